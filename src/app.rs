use aditamil::model::{GeminiClient, GenerativeModel, ModelError};
use aditamil::{AnnotationSession, PendingAnalysis, Segment, SessionError, WordOrigin};
use eframe::{egui, App, NativeOptions};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Runtime;

type Reply = (PendingAnalysis, Result<String, ModelError>);

const HIGHLIGHT: egui::Color32 = egui::Color32::from_rgb(253, 230, 138);
const HIGHLIGHT_SELECTED: egui::Color32 = egui::Color32::from_rgb(252, 211, 77);

struct AdiTamilApp {
    runtime: Runtime,
    session: AnnotationSession<GeminiClient>,
    input: String,
    api_key_input: String,
    show_settings: bool,
    notice: Option<String>,
    replies_tx: Sender<Reply>,
    replies_rx: Receiver<Reply>,
}

impl AdiTamilApp {
    fn new(runtime: Runtime, session: AnnotationSession<GeminiClient>) -> Self {
        let (replies_tx, replies_rx) = channel();
        let show_settings = !session.has_credential();
        Self {
            runtime,
            session,
            input: String::new(),
            api_key_input: String::new(),
            show_settings,
            notice: None,
            replies_tx,
            replies_rx,
        }
    }

    fn drain_replies(&mut self) {
        while let Ok((pending, outcome)) = self.replies_rx.try_recv() {
            if let Err(e) = self.session.finish(pending, outcome) {
                self.notice = notice_for(&e);
            }
        }
    }

    fn submit(&mut self, ctx: &egui::Context) {
        self.notice = None;
        match self.session.begin(&self.input) {
            Ok(pending) => {
                let client = self.session.model().clone();
                let tx = self.replies_tx.clone();
                let ctx = ctx.clone();
                self.runtime.spawn(async move {
                    let outcome = client.generate(pending.request()).await;
                    let _ = tx.send((pending, outcome));
                    ctx.request_repaint();
                });
            }
            Err(SessionError::MissingCredential) => {
                self.notice = Some(SessionError::MissingCredential.to_string());
                self.show_settings = true;
            }
            Err(e) => self.notice = notice_for(&e),
        }
    }

    fn settings_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("API Settings");
        ui.label("Google Gemini API Key");
        ui.add(
            egui::TextEdit::singleline(&mut self.api_key_input)
                .password(true)
                .hint_text("Enter your Gemini API key"),
        );
        ui.small("Get a free key at https://aistudio.google.com/app/apikey");
        if ui.button("Save & Close").clicked() {
            self.session.set_credential(&self.api_key_input);
            self.show_settings = !self.session.has_credential();
        }
        ui.separator();
    }

    fn input_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let edited = ui.add(
            egui::TextEdit::multiline(&mut self.input)
                .desired_rows(5)
                .desired_width(f32::INFINITY)
                .hint_text("Try: I ate mango curry with rice and went on my catamaran boat"),
        );
        if edited.changed() && self.input.trim().is_empty() {
            self.session.clear();
        }

        let busy = self.session.is_busy();
        ui.horizontal(|ui| {
            let label = if busy { "Analyzing..." } else { "Analyze Tamil Origins" };
            let clicked = ui
                .add_enabled(!busy && !self.input.trim().is_empty(), egui::Button::new(label))
                .clicked();
            if busy {
                ui.spinner();
            }
            if clicked {
                self.submit(ctx);
            }
        });
        if let Some(notice) = &self.notice {
            ui.colored_label(egui::Color32::RED, notice);
        }
    }

    fn highlighted_text_ui(&self, ui: &mut egui::Ui) -> Option<Arc<WordOrigin>> {
        let mut clicked = None;
        let selection = self.session.selection();
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for seg in self.session.segments() {
                match seg {
                    Segment::Literal { text, .. } => {
                        ui.label(text.as_str());
                    }
                    Segment::Highlight { text, origin, .. } => {
                        let selected = selection.is_some_and(|s| Arc::ptr_eq(s, origin));
                        let color = if selected { HIGHLIGHT_SELECTED } else { HIGHLIGHT };
                        let rich = egui::RichText::new(text.as_str())
                            .background_color(color)
                            .color(egui::Color32::BLACK);
                        let response = ui
                            .add(egui::Label::new(rich).sense(egui::Sense::click()))
                            .on_hover_cursor(egui::CursorIcon::PointingHand);
                        if response.clicked() {
                            clicked = Some(Arc::clone(origin));
                        }
                    }
                }
            }
        });
        clicked
    }

    fn details_ui(&self, ui: &mut egui::Ui) {
        ui.heading("Etymology Details");
        ui.separator();
        match self.session.selection() {
            Some(word) => {
                ui.heading(&word.word);
                ui.small(word.route.to_uppercase());
                ui.add_space(6.0);
                ui.strong("Tamil Origin:");
                ui.label(egui::RichText::new(&word.tamil_origin).size(20.0));
                if !word.tamil_romanized.is_empty() {
                    ui.label(&word.tamil_romanized);
                }
                ui.add_space(6.0);
                ui.strong("Meaning:");
                ui.label(&word.meaning);
                ui.add_space(6.0);
                ui.strong("Etymology:");
                ui.label(&word.etymology);
                if !word.confidence.is_empty() {
                    ui.add_space(6.0);
                    ui.small(format!("Confidence: {}", word.confidence));
                }
            }
            None => {
                ui.label("Select a highlighted word to see its Tamil etymology");
            }
        }
        if let Some(result) = self.session.result().filter(|r| !r.summary.is_empty()) {
            ui.add_space(10.0);
            ui.separator();
            ui.strong("Summary:");
            ui.label(&result.summary);
        }
    }

    fn results_ui(&mut self, ui: &mut egui::Ui) {
        if let Some(message) = self.session.error_message() {
            ui.colored_label(egui::Color32::RED, format!("Analysis failed: {message}"));
            return;
        }
        let Some(result) = self.session.result() else {
            return;
        };
        let words: Vec<Arc<WordOrigin>> = result.found().to_vec();

        let mut clicked = None;
        ui.columns(2, |columns| {
            columns[0].heading("Highlighted Text");
            columns[0].separator();
            if words.is_empty() {
                columns[0].label("No Tamil-origin words found in this text.");
            } else {
                clicked = self.highlighted_text_ui(&mut columns[0]);
                columns[0].add_space(8.0);
                columns[0].small("Click on highlighted words to see their etymology");
            }
            self.details_ui(&mut columns[1]);
        });

        if !words.is_empty() {
            ui.separator();
            let plural = if words.len() == 1 { "" } else { "s" };
            ui.strong(format!("Found {} word{plural} with Tamil origins:", words.len()));
            ui.horizontal_wrapped(|ui| {
                for word in &words {
                    if ui.button(&word.word).clicked() {
                        clicked = Some(Arc::clone(word));
                    }
                }
            });
        }

        if let Some(origin) = clicked {
            self.session.select(&origin);
        }
    }
}

/// Text for the notice under the input box. A failed analysis is already
/// shown in the results panel and a superseded one is dropped silently.
fn notice_for(error: &SessionError) -> Option<String> {
    match error {
        SessionError::Superseded | SessionError::AnalysisFailed(_) => None,
        other => Some(other.to_string()),
    }
}

impl App for AdiTamilApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_replies();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("AdiTamil");
                ui.label("Discover the Tamil roots in everyday language");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                if self.show_settings {
                    self.settings_ui(ui);
                }
                self.input_ui(ui, ctx);
                ui.separator();
                self.results_ui(ui);
            });
        });
    }
}

pub fn run(runtime: Runtime, session: AnnotationSession<GeminiClient>) -> anyhow::Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "AdiTamil",
        options,
        Box::new(move |_cc| Box::new(AdiTamilApp::new(runtime, session))),
    )
    .map_err(|e| anyhow::anyhow!("desktop window failed: {e}"))
}
