pub mod config;
pub mod model;
pub mod prompt;
pub mod report;
pub mod session;
pub mod types {
    pub mod word_origin;
}
pub mod parsing {
    pub mod response_parser;
}
pub mod annotate {
    pub mod segmenter;
}

pub use annotate::segmenter::segment;
pub use parsing::response_parser::{parse_lookup, parse_response, ParseError};
pub use prompt::build_prompt;
pub use session::{AnnotationSession, PendingAnalysis, SessionError, SessionState};
pub use types::word_origin::{AnalysisResult, Segment, WordLookup, WordOrigin};
