mod crisis;
mod pipeline;
mod session;

pub use crisis::{detect_crisis_keywords, CRISIS_KEYWORDS};
pub use pipeline::{ChatPipeline, PipelineSettings};
pub use session::{SessionContext, SessionHandle, SessionStore};
