mod api;
mod provider;
mod queue;

pub use provider::SpeechProvider;
pub use queue::{SpeechJob, SpeechJobState, SpeechQueue};
