mod conversation;
mod mood;
mod suggestion;

pub use conversation::*;
pub use mood::*;
pub use suggestion::*;
