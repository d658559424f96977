pub(crate) mod health;
pub mod moods;
pub mod sessions;
pub mod speech;

pub use health::health_check;
