//! v1 API Data Transfer Objects.
//!
//! Wire format for the v1 REST API, kept separate from the domain models in
//! `src/models/`.

pub mod moods;
pub mod sessions;
pub mod speech;

pub use moods::*;
pub use sessions::*;
pub use speech::*;
