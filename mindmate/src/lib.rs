pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod mood;
pub mod services;
pub mod speech;
pub mod store;
pub mod transcription;
