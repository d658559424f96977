mod chart;
mod classifier;
mod counter;
mod suggestions;

pub use chart::chart_series;
pub use classifier::MoodClassifier;
pub use counter::MoodSuggestionCounter;
pub use suggestions::suggestion_for;
