mod csv_log;
mod traits;

pub use csv_log::CsvMoodLog;
pub use traits::MoodLog;
