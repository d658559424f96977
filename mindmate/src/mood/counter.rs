use std::collections::HashMap;

use crate::models::{Mood, Suggestion};
use crate::mood::suggestions::suggestion_for;

/// Per-session running tally of classified moods.
///
/// A suggestion for a mood fires on the turn its count reaches `threshold`,
/// after which that count is reset to zero.
#[derive(Debug, Clone)]
pub struct MoodSuggestionCounter {
    counts: HashMap<Mood, u32>,
    threshold: u32,
}

impl MoodSuggestionCounter {
    pub fn new(threshold: u32) -> Self {
        Self {
            counts: HashMap::new(),
            threshold: threshold.max(1),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn count(&self, mood: Mood) -> u32 {
        self.counts.get(&mood).copied().unwrap_or(0)
    }

    /// Counts for every mood, in [`Mood::ALL`] order.
    pub fn counts(&self) -> Vec<(Mood, u32)> {
        Mood::ALL.into_iter().map(|m| (m, self.count(m))).collect()
    }

    pub fn record(&mut self, mood: Mood) -> Option<Suggestion> {
        let count = self.counts.entry(mood).or_insert(0);
        *count += 1;

        if *count >= self.threshold {
            *count = 0;
            return Some(suggestion_for(mood));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_starts_at_zero() {
        let counter = MoodSuggestionCounter::new(3);
        assert!(counter.counts().iter().all(|(_, c)| *c == 0));
    }

    #[test]
    fn test_record_only_touches_classified_mood() {
        let mut counter = MoodSuggestionCounter::new(3);
        counter.record(Mood::Angry);

        assert_eq!(
            counter.counts(),
            vec![
                (Mood::Happy, 0),
                (Mood::Neutral, 0),
                (Mood::Sad, 0),
                (Mood::Angry, 1),
                (Mood::Distressed, 0),
            ]
        );
    }

    #[test]
    fn test_fires_on_threshold_and_resets() {
        let mut counter = MoodSuggestionCounter::new(3);
        assert!(counter.record(Mood::Sad).is_none());
        assert!(counter.record(Mood::Sad).is_none());

        let suggestion = counter.record(Mood::Sad).expect("third sad should fire");
        assert_eq!(suggestion.mood, Mood::Sad);
        assert_eq!(counter.count(Mood::Sad), 0);

        // Debounced: the cycle starts over.
        assert!(counter.record(Mood::Sad).is_none());
        assert_eq!(counter.count(Mood::Sad), 1);
    }

    #[test]
    fn test_interleaved_moods_count_independently() {
        let mut counter = MoodSuggestionCounter::new(2);
        assert!(counter.record(Mood::Happy).is_none());
        assert!(counter.record(Mood::Sad).is_none());
        let fired = counter.record(Mood::Happy).expect("second happy fires");
        assert_eq!(fired.mood, Mood::Happy);
        assert_eq!(counter.count(Mood::Sad), 1);
    }

    #[test]
    fn test_threshold_one_fires_every_time() {
        let mut counter = MoodSuggestionCounter::new(1);
        assert!(counter.record(Mood::Neutral).is_some());
        assert!(counter.record(Mood::Neutral).is_some());
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        assert_eq!(MoodSuggestionCounter::new(0).threshold(), 1);
    }
}
