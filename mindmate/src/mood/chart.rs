use crate::models::{ChartPoint, MoodSample};

/// Valence series for the mood history chart, ordered by time.
///
/// Samples sharing a timestamp keep their log order.
pub fn chart_series(samples: &[MoodSample]) -> Vec<ChartPoint> {
    let mut ordered: Vec<&MoodSample> = samples.iter().collect();
    ordered.sort_by_key(|sample| sample.timestamp);

    ordered
        .into_iter()
        .map(|sample| ChartPoint {
            timestamp: sample.timestamp,
            mood: sample.mood,
            score: sample.mood.valence(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mood;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_happy_then_sad() {
        let t1 = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 1, 1, 11, 0, 0).unwrap();
        let series = chart_series(&[MoodSample::at(t1, Mood::Happy), MoodSample::at(t2, Mood::Sad)]);

        let scores: Vec<f64> = series.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![2.0, -1.0]);
    }

    #[test]
    fn test_out_of_order_rows_are_sorted() {
        let t1 = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap();
        let series = chart_series(&[MoodSample::at(t2, Mood::Angry), MoodSample::at(t1, Mood::Neutral)]);

        assert_eq!(series[0].mood, Mood::Neutral);
        assert_eq!(series[1].mood, Mood::Angry);
    }

    #[test]
    fn test_equal_timestamps_keep_log_order() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        let series = chart_series(&[
            MoodSample::at(t, Mood::Distressed),
            MoodSample::at(t, Mood::Happy),
        ]);
        assert_eq!(series[0].score, -1.5);
        assert_eq!(series[1].score, 2.0);
    }

    #[test]
    fn test_empty_log() {
        assert!(chart_series(&[]).is_empty());
    }
}
