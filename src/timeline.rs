use crate::detection::KeywordMatch;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeInterval {
    pub keyword: String,
    pub start_secs: f64,
    pub end_secs: f64,
}

impl TimeInterval {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Estimate where each match sits in the audio, assuming speech is spread
/// evenly over the whole clip.
pub fn to_time_intervals(
    matches: &[KeywordMatch],
    transcript_chars: usize,
    audio_duration: f64,
) -> Vec<TimeInterval> {
    if transcript_chars == 0 {
        return Vec::new();
    }
    let total = transcript_chars as f64;

    matches
        .iter()
        .map(|m| TimeInterval {
            keyword: m.keyword.clone(),
            start_secs: m.start as f64 / total * audio_duration,
            end_secs: m.end as f64 / total * audio_duration,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword_match(start: usize, end: usize) -> KeywordMatch {
        KeywordMatch {
            keyword: "hello".to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_proportional_mapping() {
        let intervals = to_time_intervals(&[keyword_match(0, 5), keyword_match(15, 20)], 20, 4.0);
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start_secs, 0.0);
        assert_eq!(intervals[0].end_secs, 1.0);
        assert_eq!(intervals[1].start_secs, 3.0);
        assert_eq!(intervals[1].end_secs, 4.0);
        assert_eq!(intervals[1].duration_secs(), 1.0);
    }

    #[test]
    fn test_empty_transcript() {
        assert!(to_time_intervals(&[keyword_match(0, 1)], 0, 3.0).is_empty());
    }
}
