use crate::detection::KeywordPositions;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Scores {
    pub fn from_counts(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        let precision = ratio(true_positives, true_positives + false_positives);
        let recall = ratio(true_positives, true_positives + false_negatives);
        Self {
            precision,
            recall,
            f1: f1_score(precision, recall),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordMetrics {
    pub keyword: String,
    #[serde(flatten)]
    pub scores: Scores,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Harmonic mean of precision and recall, 0 when both are 0
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Score the set of detected keywords against the expected ones.
///
/// Each distinct keyword found in both lists is a true positive; every other
/// detection is a false positive and every other expected keyword a false negative.
pub fn overall_scores(detected: &[String], keywords: &[String]) -> Scores {
    let detected_set: HashSet<&str> = detected.iter().map(String::as_str).collect();
    let expected_set: HashSet<&str> = keywords.iter().map(String::as_str).collect();
    let true_positives = detected_set.intersection(&expected_set).count();

    Scores::from_counts(
        true_positives,
        detected.len().saturating_sub(true_positives),
        keywords.len().saturating_sub(true_positives),
    )
}

/// Per-keyword scores: occurrences of a keyword count as its true positives,
/// occurrences of any other keyword as its false positives.
pub fn keyword_metrics(positions: &[KeywordPositions], keywords: &[String]) -> Vec<KeywordMetrics> {
    let occurrences = |keyword: &str| {
        positions
            .iter()
            .filter(|p| p.keyword == keyword)
            .map(|p| p.spans.len())
            .sum::<usize>()
    };
    let total: usize = positions.iter().map(|p| p.spans.len()).sum();

    keywords
        .iter()
        .map(|keyword| {
            let true_positives = occurrences(keyword.as_str());
            let false_positives = total - true_positives;
            let false_negatives = usize::from(true_positives == 0);

            KeywordMetrics {
                keyword: keyword.clone(),
                scores: Scores::from_counts(true_positives, false_positives, false_negatives),
                true_positives,
                false_positives,
                false_negatives,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn positions(entries: &[(&str, usize)]) -> Vec<KeywordPositions> {
        entries
            .iter()
            .map(|&(keyword, count)| KeywordPositions {
                keyword: keyword.to_string(),
                spans: (0..count).map(|i| (i * 10, i * 10 + 3)).collect(),
            })
            .collect()
    }

    #[test]
    fn test_f1_zero_guard() {
        assert_eq!(f1_score(0.0, 0.0), 0.0);
        assert!((f1_score(1.0, 0.5) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_overall_all_found() {
        let scores = overall_scores(&strings(&["a", "b"]), &strings(&["a", "b"]));
        assert_eq!(scores, Scores { precision: 1.0, recall: 1.0, f1: 1.0 });
    }

    #[test]
    fn test_overall_partial() {
        let scores = overall_scores(&strings(&["a"]), &strings(&["a", "b", "c", "d"]));
        assert_eq!(scores.precision, 1.0);
        assert_eq!(scores.recall, 0.25);
        assert!((scores.f1 - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_overall_nothing_detected() {
        let scores = overall_scores(&[], &strings(&["a"]));
        assert_eq!(scores, Scores::default());
    }

    #[test]
    fn test_keyword_metrics_counts() {
        let keywords = strings(&["hello", "world", "absent"]);
        let metrics = keyword_metrics(&positions(&[("hello", 2), ("world", 1), ("absent", 0)]), &keywords);

        assert_eq!(metrics.len(), 3);

        let hello = &metrics[0];
        assert_eq!((hello.true_positives, hello.false_positives, hello.false_negatives), (2, 1, 0));
        assert!((hello.scores.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(hello.scores.recall, 1.0);

        let world = &metrics[1];
        assert_eq!((world.true_positives, world.false_positives, world.false_negatives), (1, 2, 0));

        let absent = &metrics[2];
        assert_eq!((absent.true_positives, absent.false_positives, absent.false_negatives), (0, 3, 1));
        assert_eq!(absent.scores, Scores::default());
    }

    #[test]
    fn test_keyword_metrics_single_keyword() {
        let keywords = strings(&["solo"]);
        let metrics = keyword_metrics(&positions(&[("solo", 1)]), &keywords);
        assert_eq!(metrics[0].scores, Scores { precision: 1.0, recall: 1.0, f1: 1.0 });
    }

    #[test]
    fn test_keyword_metrics_serialize_flat() {
        let metrics = keyword_metrics(&positions(&[("x", 1)]), &strings(&["x"]));
        let json = serde_json::to_value(&metrics[0]).unwrap();
        assert_eq!(json["keyword"], "x");
        assert_eq!(json["precision"], 1.0);
        assert_eq!(json["true_positives"], 1);
    }
}
