//! Per-area score aggregation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::models::AnswerRecord;
use crate::error::{AssessmentError, Result};

/// Correct/total counts for one skill area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaTally {
    pub correct: usize,
    pub total: usize,
}

/// Final outcome for one skill area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillResult {
    /// Score in [0, 10]
    pub score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Fold graded answers into per-area counts.
pub fn tally_answers(answers: &[AnswerRecord]) -> BTreeMap<String, AreaTally> {
    let mut tally: BTreeMap<String, AreaTally> = BTreeMap::new();
    for answer in answers {
        let counts = tally.entry(answer.skill_area.clone()).or_default();
        counts.total += 1;
        if answer.is_correct {
            counts.correct += 1;
        }
    }
    tally
}

/// Score every area in the tally: `(correct / total) * 10`.
///
/// Strengths, weaknesses, and recommendations stay empty at this layer;
/// richer derivations belong to downstream consumers. An area with zero
/// answers is an error, but a tally built by [`tally_answers`] never
/// contains one.
pub fn aggregate_scores(
    tally: &BTreeMap<String, AreaTally>,
) -> Result<BTreeMap<String, SkillResult>> {
    let mut results = BTreeMap::new();
    for (area, counts) in tally {
        if counts.total == 0 {
            return Err(AssessmentError::EmptySkillArea(area.clone()).into());
        }
        let score = (counts.correct as f64 / counts.total as f64) * 10.0;
        results.insert(
            area.clone(),
            SkillResult {
                score,
                strengths: Vec::new(),
                weaknesses: Vec::new(),
                recommendations: Vec::new(),
            },
        );
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn answer(skill_area: &str, is_correct: bool) -> AnswerRecord {
        AnswerRecord {
            assessment_id: "a-1".to_string(),
            user_id: "u-1".to_string(),
            question: "q".to_string(),
            user_answer: "x".to_string(),
            is_correct,
            skill_area: skill_area.to_string(),
        }
    }

    #[test]
    fn test_seven_of_ten_scores_seven() {
        let mut answers = vec![answer("arrays", true); 7];
        answers.extend(vec![answer("arrays", false); 3]);

        let results = aggregate_scores(&tally_answers(&answers)).unwrap();
        assert_eq!(results["arrays"].score, 7.0);
    }

    #[test]
    fn test_all_correct_scores_ten() {
        let answers = vec![answer("graphs", true); 4];
        let results = aggregate_scores(&tally_answers(&answers)).unwrap();
        assert_eq!(results["graphs"].score, 10.0);
    }

    #[test]
    fn test_none_correct_scores_zero() {
        let answers = vec![answer("graphs", false); 3];
        let results = aggregate_scores(&tally_answers(&answers)).unwrap();
        assert_eq!(results["graphs"].score, 0.0);
    }

    #[test]
    fn test_multiple_areas_scored_independently() {
        let answers = vec![
            answer("arrays", true),
            answer("arrays", false),
            answer("graphs", true),
            answer("graphs", true),
            answer("graphs", false),
        ];

        let results = aggregate_scores(&tally_answers(&answers)).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results["arrays"].score, 5.0);
        assert!((results["graphs"].score - 20.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_derived_collections_stay_empty() {
        let answers = vec![answer("arrays", true)];
        let results = aggregate_scores(&tally_answers(&answers)).unwrap();
        let result = &results["arrays"];
        assert!(result.strengths.is_empty());
        assert!(result.weaknesses.is_empty());
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_zero_total_area_fails() {
        let mut tally = BTreeMap::new();
        tally.insert("phantom".to_string(), AreaTally::default());

        let result = aggregate_scores(&tally);
        assert!(matches!(
            result,
            Err(Error::Assessment(AssessmentError::EmptySkillArea(_)))
        ));
    }

    #[test]
    fn test_tally_counts_per_area() {
        let answers = vec![
            answer("arrays", false),
            answer("arrays", true),
            answer("graphs", true),
        ];

        let tally = tally_answers(&answers);
        assert_eq!(
            tally["arrays"],
            AreaTally {
                correct: 1,
                total: 2
            }
        );
        assert_eq!(
            tally["graphs"],
            AreaTally {
                correct: 1,
                total: 1
            }
        );
    }

    #[test]
    fn test_empty_answers_empty_results() {
        let results = aggregate_scores(&tally_answers(&[])).unwrap();
        assert!(results.is_empty());
    }
}
