use super::score::{round_half_up, JudgeSlot, Score};
use crate::api::types::{Participant, ParticipantId};

/// Working copy of one participant's marks for the selected event.
///
/// `total_score` and `rank` are derived by [`calculate`](super::ranking::calculate)
/// and cannot be set directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub participant_id: ParticipantId,
    pub chest_number: String,
    pub name: String,
    judge_scores: [Score; 3],
    total_score: Option<f64>,
    rank: Option<u32>,
}

impl ScoreRecord {
    pub fn new(
        participant_id: ParticipantId,
        chest_number: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            participant_id,
            chest_number: chest_number.into(),
            name: name.into(),
            judge_scores: [Score::Unset; 3],
            total_score: None,
            rank: None,
        }
    }

    pub fn with_scores(mut self, scores: [Score; 3]) -> Self {
        self.judge_scores = scores;
        self
    }

    /// Build from a store listing. Stored total and rank are shown until the
    /// next calculation; a stored rank of 0 means the store never ranked it.
    pub fn from_participant(participant: &Participant) -> Self {
        Self {
            participant_id: participant.id,
            chest_number: participant.chest_number.clone(),
            name: participant.name.clone(),
            judge_scores: [
                Score::from_stored(participant.judge1_marks),
                Score::from_stored(participant.judge2_marks),
                Score::from_stored(participant.judge3_marks),
            ],
            total_score: participant.total_marks,
            rank: participant
                .rank
                .filter(|r| *r > 0)
                .and_then(|r| u32::try_from(r).ok()),
        }
    }

    pub fn score(&self, slot: JudgeSlot) -> Score {
        self.judge_scores[slot.index()]
    }

    pub fn judge_scores(&self) -> &[Score; 3] {
        &self.judge_scores
    }

    pub fn total_score(&self) -> Option<f64> {
        self.total_score
    }

    pub fn rank(&self) -> Option<u32> {
        self.rank
    }

    /// Sum of the three marks (unset counts as 0), rounded to 2 decimals
    pub fn computed_total(&self) -> f64 {
        round_half_up(self.judge_scores.iter().map(Score::value_or_zero).sum())
    }

    pub(crate) fn set_score(&mut self, slot: JudgeSlot, score: Score) {
        self.judge_scores[slot.index()] = score;
    }

    pub(crate) fn set_total(&mut self, total: f64) {
        self.total_score = Some(total);
    }

    pub(crate) fn set_rank(&mut self, rank: u32) {
        self.rank = Some(rank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(rank: Option<i64>) -> Participant {
        Participant {
            id: 9,
            chest_number: "B-12".to_string(),
            name: "Anna".to_string(),
            category_id: Some(1),
            events: vec![],
            judge1_marks: None,
            judge2_marks: Some(5.0),
            judge3_marks: Some(0.0),
            total_marks: Some(5.0),
            rank,
        }
    }

    #[test]
    fn test_from_participant_keeps_unset_distinct_from_zero() {
        let record = ScoreRecord::from_participant(&participant(Some(2)));
        assert_eq!(record.score(JudgeSlot::First), Score::Unset);
        assert_eq!(record.score(JudgeSlot::Second), Score::Numeric(5.0));
        assert_eq!(record.score(JudgeSlot::Third), Score::Numeric(0.0));
        assert_eq!(record.total_score(), Some(5.0));
        assert_eq!(record.rank(), Some(2));
    }

    #[test]
    fn test_stored_rank_zero_is_unranked() {
        let record = ScoreRecord::from_participant(&participant(Some(0)));
        assert_eq!(record.rank(), None);
    }

    #[test]
    fn test_computed_total_defaults_unset_to_zero() {
        let record = ScoreRecord::new(1, "1", "A").with_scores([
            Score::Unset,
            Score::Numeric(5.0),
            Score::Numeric(3.0),
        ]);
        assert_eq!(record.computed_total(), 8.0);
        // Not stored until calculated
        assert_eq!(record.total_score(), None);
    }

    #[test]
    fn test_computed_total_rounds_float_noise() {
        let record = ScoreRecord::new(1, "1", "A").with_scores([
            Score::Numeric(0.1),
            Score::Numeric(0.2),
            Score::Unset,
        ]);
        assert_eq!(record.computed_total(), 0.3);
    }
}
