use std::collections::HashMap;
use tracing::{info, warn};

use super::batch::{prepare_for_export, prepare_for_save, ExportTable};
use super::ranking::calculate;
use super::record::ScoreRecord;
use super::score::{JudgeSlot, Score};
use crate::api::types::{EventId, Participant, ParticipantId};
use crate::error::ConsoleError;
use crate::notification::Notification;

/// In-memory score map for one (category, event) selection
#[derive(Debug, Clone, Default)]
pub struct ScoreSheet {
    records: Vec<ScoreRecord>,
    index: HashMap<ParticipantId, usize>,
    /// Marks changed since totals and ranks were last derived
    stale: bool,
}

/// Build a score sheet from the participants listed for a selection.
///
/// An empty listing is a valid state and comes back with an info notice.
pub fn load_scores(participants: &[Participant]) -> (ScoreSheet, Option<Notification>) {
    let mut records = Vec::with_capacity(participants.len());
    for participant in participants {
        if records
            .iter()
            .any(|r: &ScoreRecord| r.participant_id == participant.id)
        {
            warn!(participant = participant.id, "duplicate participant in listing, skipped");
            continue;
        }
        records.push(ScoreRecord::from_participant(participant));
    }

    let sheet = ScoreSheet::new(records);

    let notice = if sheet.is_empty() {
        info!("no participants for the selected category and event");
        Some(Notification::info(
            "No participants found for the selected category and event",
        ))
    } else if participants.iter().any(Participant::has_stored_marks) {
        info!(participants = sheet.len(), "loaded saved results");
        Some(Notification::success("Loaded saved results successfully"))
    } else {
        info!(participants = sheet.len(), "loaded participants");
        None
    };

    (sheet, notice)
}

impl ScoreSheet {
    pub fn new(records: Vec<ScoreRecord>) -> Self {
        let mut sheet = Self {
            records,
            index: HashMap::new(),
            stale: false,
        };
        sheet.reindex();
        sheet
    }

    fn reindex(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.participant_id, i))
            .collect();
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, participant_id: ParticipantId) -> Option<&ScoreRecord> {
        self.index.get(&participant_id).map(|&i| &self.records[i])
    }

    pub fn find_by_chest(&self, chest_number: &str) -> Option<&ScoreRecord> {
        self.records
            .iter()
            .find(|r| r.chest_number.eq_ignore_ascii_case(chest_number.trim()))
    }

    /// True once any record carries a rank (calculated or stored)
    pub fn is_ranked(&self) -> bool {
        self.records.iter().any(|r| r.rank().is_some())
    }

    /// True when a mark changed after the last calculation, so totals and
    /// ranks no longer match the marks. Stored ranks count as current.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Record one judge's mark. Totals and ranks are left alone until the
    /// next [`calculate`](Self::calculate).
    pub fn set_score(
        &mut self,
        participant_id: ParticipantId,
        slot: JudgeSlot,
        score: Score,
    ) -> Result<(), ConsoleError> {
        let i = *self.index.get(&participant_id).ok_or_else(|| {
            ConsoleError::validation(format!(
                "Participant {} is not in the loaded results",
                participant_id
            ))
        })?;
        self.records[i].set_score(slot, score);
        self.stale = true;
        Ok(())
    }

    /// Recompute totals and ranks; records end up in ranked order
    pub fn calculate(&mut self) {
        let records = std::mem::take(&mut self.records);
        self.records = calculate(records);
        self.reindex();
        self.stale = false;
    }

    pub fn prepare_for_save(
        &self,
        event_id: Option<EventId>,
    ) -> Result<Vec<crate::api::types::ResultEntry>, ConsoleError> {
        prepare_for_save(&self.records, event_id)
    }

    pub fn prepare_for_export(&self, category_name: &str, event_name: &str) -> ExportTable {
        prepare_for_export(&self.records, category_name, event_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::Severity;

    fn participant(id: i64, chest: &str, marks: [Option<f64>; 3]) -> Participant {
        Participant {
            id,
            chest_number: chest.to_string(),
            name: format!("Participant {}", id),
            category_id: Some(1),
            events: vec![],
            judge1_marks: marks[0],
            judge2_marks: marks[1],
            judge3_marks: marks[2],
            total_marks: None,
            rank: None,
        }
    }

    #[test]
    fn test_load_empty_is_info_not_error() {
        let (sheet, notice) = load_scores(&[]);
        assert!(sheet.is_empty());
        let notice = notice.unwrap();
        assert_eq!(notice.severity, Severity::Info);
        assert!(!notice.is_error());
    }

    #[test]
    fn test_load_defaults_missing_to_unset() {
        let (sheet, notice) = load_scores(&[participant(1, "101", [None, None, None])]);
        assert!(notice.is_none());
        let record = sheet.get(1).unwrap();
        assert!(record.judge_scores().iter().all(|s| *s == Score::Unset));
    }

    #[test]
    fn test_load_reports_saved_results() {
        let (_, notice) = load_scores(&[
            participant(1, "101", [Some(7.0), None, None]),
            participant(2, "102", [None, None, None]),
        ]);
        assert_eq!(notice.unwrap().severity, Severity::Success);
    }

    #[test]
    fn test_load_skips_duplicate_participants() {
        let (sheet, _) = load_scores(&[
            participant(1, "101", [Some(7.0), None, None]),
            participant(1, "101", [Some(9.0), None, None]),
        ]);
        assert_eq!(sheet.len(), 1);
        assert_eq!(
            sheet.get(1).unwrap().score(JudgeSlot::First),
            Score::Numeric(7.0)
        );
    }

    #[test]
    fn test_set_score_does_not_recalculate() {
        let (mut sheet, _) = load_scores(&[participant(1, "101", [None, None, None])]);
        sheet
            .set_score(1, JudgeSlot::Second, Score::Numeric(6.5))
            .unwrap();
        let record = sheet.get(1).unwrap();
        assert_eq!(record.score(JudgeSlot::Second), Score::Numeric(6.5));
        assert_eq!(record.total_score(), None);
        assert_eq!(record.rank(), None);
    }

    #[test]
    fn test_set_score_can_clear() {
        let (mut sheet, _) = load_scores(&[participant(1, "101", [Some(4.0), None, None])]);
        sheet.set_score(1, JudgeSlot::First, Score::Unset).unwrap();
        assert_eq!(sheet.get(1).unwrap().score(JudgeSlot::First), Score::Unset);
    }

    #[test]
    fn test_set_score_unknown_participant() {
        let (mut sheet, _) = load_scores(&[participant(1, "101", [None, None, None])]);
        let err = sheet
            .set_score(42, JudgeSlot::First, Score::Numeric(1.0))
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
    }

    #[test]
    fn test_calculate_keeps_lookup_in_sync() {
        let (mut sheet, _) = load_scores(&[
            participant(1, "101", [Some(1.0), None, None]),
            participant(2, "102", [Some(9.0), None, None]),
        ]);
        assert!(!sheet.is_ranked());
        sheet.calculate();
        assert!(sheet.is_ranked());
        assert_eq!(sheet.records()[0].participant_id, 2);
        assert_eq!(sheet.get(1).unwrap().rank(), Some(2));
        assert_eq!(sheet.get(2).unwrap().rank(), Some(1));

        sheet.set_score(1, JudgeSlot::Second, Score::Numeric(20.0)).unwrap();
        assert_eq!(sheet.get(1).unwrap().score(JudgeSlot::Second), Score::Numeric(20.0));
    }

    #[test]
    fn test_edit_after_calculate_marks_sheet_stale() {
        let (mut sheet, _) = load_scores(&[
            participant(1, "101", [Some(10.0), None, None]),
            participant(2, "102", [Some(8.0), None, None]),
        ]);
        assert!(!sheet.is_stale());
        sheet.calculate();
        assert!(!sheet.is_stale());

        sheet.set_score(2, JudgeSlot::First, Score::Numeric(20.0)).unwrap();
        assert!(sheet.is_stale());

        sheet.calculate();
        assert!(!sheet.is_stale());
        assert_eq!(sheet.get(2).unwrap().rank(), Some(1));
    }

    #[test]
    fn test_stored_ranks_are_not_stale() {
        let mut stored = participant(1, "101", [Some(7.0), None, None]);
        stored.total_marks = Some(7.0);
        stored.rank = Some(1);
        let (sheet, _) = load_scores(&[stored]);
        assert!(sheet.is_ranked());
        assert!(!sheet.is_stale());
    }

    #[test]
    fn test_find_by_chest() {
        let (sheet, _) = load_scores(&[participant(1, "a-101", [None, None, None])]);
        assert_eq!(sheet.find_by_chest("A-101").unwrap().participant_id, 1);
        assert!(sheet.find_by_chest("A-999").is_none());
    }
}
