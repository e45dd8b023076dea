use std::str::FromStr;

use crate::engine::{JudgeSlot, Score, ScoreSheet};
use crate::error::ConsoleError;

/// A score edit given on the command line as `CHEST:SLOT=VALUE`.
/// An empty `VALUE` clears the score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreAssignment {
    pub chest_number: String,
    pub slot: JudgeSlot,
    pub score: Score,
}

impl FromStr for ScoreAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected CHEST:SLOT=VALUE, got '{}'", s))?;
        let (chest, slot) = target
            .rsplit_once(':')
            .ok_or_else(|| format!("expected CHEST:SLOT=VALUE, got '{}'", s))?;

        let chest_number = chest.trim();
        if chest_number.is_empty() {
            return Err(format!("missing chest number in '{}'", s));
        }
        let slot: u8 = slot
            .trim()
            .parse()
            .map_err(|_| format!("judge slot must be 1, 2 or 3 (got '{}')", slot.trim()))?;
        let slot = JudgeSlot::try_from(slot)?;
        let score = Score::parse(value).map_err(|e| e.to_string())?;

        Ok(Self {
            chest_number: chest_number.to_string(),
            slot,
            score,
        })
    }
}

/// Resolve chest numbers against the sheet and apply every edit.
/// Stops at the first chest number that is not on the sheet.
pub fn apply_assignments(
    sheet: &mut ScoreSheet,
    assignments: &[ScoreAssignment],
) -> Result<(), ConsoleError> {
    for assignment in assignments {
        let participant_id = sheet
            .find_by_chest(&assignment.chest_number)
            .map(|r| r.participant_id)
            .ok_or_else(|| {
                ConsoleError::validation(format!(
                    "No participant with chest number {} in this event",
                    assignment.chest_number
                ))
            })?;
        sheet.set_score(participant_id, assignment.slot, assignment.score)?;
    }
    Ok(())
}
