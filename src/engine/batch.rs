use super::record::ScoreRecord;
use super::score::JudgeSlot;
use crate::api::types::{EventId, ResultEntry};
use crate::error::ConsoleError;

/// Normalize ranked records into a save batch for `event_id`.
///
/// This is where unset marks become 0 and a missing rank becomes 0, matching
/// the store's numeric schema. Totals are recomputed from the marks so the
/// batch is always self-consistent.
pub fn prepare_for_save(
    records: &[ScoreRecord],
    event_id: Option<EventId>,
) -> Result<Vec<ResultEntry>, ConsoleError> {
    let event_id = match event_id {
        Some(id) if id > 0 => id,
        Some(id) => {
            return Err(ConsoleError::validation(format!(
                "Invalid event id {}",
                id
            )))
        }
        None => {
            return Err(ConsoleError::validation(
                "Select an event before saving results",
            ))
        }
    };

    if records.is_empty() {
        return Err(ConsoleError::validation("No participants to save"));
    }

    Ok(records
        .iter()
        .map(|record| ResultEntry {
            participant_id: record.participant_id,
            event_id,
            judge1_marks: record.score(JudgeSlot::First).value_or_zero(),
            judge2_marks: record.score(JudgeSlot::Second).value_or_zero(),
            judge3_marks: record.score(JudgeSlot::Third).value_or_zero(),
            total_marks: record.computed_total(),
            rank: record.rank().unwrap_or(0),
        })
        .collect())
}

/// Column labels of the results spreadsheet, in order
pub const EXPORT_COLUMNS: [&str; 9] = [
    "Chest Number",
    "Name",
    "Category",
    "Event",
    "Judge 1 Marks",
    "Judge 2 Marks",
    "Judge 3 Marks",
    "Total Marks",
    "Rank",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub chest_number: String,
    pub name: String,
    pub category: String,
    pub event: String,
    pub judge_marks: [f64; 3],
    pub total_marks: f64,
    /// Rank number, or `-` for a record that was never ranked
    pub rank: Cell,
}

impl ExportRow {
    /// Cells in [`EXPORT_COLUMNS`] order
    pub fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.chest_number.clone()),
            Cell::Text(self.name.clone()),
            Cell::Text(self.category.clone()),
            Cell::Text(self.event.clone()),
            Cell::Number(self.judge_marks[0]),
            Cell::Number(self.judge_marks[1]),
            Cell::Number(self.judge_marks[2]),
            Cell::Number(self.total_marks),
            self.rank.clone(),
        ]
    }

    /// Look up a cell by its column label
    pub fn cell(&self, label: &str) -> Option<Cell> {
        EXPORT_COLUMNS
            .iter()
            .position(|c| *c == label)
            .map(|i| self.cells().swap_remove(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub category_name: String,
    pub event_name: String,
    pub rows: Vec<ExportRow>,
}

/// Tabulate records for the spreadsheet. Blank marks and totals render as
/// 0, a missing rank as `-`. Nothing is recalculated.
pub fn prepare_for_export(
    records: &[ScoreRecord],
    category_name: &str,
    event_name: &str,
) -> ExportTable {
    let rows = records
        .iter()
        .map(|record| ExportRow {
            chest_number: record.chest_number.clone(),
            name: record.name.clone(),
            category: category_name.to_string(),
            event: event_name.to_string(),
            judge_marks: [
                record.score(JudgeSlot::First).value_or_zero(),
                record.score(JudgeSlot::Second).value_or_zero(),
                record.score(JudgeSlot::Third).value_or_zero(),
            ],
            total_marks: record.total_score().unwrap_or(0.0),
            rank: match record.rank() {
                Some(rank) => Cell::Number(f64::from(rank)),
                None => Cell::Text("-".to_string()),
            },
        })
        .collect();

    ExportTable {
        category_name: category_name.to_string(),
        event_name: event_name.to_string(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ranking::calculate;
    use crate::engine::score::Score;

    fn ranked_pair() -> Vec<ScoreRecord> {
        calculate(vec![
            ScoreRecord::new(1, "101", "Asha").with_scores([
                Score::Numeric(3.0),
                Score::Numeric(2.0),
                Score::Numeric(3.0),
            ]),
            ScoreRecord::new(2, "102", "Ben").with_scores([
                Score::Numeric(5.0),
                Score::Unset,
                Score::Unset,
            ]),
        ])
    }

    #[test]
    fn test_save_batch_shape() {
        let batch = prepare_for_save(&ranked_pair(), Some(7)).unwrap();
        assert_eq!(batch.len(), 2);

        assert_eq!(batch[0].participant_id, 1);
        assert_eq!(batch[0].event_id, 7);
        assert_eq!(batch[0].total_marks, 8.0);
        assert_eq!(batch[0].rank, 1);

        assert_eq!(batch[1].participant_id, 2);
        assert_eq!(batch[1].event_id, 7);
        assert_eq!(batch[1].total_marks, 5.0);
        assert_eq!(batch[1].rank, 2);

        for entry in &batch {
            let value = serde_json::to_value(entry).unwrap();
            assert_eq!(value.as_object().unwrap().len(), 7);
        }
    }

    #[test]
    fn test_save_collapses_unset_to_zero() {
        let batch = prepare_for_save(&ranked_pair(), Some(7)).unwrap();
        assert_eq!(batch[1].judge1_marks, 5.0);
        assert_eq!(batch[1].judge2_marks, 0.0);
        assert_eq!(batch[1].judge3_marks, 0.0);
    }

    #[test]
    fn test_save_unranked_record_gets_rank_zero() {
        let records = vec![ScoreRecord::new(5, "105", "Eve")];
        let batch = prepare_for_save(&records, Some(3)).unwrap();
        assert_eq!(batch[0].rank, 0);
        assert_eq!(batch[0].total_marks, 0.0);
    }

    #[test]
    fn test_save_requires_event() {
        let err = prepare_for_save(&ranked_pair(), None).unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));

        let err = prepare_for_save(&ranked_pair(), Some(0)).unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
    }

    #[test]
    fn test_save_requires_records() {
        let err = prepare_for_save(&[], Some(7)).unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
        assert_eq!(err.to_string(), "No participants to save");
    }

    #[test]
    fn test_export_unranked_renders_dash() {
        let records = vec![ScoreRecord::new(5, "105", "Eve")];
        let table = prepare_for_export(&records, "Junior", "Solo Song");
        let row = &table.rows[0];
        assert_eq!(row.cell("Rank"), Some(Cell::Text("-".to_string())));
        assert_eq!(row.cell("Judge 1 Marks"), Some(Cell::Number(0.0)));
        assert_eq!(row.cell("Total Marks"), Some(Cell::Number(0.0)));
    }

    #[test]
    fn test_export_row_columns() {
        let table = prepare_for_export(&ranked_pair(), "Junior", "Solo Song");
        assert_eq!(table.rows.len(), 2);
        let row = &table.rows[0];
        assert_eq!(row.cells().len(), EXPORT_COLUMNS.len());
        assert_eq!(row.cell("Chest Number"), Some(Cell::Text("101".to_string())));
        assert_eq!(row.cell("Category"), Some(Cell::Text("Junior".to_string())));
        assert_eq!(row.cell("Event"), Some(Cell::Text("Solo Song".to_string())));
        assert_eq!(row.cell("Total Marks"), Some(Cell::Number(8.0)));
        assert_eq!(row.cell("Rank"), Some(Cell::Number(1.0)));
        assert_eq!(row.cell("Nope"), None);
    }

    #[test]
    fn test_export_does_not_rank() {
        let records = vec![ScoreRecord::new(1, "1", "A").with_scores([
            Score::Numeric(9.0),
            Score::Unset,
            Score::Unset,
        ])];
        let table = prepare_for_export(&records, "C", "E");
        assert_eq!(table.rows[0].rank, Cell::Text("-".to_string()));
        // Total is only what was calculated, not recomputed here
        assert_eq!(table.rows[0].total_marks, 0.0);
    }
}
