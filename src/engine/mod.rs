pub mod batch;
pub mod ranking;
pub mod record;
pub mod score;
pub mod sheet;

pub use batch::{prepare_for_export, prepare_for_save, Cell, ExportRow, ExportTable, EXPORT_COLUMNS};
pub use ranking::calculate;
pub use record::ScoreRecord;
pub use score::{JudgeSlot, Score, ScoreParseError};
pub use sheet::{load_scores, ScoreSheet};
