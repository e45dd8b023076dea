pub mod xlsx;

pub use xlsx::{export_filename, write_workbook, SHEET_NAME};
