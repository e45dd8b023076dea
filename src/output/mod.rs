pub mod formatter;

pub use formatter::{
    format_category_list, format_event_list, format_marks, format_notification, format_overview,
    format_participant_list, format_results_table, format_results_tsv, format_score,
    format_standings, should_use_colors,
};
