use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::api::{Category, Event, Participant, StoredResult};
use crate::engine::{JudgeSlot, Score, ScoreRecord, ScoreSheet};
use crate::notification::{Notification, Severity};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, counting chars rather than bytes
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a mark with at most two decimals and no trailing zeros
pub fn format_marks(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format a judge score for display; unset shows as "-"
pub fn format_score(score: Score) -> String {
    match score {
        Score::Unset => "-".to_string(),
        Score::Numeric(v) => format_marks(v),
    }
}

fn format_optional_marks(value: Option<f64>) -> String {
    value.map(format_marks).unwrap_or_else(|| "-".to_string())
}

fn format_rank(rank: Option<u32>) -> String {
    rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())
}

/// One line per category: id, name, age band
pub fn format_category_list(categories: &[Category], use_colors: bool) -> String {
    if categories.is_empty() {
        return "No categories found.".to_string();
    }

    categories
        .iter()
        .map(|c| {
            let id = format!("{:>4}", c.id);
            let band = format!("ages {}", c.age_band());
            if use_colors {
                format!("{}  {}  {}", id.dimmed(), c.name.bold(), band.cyan())
            } else {
                format!("{}  {}  {}", id, c.name, band)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per event: id, name, date, venue
pub fn format_event_list(events: &[Event], use_colors: bool) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }

    events
        .iter()
        .map(|e| format_event_line(e, use_colors))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_event_line(event: &Event, use_colors: bool) -> String {
    let id = format!("{:>4}", event.id);
    let mut detail = Vec::new();
    if !event.date.is_empty() {
        detail.push(event.date.as_str());
    }
    if !event.venue.is_empty() {
        detail.push(event.venue.as_str());
    }
    let detail = detail.join(" @ ");

    let line = if use_colors {
        format!("{}  {}  {}", id.dimmed(), event.name.bold(), detail.yellow())
    } else {
        format!("{}  {}  {}", id, event.name, detail)
    };
    line.trim_end().to_string()
}

/// One line per participant: chest number, name, registered events
pub fn format_participant_list(participants: &[Participant], use_colors: bool) -> String {
    if participants.is_empty() {
        return "No participants found.".to_string();
    }

    participants
        .iter()
        .map(|p| {
            let chest = format!("{:>8}", p.chest_number);
            let events = p
                .events
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let line = if use_colors {
                format!("{}  {}  {}", chest.bold(), p.name, events.dimmed())
            } else {
                format!("{}  {}  {}", chest, p.name, events)
            };
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Categories with their events indented underneath. A category whose
/// events could not be loaded shows the error in place of its events.
pub fn format_overview(entries: &[(Category, Result<Vec<Event>, String>)], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No categories found.".to_string();
    }

    entries
        .iter()
        .map(|(category, events)| {
            let heading = format!("{} (ages {})", category.name, category.age_band());
            let heading = if use_colors {
                heading.bold().to_string()
            } else {
                heading
            };
            let body = match events {
                Ok(events) if events.is_empty() => "    no events".to_string(),
                Ok(events) => events
                    .iter()
                    .map(|e| format!("  {}", format_event_line(e, use_colors)))
                    .collect::<Vec<_>>()
                    .join("\n"),
                Err(e) if use_colors => format!("    {}", e.red()),
                Err(e) => format!("    {}", e),
            };
            format!("{}\n{}", heading, body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn results_row(record: &ScoreRecord, name_width: usize) -> [String; 7] {
    [
        format_rank(record.rank()),
        record.chest_number.clone(),
        truncate(&record.name, name_width),
        format_score(record.score(JudgeSlot::First)),
        format_score(record.score(JudgeSlot::Second)),
        format_score(record.score(JudgeSlot::Third)),
        format_optional_marks(record.total_score()),
    ]
}

/// Score sheet as an aligned table with a header row:
/// Rank, Chest, Name, J1, J2, J3, Total
pub fn format_results_table(sheet: &ScoreSheet, use_colors: bool) -> String {
    if sheet.is_empty() {
        return "No participants found.".to_string();
    }

    // Rank 4, chest 8, marks 4 x 7, separators 2 x 6
    let fixed_width = 4 + 8 + 7 * 4 + 12;
    let name_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => width - fixed_width,
        Some(_) => 20,
        None => usize::MAX,
    };

    let rows: Vec<[String; 7]> = sheet
        .records()
        .iter()
        .map(|r| results_row(r, name_width))
        .collect();
    let name_col = rows
        .iter()
        .map(|r| r[2].chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let header = format!(
        "{:>4}  {:>8}  {:<name_col$}  {:>7}  {:>7}  {:>7}  {:>7}",
        "Rank", "Chest", "Name", "J1", "J2", "J3", "Total",
    );
    let mut lines = vec![if use_colors {
        header.bold().underline().to_string()
    } else {
        header
    }];

    for (record, row) in sheet.records().iter().zip(&rows) {
        let rank = format!("{:>4}", row[0]);
        let total = format!("{:>7}", row[6]);
        let middle = format!(
            "{:>8}  {:<name_col$}  {:>7}  {:>7}  {:>7}",
            row[1], row[2], row[3], row[4], row[5],
        );
        let line = if use_colors {
            let rank = match record.rank() {
                Some(1) => rank.yellow().bold().to_string(),
                Some(_) => rank.bold().to_string(),
                None => rank.dimmed().to_string(),
            };
            format!("{}  {}  {}", rank, middle, total.bold())
        } else {
            format!("{}  {}  {}", rank, middle, total)
        };
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

/// Score sheet as tab-separated values for scripting
/// Columns: rank, chest, name, j1, j2, j3, total (no headers, no colors;
/// unset values are empty)
pub fn format_results_tsv(sheet: &ScoreSheet) -> String {
    sheet
        .records()
        .iter()
        .map(|r| {
            let score = |slot| match r.score(slot) {
                Score::Unset => String::new(),
                Score::Numeric(v) => format_marks(v),
            };
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.rank().map(|x| x.to_string()).unwrap_or_default(),
                r.chest_number,
                r.name,
                score(JudgeSlot::First),
                score(JudgeSlot::Second),
                score(JudgeSlot::Third),
                r.total_score().map(format_marks).unwrap_or_default(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stored results, one line per participant: rank, chest, name, total
pub fn format_standings(results: &[StoredResult], use_colors: bool) -> String {
    if results.is_empty() {
        return "No saved results for this event.".to_string();
    }

    results
        .iter()
        .map(|r| {
            let rank = match r.rank {
                Some(rank) if rank > 0 => format!("{:>3}.", rank),
                _ => "   -".to_string(),
            };
            let total = format!("{:>7}", format_optional_marks(r.total_marks));
            if use_colors {
                format!(
                    "{} {}  {:>8}  {}  {}",
                    rank.dimmed(),
                    total.bold(),
                    r.chest_number,
                    r.participant_name,
                    r.event_name.cyan()
                )
            } else {
                format!(
                    "{} {}  {:>8}  {}  {}",
                    rank, total, r.chest_number, r.participant_name, r.event_name
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Notification line for stderr, colored by severity
pub fn format_notification(notification: &Notification, use_colors: bool) -> String {
    if !use_colors {
        return notification.to_string();
    }
    let label = format!("[{}]", notification.severity);
    let label = match notification.severity {
        Severity::Success => label.green().to_string(),
        Severity::Info => label.cyan().to_string(),
        Severity::Warning => label.yellow().to_string(),
        Severity::Error => label.red().bold().to_string(),
    };
    format!("{} {}", label, notification.message)
}
