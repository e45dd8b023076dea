use super::record::ScoreRecord;

/// Total every record and assign competition ranks.
///
/// Records come back ordered by total, highest first. Equal totals keep
/// their input order and share a rank; the group after a tie of `n` starts
/// `n` places further down (10, 10, 8 ranks as 1, 1, 3).
pub fn calculate(mut records: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    for record in records.iter_mut() {
        let total = record.computed_total();
        record.set_total(total);
    }

    // sort_by is stable, so ties stay in arrival order
    records.sort_by(|a, b| total_of(b).total_cmp(&total_of(a)));

    let mut position: u32 = 1;
    for group in records.chunk_by_mut(|a, b| total_of(a) == total_of(b)) {
        for record in group.iter_mut() {
            record.set_rank(position);
        }
        position += group.len() as u32;
    }

    records
}

fn total_of(record: &ScoreRecord) -> f64 {
    record.total_score().unwrap_or(0.0)
}
