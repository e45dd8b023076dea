use serde::{Deserialize, Serialize};

pub type CategoryId = i64;
pub type EventId = i64;
pub type ParticipantId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub min_age: u32,
    pub max_age: u32,
    #[serde(default)]
    pub description: String,
}

impl Category {
    /// Age band in "min-max" form for listings
    pub fn age_band(&self) -> String {
        format!("{}-{}", self.min_age, self.max_age)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub venue: String,
}

/// Participant as listed by `/participants/`, including any stored marks
/// for the event it was filtered by.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub chest_number: String,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub judge1_marks: Option<f64>,
    #[serde(default)]
    pub judge2_marks: Option<f64>,
    #[serde(default)]
    pub judge3_marks: Option<f64>,
    #[serde(default)]
    pub total_marks: Option<f64>,
    #[serde(default)]
    pub rank: Option<i64>,
}

impl Participant {
    pub fn has_stored_marks(&self) -> bool {
        self.judge1_marks.is_some() || self.judge2_marks.is_some() || self.judge3_marks.is_some()
    }
}

/// One row of a save batch for `POST /results/`.
///
/// Field set mirrors the store's result schema exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub participant_id: ParticipantId,
    pub event_id: EventId,
    pub judge1_marks: f64,
    pub judge2_marks: f64,
    pub judge3_marks: f64,
    pub total_marks: f64,
    pub rank: u32,
}

/// Response to a save batch. Stores either echo the saved rows or reply
/// with a short summary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SaveReceipt {
    Records(Vec<serde_json::Value>),
    Summary {
        #[serde(default)]
        message: Option<String>,
        count: usize,
    },
}

impl SaveReceipt {
    pub fn saved_count(&self) -> usize {
        match self {
            SaveReceipt::Records(rows) => rows.len(),
            SaveReceipt::Summary { count, .. } => *count,
        }
    }
}

/// Stored result joined with participant/event names, from `GET /results/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    pub participant_name: String,
    pub chest_number: String,
    pub event_name: String,
    pub category_name: String,
    #[serde(default)]
    pub judge1_marks: Option<f64>,
    #[serde(default)]
    pub judge2_marks: Option<f64>,
    #[serde(default)]
    pub judge3_marks: Option<f64>,
    #[serde(default)]
    pub total_marks: Option<f64>,
    #[serde(default)]
    pub rank: Option<i64>,
}

/// Error body returned by the store on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Detail as display text. Validation failures arrive as a JSON array.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_without_marks_parses() {
        let json = r#"{
            "id": 3,
            "chest_number": "A-101",
            "name": "Mary",
            "category_id": 2,
            "events": [{"id": 7, "name": "Solo Song", "category_id": 2, "date": "2024-05-01", "venue": "Hall A"}]
        }"#;
        let p: Participant = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, 3);
        assert_eq!(p.events.len(), 1);
        assert!(p.judge1_marks.is_none());
        assert!(p.rank.is_none());
        assert!(!p.has_stored_marks());
    }

    #[test]
    fn test_participant_with_null_and_zero_marks() {
        let json = r#"{
            "id": 4, "chest_number": "A-102", "name": "John",
            "judge1_marks": null, "judge2_marks": 0.0, "judge3_marks": 7.5,
            "total_marks": 7.5, "rank": 2
        }"#;
        let p: Participant = serde_json::from_str(json).unwrap();
        assert_eq!(p.judge1_marks, None);
        assert_eq!(p.judge2_marks, Some(0.0));
        assert_eq!(p.judge3_marks, Some(7.5));
        assert!(p.has_stored_marks());
    }

    #[test]
    fn test_result_entry_has_exact_fields() {
        let entry = ResultEntry {
            participant_id: 1,
            event_id: 7,
            judge1_marks: 3.0,
            judge2_marks: 2.0,
            judge3_marks: 3.0,
            total_marks: 8.0,
            rank: 1,
        };
        let value = serde_json::to_value(&entry).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(value["event_id"], 7);
        assert_eq!(value["rank"], 1);
    }

    #[test]
    fn test_save_receipt_variants() {
        let summary: SaveReceipt =
            serde_json::from_str(r#"{"message": "Results saved successfully", "count": 4}"#)
                .unwrap();
        assert_eq!(summary.saved_count(), 4);

        let records: SaveReceipt = serde_json::from_str(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(records.saved_count(), 2);
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Chest number already registered"}"#).unwrap();
        assert_eq!(body.message(), "Chest number already registered");

        let body: ErrorBody = serde_json::from_str(r#"{"detail": [{"msg": "field required"}]}"#).unwrap();
        assert!(body.message().contains("field required"));
    }
}
