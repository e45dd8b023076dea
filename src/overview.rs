use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::api::{Category, Event, ResultsApi};

/// Fetch every category's events in parallel.
///
/// Results come back in category order. A failed category keeps its error
/// message instead of failing the whole overview.
pub async fn fetch_overview<A: ResultsApi>(
    api: &A,
    categories: &[Category],
) -> Vec<(Category, Result<Vec<Event>, String>)> {
    let mut futures = FuturesUnordered::new();
    for (idx, category) in categories.iter().enumerate() {
        let id = category.id;
        futures.push(async move { (idx, api.list_events(Some(id)).await) });
    }

    let mut slots: Vec<Option<Result<Vec<Event>, String>>> = vec![None; categories.len()];
    while let Some((idx, result)) = futures.next().await {
        match &result {
            Ok(events) => debug!(category = categories[idx].id, events = events.len(), "loaded events"),
            Err(e) => warn!(category = categories[idx].id, error = %e, "event listing failed"),
        }
        slots[idx] = Some(result.map_err(|e| e.to_string()));
    }

    categories
        .iter()
        .cloned()
        .zip(slots)
        .map(|(category, events)| {
            let events = events.unwrap_or_else(|| Err("not fetched".to_string()));
            (category, events)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CategoryId, EventId, Participant, ResultEntry, SaveReceipt, StoredResult};
    use crate::error::ConsoleError;
    use async_trait::async_trait;

    struct EventsOnly;

    #[async_trait]
    impl ResultsApi for EventsOnly {
        async fn list_categories(&self) -> Result<Vec<Category>, ConsoleError> {
            Ok(vec![])
        }

        async fn list_events(&self, category: Option<CategoryId>) -> Result<Vec<Event>, ConsoleError> {
            match category {
                Some(2) => Err(ConsoleError::fetch("events", "HTTP 500")),
                Some(id) => Ok(vec![Event {
                    id: id * 10,
                    name: format!("Event {}", id),
                    category_id: Some(id),
                    date: String::new(),
                    venue: String::new(),
                }]),
                None => Ok(vec![]),
            }
        }

        async fn list_participants(
            &self,
            _category: Option<CategoryId>,
            _event: Option<EventId>,
        ) -> Result<Vec<Participant>, ConsoleError> {
            Ok(vec![])
        }

        async fn save_results(&self, batch: &[ResultEntry]) -> Result<SaveReceipt, ConsoleError> {
            Ok(SaveReceipt::Records(vec![serde_json::Value::Null; batch.len()]))
        }

        async fn list_results(
            &self,
            _category: Option<CategoryId>,
            _event: Option<EventId>,
        ) -> Result<Vec<StoredResult>, ConsoleError> {
            Ok(vec![])
        }
    }

    fn category(id: i64) -> Category {
        Category {
            id,
            name: format!("C{}", id),
            min_age: 5,
            max_age: 9,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_overview_keeps_category_order_and_errors() {
        let categories = vec![category(3), category(2), category(1)];
        let overview = fetch_overview(&EventsOnly, &categories).await;

        let ids: Vec<i64> = overview.iter().map(|(c, _)| c.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(overview[0].1.as_ref().unwrap()[0].id, 30);
        assert_eq!(
            overview[1].1.as_ref().unwrap_err(),
            "Error fetching events: HTTP 500"
        );
        assert_eq!(overview[2].1.as_ref().unwrap()[0].id, 10);
    }

    #[tokio::test]
    async fn test_overview_empty() {
        assert!(fetch_overview(&EventsOnly, &[]).await.is_empty());
    }
}
