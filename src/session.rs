use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::api::cache::{categories_key, events_key, DirectoryCache};
use crate::api::{Category, CategoryId, Event, EventId, ParticipantId, ResultsApi, StoredResult};
use crate::engine::{load_scores, JudgeSlot, Score, ScoreSheet};
use crate::error::ConsoleError;
use crate::export::{export_filename, write_workbook};
use crate::notification::Notification;

/// State behind the results screen: directories, the current selection and
/// the score sheet being edited.
///
/// Every action takes `&mut self`, so a load or save has to finish before
/// anything else can touch the sheet.
pub struct ResultsSession<A: ResultsApi> {
    api: A,
    cache: Option<DirectoryCache>,
    categories: Vec<Category>,
    events: Vec<Event>,
    category: Option<CategoryId>,
    event: Option<EventId>,
    sheet: ScoreSheet,
    last_export: Option<PathBuf>,
}

impl<A: ResultsApi> ResultsSession<A> {
    pub fn new(api: A, cache: Option<DirectoryCache>) -> Self {
        Self {
            api,
            cache,
            categories: Vec::new(),
            events: Vec::new(),
            category: None,
            event: None,
            sheet: ScoreSheet::default(),
            last_export: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn selected_category(&self) -> Option<CategoryId> {
        self.category
    }

    pub fn selected_event(&self) -> Option<EventId> {
        self.event
    }

    pub fn sheet(&self) -> &ScoreSheet {
        &self.sheet
    }

    /// Direct access for bulk edits; totals and ranks still only change on
    /// [`calculate`](Self::calculate)
    pub fn sheet_mut(&mut self) -> &mut ScoreSheet {
        &mut self.sheet
    }

    /// Path of the most recent successful export
    pub fn last_export(&self) -> Option<&Path> {
        self.last_export.as_deref()
    }

    /// Display name of the selected category, or its id if the directory
    /// was never loaded
    pub fn category_name(&self) -> String {
        match self.category {
            Some(id) => self
                .categories
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("Category {}", id)),
            None => String::new(),
        }
    }

    pub fn event_name(&self) -> String {
        match self.event {
            Some(id) => self
                .events
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| format!("Event {}", id)),
            None => String::new(),
        }
    }

    /// Pin the selection without loading anything, for read-only queries
    /// such as [`standings`](Self::standings)
    pub fn focus(&mut self, category: Option<CategoryId>, event: Option<EventId>) {
        self.category = category;
        self.event = event;
        self.sheet = ScoreSheet::default();
    }

    pub async fn refresh_categories(&mut self) -> Notification {
        let fetched = self.api.list_categories().await;
        match self.with_fallback(fetched, &categories_key()) {
            Ok((categories, notice)) => {
                info!(count = categories.len(), "loaded categories");
                self.categories = categories;
                notice.unwrap_or_else(|| {
                    Notification::info(format!("Loaded {} categories", self.categories.len()))
                })
            }
            Err(e) => e.into(),
        }
    }

    /// Select a category. The event selection and sheet are cleared and
    /// the category's events are loaded.
    pub async fn select_category(&mut self, id: CategoryId) -> Notification {
        self.category = Some(id);
        self.event = None;
        self.events.clear();
        self.sheet = ScoreSheet::default();

        let fetched = self.api.list_events(Some(id)).await;
        match self.with_fallback(fetched, &events_key(Some(id))) {
            Ok((events, notice)) => {
                info!(category = id, count = events.len(), "loaded events");
                self.events = events;
                notice.unwrap_or_else(|| {
                    Notification::info(format!("Loaded {} events", self.events.len()))
                })
            }
            Err(e) => e.into(),
        }
    }

    /// Select an event within the selected category and load its sheet
    pub async fn select_event(&mut self, id: EventId) -> Notification {
        if self.category.is_none() {
            return ConsoleError::validation("Please select a category first").into();
        }
        self.event = Some(id);
        self.sheet = ScoreSheet::default();
        self.reload_participants().await
    }

    /// Reload participants for the current selection. A failed load keeps
    /// the sheet that was already there.
    pub async fn reload_participants(&mut self) -> Notification {
        let (Some(category), Some(event)) = (self.category, self.event) else {
            return ConsoleError::validation("Please select both category and event").into();
        };

        match self
            .api
            .list_participants(Some(category), Some(event))
            .await
        {
            Ok(participants) => {
                let (sheet, notice) = load_scores(&participants);
                self.sheet = sheet;
                notice.unwrap_or_else(|| {
                    Notification::info(format!("Loaded {} participants", self.sheet.len()))
                })
            }
            Err(e) => {
                warn!(category, event, error = %e, "participant load failed, keeping current sheet");
                e.into()
            }
        }
    }

    pub fn set_score(
        &mut self,
        participant_id: ParticipantId,
        slot: JudgeSlot,
        score: Score,
    ) -> Result<(), ConsoleError> {
        self.sheet.set_score(participant_id, slot, score)
    }

    pub fn calculate(&mut self) -> Notification {
        self.sheet.calculate();
        debug!(records = self.sheet.len(), "calculated ranks");
        Notification::success("Results calculated successfully")
    }

    /// Checks shared by save and export, run before any IO
    fn ensure_ready(&self) -> Result<(), ConsoleError> {
        if self.event.is_none() {
            return Err(ConsoleError::validation("Please select an event first"));
        }
        if self.sheet.is_empty() {
            return Err(ConsoleError::validation(
                "No participants loaded for the selected event",
            ));
        }
        if !self.sheet.is_ranked() || self.sheet.is_stale() {
            return Err(ConsoleError::validation(
                "Please calculate results before continuing",
            ));
        }
        Ok(())
    }

    /// Send the sheet to the store as one batch, then reload it so the
    /// sheet shows what was persisted.
    pub async fn save(&mut self) -> Notification {
        if let Err(e) = self.ensure_ready() {
            return e.into();
        }
        let batch = match self.sheet.prepare_for_save(self.event) {
            Ok(batch) => batch,
            Err(e) => return e.into(),
        };

        info!(event = ?self.event, entries = batch.len(), "saving results");
        match self.api.save_results(&batch).await {
            Ok(receipt) => {
                debug!(saved = receipt.saved_count(), "store accepted results");
                let reload = self.reload_participants().await;
                if reload.is_error() {
                    Notification::warning(format!(
                        "Results saved successfully, but reloading failed: {}",
                        reload.message
                    ))
                } else {
                    Notification::success("Results saved successfully")
                }
            }
            Err(e) => {
                warn!(error = %e, "save rejected");
                e.into()
            }
        }
    }

    /// Write the current sheet as a workbook into `dir`
    pub fn export(&mut self, dir: &Path, date: NaiveDate) -> Notification {
        if let Err(e) = self.ensure_ready() {
            return e.into();
        }
        let category_name = self.category_name();
        let event_name = self.event_name();
        let table = self.sheet.prepare_for_export(&category_name, &event_name);
        let path = dir.join(export_filename(&category_name, &event_name, date));

        match write_workbook(&table, &path) {
            Ok(path) => {
                let message = format!("Results downloaded successfully to {}", path.display());
                self.last_export = Some(path);
                Notification::success(message)
            }
            Err(e) => e.into(),
        }
    }

    /// Stored results for the selected event, best rank first. Unranked
    /// rows sort last.
    pub async fn standings(&self) -> Result<Vec<StoredResult>, ConsoleError> {
        let event = self
            .event
            .ok_or_else(|| ConsoleError::validation("Please select an event first"))?;
        let mut results = self.api.list_results(self.category, Some(event)).await?;
        results.sort_by_key(|r| match r.rank {
            Some(rank) if rank > 0 => rank,
            _ => i64::MAX,
        });
        Ok(results)
    }

    /// Keep a fresh directory listing in the cache, or fall back to the
    /// cached one when the fetch failed
    fn with_fallback<T: Serialize + DeserializeOwned>(
        &self,
        fetched: Result<Vec<T>, ConsoleError>,
        key: &str,
    ) -> Result<(Vec<T>, Option<Notification>), ConsoleError> {
        match fetched {
            Ok(items) => {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.store(key, &items) {
                        warn!(key, error = %e, "failed to cache directory listing");
                    }
                }
                Ok((items, None))
            }
            Err(e) => {
                let cached = self.cache.as_ref().and_then(|c| c.load::<T>(key));
                match cached {
                    Some(items) => {
                        warn!(key, error = %e, "using cached directory listing");
                        let notice =
                            Notification::warning(format!("{} (showing cached list)", e));
                        Ok((items, Some(notice)))
                    }
                    None => Err(e),
                }
            }
        }
    }
}
