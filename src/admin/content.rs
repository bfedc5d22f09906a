use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use strum::{Display, EnumString};
use tracing::warn;

use super::bulk::{BulkOutcome, SortDirection};
use crate::client::ApiFuture;
use crate::error::ClientError;

/// Collections under `/api/content/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Posts,
    Pages,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Published,
    Scheduled,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub author: String,
    pub status: ContentStatus,
    /// Posts only; pages come back without categories.
    #[serde(default)]
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl ContentRecord {
    /// Last change, falling back to creation.
    pub fn modified_at(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// Post and page endpoints exposed by the admin API.
pub trait ContentApi: Send + Sync {
    fn list_content(&self, kind: ContentKind) -> ApiFuture<'_, Vec<ContentRecord>>;

    fn set_content_status<'a>(
        &'a self,
        kind: ContentKind,
        id: &'a str,
        status: ContentStatus,
    ) -> ApiFuture<'a, ()>;

    fn delete_content<'a>(&'a self, kind: ContentKind, id: &'a str) -> ApiFuture<'a, ()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ContentAction {
    Publish,
    Unpublish,
    Archive,
    Delete,
}

impl ContentAction {
    pub fn applies_to(self, status: ContentStatus) -> bool {
        match self {
            Self::Publish => status != ContentStatus::Published,
            Self::Unpublish => matches!(status, ContentStatus::Published | ContentStatus::Scheduled),
            Self::Archive => status != ContentStatus::Archived,
            Self::Delete => true,
        }
    }

    fn target_status(self) -> Option<ContentStatus> {
        match self {
            Self::Publish => Some(ContentStatus::Published),
            Self::Unpublish => Some(ContentStatus::Draft),
            Self::Archive => Some(ContentStatus::Archived),
            Self::Delete => None,
        }
    }

    fn send<'a>(self, api: &'a dyn ContentApi, kind: ContentKind, id: &'a str) -> ApiFuture<'a, ()> {
        match self.target_status() {
            Some(status) => api.set_content_status(kind, id, status),
            None => api.delete_content(kind, id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    /// Case-insensitive match on title, slug and author.
    pub search: String,
    pub status: Option<ContentStatus>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl ContentFilter {
    pub fn matches(&self, item: &ContentRecord) -> bool {
        if self.status.is_some_and(|s| s != item.status) {
            return false;
        }
        if let Some(author) = &self.author
            && !author.eq_ignore_ascii_case(&item.author)
        {
            return false;
        }
        if let Some(category) = &self.category
            && !item.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
        {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || [&item.title, &item.slug, &item.author]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentSortKey {
    Title,
    Status,
    Created,
    #[default]
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSort {
    pub key: ContentSortKey,
    pub direction: SortDirection,
}

impl Default for ContentSort {
    /// Most recently changed first.
    fn default() -> Self {
        Self {
            key: ContentSortKey::Updated,
            direction: SortDirection::Desc,
        }
    }
}

impl ContentSort {
    pub fn compare(&self, a: &ContentRecord, b: &ContentRecord) -> Ordering {
        let primary = match self.key {
            ContentSortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            ContentSortKey::Status => a.status.cmp(&b.status),
            ContentSortKey::Created => a.created_at.cmp(&b.created_at),
            ContentSortKey::Updated => a.modified_at().cmp(&b.modified_at()),
        };
        self.direction.apply(primary).then_with(|| a.id.cmp(&b.id))
    }
}

/// One content collection (posts or pages) with its filter, sort and
/// selection.
#[derive(Debug, Clone, Default)]
pub struct ContentTable {
    kind: ContentKind,
    items: Vec<ContentRecord>,
    pub filter: ContentFilter,
    pub sort: ContentSort,
    selected: BTreeSet<String>,
}

impl ContentTable {
    pub fn new(kind: ContentKind, items: Vec<ContentRecord>) -> Self {
        Self {
            kind,
            items,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub async fn refresh(&mut self, api: &dyn ContentApi) -> Result<(), ClientError> {
        self.items = api.list_content(self.kind).await?;
        let known: BTreeSet<&str> = self.items.iter().map(|c| c.id.as_str()).collect();
        self.selected.retain(|id| known.contains(id.as_str()));
        Ok(())
    }

    pub fn items(&self) -> &[ContentRecord] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ContentRecord> {
        self.items.iter().find(|c| c.id == id)
    }

    /// Resolve an entry by id or slug.
    pub fn find(&self, key: &str) -> Option<&ContentRecord> {
        self.get(key)
            .or_else(|| self.items.iter().find(|c| c.slug == key))
    }

    pub fn visible(&self) -> Vec<&ContentRecord> {
        let mut rows: Vec<&ContentRecord> =
            self.items.iter().filter(|c| self.filter.matches(c)).collect();
        rows.sort_by(|a, b| self.sort.compare(a, b));
        rows
    }

    pub fn status_counts(&self) -> BTreeMap<ContentStatus, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.status).or_insert(0) += 1;
        }
        counts
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Add to the selection; selecting twice keeps it selected.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected.insert(id.to_string());
        true
    }

    pub fn select_all_visible(&mut self) {
        let ids: Vec<String> = self.visible().iter().map(|c| c.id.clone()).collect();
        self.selected.extend(ids);
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Optimistic status change, rolled back per entry on failure; deleted
    /// entries leave the table.
    pub async fn bulk_apply(&mut self, api: &dyn ContentApi, action: ContentAction) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        let mut targets: Vec<(String, ContentStatus)> = Vec::new();

        for id in &self.selected {
            match self.items.iter_mut().find(|c| &c.id == id) {
                Some(item) if action.applies_to(item.status) => {
                    targets.push((id.clone(), item.status));
                    if let Some(status) = action.target_status() {
                        item.status = status;
                    }
                }
                _ => outcome.skipped.push(id.clone()),
            }
        }

        let kind = self.kind;
        let results = join_all(targets.iter().map(|(id, _)| action.send(api, kind, id))).await;

        for ((id, previous), result) in targets.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    self.selected.remove(&id);
                    if action == ContentAction::Delete {
                        self.items.retain(|c| c.id != id);
                    }
                    outcome.succeeded.push(id);
                }
                Err(e) => {
                    warn!(%kind, id = %id, %action, "content action failed: {e}");
                    if let Some(item) = self.items.iter_mut().find(|c| c.id == id) {
                        item.status = previous;
                    }
                    outcome.failed.push((id, e.to_string()));
                }
            }
        }
        outcome
    }
}
