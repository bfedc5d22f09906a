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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PluginStatus {
    Active,
    Inactive,
    Error,
    NotInstalled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord {
    pub slug: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    pub status: PluginStatus,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Plugin lifecycle endpoints exposed by the admin API.
pub trait PluginsApi: Send + Sync {
    fn list_plugins(&self) -> ApiFuture<'_, Vec<PluginRecord>>;

    fn install_plugin<'a>(&'a self, slug: &'a str) -> ApiFuture<'a, PluginRecord>;

    fn activate_plugin<'a>(&'a self, slug: &'a str) -> ApiFuture<'a, ()>;

    fn deactivate_plugin<'a>(&'a self, slug: &'a str) -> ApiFuture<'a, ()>;

    fn uninstall_plugin<'a>(&'a self, slug: &'a str) -> ApiFuture<'a, ()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PluginAction {
    Activate,
    Deactivate,
    Uninstall,
}

impl PluginAction {
    pub fn applies_to(self, status: PluginStatus) -> bool {
        match self {
            Self::Activate => matches!(status, PluginStatus::Inactive | PluginStatus::Error),
            Self::Deactivate => status == PluginStatus::Active,
            Self::Uninstall => status != PluginStatus::NotInstalled,
        }
    }

    fn optimistic_status(self) -> PluginStatus {
        match self {
            Self::Activate => PluginStatus::Active,
            Self::Deactivate => PluginStatus::Inactive,
            Self::Uninstall => PluginStatus::NotInstalled,
        }
    }

    fn send<'a>(self, api: &'a dyn PluginsApi, slug: &'a str) -> ApiFuture<'a, ()> {
        match self {
            Self::Activate => api.activate_plugin(slug),
            Self::Deactivate => api.deactivate_plugin(slug),
            Self::Uninstall => api.uninstall_plugin(slug),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginFilter {
    /// Case-insensitive match on name, slug, description and author.
    pub search: String,
    pub status: Option<PluginStatus>,
    pub category: Option<String>,
}

impl PluginFilter {
    pub fn matches(&self, plugin: &PluginRecord) -> bool {
        if self.status.is_some_and(|s| s != plugin.status) {
            return false;
        }
        if let Some(category) = &self.category
            && !category.eq_ignore_ascii_case(&plugin.category)
        {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || [
                &plugin.name,
                &plugin.slug,
                &plugin.description,
                &plugin.author,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PluginSortKey {
    #[default]
    Name,
    Downloads,
    Rating,
    Updated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginSort {
    pub key: PluginSortKey,
    pub direction: SortDirection,
}

impl PluginSort {
    pub fn compare(&self, a: &PluginRecord, b: &PluginRecord) -> Ordering {
        let primary = match self.key {
            PluginSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            PluginSortKey::Downloads => a.downloads.cmp(&b.downloads),
            PluginSortKey::Rating => a.rating.total_cmp(&b.rating),
            PluginSortKey::Updated => a.updated_at.cmp(&b.updated_at),
        };
        self.direction
            .apply(primary)
            .then_with(|| a.slug.cmp(&b.slug))
    }
}

/// List/selection/sort state of the plugins screen.
#[derive(Debug, Clone, Default)]
pub struct PluginTable {
    plugins: Vec<PluginRecord>,
    pub filter: PluginFilter,
    pub sort: PluginSort,
    selected: BTreeSet<String>,
}

impl PluginTable {
    pub fn new(plugins: Vec<PluginRecord>) -> Self {
        Self {
            plugins,
            ..Self::default()
        }
    }

    /// Reload from the API, keeping the selection for rows that still exist.
    pub async fn refresh(&mut self, api: &dyn PluginsApi) -> Result<(), ClientError> {
        self.plugins = api.list_plugins().await?;
        let known: BTreeSet<&str> = self.plugins.iter().map(|p| p.slug.as_str()).collect();
        self.selected.retain(|slug| known.contains(slug.as_str()));
        Ok(())
    }

    pub fn plugins(&self) -> &[PluginRecord] {
        &self.plugins
    }

    pub fn get(&self, slug: &str) -> Option<&PluginRecord> {
        self.plugins.iter().find(|p| p.slug == slug)
    }

    /// Filtered and sorted rows.
    pub fn visible(&self) -> Vec<&PluginRecord> {
        let mut rows: Vec<&PluginRecord> = self
            .plugins
            .iter()
            .filter(|p| self.filter.matches(p))
            .collect();
        rows.sort_by(|a, b| self.sort.compare(a, b));
        rows
    }

    pub fn status_counts(&self) -> BTreeMap<PluginStatus, usize> {
        let mut counts = BTreeMap::new();
        for plugin in &self.plugins {
            *counts.entry(plugin.status).or_insert(0) += 1;
        }
        counts
    }

    /// Flip selection of `slug`; returns whether it is now selected.
    pub fn toggle(&mut self, slug: &str) -> bool {
        if self.get(slug).is_none() {
            return false;
        }
        if self.selected.remove(slug) {
            false
        } else {
            self.selected.insert(slug.to_string());
            true
        }
    }

    /// Add to the selection; selecting twice keeps it selected.
    pub fn select(&mut self, slug: &str) -> bool {
        if self.get(slug).is_none() {
            return false;
        }
        self.selected.insert(slug.to_string());
        true
    }

    pub fn select_all_visible(&mut self) {
        let slugs: Vec<String> = self.visible().iter().map(|p| p.slug.clone()).collect();
        self.selected.extend(slugs);
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn is_selected(&self, slug: &str) -> bool {
        self.selected.contains(slug)
    }

    /// Run `action` on every applicable selected plugin concurrently.
    ///
    /// Rows flip to the target status before the requests go out; a failed
    /// request restores the row's previous status. Successful rows leave the
    /// selection, and successful uninstalls leave the table.
    pub async fn bulk_apply(&mut self, api: &dyn PluginsApi, action: PluginAction) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        let mut targets: Vec<(String, PluginStatus)> = Vec::new();

        for slug in &self.selected {
            match self.plugins.iter_mut().find(|p| &p.slug == slug) {
                Some(plugin) if action.applies_to(plugin.status) => {
                    targets.push((slug.clone(), plugin.status));
                    plugin.status = action.optimistic_status();
                }
                _ => outcome.skipped.push(slug.clone()),
            }
        }

        let results = join_all(targets.iter().map(|(slug, _)| action.send(api, slug))).await;

        for ((slug, previous), result) in targets.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    self.selected.remove(&slug);
                    if action == PluginAction::Uninstall {
                        self.plugins.retain(|p| p.slug != slug);
                    }
                    outcome.succeeded.push(slug);
                }
                Err(e) => {
                    warn!(plugin = %slug, %action, "plugin action failed: {e}");
                    if let Some(plugin) = self.plugins.iter_mut().find(|p| p.slug == slug) {
                        plugin.status = previous;
                    }
                    outcome.failed.push((slug, e.to_string()));
                }
            }
        }
        outcome
    }
}
