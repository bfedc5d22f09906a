use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use strum::{Display, EnumString};
use tracing::warn;

use super::bulk::{BulkOutcome, SortDirection};
use super::forms::{RoleForm, UserForm};
use crate::client::ApiFuture;
use crate::error::ClientError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

pub trait UsersApi: Send + Sync {
    fn list_users(&self) -> ApiFuture<'_, Vec<UserRecord>>;

    fn create_user<'a>(&'a self, form: &'a UserForm) -> ApiFuture<'a, UserRecord>;

    fn set_user_status<'a>(&'a self, id: &'a str, status: UserStatus) -> ApiFuture<'a, ()>;

    fn delete_user<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()>;

    fn set_user_roles<'a>(&'a self, id: &'a str, roles: &'a [String]) -> ApiFuture<'a, ()>;

    fn create_role<'a>(&'a self, form: &'a RoleForm) -> ApiFuture<'a, Role>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UserAction {
    Activate,
    Suspend,
    Delete,
}

impl UserAction {
    pub fn applies_to(self, status: UserStatus) -> bool {
        match self {
            Self::Activate => status != UserStatus::Active,
            Self::Suspend => status != UserStatus::Suspended,
            Self::Delete => true,
        }
    }

    /// Status shown while the request is in flight; `None` leaves the row as is.
    fn optimistic_status(self) -> Option<UserStatus> {
        match self {
            Self::Activate => Some(UserStatus::Active),
            Self::Suspend => Some(UserStatus::Suspended),
            Self::Delete => None,
        }
    }

    fn send<'a>(self, api: &'a dyn UsersApi, id: &'a str) -> ApiFuture<'a, ()> {
        match self {
            Self::Activate => api.set_user_status(id, UserStatus::Active),
            Self::Suspend => api.set_user_status(id, UserStatus::Suspended),
            Self::Delete => api.delete_user(id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Case-insensitive match on username, email and full name.
    pub search: String,
    pub role: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub fn matches(&self, user: &UserRecord) -> bool {
        if self.status.is_some_and(|s| s != user.status) {
            return false;
        }
        if let Some(role) = &self.role
            && !user.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
        {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || [
                user.username.to_lowercase(),
                user.email.to_lowercase(),
                user.display_name().to_lowercase(),
            ]
            .iter()
            .any(|field| field.contains(&needle))
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserSortKey {
    #[default]
    Username,
    Email,
    Created,
    LastLogin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserSort {
    pub key: UserSortKey,
    pub direction: SortDirection,
}

impl UserSort {
    pub fn compare(&self, a: &UserRecord, b: &UserRecord) -> Ordering {
        let primary = match self.key {
            UserSortKey::Username => a.username.to_lowercase().cmp(&b.username.to_lowercase()),
            UserSortKey::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
            UserSortKey::Created => a.created_at.cmp(&b.created_at),
            UserSortKey::LastLogin => a.last_login.cmp(&b.last_login),
        };
        self.direction.apply(primary).then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserTable {
    users: Vec<UserRecord>,
    pub filter: UserFilter,
    pub sort: UserSort,
    selected: BTreeSet<String>,
}

impl UserTable {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    pub async fn refresh(&mut self, api: &dyn UsersApi) -> Result<(), ClientError> {
        self.users = api.list_users().await?;
        let known: BTreeSet<&str> = self.users.iter().map(|u| u.id.as_str()).collect();
        self.selected.retain(|id| known.contains(id.as_str()));
        Ok(())
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Resolve a user by id or username.
    pub fn find(&self, key: &str) -> Option<&UserRecord> {
        self.get(key)
            .or_else(|| self.users.iter().find(|u| u.username == key))
    }

    pub fn visible(&self) -> Vec<&UserRecord> {
        let mut rows: Vec<&UserRecord> =
            self.users.iter().filter(|u| self.filter.matches(u)).collect();
        rows.sort_by(|a, b| self.sort.compare(a, b));
        rows
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
        let ids: Vec<String> = self.visible().iter().map(|u| u.id.clone()).collect();
        self.selected.extend(ids);
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Same optimistic/rollback policy as the plugins table; deleted users
    /// leave the table.
    pub async fn bulk_apply(&mut self, api: &dyn UsersApi, action: UserAction) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        let mut targets: Vec<(String, UserStatus)> = Vec::new();

        for id in &self.selected {
            match self.users.iter_mut().find(|u| &u.id == id) {
                Some(user) if action.applies_to(user.status) => {
                    targets.push((id.clone(), user.status));
                    if let Some(status) = action.optimistic_status() {
                        user.status = status;
                    }
                }
                _ => outcome.skipped.push(id.clone()),
            }
        }

        let results = join_all(targets.iter().map(|(id, _)| action.send(api, id))).await;

        for ((id, previous), result) in targets.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    self.selected.remove(&id);
                    if action == UserAction::Delete {
                        self.users.retain(|u| u.id != id);
                    }
                    outcome.succeeded.push(id);
                }
                Err(e) => {
                    warn!(user = %id, %action, "user action failed: {e}");
                    if let Some(user) = self.users.iter_mut().find(|u| u.id == id) {
                        user.status = previous;
                    }
                    outcome.failed.push((id, e.to_string()));
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn user(id: &str, username: &str, status: UserStatus, day: u32) -> UserRecord {
        UserRecord {
            id: id.into(),
            username: username.into(),
            email: format!("{username}@example.com"),
            first_name: username.to_uppercase(),
            last_name: "Tester".into(),
            roles: vec!["editor".into()],
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            last_login: None,
        }
    }

    fn table() -> UserTable {
        let mut admin = user("u1", "zoe", UserStatus::Active, 3);
        admin.roles = vec!["admin".into()];
        UserTable::new(vec![
            admin,
            user("u2", "adam", UserStatus::Suspended, 1),
            user("u3", "mia", UserStatus::Inactive, 2),
        ])
    }

    struct FakeUsers {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeUsers {
        fn new(failing: Vec<&'static str>) -> Self {
            Self {
                failing,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: String, id: &str) -> Result<(), ClientError> {
            self.calls.lock().unwrap().push(call);
            if self.failing.contains(&id) {
                Err(ClientError::Status {
                    status: 403,
                    message: "Forbidden".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl UsersApi for FakeUsers {
        fn list_users(&self) -> ApiFuture<'_, Vec<UserRecord>> {
            Box::pin(async { Ok(vec![user("u3", "mia", UserStatus::Active, 2)]) })
        }

        fn create_user<'a>(&'a self, form: &'a UserForm) -> ApiFuture<'a, UserRecord> {
            Box::pin(async move { Ok(user("new", &form.username, UserStatus::Active, 9)) })
        }

        fn set_user_status<'a>(&'a self, id: &'a str, status: UserStatus) -> ApiFuture<'a, ()> {
            let result = self.record(format!("{status}:{id}"), id);
            Box::pin(async move { result })
        }

        fn delete_user<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
            let result = self.record(format!("delete:{id}"), id);
            Box::pin(async move { result })
        }

        fn set_user_roles<'a>(&'a self, id: &'a str, _roles: &'a [String]) -> ApiFuture<'a, ()> {
            let result = self.record(format!("roles:{id}"), id);
            Box::pin(async move { result })
        }

        fn create_role<'a>(&'a self, form: &'a RoleForm) -> ApiFuture<'a, Role> {
            Box::pin(async move {
                Ok(Role {
                    id: "r1".into(),
                    name: form.name.clone(),
                    description: form.description.clone(),
                    permissions: form.permissions.clone(),
                })
            })
        }
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut u = user("u9", "ghost", UserStatus::Active, 1);
        assert_eq!(u.display_name(), "GHOST Tester");
        u.first_name.clear();
        u.last_name.clear();
        assert_eq!(u.display_name(), "ghost");
    }

    #[test]
    fn sorts_and_filters() {
        let mut t = table();
        let names: Vec<&str> = t.visible().iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["adam", "mia", "zoe"]);

        t.sort = UserSort {
            key: UserSortKey::Created,
            direction: SortDirection::Desc,
        };
        let names: Vec<&str> = t.visible().iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["zoe", "mia", "adam"]);

        t.filter.role = Some("ADMIN".into());
        assert_eq!(t.visible().len(), 1);

        t.filter.role = None;
        t.filter.search = "mia@".into();
        assert_eq!(t.visible()[0].id, "u3");
    }

    #[test]
    fn find_accepts_id_or_username() {
        let t = table();
        assert_eq!(t.find("u2").unwrap().username, "adam");
        assert_eq!(t.find("zoe").unwrap().id, "u1");
        assert!(t.find("nobody").is_none());
    }

    #[test]
    fn select_by_username_then_id_keeps_one_entry() {
        let mut t = table();
        let id = t.find("zoe").unwrap().id.clone();
        assert!(t.select(&id));
        assert!(t.select("u1"));
        assert_eq!(t.selected().collect::<Vec<_>>(), ["u1"]);
        assert!(!t.select("nobody"));
    }

    #[test]
    fn user_record_reads_camel_case() {
        let json = serde_json::json!({
            "id": "abc",
            "username": "root",
            "email": "root@example.com",
            "firstName": "Ro",
            "lastName": "Ot",
            "roles": ["admin"],
            "status": "suspended",
            "createdAt": "2024-05-01T10:00:00Z"
        });
        let record: UserRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.status, UserStatus::Suspended);
        assert_eq!(record.first_name, "Ro");
        assert!(record.last_login.is_none());
    }

    #[tokio::test]
    async fn bulk_suspend_rolls_back_failures() {
        let api = FakeUsers::new(vec!["u1"]);
        let mut t = table();
        t.select_all_visible();

        let outcome = t.bulk_apply(&api, UserAction::Suspend).await;

        assert_eq!(outcome.succeeded, ["u3"]);
        assert_eq!(outcome.skipped, ["u2"]);
        assert_eq!(outcome.failed[0].0, "u1");
        assert_eq!(t.get("u1").unwrap().status, UserStatus::Active);
        assert_eq!(t.get("u3").unwrap().status, UserStatus::Suspended);
        assert!(t.is_selected("u1"));
        assert!(!t.is_selected("u3"));
    }

    #[tokio::test]
    async fn bulk_delete_removes_rows() {
        let api = FakeUsers::new(vec![]);
        let mut t = table();
        t.toggle("u2");

        let outcome = t.bulk_apply(&api, UserAction::Delete).await;

        assert!(outcome.is_clean());
        assert!(t.get("u2").is_none());
        assert_eq!(t.users().len(), 2);
        assert_eq!(api.calls.lock().unwrap().as_slice(), &["delete:u2".to_string()]);
    }

    #[tokio::test]
    async fn refresh_replaces_rows() {
        let api = FakeUsers::new(vec![]);
        let mut t = table();
        t.toggle("u1");
        t.toggle("u3");
        t.refresh(&api).await.unwrap();
        assert_eq!(t.users().len(), 1);
        assert_eq!(t.selected().collect::<Vec<_>>(), ["u3"]);
    }
}
