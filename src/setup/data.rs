use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::SetupError;

pub const DEFAULT_DATABASE_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE_NAME: &str = "modular_cms";
pub const DEFAULT_SITE_TITLE: &str = "My Modular Site";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Top-level group of the setup draft. Its string form is the prefix of
/// every dotted error key (`database.uri`, `admin.password`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    Database,
    Admin,
    Site,
}

impl Section {
    /// Dotted error/field key for `field` inside this section.
    pub fn key(self, field: &str) -> String {
        format!("{self}.{field}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseSection {
    pub uri: String,
    pub name: String,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminSection {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

// Passwords never reach logs through `{:?}`.
impl fmt::Debug for AdminSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSection")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field(
                "confirm_password",
                &self.confirm_password.as_ref().map(|_| "[redacted]"),
            )
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteSection {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl SiteSection {
    pub fn language_or_default(&self) -> &str {
        self.language
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn timezone_or_default(&self) -> &str {
        self.timezone
            .as_deref()
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or(DEFAULT_TIMEZONE)
    }
}

/// The wizard's working draft. Sent once as the installation payload.
///
/// `Default` yields the hard-coded values the wizard starts from; the
/// sections' own `Default` impls are empty and only fill gaps when a
/// payload omits fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupData {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub admin: AdminSection,
    #[serde(default)]
    pub site: SiteSection,
}

impl Default for SetupData {
    fn default() -> Self {
        Self {
            database: DatabaseSection {
                uri: DEFAULT_DATABASE_URI.into(),
                name: DEFAULT_DATABASE_NAME.into(),
            },
            admin: AdminSection::default(),
            site: SiteSection {
                title: DEFAULT_SITE_TITLE.into(),
                description: String::new(),
                url: DEFAULT_SITE_URL.into(),
                language: Some(DEFAULT_LANGUAGE.into()),
                timezone: Some(DEFAULT_TIMEZONE.into()),
            },
        }
    }
}

impl SetupData {
    /// Generic field merge: `update(Section::Admin, "firstName", "Ada")`.
    pub fn update(
        &mut self,
        section: Section,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), SetupError> {
        let slot = self
            .field_mut(section, field)
            .ok_or_else(|| SetupError::UnknownField {
                section: section.to_string(),
                field: field.to_string(),
            })?;
        *slot = value.into();
        Ok(())
    }

    /// Current value of a field. Unset optional fields read as `""`.
    pub fn field(&self, section: Section, field: &str) -> Option<&str> {
        let value = match (section, field) {
            (Section::Database, "uri") => &self.database.uri,
            (Section::Database, "name") => &self.database.name,
            (Section::Admin, "username") => &self.admin.username,
            (Section::Admin, "email") => &self.admin.email,
            (Section::Admin, "password") => &self.admin.password,
            (Section::Admin, "confirmPassword") => {
                return Some(self.admin.confirm_password.as_deref().unwrap_or(""));
            }
            (Section::Admin, "firstName") => &self.admin.first_name,
            (Section::Admin, "lastName") => &self.admin.last_name,
            (Section::Site, "title") => &self.site.title,
            (Section::Site, "description") => &self.site.description,
            (Section::Site, "url") => &self.site.url,
            (Section::Site, "language") => {
                return Some(self.site.language.as_deref().unwrap_or(""));
            }
            (Section::Site, "timezone") => {
                return Some(self.site.timezone.as_deref().unwrap_or(""));
            }
            _ => return None,
        };
        Some(value.as_str())
    }

    fn field_mut(&mut self, section: Section, field: &str) -> Option<&mut String> {
        let slot = match (section, field) {
            (Section::Database, "uri") => &mut self.database.uri,
            (Section::Database, "name") => &mut self.database.name,
            (Section::Admin, "username") => &mut self.admin.username,
            (Section::Admin, "email") => &mut self.admin.email,
            (Section::Admin, "password") => &mut self.admin.password,
            (Section::Admin, "confirmPassword") => {
                self.admin.confirm_password.get_or_insert_with(String::new)
            }
            (Section::Admin, "firstName") => &mut self.admin.first_name,
            (Section::Admin, "lastName") => &mut self.admin.last_name,
            (Section::Site, "title") => &mut self.site.title,
            (Section::Site, "description") => &mut self.site.description,
            (Section::Site, "url") => &mut self.site.url,
            (Section::Site, "language") => self.site.language.get_or_insert_with(String::new),
            (Section::Site, "timezone") => self.site.timezone.get_or_insert_with(String::new),
            _ => return None,
        };
        Some(slot)
    }
}
