use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::client::ApiFuture;
use crate::error::ClientError;
use crate::setup::{ErrorMap, is_email, is_http_url, is_present};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SettingsSection {
    General,
    Security,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralSettings {
    pub site_title: String,
    pub site_description: String,
    pub site_url: String,
    pub language: String,
    pub timezone: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            site_title: crate::setup::DEFAULT_SITE_TITLE.into(),
            site_description: String::new(),
            site_url: crate::setup::DEFAULT_SITE_URL.into(),
            language: crate::setup::DEFAULT_LANGUAGE.into(),
            timezone: crate::setup::DEFAULT_TIMEZONE.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecuritySettings {
    pub session_timeout_secs: u64,
    pub password_min_length: usize,
    pub max_login_attempts: u32,
    pub require_email_verification: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            session_timeout_secs: 86_400,
            password_min_length: crate::setup::DEFAULT_MIN_PASSWORD_LENGTH,
            max_login_attempts: 5,
            require_email_verification: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub from_address: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: String::new(),
            from_address: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settings {
    General(GeneralSettings),
    Security(SecuritySettings),
    Email(EmailSettings),
}

impl Settings {
    pub fn section(&self) -> SettingsSection {
        match self {
            Self::General(_) => SettingsSection::General,
            Self::Security(_) => SettingsSection::Security,
            Self::Email(_) => SettingsSection::Email,
        }
    }

    pub fn decode(section: SettingsSection, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match section {
            SettingsSection::General => Self::General(serde_json::from_value(value)?),
            SettingsSection::Security => Self::Security(serde_json::from_value(value)?),
            SettingsSection::Email => Self::Email(serde_json::from_value(value)?),
        })
    }

    pub fn to_value(&self) -> Value {
        let encoded = match self {
            Self::General(s) => serde_json::to_value(s),
            Self::Security(s) => serde_json::to_value(s),
            Self::Email(s) => serde_json::to_value(s),
        };
        encoded.unwrap_or(Value::Null)
    }

    /// Set one camelCase field from its textual form. Values that parse as
    /// JSON (numbers, booleans) are taken as such, anything else as a string.
    pub fn with_field(&self, field: &str, raw: &str) -> Result<Self, ClientError> {
        let key = format!("settings.{field}");
        let mut value = self.to_value();
        let Some(slot) = value.as_object_mut().and_then(|m| m.get_mut(field)) else {
            return Err(invalid(key, format!("Unknown {} setting", self.section())));
        };
        *slot = match slot {
            Value::String(_) => Value::String(raw.to_string()),
            _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        };
        Self::decode(self.section(), value)
            .map_err(|e| invalid(key, format!("Invalid value: {e}")))
    }

    pub fn validate(&self) -> ErrorMap {
        let mut errors = ErrorMap::new();
        let mut fail = |field: &str, message: &str| {
            errors.insert(format!("settings.{field}"), message.to_string());
        };
        match self {
            Self::General(s) => {
                if !is_present(&s.site_title) {
                    fail("siteTitle", "Site title is required");
                }
                if !is_present(&s.site_url) {
                    fail("siteUrl", "Site URL is required");
                } else if !is_http_url(&s.site_url) {
                    fail("siteUrl", "Site URL must be a valid http(s) URL");
                }
            }
            Self::Security(s) => {
                if s.session_timeout_secs == 0 {
                    fail("sessionTimeoutSecs", "Session timeout must be positive");
                }
                if s.password_min_length < crate::setup::DEFAULT_MIN_PASSWORD_LENGTH {
                    fail(
                        "passwordMinLength",
                        "Password minimum length must be at least 8",
                    );
                }
                if s.max_login_attempts == 0 {
                    fail("maxLoginAttempts", "Allow at least one login attempt");
                }
            }
            Self::Email(s) if s.enabled => {
                if !is_present(&s.smtp_host) {
                    fail("smtpHost", "SMTP host is required");
                }
                if s.smtp_port == 0 {
                    fail("smtpPort", "SMTP port is required");
                }
                if !is_email(&s.from_address) {
                    fail("fromAddress", "Sender address is invalid");
                }
            }
            Self::Email(_) => {}
        }
        errors
    }
}

fn invalid(key: String, message: String) -> ClientError {
    ClientError::Invalid(ErrorMap::from([(key, message)]))
}

pub trait SettingsApi: Send + Sync {
    fn get_settings(&self, section: SettingsSection) -> ApiFuture<'_, Settings>;

    fn update_settings<'a>(&'a self, settings: &'a Settings) -> ApiFuture<'a, Settings>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_settings_use_setup_defaults() {
        let settings = Settings::General(GeneralSettings::default());
        assert!(settings.validate().is_empty());
        assert_eq!(settings.to_value()["siteTitle"], "My Modular Site");
    }

    #[test]
    fn decode_fills_missing_fields() {
        let settings = Settings::decode(
            SettingsSection::Security,
            serde_json::json!({"maxLoginAttempts": 3}),
        )
        .unwrap();
        let Settings::Security(security) = settings else {
            panic!("wrong section");
        };
        assert_eq!(security.max_login_attempts, 3);
        assert_eq!(security.session_timeout_secs, 86_400);
    }

    #[test]
    fn with_field_parses_by_type() {
        let email = Settings::Email(EmailSettings::default());
        let updated = email.with_field("smtpPort", "2525").unwrap();
        let updated = updated.with_field("enabled", "true").unwrap();
        let updated = updated.with_field("smtpHost", "42").unwrap();
        let Settings::Email(e) = updated else {
            panic!("wrong section");
        };
        assert_eq!(e.smtp_port, 2525);
        assert!(e.enabled);
        assert_eq!(e.smtp_host, "42");
    }

    #[test]
    fn with_field_rejects_unknown_and_mistyped() {
        let security = Settings::Security(SecuritySettings::default());
        let err = security.with_field("colour", "blue").unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("settings.colour"));

        let err = security.with_field("maxLoginAttempts", "many").unwrap_err();
        assert!(
            err.field_errors().unwrap()["settings.maxLoginAttempts"].starts_with("Invalid value")
        );
    }

    #[test]
    fn enabled_email_requires_transport() {
        let mut email = EmailSettings {
            enabled: true,
            ..EmailSettings::default()
        };
        let errors = Settings::Email(email.clone()).validate();
        assert!(errors.contains_key("settings.smtpHost"));
        assert!(errors.contains_key("settings.fromAddress"));

        email.enabled = false;
        assert!(Settings::Email(email).validate().is_empty());
    }

    #[test]
    fn general_rejects_bad_url() {
        let settings = Settings::General(GeneralSettings {
            site_url: "localhost".into(),
            ..GeneralSettings::default()
        });
        assert_eq!(
            settings.validate()["settings.siteUrl"],
            "Site URL must be a valid http(s) URL"
        );
    }
}
