//! Per-step rule table for the setup draft.
//!
//! Rules run in table order; the first failing rule for a field wins, so a
//! blank password reports "required" rather than "too short".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::data::{Section, SetupData};

/// Field-keyed error messages (`"database.uri"`, `"general"`, ...).
pub type ErrorMap = BTreeMap<String, String>;

pub const GENERAL_ERROR_KEY: &str = "general";
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Which wizard variant is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationProfile {
    /// `confirmPassword` must equal `password`.
    pub require_password_confirmation: bool,
    /// A successful connection test gates leaving the database step.
    pub require_database_test: bool,
    pub min_password_length: usize,
}

impl ValidationProfile {
    pub const fn standard() -> Self {
        Self {
            require_password_confirmation: false,
            require_database_test: false,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }

    pub const fn strict() -> Self {
        Self {
            require_password_confirmation: true,
            require_database_test: true,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

impl Default for ValidationProfile {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy)]
enum Check {
    Present,
    MongoScheme,
    EmailShape,
    PasswordLength,
    MatchesPassword,
    HttpUrl,
}

struct FieldRule {
    field: &'static str,
    check: Check,
    message: &'static str,
}

const fn rule(field: &'static str, check: Check, message: &'static str) -> FieldRule {
    FieldRule {
        field,
        check,
        message,
    }
}

const DATABASE_RULES: &[FieldRule] = &[
    rule("uri", Check::Present, "Database URI is required"),
    rule(
        "uri",
        Check::MongoScheme,
        "Database URI must start with mongodb:// or mongodb+srv://",
    ),
    rule("name", Check::Present, "Database name is required"),
];

const ADMIN_RULES: &[FieldRule] = &[
    rule("username", Check::Present, "Username is required"),
    rule("email", Check::Present, "Email is required"),
    rule("email", Check::EmailShape, "Email address is invalid"),
    rule("password", Check::Present, "Password is required"),
    // Message carries the configured minimum; see `render_message`.
    rule("password", Check::PasswordLength, ""),
    rule("confirmPassword", Check::MatchesPassword, "Passwords do not match"),
    rule("firstName", Check::Present, "First name is required"),
    rule("lastName", Check::Present, "Last name is required"),
];

const SITE_RULES: &[FieldRule] = &[
    rule("title", Check::Present, "Site title is required"),
    rule("url", Check::Present, "Site URL is required"),
    rule("url", Check::HttpUrl, "Site URL must be a valid http(s) URL"),
];

fn rules_for(section: Section) -> &'static [FieldRule] {
    match section {
        Section::Database => DATABASE_RULES,
        Section::Admin => ADMIN_RULES,
        Section::Site => SITE_RULES,
    }
}

/// Validate one section of the draft.
pub fn validate_section(
    section: Section,
    data: &SetupData,
    profile: &ValidationProfile,
) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for rule in rules_for(section) {
        let key = section.key(rule.field);
        if errors.contains_key(&key) {
            continue;
        }
        let value = data.field(section, rule.field).unwrap_or("");
        let ok = match rule.check {
            Check::Present => is_present(value),
            Check::MongoScheme => is_mongodb_uri(value),
            Check::EmailShape => is_email(value),
            Check::PasswordLength => value.chars().count() >= profile.min_password_length,
            Check::MatchesPassword => {
                !profile.require_password_confirmation || value == data.admin.password
            }
            Check::HttpUrl => is_http_url(value),
        };
        if !ok {
            errors.insert(key, render_message(rule, profile));
        }
    }
    errors
}

/// Validate every section, as the installer does for a full payload.
pub fn validate_all(data: &SetupData, profile: &ValidationProfile) -> ErrorMap {
    [Section::Database, Section::Admin, Section::Site]
        .into_iter()
        .flat_map(|section| validate_section(section, data, profile))
        .collect()
}

fn render_message(rule: &FieldRule, profile: &ValidationProfile) -> String {
    match rule.check {
        Check::PasswordLength => format!(
            "Password must be at least {} characters",
            profile.min_password_length
        ),
        _ => rule.message.to_string(),
    }
}

pub(crate) fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

pub(crate) fn is_mongodb_uri(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("mongodb://") || value.starts_with("mongodb+srv://")
}

/// `local@domain.tld` with no whitespace. Deliverability is not our concern.
pub(crate) fn is_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub(crate) fn is_http_url(value: &str) -> bool {
    url::Url::parse(value.trim())
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_data() -> SetupData {
        let mut data = SetupData::default();
        data.admin.username = "admin".into();
        data.admin.email = "admin@example.com".into();
        data.admin.password = "correct-horse".into();
        data.admin.first_name = "Ada".into();
        data.admin.last_name = "Lovelace".into();
        data
    }

    #[test]
    fn complete_draft_has_no_errors() {
        let errors = validate_all(&complete_data(), &ValidationProfile::standard());
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn empty_database_uri_reports_required() {
        let mut data = complete_data();
        data.database.uri = String::new();
        let errors = validate_section(Section::Database, &data, &ValidationProfile::standard());
        assert_eq!(
            errors.get("database.uri").map(String::as_str),
            Some("Database URI is required")
        );
    }

    #[test]
    fn non_mongodb_uri_is_rejected() {
        let mut data = complete_data();
        data.database.uri = "postgres://localhost/db".into();
        let errors = validate_section(Section::Database, &data, &ValidationProfile::standard());
        assert!(errors["database.uri"].contains("mongodb://"));
    }

    #[test]
    fn short_password_always_errors() {
        let profile = ValidationProfile::standard();
        for password in ["", "a", "1234567", "       "] {
            let mut data = complete_data();
            data.admin.password = password.into();
            let errors = validate_section(Section::Admin, &data, &profile);
            assert!(
                errors.contains_key("admin.password"),
                "password {password:?} should be rejected"
            );
        }
    }

    #[test]
    fn blank_password_reports_required_not_length() {
        let mut data = complete_data();
        data.admin.password = String::new();
        let errors = validate_section(Section::Admin, &data, &ValidationProfile::standard());
        assert_eq!(errors["admin.password"], "Password is required");
    }

    #[test]
    fn length_message_uses_profile_minimum() {
        let profile = ValidationProfile {
            min_password_length: 12,
            ..ValidationProfile::standard()
        };
        let mut data = complete_data();
        data.admin.password = "elevenchars".into();
        let errors = validate_section(Section::Admin, &data, &profile);
        assert_eq!(
            errors["admin.password"],
            "Password must be at least 12 characters"
        );
    }

    #[test]
    fn confirmation_only_checked_in_strict_profile() {
        let mut data = complete_data();
        data.admin.confirm_password = Some("something-else".into());

        let standard = validate_section(Section::Admin, &data, &ValidationProfile::standard());
        assert!(!standard.contains_key("admin.confirmPassword"));

        let strict = validate_section(Section::Admin, &data, &ValidationProfile::strict());
        assert_eq!(strict["admin.confirmPassword"], "Passwords do not match");
    }

    #[test]
    fn missing_confirmation_fails_strict_profile() {
        let data = complete_data();
        let errors = validate_section(Section::Admin, &data, &ValidationProfile::strict());
        assert!(errors.contains_key("admin.confirmPassword"));
    }

    #[test]
    fn email_shape() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a b@c.de"));
        assert!(!is_email("a@@b.co"));
        assert!(!is_email("a@.co"));
    }

    #[test]
    fn site_url_must_be_http() {
        assert!(is_http_url("https://example.com"));
        assert!(is_http_url("http://localhost:3000/blog"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("example.com"));
    }

    #[test]
    fn site_rules_report_each_field() {
        let mut data = complete_data();
        data.site.title = " ".into();
        data.site.url = String::new();
        let errors = validate_section(Section::Site, &data, &ValidationProfile::standard());
        assert_eq!(errors["site.title"], "Site title is required");
        assert_eq!(errors["site.url"], "Site URL is required");
    }
}
