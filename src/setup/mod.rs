//! Installation wizard core: the draft [`SetupData`], the per-step rule
//! table, and the [`SetupWizard`] state machine that submits the draft
//! through a [`SetupApi`].

pub mod api;
mod data;
mod step;
mod validation;
mod wizard;

pub use api::{DatabaseTestRequest, InstallationStatus, SetupApi, SetupResponse};
pub use data::{
    AdminSection, DEFAULT_DATABASE_NAME, DEFAULT_DATABASE_URI, DEFAULT_LANGUAGE,
    DEFAULT_SITE_TITLE, DEFAULT_SITE_URL, DEFAULT_TIMEZONE, DatabaseSection, Section, SetupData,
    SiteSection,
};
pub use step::SetupStep;
pub(crate) use validation::{is_email, is_http_url, is_present};
pub use validation::{
    DEFAULT_MIN_PASSWORD_LENGTH, ErrorMap, GENERAL_ERROR_KEY, ValidationProfile, validate_all,
    validate_section,
};
pub use wizard::{DATABASE_CONNECTION_KEY, DatabaseCheck, SetupWizard};
