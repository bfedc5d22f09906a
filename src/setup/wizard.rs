use tracing::{debug, info, warn};

use super::api::SetupApi;
use super::data::{Section, SetupData};
use super::step::SetupStep;
use super::validation::{
    ErrorMap, GENERAL_ERROR_KEY, ValidationProfile, is_present, validate_section,
};
use crate::error::SetupError;

pub const DATABASE_CONNECTION_KEY: &str = "database.connection";
const UNTESTED_DATABASE_MESSAGE: &str = "Test the database connection before continuing";
const INSTALL_FAILED_MESSAGE: &str = "Installation failed";

/// Outcome of the last connection test, pinned to the URI that was tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseCheck {
    pub uri: String,
    pub success: bool,
    pub message: Option<String>,
}

/// The setup wizard state machine.
///
/// `welcome → database → admin → site → installing → complete`, linear. The
/// only way back from `installing` is a failed installation, which lands on
/// `site` with `errors["general"]` set.
#[derive(Debug, Clone)]
pub struct SetupWizard {
    step: SetupStep,
    data: SetupData,
    errors: ErrorMap,
    profile: ValidationProfile,
    history: Vec<SetupStep>,
    database_check: Option<DatabaseCheck>,
    completion_message: Option<String>,
}

impl Default for SetupWizard {
    fn default() -> Self {
        Self::new(ValidationProfile::standard())
    }
}

impl SetupWizard {
    pub fn new(profile: ValidationProfile) -> Self {
        Self::with_data(profile, SetupData::default())
    }

    pub fn with_data(profile: ValidationProfile, data: SetupData) -> Self {
        Self {
            step: SetupStep::Welcome,
            data,
            errors: ErrorMap::new(),
            profile,
            history: vec![SetupStep::Welcome],
            database_check: None,
            completion_message: None,
        }
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn data(&self) -> &SetupData {
        &self.data
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn profile(&self) -> &ValidationProfile {
        &self.profile
    }

    /// Every step entered so far, in order, starting with `welcome`.
    pub fn history(&self) -> &[SetupStep] {
        &self.history
    }

    pub fn database_check(&self) -> Option<&DatabaseCheck> {
        self.database_check.as_ref()
    }

    /// Message returned by a successful installation.
    pub fn completion_message(&self) -> Option<&str> {
        self.completion_message.as_deref()
    }

    /// Whether the current database URI has a passing connection test.
    pub fn database_verified(&self) -> bool {
        self.database_check
            .as_ref()
            .is_some_and(|check| check.success && check.uri == self.data.database.uri)
    }

    /// Merge one field into the draft and clear its stale error.
    pub fn update_data(
        &mut self,
        section: Section,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), SetupError> {
        self.data.update(section, field, value)?;
        self.errors.remove(&section.key(field));
        if section == Section::Database && field == "uri" {
            self.errors.remove(DATABASE_CONNECTION_KEY);
        }
        Ok(())
    }

    /// Validate the current step and advance on success.
    ///
    /// Returns whether the step changed. `site` only validates here; the
    /// transition out of it is [`Self::run_installation`].
    pub fn next_step(&mut self) -> bool {
        if !self.step.accepts_input() {
            return false;
        }
        let errors = self.validate_current();
        if !errors.is_empty() {
            debug!(step = %self.step, fields = errors.len(), "setup step rejected");
            self.errors = errors;
            return false;
        }
        self.errors.clear();
        match self.step {
            SetupStep::Site => false,
            step => match step.next() {
                Some(next) => {
                    self.enter(next);
                    true
                }
                None => false,
            },
        }
    }

    /// Move back one step. No-op on `welcome`, `installing` and `complete`.
    pub fn prev_step(&mut self) -> bool {
        if !self.step.accepts_input() {
            return false;
        }
        match self.step.prev() {
            Some(prev) => {
                self.errors.clear();
                self.enter(prev);
                true
            }
            None => false,
        }
    }

    /// Probe the draft's database URI through `api` and remember the result.
    ///
    /// Transport failures count as a failed test; nothing is propagated.
    pub async fn test_database_connection(&mut self, api: &dyn SetupApi) -> bool {
        let uri = self.data.database.uri.clone();
        if !is_present(&uri) {
            self.errors.insert(
                Section::Database.key("uri"),
                "Database URI is required".into(),
            );
            return false;
        }

        let (success, message) = match api.test_database(&uri).await {
            Ok(resp) => (resp.success, resp.message),
            Err(e) => {
                warn!("database connection test failed: {e}");
                (false, Some(e.to_string()))
            }
        };

        if success {
            self.errors.remove(DATABASE_CONNECTION_KEY);
        } else {
            self.errors.insert(
                DATABASE_CONNECTION_KEY.into(),
                message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Database connection failed".into()),
            );
        }
        self.database_check = Some(DatabaseCheck {
            uri,
            success,
            message,
        });
        success
    }

    /// Submit the draft. Only valid from the `site` step.
    ///
    /// Returns the step the wizard ends on: `complete` on success, `site`
    /// when validation, the server, or the transport failed.
    pub async fn run_installation(
        &mut self,
        api: &dyn SetupApi,
    ) -> Result<SetupStep, SetupError> {
        if self.step != SetupStep::Site {
            return Err(SetupError::InvalidTransition {
                from: self.step,
                action: "run the installation",
            });
        }

        let errors = validate_section(Section::Site, &self.data, &self.profile);
        if !errors.is_empty() {
            self.errors = errors;
            return Ok(self.step);
        }

        self.errors.clear();
        self.enter(SetupStep::Installing);

        let outcome = api.install(&self.data).await;
        match outcome {
            Ok(resp) if resp.success => {
                info!(site = %self.data.site.title, "installation complete");
                self.completion_message = resp.message;
                self.enter(SetupStep::Complete);
            }
            Ok(resp) => {
                warn!("installation rejected by server");
                let mut errors = resp.errors;
                let general = resp
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| INSTALL_FAILED_MESSAGE.into());
                errors.insert(GENERAL_ERROR_KEY.into(), general);
                self.errors = errors;
                self.enter(SetupStep::Site);
            }
            Err(e) => {
                warn!("installation request failed: {e}");
                let message = e.to_string();
                self.errors.insert(
                    GENERAL_ERROR_KEY.into(),
                    if message.trim().is_empty() {
                        INSTALL_FAILED_MESSAGE.into()
                    } else {
                        message
                    },
                );
                self.enter(SetupStep::Site);
            }
        }
        Ok(self.step)
    }

    fn validate_current(&self) -> ErrorMap {
        let Some(section) = self.step.section() else {
            return ErrorMap::new();
        };
        let mut errors = validate_section(section, &self.data, &self.profile);
        if section == Section::Database
            && self.profile.require_database_test
            && errors.is_empty()
            && !self.database_verified()
        {
            errors.insert(
                DATABASE_CONNECTION_KEY.into(),
                UNTESTED_DATABASE_MESSAGE.into(),
            );
        }
        errors
    }

    fn enter(&mut self, step: SetupStep) {
        debug!(from = %self.step, to = %step, "setup step transition");
        self.step = step;
        self.history.push(step);
    }
}
