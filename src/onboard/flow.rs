use anyhow::{Context, Result, bail};
use clap::Args;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use crate::client::HttpSetupClient;
use crate::config::Config;
use crate::install::{FileInstaller, LocalSetupApi};
use crate::setup::{
    ErrorMap, GENERAL_ERROR_KEY, Section, SetupApi, SetupStep, SetupWizard, ValidationProfile,
};
use crate::ui::style as ui;

use super::prompts::{self, StepChoice};
use super::view::{
    print_bullet, print_complete, print_connection_result, print_errors, print_step,
    print_summary, print_welcome_banner,
};

/// Installation payload supplied as flags for `modular setup --quick`.
///
/// Database values default to the config's `[database]` section (and thus
/// `MONGODB_URI` / `MONGODB_DB`).
#[derive(Args, Debug, Clone, Default)]
pub struct QuickSetup {
    /// Database connection string
    #[arg(long)]
    pub db_uri: Option<String>,
    /// Database name
    #[arg(long)]
    pub db_name: Option<String>,
    #[arg(long, env = "MODULAR_ADMIN_USERNAME")]
    pub admin_username: Option<String>,
    #[arg(long, env = "MODULAR_ADMIN_EMAIL")]
    pub admin_email: Option<String>,
    /// Administrator password (prefer the env var over the flag)
    #[arg(long, env = "MODULAR_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
    #[arg(long)]
    pub admin_first_name: Option<String>,
    #[arg(long)]
    pub admin_last_name: Option<String>,
    #[arg(long)]
    pub site_title: Option<String>,
    #[arg(long)]
    pub site_description: Option<String>,
    #[arg(long)]
    pub site_url: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub timezone: Option<String>,
}

impl QuickSetup {
    fn fields(&self) -> [(Section, &'static str, Option<&str>); 12] {
        [
            (Section::Database, "uri", self.db_uri.as_deref()),
            (Section::Database, "name", self.db_name.as_deref()),
            (Section::Admin, "username", self.admin_username.as_deref()),
            (Section::Admin, "email", self.admin_email.as_deref()),
            (Section::Admin, "password", self.admin_password.as_deref()),
            (Section::Admin, "firstName", self.admin_first_name.as_deref()),
            (Section::Admin, "lastName", self.admin_last_name.as_deref()),
            (Section::Site, "title", self.site_title.as_deref()),
            (Section::Site, "description", self.site_description.as_deref()),
            (Section::Site, "url", self.site_url.as_deref()),
            (Section::Site, "language", self.language.as_deref()),
            (Section::Site, "timezone", self.timezone.as_deref()),
        ]
    }

    /// Merge every supplied flag into the wizard's draft.
    pub fn apply(&self, wizard: &mut SetupWizard) -> Result<()> {
        for (section, field, value) in self.fields() {
            if let Some(value) = value {
                wizard.update_data(section, field, value.trim())?;
            }
        }
        // Flags can't be typed twice; the password stands in for its confirmation.
        if wizard.profile().require_password_confirmation
            && let Some(password) = &self.admin_password
        {
            wizard.update_data(Section::Admin, "confirmPassword", password.trim())?;
        }
        Ok(())
    }
}

/// Installation endpoint the wizard submits to: the local data directory,
/// or a running setup gateway at `server`.
pub fn setup_api(config: &Config, server: Option<&str>) -> Result<Arc<dyn SetupApi>> {
    match server {
        Some(url) => {
            let client = HttpSetupClient::with_timeout(
                url,
                Duration::from_secs(config.client.timeout_secs),
            )
            .with_context(|| format!("invalid server URL {url}"))?
            .with_setup_token(config.setup.token.clone());
            Ok(Arc::new(client))
        }
        None => {
            let installer = FileInstaller::from_config(config);
            Ok(Arc::new(LocalSetupApi::new(Arc::new(installer))))
        }
    }
}

fn describe_errors(errors: &ErrorMap) -> String {
    let mut out = String::new();
    for (key, message) in errors {
        let _ = write!(out, "\n  {key}: {message}");
    }
    out
}

/// Advance out of the current form step, printing errors on rejection.
fn advance(wizard: &mut SetupWizard) -> bool {
    if wizard.next_step() {
        return true;
    }
    print_errors(wizard.errors());
    false
}

/// Interactive console wizard. Returns the wizard in its final state, or
/// `None` when the operator cancelled or the site was already installed.
pub async fn run_wizard(
    config: &Config,
    api: &dyn SetupApi,
    profile: ValidationProfile,
) -> Result<Option<SetupWizard>> {
    print_welcome_banner();

    if api.check().await?.installed {
        println!("  {} {}", ui::ok_mark(), t!("onboard.already_installed"));
        return Ok(None);
    }

    let mut wizard = SetupWizard::with_data(profile, config.setup_defaults());
    loop {
        match wizard.step() {
            SetupStep::Welcome => {
                print_bullet(&t!("onboard.welcome.intro"));
                print_bullet(&t!("onboard.welcome.steps"));
                wizard.next_step();
            }
            SetupStep::Database => {
                print_step(SetupStep::Database);
                prompts::database(&mut wizard)?;
                if (wizard.profile().require_database_test && !wizard.database_verified())
                    || prompts::confirm_connection_test()?
                {
                    let success = wizard.test_database_connection(api).await;
                    let message = wizard
                        .database_check()
                        .and_then(|check| check.message.clone());
                    print_connection_result(success, message.as_deref());
                }
                advance(&mut wizard);
            }
            SetupStep::Admin => {
                print_step(SetupStep::Admin);
                prompts::admin(&mut wizard)?;
                match prompts::step_choice(&t!("onboard.choice.continue"), true)? {
                    StepChoice::Continue => {
                        advance(&mut wizard);
                    }
                    StepChoice::Back => {
                        wizard.prev_step();
                    }
                    StepChoice::Cancel => return Ok(None),
                }
            }
            SetupStep::Site => {
                print_step(SetupStep::Site);
                if let Some(general) = wizard.error(GENERAL_ERROR_KEY) {
                    println!("  {} {}", ui::fail_mark(), ui::error(general));
                }
                prompts::site(&mut wizard)?;
                wizard.next_step();
                if !wizard.errors().is_empty() {
                    print_errors(wizard.errors());
                    continue;
                }
                print_summary(wizard.data());
                match prompts::step_choice(&t!("onboard.choice.install"), true)? {
                    StepChoice::Continue => {
                        println!("  {} {}", ui::accent("›"), t!("onboard.installing"));
                        wizard.run_installation(api).await?;
                    }
                    StepChoice::Back => {
                        wizard.prev_step();
                    }
                    StepChoice::Cancel => return Ok(None),
                }
            }
            SetupStep::Installing => bail!("installation did not settle"),
            SetupStep::Complete => {
                print_complete(wizard.data(), wizard.completion_message());
                return Ok(Some(wizard));
            }
        }
    }
}

/// Non-interactive setup: the same state machine, fed from flags.
pub async fn run_quick_setup(
    config: &Config,
    api: &dyn SetupApi,
    profile: ValidationProfile,
    quick: &QuickSetup,
) -> Result<SetupWizard> {
    let mut wizard = SetupWizard::with_data(profile, config.setup_defaults());
    quick.apply(&mut wizard)?;
    wizard.next_step();

    if wizard.profile().require_database_test
        && !wizard.test_database_connection(api).await
    {
        bail!(
            "database connection test failed:{}",
            describe_errors(wizard.errors())
        );
    }

    while matches!(wizard.step(), SetupStep::Database | SetupStep::Admin) {
        if !wizard.next_step() {
            bail!(
                "{} step is incomplete:{}",
                wizard.step(),
                describe_errors(wizard.errors())
            );
        }
    }

    let step = wizard.run_installation(api).await?;
    if step != SetupStep::Complete {
        bail!("installation failed:{}", describe_errors(wizard.errors()));
    }

    println!(
        "  {} {}",
        ui::ok_mark(),
        wizard.completion_message().unwrap_or("Installed")
    );
    Ok(wizard)
}
