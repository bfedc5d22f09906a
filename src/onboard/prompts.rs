use anyhow::Result;
use dialoguer::{Confirm, Input, Password, Select};

use crate::setup::{Section, SetupWizard};
use crate::ui::style as ui;

/// What the operator wants after filling a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepChoice {
    Continue,
    Back,
    Cancel,
}

fn show_error(wizard: &SetupWizard, key: &str) {
    if let Some(message) = wizard.error(key) {
        println!("  {} {}", ui::fail_mark(), ui::error(message));
    }
}

/// Prompt one text field, prefilled with the draft's current value.
fn text_field(
    wizard: &mut SetupWizard,
    section: Section,
    field: &str,
    prompt: &str,
    optional: bool,
) -> Result<()> {
    show_error(wizard, &section.key(field));
    let current = wizard.data().field(section, field).unwrap_or_default().to_string();
    let mut input = Input::<String>::new()
        .with_prompt(format!("  {prompt}"))
        .allow_empty(optional);
    if !current.is_empty() {
        input = input.default(current);
    }
    let value = input.interact_text()?;
    wizard.update_data(section, field, value.trim())?;
    Ok(())
}

pub fn database(wizard: &mut SetupWizard) -> Result<()> {
    text_field(wizard, Section::Database, "uri", &t!("onboard.database.uri"), false)?;
    show_error(wizard, crate::setup::DATABASE_CONNECTION_KEY);
    text_field(wizard, Section::Database, "name", &t!("onboard.database.name"), false)
}

pub fn confirm_connection_test() -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("  {}", t!("onboard.database.test_prompt")))
        .default(true)
        .interact()?)
}

pub fn admin(wizard: &mut SetupWizard) -> Result<()> {
    text_field(wizard, Section::Admin, "username", &t!("onboard.admin.username"), false)?;
    text_field(wizard, Section::Admin, "email", &t!("onboard.admin.email"), false)?;

    show_error(wizard, &Section::Admin.key("password"));
    show_error(wizard, &Section::Admin.key("confirmPassword"));
    let prompt = format!("  {}", t!("onboard.admin.password"));
    if wizard.profile().require_password_confirmation {
        let password = Password::new().with_prompt(prompt).interact()?;
        let confirm = Password::new()
            .with_prompt(format!("  {}", t!("onboard.admin.confirm_password")))
            .interact()?;
        wizard.update_data(Section::Admin, "password", password)?;
        wizard.update_data(Section::Admin, "confirmPassword", confirm)?;
    } else {
        let password = Password::new()
            .with_prompt(prompt)
            .with_confirmation(
                format!("  {}", t!("onboard.admin.confirm_password")),
                t!("onboard.admin.mismatch").to_string(),
            )
            .interact()?;
        wizard.update_data(Section::Admin, "password", password)?;
    }

    text_field(wizard, Section::Admin, "firstName", &t!("onboard.admin.first_name"), false)?;
    text_field(wizard, Section::Admin, "lastName", &t!("onboard.admin.last_name"), false)
}

pub fn site(wizard: &mut SetupWizard) -> Result<()> {
    text_field(wizard, Section::Site, "title", &t!("onboard.site.title"), false)?;
    text_field(wizard, Section::Site, "description", &t!("onboard.site.description"), true)?;
    text_field(wizard, Section::Site, "url", &t!("onboard.site.url"), false)?;
    text_field(wizard, Section::Site, "language", &t!("onboard.site.language"), true)?;
    text_field(wizard, Section::Site, "timezone", &t!("onboard.site.timezone"), true)
}

/// Continue / back / cancel. `continue_label` names the forward action.
pub fn step_choice(continue_label: &str, allow_back: bool) -> Result<StepChoice> {
    let mut choices = vec![(continue_label.to_string(), StepChoice::Continue)];
    if allow_back {
        choices.push((t!("onboard.choice.back").to_string(), StepChoice::Back));
    }
    choices.push((t!("onboard.choice.cancel").to_string(), StepChoice::Cancel));

    let labels: Vec<&str> = choices.iter().map(|(label, _)| label.as_str()).collect();
    let idx = Select::new()
        .with_prompt(format!("  {}", t!("onboard.choice.prompt")))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(choices.get(idx).map_or(StepChoice::Cancel, |(_, choice)| *choice))
}
