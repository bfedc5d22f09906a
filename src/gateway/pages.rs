use serde::Serialize;
use tera::{Context, Tera};

use crate::install::{InstallManifest, redact_uri};
use crate::setup::{SetupData, SetupStep};

const SETUP_TEMPLATE: &str = include_str!("../../templates/setup.html");
const HOME_TEMPLATE: &str = include_str!("../../templates/home.html");

/// Tera-backed HTML pages served by the gateway. Templates are compiled in;
/// `.html` names keep Tera's autoescaping on.
pub struct Pages {
    tera: Tera,
}

#[derive(Serialize)]
struct StepView {
    number: usize,
    key: String,
    title: &'static str,
}

impl Pages {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("setup.html", SETUP_TEMPLATE),
            ("home.html", HOME_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    /// Setup landing page: the step list and the draft the wizard starts from.
    pub fn render_setup(&self, defaults: &SetupData, token_required: bool) -> anyhow::Result<String> {
        let steps: Vec<StepView> = SetupStep::ALL
            .iter()
            .map(|step| StepView {
                number: step.index() + 1,
                key: step.to_string(),
                title: step.title(),
            })
            .collect();

        let mut ctx = Context::new();
        ctx.insert("steps", &steps);
        ctx.insert("database_uri", &redact_uri(&defaults.database.uri));
        ctx.insert("database_name", &defaults.database.name);
        ctx.insert("site_title", &defaults.site.title);
        ctx.insert("site_url", &defaults.site.url);
        ctx.insert("language", defaults.site.language_or_default());
        ctx.insert("timezone", defaults.site.timezone_or_default());
        ctx.insert("token_required", &token_required);
        Ok(self.tera.render("setup.html", &ctx)?)
    }

    pub fn render_home(&self, manifest: &InstallManifest) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("site", &manifest.site);
        ctx.insert(
            "installed_on",
            &manifest.installed_at.format("%Y-%m-%d").to_string(),
        );
        Ok(self.tera.render("home.html", &ctx)?)
    }
}
