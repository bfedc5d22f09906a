use crate::config::Config;
use crate::install::{InstallManifest, redact_uri};

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// `stored_database` is the installed site's connection string, already
/// unsealed; it is shown redacted.
pub fn render_status(
    config: &Config,
    manifest: Option<&InstallManifest>,
    stored_database: Option<&str>,
) -> String {
    let profile = config.validation_profile();
    let mut lines = vec![
        format!("◆ {}", t!("status.title")),
        String::new(),
        format!("{}     {}", t!("status.version"), env!("CARGO_PKG_VERSION")),
        format!("{}      {}", t!("status.config"), config.config_path.display()),
        format!("{}        {}", t!("status.data"), config.data_dir().display()),
        String::new(),
        format!(
            "  {}      {}:{}",
            t!("status.gateway"),
            config.server.host,
            config.server.port
        ),
        format!(
            "  {}     {} ({})",
            t!("status.database"),
            redact_uri(&config.database.uri),
            config.database.name
        ),
        format!(
            "  {}   confirmation={}, database_test={}, min_password={}",
            t!("status.setup_rules"),
            on_off(profile.require_password_confirmation),
            on_off(profile.require_database_test),
            profile.min_password_length
        ),
        format!(
            "  {}  {}",
            t!("status.setup_token"),
            if config.setup.token.is_some() {
                t!("status.set")
            } else {
                t!("status.not_set")
            }
        ),
        format!(
            "  {}      {}",
            t!("status.secrets"),
            if config.security.encrypt_secrets {
                t!("status.encrypted")
            } else {
                t!("status.plaintext")
            }
        ),
        format!(
            "  {}         {}",
            t!("status.smtp"),
            if config.smtp.is_configured() {
                config.smtp.host.as_deref().unwrap_or_default().to_string()
            } else {
                t!("status.not_configured").to_string()
            }
        ),
        String::new(),
    ];

    match manifest {
        Some(manifest) => {
            lines.push(format!(
                "{}  {}",
                t!("status.installed"),
                manifest.installed_at.format("%Y-%m-%d %H:%M UTC")
            ));
            lines.push(format!(
                "  {}         {} ({})",
                t!("status.site"),
                manifest.site.title,
                manifest.site.url
            ));
            lines.push(format!(
                "  {}        {} <{}>",
                t!("status.admin"),
                manifest.admin.username,
                manifest.admin.email
            ));
            if let Some(uri) = stored_database {
                lines.push(format!(
                    "  {}     {} ({})",
                    t!("status.database"),
                    redact_uri(uri),
                    manifest.database.name
                ));
            }
        }
        None => lines.push(format!(
            "{}  {}",
            t!("status.installed"),
            t!("status.not_installed")
        )),
    }

    lines.join("\n")
}
