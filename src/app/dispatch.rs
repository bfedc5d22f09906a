use anyhow::{Context, Result, bail};
use std::time::Duration;
use tracing::{info, warn};

use crate::admin::{
    ContentAction, ContentApi, ContentFilter, ContentKind, ContentSort, ContentTable, FormMode,
    PluginAction, PluginFilter, PluginSort, PluginTable, PluginsApi, RoleForm,
    SettingsApi, UserAction, UserFilter, UserForm, UserSort, UserTable, UsersApi,
};
use crate::app::status::render_status;
use crate::app::tables::{
    render_content, render_outcome, render_plugins, render_settings, render_users,
};
use crate::cli::commands::{
    Cli, Commands, ContentCommands, PluginCommands, SettingsCommands, UserCommands,
};
use crate::client::AdminClient;
use crate::config::Config;
use crate::error::ClientError;
use crate::install::{FileInstaller, Installer};
use crate::onboard::{run_quick_setup, run_wizard, setup_api};
use crate::setup::{ErrorMap, ValidationProfile};
use crate::ui::style as ui;

fn admin_client(config: &Config, server: Option<String>, token: Option<String>) -> Result<AdminClient> {
    let url = server.unwrap_or_else(|| config.client.server_url.clone());
    let client = AdminClient::with_timeout(&url, Duration::from_secs(config.client.timeout_secs))
        .with_context(|| format!("invalid server URL {url}"))?
        .with_token(token.or_else(|| config.client.admin_token.clone()));
    Ok(client)
}

/// Local form errors read better as a list than as the error's summary line.
fn explain(err: ClientError) -> anyhow::Error {
    match err.field_errors() {
        Some(errors) => anyhow::anyhow!("{}", describe(errors)),
        None => err.into(),
    }
}

fn describe(errors: &ErrorMap) -> String {
    errors
        .iter()
        .map(|(key, message)| format!("{key}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn handle_plugins(api: &dyn PluginsApi, command: PluginCommands) -> Result<()> {
    let mut table = PluginTable::default();

    let (action, slugs) = match command {
        PluginCommands::List {
            search,
            status,
            category,
            sort,
            order,
        } => {
            table.refresh(api).await.map_err(explain)?;
            table.filter = PluginFilter {
                search,
                status,
                category,
            };
            table.sort = PluginSort {
                key: sort,
                direction: order.direction(),
            };
            println!("{}", render_plugins(&table));
            return Ok(());
        }
        PluginCommands::Install { slug } => {
            let plugin = api.install_plugin(&slug).await.map_err(explain)?;
            println!(
                "{} {}",
                ui::ok_mark(),
                t!("admin.plugin_installed", name = plugin.name, version = plugin.version)
            );
            return Ok(());
        }
        PluginCommands::Activate { slugs } => (PluginAction::Activate, slugs),
        PluginCommands::Deactivate { slugs } => (PluginAction::Deactivate, slugs),
        PluginCommands::Uninstall { slugs } => (PluginAction::Uninstall, slugs),
    };

    table.refresh(api).await.map_err(explain)?;
    for slug in &slugs {
        if !table.select(slug) {
            bail!("unknown plugin {slug}");
        }
    }
    let outcome = table.bulk_apply(api, action).await;
    println!("{}", render_outcome(&action.to_string(), &outcome));
    if !outcome.is_clean() {
        bail!("{} of {} plugin(s) failed", outcome.failed.len(), outcome.attempted());
    }
    Ok(())
}

async fn handle_users(api: &dyn UsersApi, command: UserCommands) -> Result<()> {
    let mut table = UserTable::default();

    let (action, keys) = match command {
        UserCommands::List {
            search,
            role,
            status,
            sort,
            order,
        } => {
            table.refresh(api).await.map_err(explain)?;
            table.filter = UserFilter {
                search,
                role,
                status,
            };
            table.sort = UserSort {
                key: sort,
                direction: order.direction(),
            };
            println!("{}", render_users(&table));
            return Ok(());
        }
        UserCommands::Create {
            username,
            email,
            first_name,
            last_name,
            password,
            roles,
        } => {
            let form = UserForm {
                username,
                email,
                confirm_password: password.clone(),
                password,
                first_name,
                last_name,
                roles,
            };
            let errors = form.validate(FormMode::Create);
            if !errors.is_empty() {
                bail!("{}", describe(&errors));
            }
            let user = api.create_user(&form).await.map_err(explain)?;
            println!("{} {}", ui::ok_mark(), t!("admin.user_created", user = user.username));
            return Ok(());
        }
        UserCommands::SetRoles { user, roles } => {
            table.refresh(api).await.map_err(explain)?;
            let id = table
                .find(&user)
                .map(|u| u.id.clone())
                .with_context(|| format!("unknown user {user}"))?;
            api.set_user_roles(&id, &roles).await.map_err(explain)?;
            println!("{} {}", ui::ok_mark(), t!("admin.roles_updated", user = user));
            return Ok(());
        }
        UserCommands::CreateRole {
            name,
            description,
            permissions,
        } => {
            let form = RoleForm {
                name,
                description,
                permissions,
            };
            let errors = form.validate();
            if !errors.is_empty() {
                bail!("{}", describe(&errors));
            }
            let role = api.create_role(&form).await.map_err(explain)?;
            println!("{} {}", ui::ok_mark(), t!("admin.role_created", role = role.name));
            return Ok(());
        }
        UserCommands::Activate { users } => (UserAction::Activate, users),
        UserCommands::Suspend { users } => (UserAction::Suspend, users),
        UserCommands::Delete { users } => (UserAction::Delete, users),
    };

    table.refresh(api).await.map_err(explain)?;
    for key in &keys {
        let id = table
            .find(key)
            .map(|u| u.id.clone())
            .with_context(|| format!("unknown user {key}"))?;
        table.select(&id);
    }
    let outcome = table.bulk_apply(api, action).await;
    println!("{}", render_outcome(&action.to_string(), &outcome));
    if !outcome.is_clean() {
        bail!("{} of {} user(s) failed", outcome.failed.len(), outcome.attempted());
    }
    Ok(())
}

async fn handle_content(api: &dyn ContentApi, command: ContentCommands) -> Result<()> {
    let (action, kind, keys) = match command {
        ContentCommands::List {
            kind,
            search,
            status,
            author,
            category,
            sort,
            order,
        } => {
            let mut table = ContentTable::new(kind, Vec::new());
            table.refresh(api).await.map_err(explain)?;
            table.filter = ContentFilter {
                search,
                status,
                author,
                category,
            };
            if let Some(key) = sort {
                table.sort = ContentSort {
                    key,
                    direction: order.direction(),
                };
            }
            println!("{}", render_content(&table));
            return Ok(());
        }
        ContentCommands::Publish { kind, entries } => (ContentAction::Publish, kind, entries),
        ContentCommands::Unpublish { kind, entries } => (ContentAction::Unpublish, kind, entries),
        ContentCommands::Archive { kind, entries } => (ContentAction::Archive, kind, entries),
        ContentCommands::Delete { kind, entries } => (ContentAction::Delete, kind, entries),
    };

    let mut table = ContentTable::new(kind, Vec::new());
    table.refresh(api).await.map_err(explain)?;
    for key in &keys {
        let id = table
            .find(key)
            .map(|c| c.id.clone())
            .with_context(|| format!("unknown {} entry {key}", singular(kind)))?;
        table.select(&id);
    }
    let outcome = table.bulk_apply(api, action).await;
    println!("{}", render_outcome(&action.to_string(), &outcome));
    if !outcome.is_clean() {
        bail!(
            "{} of {} {kind} failed",
            outcome.failed.len(),
            outcome.attempted()
        );
    }
    Ok(())
}

fn singular(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Posts => "post",
        ContentKind::Pages => "page",
    }
}

async fn handle_settings(api: &dyn SettingsApi, command: SettingsCommands) -> Result<()> {
    match command {
        SettingsCommands::Get { section } => {
            let settings = api.get_settings(section).await.map_err(explain)?;
            println!("{}", render_settings(&settings));
        }
        SettingsCommands::Set {
            section,
            field,
            value,
        } => {
            let current = api.get_settings(section).await.map_err(explain)?;
            let updated = current.with_field(&field, &value).map_err(explain)?;
            let saved = api.update_settings(&updated).await.map_err(explain)?;
            println!("{}", render_settings(&saved));
        }
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let Cli {
        server,
        token,
        command,
    } = cli;

    match command {
        Commands::Setup {
            quick,
            strict,
            fields,
        } => {
            let profile = if strict {
                ValidationProfile::strict()
            } else {
                config.validation_profile()
            };
            let api = setup_api(&config, server.as_deref())?;
            if quick {
                run_quick_setup(&config, api.as_ref(), profile, &fields).await?;
            } else {
                run_wizard(&config, api.as_ref(), profile).await?;
            }
            Ok(())
        }

        Commands::Serve { port, host } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if config.server.port == 0 {
                info!("Starting setup gateway on {} (random port)", config.server.host);
            } else {
                info!(
                    "Starting setup gateway on {}:{}",
                    config.server.host, config.server.port
                );
            }
            crate::gateway::run_gateway(config).await
        }

        Commands::Check => {
            let api = setup_api(&config, server.as_deref())?;
            let status = api.check().await?;
            if status.installed {
                println!("{} {}", ui::ok_mark(), t!("check.installed"));
            } else {
                println!("{} {}", ui::fail_mark(), t!("check.not_installed"));
            }
            Ok(())
        }

        Commands::TestDb { uri } => {
            let api = setup_api(&config, server.as_deref())?;
            let uri = uri.unwrap_or_else(|| config.database.uri.clone());
            let resp = api.test_database(&uri).await?;
            let message = resp.message.unwrap_or_default();
            if resp.success {
                println!("{} {}", ui::ok_mark(), message);
                Ok(())
            } else {
                bail!("{message}")
            }
        }

        Commands::Status => {
            let installer = FileInstaller::from_config(&config);
            let manifest = installer.manifest().await?;
            let stored = installer.database_uri().await.unwrap_or_else(|e| {
                warn!("stored database URI could not be opened: {e}");
                None
            });
            println!(
                "{}",
                render_status(&config, manifest.as_ref(), stored.as_deref())
            );
            Ok(())
        }

        Commands::Plugins { plugin_command } => {
            let client = admin_client(&config, server, token)?;
            handle_plugins(&client, plugin_command).await
        }

        Commands::Users { user_command } => {
            let client = admin_client(&config, server, token)?;
            handle_users(&client, user_command).await
        }

        Commands::Content { content_command } => {
            let client = admin_client(&config, server, token)?;
            handle_content(&client, content_command).await
        }

        Commands::Settings { settings_command } => {
            let client = admin_client(&config, server, token)?;
            handle_settings(&client, settings_command).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::OrderArgs;
    use crate::admin::{PluginSortKey, SettingsSection};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn plugins_json() -> serde_json::Value {
        json!([
            {"slug": "seo", "name": "SEO", "version": "1.0.0", "status": "inactive"},
            {"slug": "forms", "name": "Forms", "version": "2.1.0", "status": "inactive"}
        ])
    }

    #[tokio::test]
    async fn bulk_activate_reports_partial_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plugins"))
            .respond_with(ResponseTemplate::new(200).set_body_json(plugins_json()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/plugins/seo/activate"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/plugins/forms/activate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = AdminClient::new(&server.uri()).unwrap();
        let err = handle_plugins(
            &client,
            PluginCommands::Activate {
                slugs: vec!["seo".into(), "forms".into()],
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("1 of 2 plugin(s) failed"));
    }

    #[tokio::test]
    async fn unknown_plugin_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plugins"))
            .respond_with(ResponseTemplate::new(200).set_body_json(plugins_json()))
            .mount(&server)
            .await;

        let client = AdminClient::new(&server.uri()).unwrap();
        let err = handle_plugins(
            &client,
            PluginCommands::Uninstall {
                slugs: vec!["gallery".into()],
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unknown plugin gallery"));
    }

    #[tokio::test]
    async fn repeated_plugin_slug_is_still_acted_on() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plugins"))
            .respond_with(ResponseTemplate::new(200).set_body_json(plugins_json()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/plugins/seo/activate"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdminClient::new(&server.uri()).unwrap();
        handle_plugins(
            &client,
            PluginCommands::Activate {
                slugs: vec!["seo".into(), "seo".into()],
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn user_named_by_username_and_id_is_suspended_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "u1",
                "username": "zoe",
                "email": "zoe@example.com",
                "status": "active",
                "createdAt": "2026-01-01T00:00:00Z"
            }])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/users/u1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdminClient::new(&server.uri()).unwrap();
        handle_users(
            &client,
            UserCommands::Suspend {
                users: vec!["zoe".into(), "u1".into()],
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn content_publish_by_slug_and_unknown_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/content/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "p1",
                "title": "Hello",
                "slug": "hello",
                "status": "draft",
                "createdAt": "2026-01-01T00:00:00Z"
            }])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/content/posts/p1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdminClient::new(&server.uri()).unwrap();
        handle_content(
            &client,
            ContentCommands::Publish {
                kind: ContentKind::Posts,
                entries: vec!["hello".into(), "p1".into()],
            },
        )
        .await
        .unwrap();

        let err = handle_content(
            &client,
            ContentCommands::Archive {
                kind: ContentKind::Posts,
                entries: vec!["missing".into()],
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unknown post entry missing"));
    }

    #[tokio::test]
    async fn list_plugins_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plugins"))
            .respond_with(ResponseTemplate::new(200).set_body_json(plugins_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdminClient::new(&server.uri()).unwrap();
        handle_plugins(
            &client,
            PluginCommands::List {
                search: "seo".into(),
                status: None,
                category: None,
                sort: PluginSortKey::Name,
                order: OrderArgs::default(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn invalid_user_form_never_reaches_server() {
        let server = MockServer::start().await;
        let client = AdminClient::new(&server.uri()).unwrap();
        let err = handle_users(
            &client,
            UserCommands::Create {
                username: String::new(),
                email: "nobody".into(),
                first_name: String::new(),
                last_name: String::new(),
                password: "short".into(),
                roles: Vec::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("user.username"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn settings_set_rejects_unknown_field_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/settings/email"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"smtpPort": 587})))
            .mount(&server)
            .await;

        let client = AdminClient::new(&server.uri()).unwrap();
        let err = handle_settings(
            &client,
            SettingsCommands::Set {
                section: SettingsSection::Email,
                field: "smtpPassword".into(),
                value: "x".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("settings.smtpPassword"));
    }
}
