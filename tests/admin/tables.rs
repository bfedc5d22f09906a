use modular_cms::admin::{
    PluginAction, PluginStatus, PluginTable, SettingsApi, SettingsSection, UserAction, UserStatus,
    UserTable,
};
use modular_cms::app::tables::{render_outcome, render_plugins, render_settings, render_users};
use modular_cms::client::AdminClient;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn admin_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/plugins"))
        .and(header("authorization", "Bearer t0ken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"slug": "seo", "name": "SEO", "version": "1.2.0", "status": "inactive",
             "category": "marketing", "downloads": 900, "rating": 4.2},
            {"slug": "forms", "name": "Forms", "version": "2.0.0", "status": "active",
             "category": "content", "downloads": 3000, "rating": 4.8},
            {"slug": "gallery", "name": "Gallery", "version": "0.9.1", "status": "not_installed"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "u1", "username": "ada", "email": "ada@example.com", "firstName": "Ada",
             "lastName": "Lovelace", "roles": ["admin"], "status": "active",
             "createdAt": "2026-01-02T00:00:00Z", "lastLogin": "2026-03-04T10:00:00Z"},
            {"id": "u2", "username": "bob", "email": "bob@example.com", "firstName": "Bob",
             "lastName": "Byte", "roles": ["editor"], "status": "active",
             "createdAt": "2026-02-01T00:00:00Z"}
        ])))
        .mount(&server)
        .await;
    server
}

fn client(server: &MockServer) -> AdminClient {
    AdminClient::new(&server.uri())
        .unwrap()
        .with_token(Some("t0ken".into()))
}

#[tokio::test]
async fn plugin_table_bulk_activate_over_http() {
    let server = admin_server().await;
    Mock::given(method("POST"))
        .and(path("/api/plugins/seo/activate"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let mut table = PluginTable::default();
    table.refresh(&api).await.unwrap();
    assert!(table.toggle("seo"));
    assert!(table.toggle("forms"));

    let outcome = table.bulk_apply(&api, PluginAction::Activate).await;
    assert!(outcome.is_clean());
    assert_eq!(outcome.succeeded, vec!["seo".to_string()]);
    assert_eq!(outcome.skipped, vec!["forms".to_string()]);
    assert_eq!(table.get("seo").unwrap().status, PluginStatus::Active);

    let text = render_outcome("activate", &outcome);
    assert!(text.starts_with("activate: 1/1 succeeded, skipped forms"));
    assert!(render_plugins(&table).contains("active=2"));
}

#[tokio::test]
async fn user_suspend_failure_rolls_back() {
    let server = admin_server().await;
    Mock::given(method("PATCH"))
        .and(path("/api/users/u2"))
        .and(body_json(json!({"status": "suspended"})))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "Forbidden"})))
        .mount(&server)
        .await;

    let api = client(&server);
    let mut table = UserTable::default();
    table.refresh(&api).await.unwrap();
    let id = table.find("bob").unwrap().id.clone();
    table.toggle(&id);

    let outcome = table.bulk_apply(&api, UserAction::Suspend).await;
    assert!(!outcome.is_clean());
    assert_eq!(outcome.failed.len(), 1);
    assert!(outcome.failed[0].1.contains("Forbidden"));
    assert_eq!(table.get("u2").unwrap().status, UserStatus::Active);

    let text = render_users(&table);
    assert!(text.contains("2026-03-04"));
    assert!(text.contains("never"));
}

#[tokio::test]
async fn settings_update_round_trips_through_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/settings/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabled": false, "smtpHost": "", "smtpPort": 587
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/settings/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabled": false, "smtpHost": "", "smtpPort": 2525
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = AdminClient::new(&server.uri()).unwrap();
    let current = api.get_settings(SettingsSection::Email).await.unwrap();
    let updated = current.with_field("smtpPort", "2525").unwrap();
    let saved = api.update_settings(&updated).await.unwrap();
    assert!(render_settings(&saved).contains("smtpPort = 2525"));
}
