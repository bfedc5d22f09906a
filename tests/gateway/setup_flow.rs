use super::support::GatewayTestServer;
use modular_cms::client::HttpSetupClient;
use modular_cms::setup::{Section, SetupApi, SetupStep, SetupWizard, ValidationProfile};

fn fill_admin(wizard: &mut SetupWizard) {
    for (field, value) in [
        ("username", "admin"),
        ("email", "admin@example.com"),
        ("password", "correct-horse"),
        ("firstName", "Ada"),
        ("lastName", "Lovelace"),
    ] {
        wizard.update_data(Section::Admin, field, value).unwrap();
    }
}

#[tokio::test]
async fn wizard_installs_through_http_client() {
    let server = GatewayTestServer::start(None).await;
    let api = HttpSetupClient::new(&server.base_url()).unwrap();
    assert!(!api.check().await.unwrap().installed);

    let mut wizard = SetupWizard::new(ValidationProfile::default());
    assert!(wizard.next_step());
    assert_eq!(wizard.step(), SetupStep::Database);
    assert!(wizard.next_step());
    fill_admin(&mut wizard);
    assert!(wizard.next_step());
    assert_eq!(wizard.step(), SetupStep::Site);
    wizard
        .update_data(Section::Site, "title", "Field Notes")
        .unwrap();

    let step = wizard.run_installation(&api).await.unwrap();
    assert_eq!(step, SetupStep::Complete);
    assert!(wizard.completion_message().is_some());
    assert!(api.check().await.unwrap().installed);
}

#[tokio::test]
async fn missing_token_surfaces_as_general_error() {
    let server = GatewayTestServer::start(Some("s3cret")).await;
    let api = HttpSetupClient::new(&server.base_url()).unwrap();

    let mut wizard = SetupWizard::new(ValidationProfile::default());
    wizard.next_step();
    wizard.next_step();
    fill_admin(&mut wizard);
    wizard.next_step();

    let step = wizard.run_installation(&api).await.unwrap();
    assert_eq!(step, SetupStep::Site);
    assert_eq!(
        wizard.error("general"),
        Some("Invalid or missing setup token")
    );

    let api = api.with_setup_token(Some("s3cret".into()));
    let step = wizard.run_installation(&api).await.unwrap();
    assert_eq!(step, SetupStep::Complete);
}

#[tokio::test]
async fn unreachable_database_is_reported_on_the_database_step() {
    let server = GatewayTestServer::start(None).await;
    let api = HttpSetupClient::new(&server.base_url()).unwrap();

    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = closed.local_addr().unwrap().port();
    drop(closed);

    let mut wizard = SetupWizard::new(ValidationProfile::default());
    wizard.next_step();
    wizard
        .update_data(
            Section::Database,
            "uri",
            format!("mongodb://127.0.0.1:{port}/cms"),
        )
        .unwrap();
    assert!(!wizard.test_database_connection(&api).await);
    assert!(wizard.error("database.connection").is_some());
    assert_eq!(wizard.step(), SetupStep::Database);
}
