use modular_cms::admin::{
    ContentAction, ContentKind, ContentSort, ContentSortKey, ContentStatus, ContentTable,
    SortDirection,
};
use modular_cms::app::tables::{render_content, render_outcome};
use modular_cms::client::AdminClient;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn content_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/content/posts"))
        .and(header("authorization", "Bearer t0ken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "p1", "title": "Welcome", "slug": "welcome", "author": "ada",
             "status": "published", "categories": ["news"],
             "createdAt": "2026-01-02T00:00:00Z", "publishedAt": "2026-01-02T00:00:00Z"},
            {"id": "p2", "title": "Roadmap", "slug": "roadmap", "author": "bob",
             "status": "draft", "categories": ["planning"],
             "createdAt": "2026-02-01T00:00:00Z", "updatedAt": "2026-02-05T00:00:00Z"},
            {"id": "p3", "title": "Changelog", "slug": "changelog", "author": "ada",
             "status": "scheduled", "createdAt": "2026-02-10T00:00:00Z"}
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
async fn post_table_bulk_publish_over_http() {
    let server = content_server().await;
    Mock::given(method("PATCH"))
        .and(path("/api/content/posts/p2"))
        .and(body_json(json!({"status": "published"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/content/posts/p3"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"error": "Entry is scheduled"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let mut table = ContentTable::new(ContentKind::Posts, Vec::new());
    table.refresh(&api).await.unwrap();
    table.select_all_visible();

    let outcome = table.bulk_apply(&api, ContentAction::Publish).await;
    assert_eq!(outcome.succeeded, ["p2"]);
    assert_eq!(outcome.skipped, ["p1"]);
    assert_eq!(outcome.failed[0].0, "p3");
    assert_eq!(table.get("p2").unwrap().status, ContentStatus::Published);
    assert_eq!(table.get("p3").unwrap().status, ContentStatus::Scheduled);

    let report = render_outcome("publish", &outcome);
    assert!(report.contains("server returned 409: Entry is scheduled"));
}

#[tokio::test]
async fn post_table_filters_sorts_and_deletes() {
    let server = content_server().await;
    Mock::given(method("DELETE"))
        .and(path("/api/content/posts/p1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let mut table = ContentTable::new(ContentKind::Posts, Vec::new());
    table.refresh(&api).await.unwrap();

    let ids: Vec<&str> = table.visible().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["p3", "p2", "p1"]);

    table.filter.author = Some("ada".into());
    table.sort = ContentSort {
        key: ContentSortKey::Title,
        direction: SortDirection::Asc,
    };
    let titles: Vec<&str> = table.visible().iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["Changelog", "Welcome"]);

    assert!(table.select("p1"));
    let outcome = table.bulk_apply(&api, ContentAction::Delete).await;
    assert!(outcome.is_clean());
    assert!(table.find("welcome").is_none());
    assert!(render_content(&table).contains("Changelog"));
}
