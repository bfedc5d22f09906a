use modular_cms::config::Config;
use modular_cms::gateway::run_gateway_with_listener;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;

pub struct GatewayTestServer {
    port: u16,
    _data: TempDir,
    stop: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl GatewayTestServer {
    pub async fn start(setup_token: Option<&str>) -> Self {
        let data = TempDir::new().expect("temp data dir should be created");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("listener should expose local address")
            .port();

        let mut config = Config::default();
        config.config_dir = data.path().to_path_buf();
        config.config_path = data.path().join("config.toml");
        config.setup.data_dir = Some(data.path().join("site").display().to_string());
        config.setup.token = setup_token.map(str::to_string);
        config.security.hash_rounds = 1;
        config.server.port = port;

        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(run_gateway_with_listener(listener, config, async move {
            let _ = stopped.await;
        }));

        Self {
            port,
            _data: data,
            stop: Some(stop),
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    /// Signal graceful shutdown and wait for the server task.
    pub async fn stop(mut self) -> anyhow::Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), &mut self.handle)
            .await
            .expect("gateway should stop within 5s")
            .expect("gateway task should not panic")
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client that reports redirects instead of following them.
pub fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client should be built")
}

pub fn install_payload() -> serde_json::Value {
    serde_json::json!({
        "database": { "uri": "mongodb://localhost:27017", "name": "modular_cms" },
        "admin": {
            "username": "admin",
            "email": "admin@example.com",
            "password": "correct-horse",
            "firstName": "Ada",
            "lastName": "Lovelace"
        },
        "site": { "title": "Field Notes", "url": "http://localhost:3000" }
    })
}
