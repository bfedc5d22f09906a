use super::Config;

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(uri) = non_empty("MONGODB_URI") {
            self.database.uri = uri;
        }
        if let Some(name) = non_empty("MONGODB_DB") {
            self.database.name = name;
        }

        if let Some(secret) = non_empty("JWT_SECRET") {
            self.security.jwt_secret = Some(secret);
        }
        if let Some(secret) = non_empty("NEXTAUTH_SECRET") {
            self.security.nextauth_secret = Some(secret);
        }
        if let Some(rounds) = non_empty("BCRYPT_ROUNDS")
            && let Ok(rounds) = rounds.parse::<u32>()
            && rounds > 0
        {
            self.security.hash_rounds = rounds;
        }
        if let Some(timeout) = non_empty("SESSION_TIMEOUT")
            && let Ok(timeout) = timeout.parse::<u64>()
        {
            self.security.session_timeout_secs = timeout;
        }

        if let Some(host) = non_empty("SMTP_HOST") {
            self.smtp.host = Some(host);
        }
        if let Some(port) = non_empty("SMTP_PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            self.smtp.port = port;
        }
        if let Some(user) = non_empty("SMTP_USER") {
            self.smtp.user = Some(user);
        }
        if let Some(password) = non_empty("SMTP_PASSWORD") {
            self.smtp.password = Some(password);
        }
        if let Some(from) = non_empty("SMTP_FROM") {
            self.smtp.from = Some(from);
        }

        if let Some(host) = non_empty("MODULAR_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("MODULAR_PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            self.server.port = port;
        }

        if let Some(dir) = non_empty("MODULAR_DATA_DIR") {
            self.setup.data_dir = Some(dir);
        }
        if let Some(token) = non_empty("MODULAR_SETUP_TOKEN") {
            self.setup.token = Some(token);
        }
        if let Some(url) = non_empty("MODULAR_SERVER_URL") {
            self.client.server_url = url;
        }
        if let Some(level) = non_empty("MODULAR_LOG_LEVEL") {
            self.observability.log_level = level;
        }
    }
}
