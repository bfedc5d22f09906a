use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::{ApiFuture, DEFAULT_TIMEOUT_SECS, build_http_client, endpoint, expect_success, parse_base_url};
use crate::admin::{
    ContentApi, ContentKind, ContentRecord, ContentStatus, FormMode, PluginRecord, PluginsApi, Role, RoleForm, Settings, SettingsApi, SettingsSection,
    UserForm, UserRecord, UserStatus, UsersApi,
};
use crate::error::ClientError;

/// Client for the admin API of an installed site.
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl AdminClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: parse_base_url(base_url)?,
            token: None,
        })
    }

    /// Session token sent as `Authorization: Bearer`.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder, ClientError> {
        let url = endpoint(&self.base_url, path)?;
        let request = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        expect_success(request.send().await?).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        Ok(self.send(request).await?.json::<T>().await?)
    }

    async fn plugin_action(&self, slug: &str, action: &str) -> Result<(), ClientError> {
        tracing::debug!(plugin = slug, action, "plugin action");
        let request = self.request(Method::POST, &["api", "plugins", slug, action])?;
        self.send(request).await.map(drop)
    }
}

impl PluginsApi for AdminClient {
    fn list_plugins(&self) -> ApiFuture<'_, Vec<PluginRecord>> {
        Box::pin(async move { self.fetch(self.request(Method::GET, &["api", "plugins"])?).await })
    }

    fn install_plugin<'a>(&'a self, slug: &'a str) -> ApiFuture<'a, PluginRecord> {
        Box::pin(async move {
            let request = self
                .request(Method::POST, &["api", "plugins", "install"])?
                .json(&serde_json::json!({ "slug": slug }));
            self.fetch(request).await
        })
    }

    fn activate_plugin<'a>(&'a self, slug: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(self.plugin_action(slug, "activate"))
    }

    fn deactivate_plugin<'a>(&'a self, slug: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(self.plugin_action(slug, "deactivate"))
    }

    fn uninstall_plugin<'a>(&'a self, slug: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(self.plugin_action(slug, "uninstall"))
    }
}

impl UsersApi for AdminClient {
    fn list_users(&self) -> ApiFuture<'_, Vec<UserRecord>> {
        Box::pin(async move { self.fetch(self.request(Method::GET, &["api", "users"])?).await })
    }

    fn create_user<'a>(&'a self, form: &'a UserForm) -> ApiFuture<'a, UserRecord> {
        Box::pin(async move {
            let errors = form.validate(FormMode::Create);
            if !errors.is_empty() {
                return Err(ClientError::Invalid(errors));
            }
            let request = self.request(Method::POST, &["api", "users"])?.json(form);
            self.fetch(request).await
        })
    }

    fn set_user_status<'a>(&'a self, id: &'a str, status: UserStatus) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .request(Method::PATCH, &["api", "users", id])?
                .json(&serde_json::json!({ "status": status }));
            self.send(request).await.map(drop)
        })
    }

    fn delete_user<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let request = self.request(Method::DELETE, &["api", "users", id])?;
            self.send(request).await.map(drop)
        })
    }

    fn set_user_roles<'a>(&'a self, id: &'a str, roles: &'a [String]) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .request(Method::PUT, &["api", "users", id, "roles"])?
                .json(&serde_json::json!({ "roles": roles }));
            self.send(request).await.map(drop)
        })
    }

    fn create_role<'a>(&'a self, form: &'a RoleForm) -> ApiFuture<'a, Role> {
        Box::pin(async move {
            let errors = form.validate();
            if !errors.is_empty() {
                return Err(ClientError::Invalid(errors));
            }
            let request = self
                .request(Method::POST, &["api", "users", "roles"])?
                .json(form);
            self.fetch(request).await
        })
    }
}

impl SettingsApi for AdminClient {
    fn get_settings(&self, section: SettingsSection) -> ApiFuture<'_, Settings> {
        Box::pin(async move {
            let name = section.to_string();
            let value: serde_json::Value = self
                .fetch(self.request(Method::GET, &["api", "settings", name.as_str()])?)
                .await?;
            decode_settings(section, value)
        })
    }

    fn update_settings<'a>(&'a self, settings: &'a Settings) -> ApiFuture<'a, Settings> {
        Box::pin(async move {
            let errors = settings.validate();
            if !errors.is_empty() {
                return Err(ClientError::Invalid(errors));
            }
            let section = settings.section();
            let name = section.to_string();
            let request = self
                .request(Method::PUT, &["api", "settings", name.as_str()])?
                .json(&settings.to_value());
            let value: serde_json::Value = self.fetch(request).await?;
            decode_settings(section, value)
        })
    }
}

impl ContentApi for AdminClient {
    fn list_content(&self, kind: ContentKind) -> ApiFuture<'_, Vec<ContentRecord>> {
        Box::pin(async move {
            let collection = kind.to_string();
            let request = self.request(Method::GET, &["api", "content", collection.as_str()])?;
            self.fetch(request).await
        })
    }

    fn set_content_status<'a>(
        &'a self,
        kind: ContentKind,
        id: &'a str,
        status: ContentStatus,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let collection = kind.to_string();
            let request = self
                .request(Method::PATCH, &["api", "content", collection.as_str(), id])?
                .json(&serde_json::json!({ "status": status }));
            self.send(request).await.map(drop)
        })
    }

    fn delete_content<'a>(&'a self, kind: ContentKind, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let collection = kind.to_string();
            let request =
                self.request(Method::DELETE, &["api", "content", collection.as_str(), id])?;
            self.send(request).await.map(drop)
        })
    }
}

fn decode_settings(
    section: SettingsSection,
    value: serde_json::Value,
) -> Result<Settings, ClientError> {
    Settings::decode(section, value).map_err(|e| ClientError::Status {
        status: 200,
        message: format!("unexpected {section} settings payload: {e}"),
    })
}
