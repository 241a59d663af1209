use std::sync::Arc;

use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method, RequestBuilder, Url,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{Comment, Credentials, Event, EventDraft, IdeaDraft, Profile, User};
use crate::session::SessionStore;

#[derive(Debug, Deserialize)]
struct DescriptionResponse {
    description: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    event: &'a Event,
    comments: &'a [Comment],
}

/// One method per remote endpoint. Everything except login and register is
/// sent with the persisted session's bearer token when there is one.
pub struct ApiClient {
    base_url: Url,
    session: Arc<SessionStore>,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        Ok(Self {
            base_url,
            session,
            client,
        })
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let url = self.url(&["auth", "login"])?;
        self.send(self.client.post(url).json(credentials)).await
    }

    pub async fn register(&self, profile: &Profile) -> Result<User, ApiError> {
        let url = self.url(&["auth", "register"])?;
        self.send(self.client.post(url).json(profile)).await
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        let url = self.url(&["events"])?;
        self.send(self.authed(Method::GET, url)).await
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, ApiError> {
        let url = self.url(&["events", id])?;
        self.send(self.authed(Method::GET, url)).await
    }

    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        let url = self.url(&["events"])?;
        self.send(self.authed(Method::POST, url).json(draft)).await
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        let url = self.url(&["events", id])?;
        self.execute(self.authed(Method::DELETE, url)).await?;
        Ok(())
    }

    pub async fn register_for_event(&self, id: &str) -> Result<Event, ApiError> {
        let url = self.url(&["events", id, "register"])?;
        self.send(self.authed(Method::POST, url)).await
    }

    pub async fn add_comment(&self, id: &str, text: &str) -> Result<Event, ApiError> {
        let url = self.url(&["events", id, "comments"])?;
        self.send(self.authed(Method::POST, url).json(&json!({ "text": text })))
            .await
    }

    pub async fn generate_ideas(&self, prompt: &str) -> Result<Vec<IdeaDraft>, ApiError> {
        let url = self.url(&["ai", "ideas"])?;
        self.send(self.authed(Method::POST, url).json(&json!({ "prompt": prompt })))
            .await
    }

    pub async fn generate_description(
        &self,
        title: &str,
        keywords: &str,
    ) -> Result<String, ApiError> {
        let url = self.url(&["ai", "description"])?;
        let body = json!({ "title": title, "keywords": keywords });
        let response: DescriptionResponse =
            self.send(self.authed(Method::POST, url).json(&body)).await?;
        Ok(response.description)
    }

    pub async fn generate_chat_reply(
        &self,
        event: &Event,
        comments: &[Comment],
    ) -> Result<Event, ApiError> {
        let url = self.url(&["ai", "chat"])?;
        let body = ChatRequest { event, comments };
        self.send(self.authed(Method::POST, url).json(&body)).await
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authed(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match self.session.credential() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let request = request.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "api request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(%method, %path, status = status.as_u16(), "api request rejected");
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        Ok(body)
    }
}
