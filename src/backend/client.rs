use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{ChatReply, ChatRequest, ChatTurn, ClearChatRequest, ErrorBody, Leader};
use super::{ApiError, ChatBackend};

/// HTTP client for the leaders API. The bearer token is supplied by
/// the caller and forwarded as-is.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    api_url: String,
    auth_token: Option<String>,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(api_url: &str, auth_token: Option<&str>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.map(str::to_string),
            timeout,
        }
    }

    fn leader_url(&self, leader_id: &str, action: &str) -> String {
        format!(
            "{}/api/leaders/{}/{}",
            self.api_url,
            urlencoding::encode(leader_id),
            action
        )
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.timeout(self.timeout);
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let response = self.authorize(req).send().await?;
        let body = Self::check_status(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to decode response: {}\nBody: {}", e, body);
            ApiError::Malformed(e.to_string())
        })
    }

    /// Returns the body of a successful response or maps the failure
    /// into an `ApiError`.
    async fn check_status(response: Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .unwrap_or_else(|| body.clone());
        tracing::warn!("Request failed with status {}: {}", status, message);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ApiError::Unauthorized { status, message })
        } else {
            Err(ApiError::Status { status, message })
        }
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn list_leaders(&self) -> Result<Vec<Leader>, ApiError> {
        let url = format!("{}/api/leaders/", self.api_url);
        self.send(self.client.get(url)).await
    }

    async fn get_leader(&self, leader_id: &str) -> Result<Leader, ApiError> {
        let url = self.leader_url(leader_id, "");
        self.send(self.client.get(url)).await
    }

    async fn chat_history(
        &self,
        leader_id: &str,
        session_id: &str,
    ) -> Result<Vec<ChatTurn>, ApiError> {
        let url = self.leader_url(leader_id, "chat_history/");
        let req = self.client.get(url).query(&[("session_id", session_id)]);
        self.send(req).await
    }

    async fn send_chat(
        &self,
        leader_id: &str,
        session_id: &str,
        message: &str,
    ) -> Result<String, ApiError> {
        let url = self.leader_url(leader_id, "chat/");
        let req = self.client.post(url).json(&ChatRequest {
            message,
            session_id,
        });
        let reply: ChatReply = self.send(req).await?;
        Ok(reply.response)
    }

    async fn clear_chat(&self, leader_id: &str, session_id: &str) -> Result<(), ApiError> {
        let url = self.leader_url(leader_id, "clear_chat/");
        let req = self.client.post(url).json(&ClearChatRequest { session_id });
        let response = self.authorize(req).send().await?;
        // Any 2xx body is an acknowledgement
        Self::check_status(response).await?;
        Ok(())
    }
}
