// 基于 HTTP 的仿真后端客户端
use crate::config::ToynetConfig;
use crate::domain::session::SessionId;
use crate::error::{ToynetError, ToynetResult};
use crate::services::backend::{
    CreateSessionRequest, CreateSessionResponse, SessionResponse, ToynetBackend,
    UpdateSessionRequest,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ToynetConfig) -> ToynetResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ToynetError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    fn session_url(&self) -> String {
        format!("{}/api/toynet/session", self.base_url)
    }

    fn session_item_url(&self, id: SessionId) -> String {
        format!("{}/api/toynet/session/{}", self.base_url, id)
    }

    /// 非 2xx 一律视为传输失败，带上响应正文便于排查
    async fn check_status(response: Response) -> ToynetResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ToynetError::Http(format!("HTTP {}: {}", status, body)))
    }
}

#[async_trait]
impl ToynetBackend for HttpBackend {
    async fn create_session(&self, user_id: &str, topology_id: u64) -> ToynetResult<SessionId> {
        let request = CreateSessionRequest {
            user_id: user_id.to_string(),
            toynet_topo_id: topology_id,
        };
        debug!("POST {} topology_id={}", self.session_url(), topology_id);

        let response = self
            .client
            .post(self.session_url())
            .json(&request)
            .send()
            .await?;
        let created: CreateSessionResponse = Self::check_status(response).await?.json().await?;
        Ok(created.session_id)
    }

    async fn get_session(&self, id: SessionId) -> ToynetResult<String> {
        let url = self.session_item_url(id);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let session: SessionResponse = Self::check_status(response).await?.json().await?;
        Ok(session.topology)
    }

    async fn update_session(
        &self,
        id: SessionId,
        command: &str,
    ) -> ToynetResult<serde_json::Value> {
        let url = self.session_item_url(id);
        let request = UpdateSessionRequest {
            id,
            command: command.to_string(),
        };
        debug!("PUT {} command={:?}", url, command);

        let response = self.client.put(&url).json(&request).send().await?;
        let response = Self::check_status(response).await?;
        // 空正文按空值处理，交给调用方判定为拒绝
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)
            .unwrap_or(serde_json::Value::String(body)))
    }
}
