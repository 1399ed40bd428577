// 仿真后端接口与报文
use crate::domain::session::SessionId;
use crate::error::ToynetResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateSessionRequest {
    pub user_id: String,
    pub toynet_topo_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    #[serde(default)]
    pub topology: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateSessionRequest {
    pub id: SessionId,
    pub command: String,
}

/// 远端仿真服务。实现只负责传输，去重与缓存由调用方处理
#[async_trait]
pub trait ToynetBackend: Send + Sync {
    async fn create_session(&self, user_id: &str, topology_id: u64) -> ToynetResult<SessionId>;

    /// 返回序列化的拓扑内容
    async fn get_session(&self, id: SessionId) -> ToynetResult<String>;

    /// 返回后端原样响应，由调用方判断真假
    async fn update_session(&self, id: SessionId, command: &str)
        -> ToynetResult<serde_json::Value>;
}

/// 按 JSON 真值判断后端是否接受了命令
pub fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
