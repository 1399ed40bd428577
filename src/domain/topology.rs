// 拓扑快照
use crate::domain::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 后端返回的拓扑序列化内容，客户端不解析，仅用于展示
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopologySnapshot {
    pub session_id: SessionId,
    pub raw: String,
    pub fetched_at: DateTime<Utc>,
}

impl TopologySnapshot {
    pub fn new(session_id: SessionId, raw: String) -> Self {
        Self {
            session_id,
            raw,
            fetched_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }
}
