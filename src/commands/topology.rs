// 拓扑相关命令：链路增删、快照读取、会话重置
use crate::commands::AppState;
use crate::domain::intent::Intent;
use crate::domain::mutation::{MutationHandle, MutationOutcome};
use crate::domain::topology::TopologySnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkRequest {
    pub to: String,
    pub from: String,
}

/// 展示给界面的拓扑信息
#[derive(Debug, Serialize, Deserialize)]
pub struct TopologyView {
    pub session_id: u64,
    pub topology: String,
    pub is_empty: bool,
    pub fetched_at: String,
}

impl From<TopologySnapshot> for TopologyView {
    fn from(snapshot: TopologySnapshot) -> Self {
        Self {
            session_id: snapshot.session_id.0,
            is_empty: snapshot.is_empty(),
            fetched_at: snapshot.fetched_at.to_rfc3339(),
            topology: snapshot.raw,
        }
    }
}

pub async fn create_link(
    state: &AppState,
    request: LinkRequest,
    handle: &MutationHandle,
) -> Result<MutationOutcome, String> {
    let session = state
        .bootstrap
        .ensure_session()
        .await
        .map_err(|e| e.to_string())?;
    let intent = Intent::AddLink {
        to: request.to,
        from: request.from,
    };
    state
        .router
        .dispatch_tracked(&session, intent, handle)
        .await
        .map_err(|e| e.to_string())
}

pub async fn delete_link(
    state: &AppState,
    request: LinkRequest,
    handle: &MutationHandle,
) -> Result<MutationOutcome, String> {
    let session = state
        .bootstrap
        .ensure_session()
        .await
        .map_err(|e| e.to_string())?;
    state
        .router
        .dispatch_tracked(&session, Intent::remove_link(&request.to, &request.from), handle)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_topology(state: &AppState) -> Result<TopologyView, String> {
    state
        .bootstrap
        .topology()
        .await
        .map(TopologyView::from)
        .map_err(|e| e.to_string())
}

/// 跳过缓存，直接向后端读取
pub async fn refresh_topology(state: &AppState) -> Result<TopologyView, String> {
    state
        .bootstrap
        .refresh_topology()
        .await
        .map(TopologyView::from)
        .map_err(|e| e.to_string())
}

pub async fn reset_session(state: &AppState) -> Result<(), String> {
    state.bootstrap.reset().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session_store::MemoryStore;
    use crate::testing::RecordingBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn link_mutation_refreshes_topology_view() {
        let backend = Arc::new(RecordingBackend::new().with_first_session(5));
        let state = AppState::new(backend.clone(), Arc::new(MemoryStore::new()), "toynet-bot", 1);
        backend.set_topology("before");

        let view = get_topology(&state).await.unwrap();
        assert_eq!(view.session_id, 5);
        assert_eq!(view.topology, "before");

        backend.set_topology("after");
        let handle = MutationHandle::new();
        create_link(
            &state,
            LinkRequest {
                to: "h1".to_string(),
                from: "s1".to_string(),
            },
            &handle,
        )
        .await
        .unwrap();

        let view = get_topology(&state).await.unwrap();
        assert_eq!(view.topology, "after");
        assert_eq!(backend.read_count(), 2);
    }

    #[tokio::test]
    async fn self_link_delete_removes_device() {
        let backend = Arc::new(RecordingBackend::new());
        let state = AppState::new(backend.clone(), Arc::new(MemoryStore::new()), "toynet-bot", 1);
        delete_link(
            &state,
            LinkRequest {
                to: "h3".to_string(),
                from: "h3".to_string(),
            },
            &MutationHandle::new(),
        )
        .await
        .unwrap();
        assert_eq!(backend.commands(), vec!["remove host h3"]);
    }
}
