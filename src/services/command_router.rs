// 拓扑命令路由：意图 → 文本命令，按会话去重，成功后使拓扑缓存失效
use crate::domain::device::DeviceKind;
use crate::domain::intent::Intent;
use crate::domain::mutation::{MutationHandle, MutationOutcome};
use crate::domain::session::{IntentLedger, IntentState, Session};
use crate::error::{ToynetError, ToynetResult};
use crate::services::backend::{is_truthy, ToynetBackend};
use crate::services::topology_cache::TopologyCache;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct TopologyRouter {
    backend: Arc<dyn ToynetBackend>,
    cache: Arc<TopologyCache>,
}

/// 占位在成功前被丢弃（出错或 future 被取消）时自动撤销
struct Reservation<'a> {
    ledger: &'a IntentLedger,
    key: &'a str,
    committed: bool,
}

impl Reservation<'_> {
    fn commit(mut self) {
        self.ledger.complete(self.key);
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.ledger.release(self.key);
        }
    }
}

impl TopologyRouter {
    pub fn new(backend: Arc<dyn ToynetBackend>, cache: Arc<TopologyCache>) -> Self {
        Self { backend, cache }
    }

    pub fn cache(&self) -> &Arc<TopologyCache> {
        &self.cache
    }

    pub async fn create_device(
        &self,
        session: &Session,
        kind: DeviceKind,
        name: &str,
    ) -> ToynetResult<MutationOutcome> {
        self.dispatch(
            session,
            Intent::AddDevice {
                kind,
                name: name.to_string(),
            },
        )
        .await
    }

    pub async fn delete_device(
        &self,
        session: &Session,
        kind: DeviceKind,
        name: &str,
    ) -> ToynetResult<MutationOutcome> {
        self.dispatch(
            session,
            Intent::RemoveDevice {
                kind,
                name: name.to_string(),
            },
        )
        .await
    }

    pub async fn create_link(
        &self,
        session: &Session,
        to: &str,
        from: &str,
    ) -> ToynetResult<MutationOutcome> {
        self.dispatch(
            session,
            Intent::AddLink {
                to: to.to_string(),
                from: from.to_string(),
            },
        )
        .await
    }

    /// 两端同名时等同于删除该设备
    pub async fn delete_link(
        &self,
        session: &Session,
        to: &str,
        from: &str,
    ) -> ToynetResult<MutationOutcome> {
        self.dispatch(session, Intent::remove_link(to, from)).await
    }

    pub async fn dispatch(&self, session: &Session, intent: Intent) -> ToynetResult<MutationOutcome> {
        intent.validate()?;
        let key = intent.key();

        if let Err(existing) = session.ledger().try_reserve(&key) {
            let in_flight = existing == IntentState::InFlight;
            debug!(
                "Session {}: intent {} already issued (in flight: {}), skipping",
                session.id(),
                key,
                in_flight
            );
            return Ok(MutationOutcome::Skipped { key, in_flight });
        }
        let reservation = Reservation {
            ledger: session.ledger(),
            key: &key,
            committed: false,
        };

        let command = intent.command();
        debug!("Session {}: sending {:?}", session.id(), command);
        let response = self.backend.update_session(session.id(), &command).await?;

        if !is_truthy(&response) {
            warn!(
                "Session {}: backend rejected {:?} (response {})",
                session.id(),
                command,
                response
            );
            return Err(ToynetError::Rejected {
                operation: intent.operation().to_string(),
                target: intent.target(),
            });
        }

        reservation.commit();
        self.cache.invalidate(session.id());
        info!("Session {}: applied {:?}", session.id(), command);
        Ok(MutationOutcome::Applied { command })
    }

    /// 同 dispatch，并把调用过程写入 handle。
    /// 相同意图仍在等待后端时 handle 保持 Pending，结果以先发出的请求为准
    pub async fn dispatch_tracked(
        &self,
        session: &Session,
        intent: Intent,
        handle: &MutationHandle,
    ) -> ToynetResult<MutationOutcome> {
        handle.begin();
        let result = self.dispatch(session, intent).await;
        match &result {
            Ok(outcome) if outcome.is_in_flight() => {}
            Ok(_) => handle.succeed(),
            Err(e) => handle.fail(e.to_string()),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mutation::MutationState;
    use crate::domain::session::{IntentState, SessionId};
    use crate::testing::RecordingBackend;
    use serde_json::json;

    fn setup() -> (Arc<RecordingBackend>, TopologyRouter, Session) {
        let backend = Arc::new(RecordingBackend::new());
        let router = TopologyRouter::new(backend.clone(), Arc::new(TopologyCache::new()));
        (backend, router, Session::new(SessionId(1)))
    }

    #[tokio::test]
    async fn repeated_create_is_sent_once() {
        let (backend, router, session) = setup();

        let first = router
            .create_device(&session, DeviceKind::Host, "h1")
            .await
            .unwrap();
        let second = router
            .create_device(&session, DeviceKind::Host, "h1")
            .await
            .unwrap();

        assert_eq!(
            first,
            MutationOutcome::Applied {
                command: "add host h1".to_string()
            }
        );
        assert_eq!(
            second,
            MutationOutcome::Skipped {
                key: "add-h1".to_string(),
                in_flight: false,
            }
        );
        assert_eq!(backend.commands(), vec!["add host h1"]);
    }

    #[tokio::test]
    async fn create_then_delete_both_go_through() {
        let (backend, router, session) = setup();
        router
            .create_device(&session, DeviceKind::Host, "h1")
            .await
            .unwrap();
        router
            .delete_device(&session, DeviceKind::Host, "h1")
            .await
            .unwrap();
        assert_eq!(backend.commands(), vec!["add host h1", "remove host h1"]);
    }

    #[tokio::test]
    async fn falsy_reply_is_an_error_and_leaves_key_retryable() {
        let (backend, router, session) = setup();
        backend.push_reply(Ok(json!(null)));

        let err = router
            .create_device(&session, DeviceKind::Router, "r1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("r1"));
        assert!(!session.ledger().contains("add-r1"));
        assert_eq!(router.cache().invalidation_count(session.id()), 0);

        let retry = router
            .create_device(&session, DeviceKind::Router, "r1")
            .await
            .unwrap();
        assert!(retry.is_applied());
        assert_eq!(backend.commands().len(), 2);
    }

    #[tokio::test]
    async fn transport_error_propagates_unchanged() {
        let (backend, router, session) = setup();
        backend.push_reply(Err(ToynetError::Http("connection reset".to_string())));

        let err = router.create_link(&session, "h1", "s1").await.unwrap_err();
        assert_eq!(err, ToynetError::Http("connection reset".to_string()));
        assert_eq!(session.ledger().state("h1-s1"), None);
    }

    #[tokio::test]
    async fn blank_names_never_reach_backend() {
        let (backend, router, session) = setup();
        let err = router
            .create_device(&session, DeviceKind::Switch, "")
            .await
            .unwrap_err();
        assert!(matches!(err, ToynetError::InvalidIntent(_)));
        assert!(backend.commands().is_empty());
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn tracked_dispatch_reports_states() {
        let (backend, router, session) = setup();
        let handle = MutationHandle::new();
        backend.push_reply(Ok(json!(false)));

        let intent = Intent::AddLink {
            to: "h1".to_string(),
            from: "h2".to_string(),
        };
        assert!(router
            .dispatch_tracked(&session, intent.clone(), &handle)
            .await
            .is_err());
        assert!(matches!(handle.state(), MutationState::Error(msg) if msg.contains("h1 <-> h2")));

        router
            .dispatch_tracked(&session, intent, &handle)
            .await
            .unwrap();
        assert_eq!(handle.state(), MutationState::Success);
        assert_eq!(session.ledger().state("h1-h2"), Some(IntentState::Done));
    }

    #[tokio::test]
    async fn duplicate_of_pending_request_stays_pending() {
        let backend = Arc::new(
            RecordingBackend::new().with_latency(std::time::Duration::from_millis(50)),
        );
        backend.push_reply(Ok(json!(null)));
        let router = TopologyRouter::new(backend.clone(), Arc::new(TopologyCache::new()));
        let session = Session::new(SessionId(2));
        let intent = Intent::AddDevice {
            kind: DeviceKind::Host,
            name: "h5".to_string(),
        };
        let first_handle = MutationHandle::new();
        let second_handle = MutationHandle::new();

        let (first, second) = tokio::join!(
            router.dispatch_tracked(&session, intent.clone(), &first_handle),
            router.dispatch_tracked(&session, intent, &second_handle),
        );

        assert!(matches!(first, Err(ToynetError::Rejected { .. })));
        assert_eq!(
            second.unwrap(),
            MutationOutcome::Skipped {
                key: "add-h5".to_string(),
                in_flight: true,
            }
        );
        assert!(matches!(first_handle.state(), MutationState::Error(_)));
        // 未被告知成功
        assert_eq!(second_handle.state(), MutationState::Pending);
        assert!(!session.ledger().contains("add-h5"));
        assert_eq!(backend.commands(), vec!["add host h5"]);
    }

    #[tokio::test]
    async fn cancelled_request_releases_reservation() {
        let backend = Arc::new(
            RecordingBackend::new().with_latency(std::time::Duration::from_millis(200)),
        );
        let router = TopologyRouter::new(backend.clone(), Arc::new(TopologyCache::new()));
        let session = Session::new(SessionId(8));

        let pending = router.create_device(&session, DeviceKind::Host, "h9");
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
        assert!(timed_out.is_err());
        assert!(!session.ledger().contains("add-h9"));
    }
}
