//! In-memory backend used by unit and integration tests.

use crate::domain::session::SessionId;
use crate::error::{ToynetError, ToynetResult};
use crate::services::backend::ToynetBackend;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Records every call and answers updates from a scripted queue
/// (falling back to `true` once the queue is empty).
#[derive(Debug)]
pub struct RecordingBackend {
    next_session: AtomicU64,
    creates: AtomicU64,
    reads: AtomicU64,
    commands: Mutex<Vec<(SessionId, String)>>,
    replies: Mutex<VecDeque<ToynetResult<Value>>>,
    create_failures: Mutex<VecDeque<ToynetError>>,
    topology: Mutex<String>,
    latency: Option<Duration>,
    read_latency: Option<Duration>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            next_session: AtomicU64::new(1),
            creates: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            commands: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            create_failures: Mutex::new(VecDeque::new()),
            topology: Mutex::new(String::new()),
            latency: None,
            read_latency: None,
        }
    }

    /// Every update waits this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Topology reads capture the current topology, then wait this long.
    pub fn with_read_latency(mut self, latency: Duration) -> Self {
        self.read_latency = Some(latency);
        self
    }

    pub fn with_first_session(self, id: u64) -> Self {
        self.next_session.store(id, Ordering::SeqCst);
        self
    }

    pub fn push_reply(&self, reply: ToynetResult<Value>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn fail_next_create(&self, err: ToynetError) {
        self.create_failures.lock().unwrap().push_back(err);
    }

    pub fn set_topology(&self, topology: &str) {
        *self.topology.lock().unwrap() = topology.to_string();
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn commands_for(&self, id: SessionId) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == id)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn create_count(&self) -> u64 {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToynetBackend for RecordingBackend {
    async fn create_session(&self, _user_id: &str, _topology_id: u64) -> ToynetResult<SessionId> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(err) = self.create_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(SessionId(self.next_session.fetch_add(1, Ordering::SeqCst)))
    }

    async fn get_session(&self, _id: SessionId) -> ToynetResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let topology = self.topology.lock().unwrap().clone();
        if let Some(latency) = self.read_latency {
            tokio::time::sleep(latency).await;
        }
        Ok(topology)
    }

    async fn update_session(&self, id: SessionId, command: &str) -> ToynetResult<Value> {
        self.commands
            .lock()
            .unwrap()
            .push((id, command.to_string()));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Bool(true)))
    }
}
