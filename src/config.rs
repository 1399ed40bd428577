// 客户端配置：默认值 < JSON 配置文件 < 环境变量
use crate::error::{ToynetError, ToynetResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "TOYNET_API_URL";
pub const ENV_BOT_ID: &str = "TOYNET_BOT_ID";
pub const ENV_TOPOLOGY_ID: &str = "TOYNET_TOPOLOGY_ID";
pub const ENV_STORE_PATH: &str = "TOYNET_STORE_PATH";
pub const ENV_TIMEOUT_SECS: &str = "TOYNET_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToynetConfig {
    /// 仿真后端地址，不带末尾斜杠
    pub api_url: String,
    /// 创建会话时使用的固定机器人身份
    pub bot_user_id: String,
    /// 会话使用的拓扑模板
    pub topology_id: u64,
    /// 会话 ID 的 SQLite 存储路径，None 时仅保存在内存
    pub store_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for ToynetConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            bot_user_id: "toynet-bot".to_string(),
            topology_id: 1,
            store_path: None,
            timeout_secs: 30,
        }
    }
}

impl ToynetConfig {
    /// 读取配置文件（可选）并叠加进程环境变量
    pub fn load(path: Option<&Path>) -> ToynetResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> ToynetResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ToynetError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ToynetError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// 用 lookup 提供的值覆盖配置项，便于测试时不改动真实环境
    pub fn with_env<F>(mut self, lookup: F) -> ToynetResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(bot) = lookup(ENV_BOT_ID) {
            self.bot_user_id = bot;
        }
        if let Some(topo) = lookup(ENV_TOPOLOGY_ID) {
            self.topology_id = topo.trim().parse().map_err(|_| {
                ToynetError::Config(format!("{} must be an integer, got {}", ENV_TOPOLOGY_ID, topo))
            })?;
        }
        if let Some(path) = lookup(ENV_STORE_PATH) {
            self.store_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs.trim().parse().map_err(|_| {
                ToynetError::Config(format!("{} must be an integer, got {}", ENV_TIMEOUT_SECS, secs))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ToynetResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(ToynetError::Config("api_url must not be empty".to_string()));
        }
        if self.bot_user_id.trim().is_empty() {
            return Err(ToynetError::Config("bot_user_id must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ToynetError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
