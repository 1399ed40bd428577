//! ToyNet 网络仿真教学工具客户端。
//!
//! 负责会话引导（本地保存会话 ID，缺失时向后端创建）与拓扑命令路由
//! （设备/链路意图转为文本命令，按会话去重，成功后使拓扑缓存失效）。

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::ToynetConfig;
pub use error::{ToynetError, ToynetResult};
