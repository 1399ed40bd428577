// 业务服务模块

pub mod backend;
pub mod bootstrap;
pub mod command_router;
pub mod database;
pub mod http_backend;
pub mod session_store;
pub mod topology_cache;
