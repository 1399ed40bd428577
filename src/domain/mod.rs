// 领域模型

pub mod device;
pub mod intent;
pub mod mutation;
pub mod session;
pub mod topology;
