// 拓扑变更意图：去重键与命令文本
use crate::domain::device::DeviceKind;
use crate::error::{ToynetError, ToynetResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Intent {
    AddDevice { kind: DeviceKind, name: String },
    RemoveDevice { kind: DeviceKind, name: String },
    AddLink { to: String, from: String },
    RemoveLink { to: String, from: String },
}

impl Intent {
    /// 删除链路时两端同名，视为删除该设备本身，类型按名称首字母推断
    pub fn remove_link(to: &str, from: &str) -> Self {
        if to == from {
            Intent::RemoveDevice {
                kind: DeviceKind::infer_from_name(to),
                name: to.to_string(),
            }
        } else {
            Intent::RemoveLink {
                to: to.to_string(),
                from: from.to_string(),
            }
        }
    }

    pub fn validate(&self) -> ToynetResult<()> {
        match self {
            Intent::AddDevice { name, .. } | Intent::RemoveDevice { name, .. } => {
                if name.trim().is_empty() {
                    return Err(ToynetError::InvalidIntent(
                        "Device name must not be empty".to_string(),
                    ));
                }
            }
            Intent::AddLink { to, from } | Intent::RemoveLink { to, from } => {
                if to.trim().is_empty() || from.trim().is_empty() {
                    return Err(ToynetError::InvalidIntent(
                        "Link endpoints must not be empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn key(&self) -> String {
        match self {
            Intent::AddDevice { name, .. } => format!("add-{}", name),
            Intent::RemoveDevice { name, .. } => format!("delete-{}", name),
            Intent::AddLink { to, from } => format!("{}-{}", to, from),
            // 带前缀，避免与反向建链的键冲突
            Intent::RemoveLink { to, from } => format!("delete-{}-{}", from, to),
        }
    }

    pub fn command(&self) -> String {
        match self {
            Intent::AddDevice { kind, name } => format!("add {} {}", kind, name),
            Intent::RemoveDevice { kind, name } => format!("remove {} {}", kind, name),
            Intent::AddLink { to, from } => format!("add link {} {}", to, from),
            Intent::RemoveLink { to, from } => format!("remove link {} {}", from, to),
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Intent::AddDevice { .. } => "create device",
            Intent::RemoveDevice { .. } => "delete device",
            Intent::AddLink { .. } => "create link",
            Intent::RemoveLink { .. } => "delete link",
        }
    }

    /// 错误信息中展示的目标：设备名或 "a <-> b"
    pub fn target(&self) -> String {
        match self {
            Intent::AddDevice { name, .. } | Intent::RemoveDevice { name, .. } => name.clone(),
            Intent::AddLink { to, from } | Intent::RemoveLink { to, from } => {
                format!("{} <-> {}", to, from)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_commands_and_keys() {
        let add = Intent::AddDevice {
            kind: DeviceKind::Host,
            name: "h1".to_string(),
        };
        let remove = Intent::RemoveDevice {
            kind: DeviceKind::Host,
            name: "h1".to_string(),
        };
        assert_eq!(add.command(), "add host h1");
        assert_eq!(remove.command(), "remove host h1");
        assert_eq!(add.key(), "add-h1");
        assert_eq!(remove.key(), "delete-h1");
    }

    #[test]
    fn link_commands_swap_endpoints_on_remove() {
        let add = Intent::AddLink {
            to: "h1".to_string(),
            from: "h2".to_string(),
        };
        assert_eq!(add.command(), "add link h1 h2");
        assert_eq!(add.key(), "h1-h2");

        let remove = Intent::remove_link("h1", "h2");
        assert_eq!(remove.command(), "remove link h2 h1");
        assert_ne!(remove.key(), add.key());
        assert_ne!(
            remove.key(),
            Intent::AddLink {
                to: "h2".to_string(),
                from: "h1".to_string()
            }
            .key()
        );
    }

    #[test]
    fn self_link_removal_becomes_device_removal() {
        assert_eq!(Intent::remove_link("s3", "s3").command(), "remove switch s3");
        assert_eq!(Intent::remove_link("r1", "r1").key(), "delete-r1");
        // 无法推断的类型以空串输出
        assert_eq!(Intent::remove_link("x1", "x1").command(), "remove  x1");
    }

    #[test]
    fn rejects_blank_operands() {
        assert!(Intent::AddLink {
            to: "h1".to_string(),
            from: " ".to_string()
        }
        .validate()
        .is_err());
        assert!(Intent::AddDevice {
            kind: DeviceKind::Router,
            name: String::new()
        }
        .validate()
        .is_err());
    }
}
