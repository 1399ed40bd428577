// 设备类型与创建表单
use crate::error::{ToynetError, ToynetResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Host,    // 主机
    Switch,  // 交换机
    Router,  // 路由器
    Unknown, // 无法从名称推断的类型，命令中输出为空串
}

impl DeviceKind {
    /// 按设备名首字母推断类型：h → 主机，s → 交换机，r → 路由器，其余为 Unknown
    pub fn infer_from_name(name: &str) -> Self {
        match name.chars().next() {
            Some('h') => DeviceKind::Host,
            Some('s') => DeviceKind::Switch,
            Some('r') => DeviceKind::Router,
            _ => DeviceKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Host => "host",
            DeviceKind::Switch => "switch",
            DeviceKind::Router => "router",
            DeviceKind::Unknown => "",
        }
    }

    pub fn parse(s: &str) -> ToynetResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "host" | "h" => Ok(DeviceKind::Host),
            "switch" | "s" => Ok(DeviceKind::Switch),
            "router" | "r" => Ok(DeviceKind::Router),
            other => Err(ToynetError::InvalidIntent(format!(
                "Unknown device kind: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 各类设备的创建表单，只校验字段非空，地址格式由后端负责
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeviceForm {
    Host {
        name: String,
        ip: String,
        default_gateway: String,
    },
    Router {
        name: String,
        #[serde(default)]
        interfaces: Vec<String>,
    },
    Switch {
        name: String,
    },
}

impl DeviceForm {
    pub fn kind(&self) -> DeviceKind {
        match self {
            DeviceForm::Host { .. } => DeviceKind::Host,
            DeviceForm::Router { .. } => DeviceKind::Router,
            DeviceForm::Switch { .. } => DeviceKind::Switch,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DeviceForm::Host { name, .. }
            | DeviceForm::Router { name, .. }
            | DeviceForm::Switch { name } => name,
        }
    }

    pub fn validate(&self) -> ToynetResult<()> {
        require_filled("name", self.name())?;
        match self {
            DeviceForm::Host {
                ip,
                default_gateway,
                ..
            } => {
                require_filled("ip", ip)?;
                require_filled("default_gateway", default_gateway)?;
            }
            DeviceForm::Router { interfaces, .. } => {
                for iface in interfaces {
                    require_filled("interfaces", iface)?;
                }
            }
            DeviceForm::Switch { .. } => {}
        }
        Ok(())
    }
}

fn require_filled(field: &str, value: &str) -> ToynetResult<()> {
    if value.trim().is_empty() {
        return Err(ToynetError::InvalidForm {
            field: field.to_string(),
        });
    }
    Ok(())
}
