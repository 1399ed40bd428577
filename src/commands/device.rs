// 设备管理命令
use crate::commands::AppState;
use crate::domain::device::{DeviceForm, DeviceKind};
use crate::domain::intent::Intent;
use crate::domain::mutation::{MutationHandle, MutationOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceRequest {
    pub device_type: String, // "host" | "switch" | "router"
    pub name: String,
}

/// 按表单创建设备：先做非空校验，再交给路由发送 "add <kind> <name>"
pub async fn create_device(
    state: &AppState,
    form: DeviceForm,
    handle: &MutationHandle,
) -> Result<MutationOutcome, String> {
    form.validate().map_err(|e| e.to_string())?;
    let session = state
        .bootstrap
        .ensure_session()
        .await
        .map_err(|e| e.to_string())?;

    let intent = Intent::AddDevice {
        kind: form.kind(),
        name: form.name().to_string(),
    };
    state
        .router
        .dispatch_tracked(&session, intent, handle)
        .await
        .map_err(|e| e.to_string())
}

pub async fn delete_device(
    state: &AppState,
    request: DeviceRequest,
    handle: &MutationHandle,
) -> Result<MutationOutcome, String> {
    let kind = DeviceKind::parse(&request.device_type).map_err(|e| e.to_string())?;
    let session = state
        .bootstrap
        .ensure_session()
        .await
        .map_err(|e| e.to_string())?;

    let intent = Intent::RemoveDevice {
        kind,
        name: request.name,
    };
    state
        .router
        .dispatch_tracked(&session, intent, handle)
        .await
        .map_err(|e| e.to_string())
}
