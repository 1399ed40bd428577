// 控制台命令解析与执行
use crate::commands::device::{self, DeviceRequest};
use crate::commands::topology::{self, LinkRequest, TopologyView};
use crate::commands::AppState;
use crate::domain::device::DeviceForm;
use crate::domain::mutation::{MutationHandle, MutationOutcome};

pub const HELP: &str = "\
commands:
  add host <name> <ip> <gateway>
  add router <name> [interface ...]
  add switch <name>
  remove <host|switch|router> <name>
  link <to> <from>
  unlink <to> <from>      (same name twice removes the device)
  show
  refresh                 (re-read the topology from the backend)
  reset
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Add(DeviceForm),
    Remove { kind: String, name: String },
    Link { to: String, from: String },
    Unlink { to: String, from: String },
    Show,
    Refresh,
    Reset,
    Help,
    Quit,
}

/// 空行返回 Ok(None)。动词与设备类型不区分大小写，设备名保持原样
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = words.split_first() else {
        return Ok(None);
    };
    let unrecognized = || format!("Unrecognized command: {}", line.trim());

    let command = match (verb.to_lowercase().as_str(), args) {
        ("add", [kind, rest @ ..]) => match (kind.to_lowercase().as_str(), rest) {
            ("host", [name, ip, gateway]) => ConsoleCommand::Add(DeviceForm::Host {
                name: name.to_string(),
                ip: ip.to_string(),
                default_gateway: gateway.to_string(),
            }),
            ("router", [name, interfaces @ ..]) => ConsoleCommand::Add(DeviceForm::Router {
                name: name.to_string(),
                interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
            }),
            ("switch", [name]) => ConsoleCommand::Add(DeviceForm::Switch {
                name: name.to_string(),
            }),
            _ => return Err(unrecognized()),
        },
        ("remove", [kind, name]) => ConsoleCommand::Remove {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        ("link", [to, from]) => ConsoleCommand::Link {
            to: to.to_string(),
            from: from.to_string(),
        },
        ("unlink", [to, from]) => ConsoleCommand::Unlink {
            to: to.to_string(),
            from: from.to_string(),
        },
        ("show", []) => ConsoleCommand::Show,
        ("refresh", []) => ConsoleCommand::Refresh,
        ("reset", []) => ConsoleCommand::Reset,
        ("help", []) => ConsoleCommand::Help,
        ("quit", []) | ("exit", []) => ConsoleCommand::Quit,
        _ => return Err(unrecognized()),
    };
    Ok(Some(command))
}

fn describe(outcome: MutationOutcome) -> String {
    match outcome {
        MutationOutcome::Applied { command } => format!("ok: {}", command),
        MutationOutcome::Skipped {
            key,
            in_flight: true,
        } => format!("pending: {} is still waiting for the backend", key),
        MutationOutcome::Skipped { key, .. } => format!("skipped: {} already issued", key),
    }
}

fn render(view: TopologyView) -> String {
    let body = if view.is_empty {
        "(empty topology)"
    } else {
        view.topology.as_str()
    };
    format!(
        "session {} (fetched {})\n{}",
        view.session_id, view.fetched_at, body
    )
}

/// 执行一条命令，返回要打印的文本
pub async fn execute(
    state: &AppState,
    command: ConsoleCommand,
    handle: &MutationHandle,
) -> Result<String, String> {
    handle.reset();
    match command {
        ConsoleCommand::Add(form) => device::create_device(state, form, handle).await.map(describe),
        ConsoleCommand::Remove { kind, name } => device::delete_device(
            state,
            DeviceRequest {
                device_type: kind,
                name,
            },
            handle,
        )
        .await
        .map(describe),
        ConsoleCommand::Link { to, from } => {
            topology::create_link(state, LinkRequest { to, from }, handle)
                .await
                .map(describe)
        }
        ConsoleCommand::Unlink { to, from } => {
            topology::delete_link(state, LinkRequest { to, from }, handle)
                .await
                .map(describe)
        }
        ConsoleCommand::Show => Ok(render(topology::get_topology(state).await?)),
        ConsoleCommand::Refresh => Ok(render(topology::refresh_topology(state).await?)),
        ConsoleCommand::Reset => {
            topology::reset_session(state).await?;
            Ok("session cleared".to_string())
        }
        ConsoleCommand::Help => Ok(HELP.to_string()),
        ConsoleCommand::Quit => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session_store::MemoryStore;
    use crate::testing::RecordingBackend;
    use std::sync::Arc;

    #[test]
    fn parses_device_and_link_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(
            parse_line("add host h1 10.0.0.1 10.0.0.254").unwrap(),
            Some(ConsoleCommand::Add(DeviceForm::Host {
                name: "h1".to_string(),
                ip: "10.0.0.1".to_string(),
                default_gateway: "10.0.0.254".to_string(),
            }))
        );
        assert_eq!(
            parse_line("add router r1").unwrap(),
            Some(ConsoleCommand::Add(DeviceForm::Router {
                name: "r1".to_string(),
                interfaces: Vec::new(),
            }))
        );
        assert_eq!(
            parse_line("UNLINK h1 h2").unwrap(),
            Some(ConsoleCommand::Unlink {
                to: "h1".to_string(),
                from: "h2".to_string(),
            })
        );
        assert_eq!(parse_line("exit").unwrap(), Some(ConsoleCommand::Quit));
    }

    #[test]
    fn kind_words_are_case_insensitive() {
        assert_eq!(
            parse_line("add Host h1 10.0.0.1 10.0.0.254").unwrap(),
            Some(ConsoleCommand::Add(DeviceForm::Host {
                name: "h1".to_string(),
                ip: "10.0.0.1".to_string(),
                default_gateway: "10.0.0.254".to_string(),
            }))
        );
        assert_eq!(
            parse_line("ADD SWITCH S1").unwrap(),
            Some(ConsoleCommand::Add(DeviceForm::Switch {
                name: "S1".to_string(),
            }))
        );
        assert_eq!(parse_line("Refresh").unwrap(), Some(ConsoleCommand::Refresh));
    }

    #[tokio::test]
    async fn mixed_case_remove_reaches_backend() {
        let backend = Arc::new(RecordingBackend::new());
        let state = AppState::new(backend.clone(), Arc::new(MemoryStore::new()), "toynet-bot", 1);
        let handle = MutationHandle::new();

        let line = parse_line("remove Host h1").unwrap().unwrap();
        assert_eq!(execute(&state, line, &handle).await.unwrap(), "ok: remove host h1");
        assert_eq!(backend.commands(), vec!["remove host h1"]);
    }

    #[tokio::test]
    async fn show_and_refresh_render_topology() {
        let backend = Arc::new(RecordingBackend::new().with_first_session(6));
        let state = AppState::new(backend.clone(), Arc::new(MemoryStore::new()), "toynet-bot", 1);
        let handle = MutationHandle::new();

        let shown = execute(&state, ConsoleCommand::Show, &handle).await.unwrap();
        assert!(shown.starts_with("session 6"));
        assert!(shown.ends_with("(empty topology)"));

        backend.set_topology("<topology/>");
        // show 命中缓存，refresh 强制重新读取
        let cached = execute(&state, ConsoleCommand::Show, &handle).await.unwrap();
        assert!(cached.ends_with("(empty topology)"));
        let refreshed = execute(&state, ConsoleCommand::Refresh, &handle).await.unwrap();
        assert!(refreshed.ends_with("<topology/>"));
        assert_eq!(backend.read_count(), 2);
    }

    #[test]
    fn rejects_incomplete_lines() {
        assert!(parse_line("add host h1").is_err());
        assert!(parse_line("link h1").is_err());
        assert!(parse_line("ping h1 h2").is_err());
        assert!(parse_line("add firewall f1").is_err());
        assert!(parse_line("add").is_err());
    }

    #[tokio::test]
    async fn duplicate_line_reports_skip() {
        let backend = Arc::new(RecordingBackend::new());
        let state = AppState::new(backend.clone(), Arc::new(MemoryStore::new()), "toynet-bot", 1);
        let handle = MutationHandle::new();

        let line = parse_line("link h1 s1").unwrap().unwrap();
        let first = execute(&state, line.clone(), &handle).await.unwrap();
        let second = execute(&state, line, &handle).await.unwrap();
        assert_eq!(first, "ok: add link h1 s1");
        assert_eq!(second, "skipped: h1-s1 already issued");
        assert_eq!(backend.commands().len(), 1);
    }
}
