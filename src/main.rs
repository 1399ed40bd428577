// ToyNet 控制台：从标准输入读取拓扑命令并发送到仿真后端
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use toynet_client::commands::console::{self, ConsoleCommand};
use toynet_client::commands::AppState;
use toynet_client::domain::mutation::MutationHandle;
use toynet_client::ToynetConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "toynet-console")]
#[command(about = "Interactive client for the ToyNet network emulator")]
#[command(version)]
struct Cli {
    /// JSON 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 覆盖后端地址
    #[arg(long)]
    api_url: Option<String>,

    /// 会话 ID 的 SQLite 存储路径
    #[arg(long)]
    store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!("toynet_client={}", default_level))
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut config = ToynetConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(store) = cli.store {
        config.store_path = Some(store);
    }
    config.validate()?;

    tracing::info!("Using ToyNet backend at {}", config.base_url());
    let state = AppState::from_config(&config).context("Failed to initialize client")?;
    let handle = MutationHandle::new();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout.write_all(b"toynet> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let output = match console::parse_line(&line) {
            Ok(None) => String::new(),
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => match console::execute(&state, command, &handle).await {
                Ok(text) => text,
                Err(e) => format!("error: {}", e),
            },
            Err(e) => format!("error: {}\n{}", e, console::HELP),
        };
        if !output.is_empty() {
            stdout.write_all(output.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        stdout.write_all(b"toynet> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
