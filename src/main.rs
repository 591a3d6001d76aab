mod cli;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use staffsync::cache::{CacheStorage, NoopStorage, SqliteStorage};
use staffsync::config::Config;
use staffsync::remote::RemoteClient;
use staffsync::RecordRepository;

#[derive(Parser, Debug)]
#[command(name = "staffsync")]
#[command(about = "School personnel records with offline support")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/staffsync/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Remote endpoint URL, overrides config and STAFFSYNC_REMOTE_URL
  #[arg(short, long)]
  endpoint: Option<String>,

  #[command(subcommand)]
  command: cli::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _guard = init_tracing();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let endpoint = config.endpoint(args.endpoint.as_deref())?;
  let client = RemoteClient::new(&endpoint, config.timeout())?;

  if !config.storage.enabled {
    return run(client, NoopStorage, &config, args.command).await;
  }
  match SqliteStorage::open(config.storage.path.as_deref()) {
    Ok(storage) => run(client, storage, &config, args.command).await,
    Err(e) => {
      warn!(error = %e, "Local store unavailable, running memory-only");
      run(client, NoopStorage, &config, args.command).await
    }
  }
}

async fn run<S: CacheStorage>(
  client: RemoteClient,
  storage: S,
  config: &Config,
  command: cli::Command,
) -> Result<()> {
  let repo = RecordRepository::new(client, storage, config.admin_identity());
  cli::execute(&repo, command).await
}

/// Log to a daily file under the data dir so stdout carries only command output.
/// Falls back to stderr when no data dir is available.
fn init_tracing() -> Option<WorkerGuard> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

  let appender = dirs::data_dir().and_then(|dir| {
    RollingFileAppender::builder()
      .rotation(Rotation::DAILY)
      .filename_prefix("staffsync")
      .filename_suffix("log")
      .build(dir.join("staffsync").join("logs"))
      .ok()
  });

  match appender {
    Some(appender) => {
      let (writer, guard) = tracing_appender::non_blocking(appender);
      tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
      Some(guard)
    }
    None => {
      tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
      None
    }
  }
}
