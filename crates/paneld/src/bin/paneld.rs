use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use paneld::common::setup::setup_logging;
use paneld::config::{DEFAULT_SOCKET_PATH, DaemonConfig, load_config};
use paneld::daemon::run_daemon;
use paneld::ipc::send_command;

#[derive(Parser)]
#[command(
    name = "paneld",
    version = paneld::PANELD_VERSION,
    about = "Screen-cycling daemon for small panel displays"
)]
struct RootOptions {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    debug: bool,

    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Start the daemon
    Run(RunOpts),
    /// Send a command to a running daemon
    Send(SendOpts),
}

#[derive(Args)]
struct RunOpts {
    /// Path of the TOML configuration file
    #[arg(long, env = "PANELD_CONFIG")]
    config: Option<PathBuf>,

    /// Override the command socket path from the configuration
    #[arg(long)]
    socket: Option<PathBuf>,
}

#[derive(Args)]
struct SendOpts {
    /// Socket the daemon listens on
    #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Command verb plus optional argument, e.g. `next` or `screen weather`
    #[arg(required = true, num_args = 1..)]
    command: Vec<String>,
}

async fn command_run(opts: RunOpts) -> anyhow::Result<()> {
    let mut config = match &opts.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Cannot load configuration from {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    if let Some(socket) = opts.socket {
        config.socket_path = socket;
    }
    run_daemon(config).await
}

async fn command_send(opts: SendOpts) -> anyhow::Result<()> {
    send_command(&opts.socket, &opts.command.join(" ")).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let opts = RootOptions::parse();
    setup_logging(opts.debug);

    let result = match opts.subcmd {
        SubCommand::Run(run_opts) => command_run(run_opts).await,
        SubCommand::Send(send_opts) => command_send(send_opts).await,
    };

    if let Err(error) = result {
        eprintln!("Error: {error:?}");
        std::process::exit(1);
    }
    Ok(())
}
