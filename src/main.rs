mod app;
mod config;
mod error;
mod event;
mod logging;
mod poller;
mod procmon;
mod server;
mod status;
mod system_stats;
mod tui;
mod ui;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use config::Config;
use logging::LogTarget;
use procmon::ProcmonClient;
use status::StatusFields;
use tracing::error;

#[derive(Parser)]
#[command(
    name = "procbar",
    about = "CPU and RAM status bar fed by a procmon endpoint",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    watch: WatchArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the live status bar (default)
    Watch(WatchArgs),
    /// Refresh once and print the fields on one line
    Once(OnceArgs),
    /// Serve this machine's usage on GET /procmon
    Serve(ServeArgs),
}

#[derive(Args, Default)]
struct WatchArgs {
    /// Base URL of the procmon server
    #[arg(long)]
    url: Option<String>,
    /// Seconds between refreshes
    #[arg(long)]
    interval: Option<u64>,
    /// Draw below the prompt instead of taking over the screen
    #[arg(long)]
    inline: bool,
}

#[derive(Args)]
struct OnceArgs {
    /// Base URL of the procmon server
    #[arg(long)]
    url: Option<String>,
    /// Text placed between fields
    #[arg(long)]
    separator: Option<String>,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    bind: Option<std::net::IpAddr>,
    /// Answer clients outside the local network too
    #[arg(long)]
    allow_remote: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Watch(cli.watch));

    let target = match command {
        Commands::Watch(_) => LogTarget::File,
        _ => LogTarget::FileAndStderr,
    };
    let _log_guard = logging::init_logging(target);
    let mut config = Config::load();

    let rt = tokio::runtime::Runtime::new()?;
    match command {
        Commands::Watch(args) => {
            if let Some(url) = args.url {
                config.procmon.url = url;
            }
            if let Some(secs) = args.interval {
                config.procmon.interval_secs = secs.max(1);
            }
            if args.inline {
                config.status_bar.inline = true;
            }
            tui::install_panic_hook();
            rt.block_on(app::App::run(config))?;
        }
        Commands::Once(args) => {
            if let Some(url) = args.url {
                config.procmon.url = url;
            }
            if let Some(sep) = args.separator {
                config.status_bar.separator = sep;
            }
            // The failure is already logged; only the exit status is left
            if !rt.block_on(print_once(&config))? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                config.server.port = port;
            }
            if let Some(bind) = args.bind {
                config.server.bind = bind;
            }
            if args.allow_remote {
                config.server.local_only = false;
            }
            rt.block_on(server::run_server(&config.server))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Print one refreshed bar line. Returns `false` when the refresh failed.
async fn print_once(config: &Config) -> anyhow::Result<bool> {
    let client = ProcmonClient::new(&config.procmon.url, config.procmon.timeout())?;
    let fields = StatusFields::with_placeholders();

    match procmon::refresh(&client, &fields).await {
        Ok(lines) => {
            println!("{}", lines.join(&config.status_bar.separator));
            Ok(true)
        }
        Err(e) => {
            error!(endpoint = client.endpoint(), error = %e, "status refresh failed");
            Ok(false)
        }
    }
}
