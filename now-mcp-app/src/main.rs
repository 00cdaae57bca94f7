use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use now_mcp_app::{bootstrap, commands};
use now_mcp_core::ServerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "now-mcp")]
#[command(about = "Expose ITSM record APIs as a package-scoped set of callable tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// YAML configuration file. Environment variables override its values
    #[arg(short, long, global = true, env = "NOW_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Tool package to expose (overrides MCP_TOOL_PACKAGE)
    #[arg(short, long, global = true)]
    package: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve newline-delimited JSON requests on stdio (default)
    Serve,

    /// Print the exposed tools and their input schemas
    Tools,

    /// Call one tool and print its result
    Call {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        arguments: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        ServerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(package) = cli.package {
        config.tool_package = Some(package);
    }

    init_tracing(config.debug);

    let dispatcher = bootstrap::build_dispatcher(config).context("Startup failed")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve::run(Arc::new(dispatcher)).await,
        Command::Tools => commands::tools::run(&dispatcher),
        Command::Call { name, arguments } => {
            let result = commands::call::run(&dispatcher, &name, arguments.as_deref()).await?;
            if !result.success {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout carries responses.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
