use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use swift_info_gateway::api::{ApiServer, INFO_PATH};
use swift_info_gateway::nodes::{HttpTransport, StaticNodeResolver};
use swift_info_gateway::signature::{AdminKey, signed_query};
use swift_info_gateway::{Config, ExtendedInfoFetcher, InfoController, InfoRegistry, features};

/// Swift info - cluster capability discovery endpoint
#[derive(Parser)]
#[command(name = "swift-info", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long, env = "SWIFT_INFO_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the info endpoint (default)
    Serve,
    /// Print a signed admin query string for the configured admin key
    Sign {
        /// HTTP method the link is valid for
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Path the link is valid for
        #[arg(short, long, default_value = INFO_PATH)]
        path: String,
        /// Seconds until the link expires
        #[arg(short, long, default_value = "86400")]
        expires_in: i64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,swift_info_gateway=info",
        1 => "info,swift_info_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Sign {
            method,
            path,
            expires_in,
        } => sign(&config, &method, &path, expires_in),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        port = config.server.port,
        expose_info = config.info.expose_info,
        version = %config.info.version,
        "starting info gateway"
    );

    let mut registry = InfoRegistry::new();
    features::register_all(&mut registry, &config);
    let snapshot = registry.snapshot();

    let mut controller = InfoController::new(snapshot, &config.info);

    if config.cluster.is_configured() {
        let transport =
            HttpTransport::new(config.cluster.connect_timeout, config.cluster.read_timeout)?;
        let fetcher = ExtendedInfoFetcher::new(
            Arc::new(StaticNodeResolver::from_config(&config.cluster)),
            Arc::new(transport),
        )
        .max_attempts(config.cluster.max_attempts)
        .call_timeout(config.cluster.connect_timeout + config.cluster.read_timeout);
        controller = controller.with_fetcher(fetcher);
        tracing::info!("extended info enabled");
    } else {
        tracing::info!("no cluster nodes configured, extended info disabled");
    }

    ApiServer::new(controller, config.server.port).run().await?;
    Ok(())
}

fn sign(config: &Config, method: &str, path: &str, expires_in: i64) -> anyhow::Result<()> {
    let link = signed_link(
        config,
        method,
        path,
        chrono::Utc::now().timestamp(),
        expires_in,
    )?;
    println!("{link}");
    Ok(())
}

/// Signed admin link for `path`, valid until `now + expires_in`
fn signed_link(
    config: &Config,
    method: &str,
    path: &str,
    now: i64,
    expires_in: i64,
) -> anyhow::Result<String> {
    let key = config
        .info
        .admin_key
        .as_ref()
        .and_then(|k| AdminKey::new(k.expose_secret()))
        .ok_or_else(|| anyhow::anyhow!("no admin key configured"))?;

    let expires = now
        .checked_add(expires_in)
        .ok_or_else(|| anyhow::anyhow!("--expires-in {expires_in} is out of range"))?;
    let method = method.to_ascii_uppercase();
    Ok(format!("{path}?{}", signed_query(&key, &method, path, expires)))
}
