use clap::Parser;
use clinic_agents::config::{self, ClientConfig, FrontendConfig};
use clinic_agents::frontend;
use clinic_agents::utils::{logger, validation::Validate};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "clinic-frontend")]
#[command(about = "Web UI for the medical appointment agents")]
struct FrontendArgs {
    /// Path to TOML configuration file
    #[arg(short, long, env = "CLINIC_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long = "server.address", alias = "host")]
    address: Option<String>,

    #[arg(long = "server.port", alias = "port")]
    port: Option<u16>,

    #[arg(long, env = "DOCTOR_AGENT_URL")]
    doctor_agent_url: Option<String>,

    #[arg(long, env = "BOOKING_AGENT_URL")]
    booking_agent_url: Option<String>,

    /// Request timeout for agent calls, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Accepted for compatibility; the server is always headless
    #[arg(long = "server.headless", hide = true)]
    headless: Option<String>,

    /// Accepted for compatibility; there is no file watcher
    #[arg(long = "server.fileWatcherType", hide = true)]
    file_watcher_type: Option<String>,

    /// Accepted for compatibility; no usage statistics are collected
    #[arg(long = "browser.gatherUsageStats", hide = true)]
    gather_usage_stats: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    json_logs: bool,
}

fn resolve(args: FrontendArgs) -> clinic_agents::Result<FrontendConfig> {
    let file = config::load_optional(args.config.as_ref())?;
    let client = ClientConfig::resolve(
        file.as_ref(),
        args.doctor_agent_url,
        args.booking_agent_url,
        args.timeout,
    );
    let config = FrontendConfig::resolve(file.as_ref(), args.address, args.port, client);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = FrontendArgs::parse();

    logger::init_logger(args.verbose, args.json_logs);
    tracing::debug!("CLI args: {:?}", args);

    let config = match resolve(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = frontend::run(&config).await {
        tracing::error!("❌ Frontend failed: {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code().max(1));
    }

    Ok(())
}
