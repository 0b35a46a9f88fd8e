use clap::Parser;
use clinic_agents::utils::{logger, validation::Validate};
use clinic_agents::{server, AgentsArgs, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the container image may not ship one.
    let _ = dotenvy::dotenv();
    let args = AgentsArgs::parse();

    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("Starting clinic-agents");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match ServerConfig::from_args(&args).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run(&config).await {
        tracing::error!(
            "❌ Agent server failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
