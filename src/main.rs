use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use chatmux::application::errors::BotError;
use chatmux::application::messaging::Mux;
use chatmux::application::services::listen_and_serve;
use chatmux::infrastructure::adapters::ConsoleAdapter;
use chatmux::infrastructure::config::Config;
use chatmux::infrastructure::web::serve_web;
use chatmux::plugins::register_builtin;

#[derive(Parser)]
#[command(name = "chatmux")]
#[command(about = "A chat bot built on a message dispatch core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("chatmux v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            if let Err(e) = init_config() {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }
}

fn init_logging(level: &str) {
    // RUST_LOG wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run_bot(config_path: &str) -> Result<(), BotError> {
    // Load config before logging exists, report problems after
    let (config, load_err) = if std::path::Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(config) => (config, None),
            Err(e) => (Config::load_env(), Some(e)),
        }
    } else {
        (Config::load_env(), None)
    };

    init_logging(&config.log_level);
    if let Some(e) = load_err {
        tracing::warn!("Failed to load config: {}, using defaults", e);
    }
    config.validate()?;

    tracing::info!("Starting chatmux: {}", config.bot.name);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;
    rt.block_on(serve(config))
}

async fn serve(config: Config) -> Result<(), BotError> {
    let mux = Arc::new(Mux::new(config.bot.name.clone(), config.bot.description.clone()));
    register_builtin(&mux, &config).await?;

    let ctx = CancellationToken::new();
    let shutdown = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, shutting down");
            shutdown.cancel();
        }
    });

    let web = if config.http.enabled {
        Some(tokio::spawn(serve_web(config.http.listen.clone(), mux.clone(), ctx.clone())))
    } else {
        None
    };

    if config.console_enabled() {
        let adapter = Arc::new(ConsoleAdapter::new(&config));
        listen_and_serve(ctx.clone(), adapter, mux.clone()).await;
        ctx.cancel();
    } else if web.is_some() {
        ctx.cancelled().await;
    } else {
        tracing::warn!("No adapters or HTTP server enabled, nothing to do");
    }

    if let Some(web) = web {
        web.await
            .map_err(|e| BotError::Internal(format!("HTTP server task failed: {}", e)))??;
    }
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| BotError::Internal(format!("Failed to render config: {}", e)))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
