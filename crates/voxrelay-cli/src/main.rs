use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use voxrelay_agent::VoiceAgent;
use voxrelay_core::config::{Config, GatewayConfig};
use voxrelay_core::session_store::MemorySessionStore;
use voxrelay_gateway::GatewayState;
use voxrelay_media::{AssemblyAiTranscriber, MurfSynthesizer};
use voxrelay_providers::GeminiProvider;

mod logging;

#[derive(Parser)]
#[command(
    name = "voxrelay",
    about = "Voice agent relay: speech in, model reply, speech out",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to listen on (default: 8000)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,

        /// Directory served under /static
        #[arg(long)]
        static_dir: Option<String>,
    },

    /// Run one chat turn against the configured providers
    Chat {
        /// Audio file to send
        #[arg(short, long)]
        file: PathBuf,

        /// Session to continue (default: a fresh one)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show system status
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
}

fn build_agent(config: &Config) -> VoiceAgent {
    VoiceAgent::new(
        Arc::new(AssemblyAiTranscriber::new(config.transcription())),
        Arc::new(GeminiProvider::new(config.llm())),
        Arc::new(MurfSynthesizer::new(config.tts())),
        Arc::new(MemorySessionStore::new()),
        config.fallback_audio_url(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::config_path);

    let mut config = Config::load(&config_path)?;

    logging::init(config.logging.as_ref(), cli.verbose)?;

    match cli.command {
        Commands::Serve {
            port,
            bind,
            static_dir,
        } => {
            let gateway = config.gateway.get_or_insert_with(GatewayConfig::default);
            if let Some(port) = port {
                gateway.port = port;
            }
            if bind.is_some() {
                gateway.bind = bind;
            }
            if static_dir.is_some() {
                gateway.static_dir = static_dir;
            }

            let (warnings, errors) = config.validate();
            for w in &warnings {
                tracing::warn!("{w}");
            }
            if !errors.is_empty() {
                for e in &errors {
                    tracing::error!("{e}");
                }
                anyhow::bail!("invalid configuration ({} error(s))", errors.len());
            }

            let port = config.gateway_port();
            let agent = Arc::new(build_agent(&config));
            let state = Arc::new(GatewayState::new(Arc::new(config), agent));

            tracing::info!("Starting VoxRelay gateway on port {port}");
            voxrelay_gateway::start_gateway(state, port).await?;
        }
        Commands::Chat { file, session } => {
            let audio = tokio::fs::read(&file).await?;
            let session = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            tracing::info!(session = %session, bytes = audio.len(), "Running chat turn");

            let agent = build_agent(&config);
            let reply = agent.chat(&session, &audio).await;
            tracing::debug!(outcome = reply.outcome.as_str(), "Chat turn complete");

            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
        },
        Commands::Status => {
            let port = config.gateway_port();
            println!("VoxRelay v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {}", config_path.display());
            println!("Gateway port: {port}");
            println!("Static dir: {}", config.static_dir().display());
            println!("Model: {}", config.llm().model());

            let running = reqwest::Client::new()
                .get(format!("http://127.0.0.1:{port}/health"))
                .timeout(std::time::Duration::from_secs(2))
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false);
            println!("Status: {}", if running { "running" } else { "not running" });

            let (warnings, errors) = config.validate();
            for w in &warnings {
                println!("warning: {w}");
            }
            for e in &errors {
                println!("error: {e}");
            }
        }
    }

    Ok(())
}
