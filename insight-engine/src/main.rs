use std::sync::Arc;

use clap::{Parser, Subcommand};
use insight_core::{
    EmbeddingConfig, GeminiEmbeddingClient, GeminiTextClient, GenerationConfig, InsightConfig,
    InsightRequest, Lexicon, PgInsightStore, PgSemanticMemory,
};
use tracing_subscriber::fmt;
use uuid::Uuid;

use insight_engine::{logging, Engine};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "insight.toml")]
    config: String,

    #[arg(long)]
    health: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a stored tutoring session and persist the result
    Score { session_id: Uuid },
    /// Build the student x lesson snapshot for a classroom
    Snapshot { classroom_id: Uuid, owner_id: Uuid },
    /// Generate a diagnostic audit for a classroom
    Audit { classroom_id: Uuid, owner_id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match InsightConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let rust_log = std::env::var("RUST_LOG").ok();
    fmt()
        .with_env_filter(logging::env_filter(rust_log.as_deref(), &config.service.log_level))
        .init();

    let pool = match insight_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match insight_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ PostgreSQL connected: {}", v),
            Err(e) => {
                println!("❌ PostgreSQL connection failed: {}", e);
                std::process::exit(1);
            }
        }

        if config.memory.enabled {
            match insight_core::db::check_pgvector(&pool).await {
                Ok(v) => println!("✅ pgvector version: {}", v),
                Err(e) => {
                    println!("❌ pgvector check failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        println!("✅ Insight DB health check passed");
        return Ok(());
    }

    let Some(command) = args.command else {
        eprintln!("No command given; try --help");
        std::process::exit(2);
    };

    let lexicon = Lexicon::load(&config.lexicon)?;
    let store = Arc::new(PgInsightStore::new(pool.clone()));
    let mut engine = Engine::from_config(store, lexicon, &config).with_pool(pool.clone());

    if config.generation.backend != "gemini" {
        tracing::warn!(backend = %config.generation.backend, "Unknown generation backend, audits disabled");
    } else {
        let generation_config = GenerationConfig::from_settings(&config.generation, None);
        if generation_config.api_key.is_empty() {
            tracing::warn!("GOOGLE_API_KEY not set, audits disabled");
        } else {
            engine = engine.with_generator(Arc::new(GeminiTextClient::new(generation_config)?));
        }
    }

    if config.memory.enabled {
        let embedding_config = EmbeddingConfig::from_memory_config(&config.memory);
        match GeminiEmbeddingClient::new(embedding_config) {
            Ok(client) => {
                let memory = PgSemanticMemory::new(pool.clone(), Arc::new(client));
                engine = engine.with_memory(Arc::new(memory));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Semantic memory disabled: failed to create embedding client");
            }
        }
    }

    let request = match command {
        Command::Score { session_id } => InsightRequest::ScoreSession { session_id },
        Command::Snapshot { classroom_id, owner_id } => {
            InsightRequest::Snapshot { classroom_id, owner_id }
        }
        Command::Audit { classroom_id, owner_id } => InsightRequest::Audit { classroom_id, owner_id },
    };

    let response = engine.handle_request(request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_ok() {
        std::process::exit(1);
    }

    Ok(())
}
