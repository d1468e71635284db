use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use clausematch_api::{AppState, RestApi, ServerConfig};
use clausematch_assembler::{
    EmbeddingConfig, EmbeddingProvider, HashEmbeddingProvider, HttpEmbeddingProvider,
    QueryAssembler, DEFAULT_EMBEDDING_TIMEOUT_SECS,
};
use clausematch_similarity::DEFAULT_TOP_K;
use clausematch_storage::{CatalogManager, CatalogOptions};

/// Contract template matching service
#[derive(Parser, Debug)]
#[command(name = "clausematch")]
#[command(about = "Recommends contract templates by weighted field similarity", long_about = None)]
struct Args {
    /// Path to the template catalog (JSON array of template records)
    #[arg(short, long, env = "CLAUSEMATCH_CATALOG", default_value = "./data/template_vectors.json")]
    catalog: PathBuf,

    /// HTTP bind address
    #[arg(long, env = "CLAUSEMATCH_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "CLAUSEMATCH_HTTP_PORT", default_value_t = 8031)]
    http_port: u16,

    /// Text-to-vector service endpoint
    #[arg(long, env = "CLAUSEMATCH_EMBEDDING_URL")]
    embedding_url: Option<String>,

    /// Embedding request timeout in seconds
    #[arg(long, env = "CLAUSEMATCH_EMBEDDING_TIMEOUT_SECS", default_value_t = DEFAULT_EMBEDDING_TIMEOUT_SECS)]
    embedding_timeout_secs: u64,

    /// Use deterministic hash embeddings of this dimension instead of the
    /// embedding service (offline runs and demos)
    #[arg(long, conflicts_with = "embedding_url")]
    hash_embedding_dim: Option<usize>,

    /// Templates returned when a request does not set top_k
    #[arg(long, env = "CLAUSEMATCH_TOP_K", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Required embedding dimension; inferred from the catalog when unset
    #[arg(long, env = "CLAUSEMATCH_EXPECTED_DIM")]
    expected_dim: Option<usize>,

    /// Log level
    #[arg(long, env = "CLAUSEMATCH_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.http_port,
            default_top_k: self.top_k,
        }
    }

    fn embedding_config(&self) -> EmbeddingConfig {
        let config = match &self.embedding_url {
            Some(url) => EmbeddingConfig::new(url.clone()),
            None => EmbeddingConfig::default(),
        };
        config.with_timeout(Duration::from_secs(self.embedding_timeout_secs))
    }

    fn embedding_provider(&self) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
        if let Some(dim) = self.hash_embedding_dim {
            warn!("Using hash embeddings ({} dims); scores are not semantic", dim);
            return Ok(Arc::new(HashEmbeddingProvider::new(dim)));
        }

        let config = self.embedding_config();
        info!("Embedding service: {} (timeout {:?})", config.url, config.timeout);
        Ok(Arc::new(HttpEmbeddingProvider::new(config)?))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting ClauseMatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("HTTP API port: {}", args.http_port);

    let options = CatalogOptions {
        expected_dim: args.expected_dim,
    };
    let catalog = Arc::new(CatalogManager::from_path(&args.catalog, options));
    let report = catalog.load_initial();
    if report.degraded {
        warn!(
            "Catalog loaded in degraded state: {} records dropped",
            report.dropped
        );
    }

    let assembler = QueryAssembler::new(args.embedding_provider()?);
    let server_config = args.server_config();
    let state = Arc::new(
        AppState::new(catalog, assembler).with_default_top_k(server_config.default_top_k),
    );

    let http_port = server_config.port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, server_config).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("ClauseMatch started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
