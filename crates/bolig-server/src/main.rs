mod analysis;
mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use bolig_ai::{AiAnalyzer, ClaudeClient, ClaudeConfig, DstClient, ToolRegistry};
use bolig_scraper::{build_http_client, FirecrawlClient, ProviderRegistry};

use crate::analysis::AnalysisService;
use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = bolig_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = bolig_db::PoolConfig::from_app_config(&config);
    let pool = bolig_db::connect_pool(&config.database_url, pool_config).await?;
    bolig_db::run_migrations(&pool).await?;

    let http = build_http_client()?;

    let firecrawl = match &config.firecrawl_api_key {
        Some(key) => Some(FirecrawlClient::with_base_url(key, &config.firecrawl_base_url)?),
        None => None,
    };
    let registry = ProviderRegistry::new(
        http.clone(),
        config.fetch_timeout_secs,
        config.fetch_user_agent.clone(),
        firecrawl,
    );

    let claude = ClaudeClient::new(
        ClaudeConfig::new(&config.anthropic_api_key)
            .with_base_url(&config.claude_base_url)
            .with_retry(config.ai_max_retries, config.ai_retry_delay_secs),
    )?;
    let tools = ToolRegistry::new(DstClient::with_base_url(&config.dst_base_url)?);
    let analyzer = AiAnalyzer::new(claude, tools);

    let service = Arc::new(AnalysisService::new(
        pool.clone(),
        registry,
        analyzer,
        http,
        config.fetch_timeout_secs,
        config.fetch_user_agent.clone(),
    ));

    let app = build_app(AppState { pool, service });

    tracing::info!(addr = %config.bind_addr, env = %config.env, "starting bolig-server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
