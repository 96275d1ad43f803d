//! FinSpeak Server Entry Point

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use finspeak_agent::QueryResolver;
use finspeak_config::{load_settings, GenerativeConfig, Glossary, Settings};
use finspeak_core::{load_knowledge_base, KnowledgeBase, KnowledgeBaseHandle};
use finspeak_llm::{ChatCompletionsExplainer, LlmConfig};
use finspeak_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("FINSPEAK_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting FinSpeak Server v{}", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled && init_metrics().is_some() {
        tracing::info!("Initialized Prometheus metrics at /metrics");
    }

    let glossary = Arc::new(load_glossary(&config));
    let kb = Arc::new(KnowledgeBaseHandle::new(load_initial_knowledge_base(&config)));

    let mut resolver = QueryResolver::from_settings(&config, kb, glossary);
    if let Some(explainer) = build_generative_explainer(&config.explain.generative) {
        resolver = resolver.with_generative(explainer);
    }
    tracing::info!(
        policy = ?config.explain.policy,
        explainer = ?resolver.explanation_service(),
        "Query resolver ready"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(AppState::new(config, resolver).with_env(env));

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Glossary from `data.glossary_path`, or the built-in one
fn load_glossary(config: &Settings) -> Glossary {
    let Some(path) = config.data.glossary_path.as_deref() else {
        return Glossary::default();
    };

    match Glossary::from_file(path) {
        Ok(glossary) => {
            if let Err(problems) = glossary.validate() {
                for problem in &problems {
                    tracing::warn!(path, "Glossary problem: {}", problem);
                }
            }
            tracing::info!(path, terms = glossary.len(), "Loaded glossary");
            glossary
        }
        Err(e) => {
            tracing::error!(path, error = %e, "Failed to load glossary, using built-in terms");
            Glossary::default()
        }
    }
}

/// Start with an empty knowledge base when the CSV files are unusable;
/// `/api/admin/reload` can load them later.
fn load_initial_knowledge_base(config: &Settings) -> KnowledgeBase {
    let funds = Path::new(&config.data.funds_csv);
    let navs = Path::new(&config.data.nav_history_csv);

    match load_knowledge_base(funds, navs) {
        Ok(kb) => kb,
        Err(e) => {
            tracing::error!(
                funds_csv = %funds.display(),
                nav_history_csv = %navs.display(),
                error = %e,
                "Failed to load knowledge base, starting empty"
            );
            KnowledgeBase::empty()
        }
    }
}

/// Chat-completions explainer when enabled; the key falls back to `GROQ_API_KEY`
fn build_generative_explainer(
    config: &GenerativeConfig,
) -> Option<Arc<dyn finspeak_core::Explainer>> {
    if !config.enabled {
        tracing::info!("Generative explainer disabled");
        return None;
    }

    let mut llm_config = LlmConfig::from(config);
    if llm_config.api_key.is_none() {
        llm_config.api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
    }
    if llm_config.api_key.is_none() {
        tracing::warn!("Generative explainer enabled but no API key set, curated terms only");
        return None;
    }

    match ChatCompletionsExplainer::new(llm_config) {
        Ok(explainer) => {
            tracing::info!(
                endpoint = %config.endpoint,
                model = %config.model,
                "Generative explainer enabled"
            );
            Some(Arc::new(explainer))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create generative explainer");
            None
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("finspeak={level},finspeak_core={level},finspeak_agent={level},finspeak_llm={level},finspeak_server={level},tower_http=info").into()
    });

    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
