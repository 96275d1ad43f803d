//! Application State
//!
//! Shared state across all handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use finspeak_agent::QueryResolver;
use finspeak_config::{load_settings_from, Settings};
use finspeak_core::{load_knowledge_base, KnowledgeBase, KnowledgeBaseHandle};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration, replaced on config reload
    pub config: Arc<RwLock<Settings>>,
    pub resolver: Arc<QueryResolver>,
    /// Environment name for config reload
    env: Option<String>,
    /// Directory holding `default.yaml` and `{env}.yaml`
    config_dir: PathBuf,
}

/// Outcome of a knowledge-base reload
#[derive(Debug, Clone, Serialize)]
pub struct ReloadSummary {
    pub funds: usize,
    pub nav_points: usize,
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    /// Settings were re-read before the data files
    pub config_reloaded: bool,
}

impl AppState {
    pub fn new(config: Settings, resolver: QueryResolver) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            resolver: Arc::new(resolver),
            env: None,
            config_dir: PathBuf::from("config"),
        }
    }

    /// Remember the environment name used for config reload
    pub fn with_env(mut self, env: Option<String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBaseHandle> {
        self.resolver.knowledge_base()
    }

    /// Reload configuration from files and environment
    ///
    /// Only data paths and server limits take effect without a restart.
    /// On failure the current settings stay in place.
    pub fn reload_config(&self) -> Result<(), ServerError> {
        let new_config = load_settings_from(&self.config_dir, self.env.as_deref()).map_err(|e| {
            tracing::error!(
                dir = %self.config_dir.display(),
                error = %e,
                "Config reload failed, keeping current settings"
            );
            e
        })?;
        *self.config.write() = new_config;

        tracing::info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Re-read the CSV files and swap the snapshot
    ///
    /// Blocking; on failure the current snapshot stays in place.
    pub fn reload_knowledge_base(&self) -> Result<ReloadSummary, ServerError> {
        let (funds_csv, nav_csv) = {
            let config = self.config.read();
            (
                config.data.funds_csv.clone(),
                config.data.nav_history_csv.clone(),
            )
        };

        let kb = load_knowledge_base(Path::new(&funds_csv), Path::new(&nav_csv)).map_err(|e| {
            tracing::error!(
                funds_csv = %funds_csv,
                nav_history_csv = %nav_csv,
                error = %e,
                "Knowledge base reload failed, keeping current snapshot"
            );
            e
        })?;

        Ok(self.install(kb))
    }

    /// Swap in an already-built knowledge base
    pub fn install(&self, kb: KnowledgeBase) -> ReloadSummary {
        let handle = self.knowledge_base();
        handle.replace(kb);
        let current = handle.snapshot();
        ReloadSummary {
            funds: current.fund_count(),
            nav_points: current.nav_point_count(),
            generation: handle.generation(),
            loaded_at: current.loaded_at(),
            config_reloaded: false,
        }
    }
}
