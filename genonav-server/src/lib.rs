//! genonav-server: AI-driven genome-browser navigation daemon
//!
//! Natural-language queries go to a tool-aware language model. The model's
//! navigation tool calls are validated and normalized, and each successful
//! navigation is sent to the connected browser as a correlated command the
//! browser acknowledges.

pub mod channel;
pub mod config;
pub mod genome;
pub mod handlers;
pub mod llm;
pub mod navigation;
pub mod query;
pub mod tcp;
pub mod tools;

use std::sync::Arc;

use tokio::sync::broadcast;

use config::AppConfig;
use genome::{GeneLocator, LocusNormalizer, StaticGeneTable};
use llm::{ConfiguredModels, ModelProvider};

pub use handlers::handle_client;

/// State shared by every connection
///
/// Lookup tables are immutable; everything mutable lives per connection.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<AppConfig>,
    pub normalizer: Arc<LocusNormalizer>,
    pub genes: Arc<dyn GeneLocator>,
    pub models: Arc<dyn ModelProvider>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl SharedState {
    /// Human reference tables, models from the `[llm]` section
    pub fn new(config: AppConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let models = ConfiguredModels::from_env(config.llm.clone());
        Self {
            config: Arc::new(config),
            normalizer: Arc::new(LocusNormalizer::human()),
            genes: Arc::new(StaticGeneTable::seeded()),
            models: Arc::new(models),
            shutdown_tx,
        }
    }

    pub fn with_models(mut self, models: Arc<dyn ModelProvider>) -> Self {
        self.models = models;
        self
    }

    pub fn with_genes(mut self, genes: Arc<dyn GeneLocator>) -> Self {
        self.genes = genes;
        self
    }

    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Ask the accept loop and every connection to stop
    pub fn shutdown(&self) {
        // no receivers just means nothing is running
        let _ = self.shutdown_tx.send(());
    }
}
