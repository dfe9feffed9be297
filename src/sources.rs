use std::sync::Arc;

use tracing::debug;

use crate::app::ProgressSink;
use crate::config::ResolvedConfig;
use crate::domain::{Package, RetrieverKind};
use crate::error::PartsError;
use crate::igem::{IgemRetriever, RegistryHttpClient, SynBioHubHttpClient};
use crate::ncbi::{EntrezHttpClient, GenBankRetriever};

pub trait PartRetriever: Send + Sync {
    fn retrieve(
        &self,
        ids: &[String],
        package: &Package,
        sink: &dyn ProgressSink,
    ) -> Vec<String>;
}

#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<(String, Arc<dyn PartRetriever>)>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(
        mut self,
        prefix: impl Into<String>,
        retriever: Arc<dyn PartRetriever>,
    ) -> Self {
        self.sources.push((prefix.into(), retriever));
        self
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self, PartsError> {
        let mut genbank: Option<Arc<dyn PartRetriever>> = None;
        let mut igem: Option<Arc<dyn PartRetriever>> = None;
        let mut registry = Self::new();

        for rule in &config.sources {
            let retriever = match rule.retriever {
                RetrieverKind::Genbank => match &genbank {
                    Some(existing) => existing.clone(),
                    None => {
                        let client = EntrezHttpClient::new(config)?;
                        let created: Arc<dyn PartRetriever> = Arc::new(GenBankRetriever::new(
                            client,
                            config.cache_files.genbank.clone(),
                        ));
                        genbank = Some(created.clone());
                        created
                    }
                },
                RetrieverKind::Igem => match &igem {
                    Some(existing) => existing.clone(),
                    None => {
                        let synbiohub = SynBioHubHttpClient::new(config.timeout)?;
                        let fallback = RegistryHttpClient::new(
                            &config.endpoints.registry_url,
                            config.registry_timeout,
                        )?;
                        let created: Arc<dyn PartRetriever> =
                            Arc::new(IgemRetriever::new(synbiohub, fallback, config));
                        igem = Some(created.clone());
                        created
                    }
                },
            };
            registry = registry.with_source(rule.prefix.clone(), retriever);
        }

        Ok(registry)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|(prefix, _)| prefix.as_str())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn retrieve_parts(
        &self,
        ids: &[String],
        package: &Package,
        sink: &dyn ProgressSink,
    ) -> Vec<String> {
        let mut collected = Vec::new();
        for (prefix, retriever) in &self.sources {
            let matches: Vec<String> = ids
                .iter()
                .filter(|id| id.starts_with(prefix.as_str()))
                .cloned()
                .collect();
            if matches.is_empty() {
                continue;
            }
            debug!(prefix = %prefix, count = matches.len(), "dispatching to retriever");
            collected.extend(retriever.retrieve(&matches, package, sink));
        }
        collected
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.prefixes()).finish()
    }
}
