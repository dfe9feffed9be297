use std::fs;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DEFAULT_NAMESPACE_BASE, GENBANK_CACHE_FILE, IGEM_FASTA_CACHE_FILE, IGEM_REGISTRY_PREFIX,
    IGEM_SBOL2_CACHE_FILE, NCBI_PREFIX, RetrieverKind, SYNBIOHUB_PREFIX,
};
use crate::error::PartsError;

pub const CONFIG_FILE_NAME: &str = "parts-import.json";

pub const DEFAULT_EMAIL: &str = "engineering@igem.org";
pub const DEFAULT_NCBI_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub namespace_base: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub genbank_cache_file: Option<String>,
    #[serde(default)]
    pub sbol2_cache_file: Option<String>,
    #[serde(default)]
    pub fasta_cache_file: Option<String>,
    #[serde(default)]
    pub ncbi_base_url: Option<String>,
    #[serde(default)]
    pub synbiohub_url: Option<String>,
    #[serde(default)]
    pub registry_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub registry_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SourceEntry {
    Shorthand(String),
    Detailed(SourceEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SourceEntryObject {
    pub prefix: String,
    #[serde(default)]
    pub retriever: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRule {
    pub prefix: String,
    pub retriever: RetrieverKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFiles {
    pub genbank: String,
    pub sbol2: String,
    pub fasta: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub ncbi_base_url: String,
    pub synbiohub_url: String,
    pub registry_url: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub email: String,
    pub namespace_base: String,
    pub sources: Vec<SourceRule>,
    pub cache_files: CacheFiles,
    pub endpoints: Endpoints,
    pub timeout: Duration,
    pub registry_timeout: Duration,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        assemble(Config::default(), default_sources())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&Utf8Path>,
        package_root: &Utf8Path,
    ) -> Result<ResolvedConfig, PartsError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => package_root.join(CONFIG_FILE_NAME),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let config = Self::read(&config_path)?;
        Self::resolve_config(config)
    }

    fn read(path: &Utf8PathBuf) -> Result<Config, PartsError> {
        let content =
            fs::read_to_string(path).map_err(|_| PartsError::ConfigRead(path.clone()))?;
        serde_json::from_str(&content).map_err(|err| PartsError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(mut config: Config) -> Result<ResolvedConfig, PartsError> {
        let entries = std::mem::take(&mut config.sources);
        let sources = if entries.is_empty() {
            default_sources()
        } else {
            entries
                .into_iter()
                .map(resolve_source)
                .collect::<Result<Vec<_>, PartsError>>()?
        };

        Ok(assemble(config, sources))
    }
}

fn assemble(config: Config, sources: Vec<SourceRule>) -> ResolvedConfig {
    ResolvedConfig {
        schema_version: config.schema_version.unwrap_or(1),
        email: config.email.unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
        namespace_base: config
            .namespace_base
            .unwrap_or_else(|| DEFAULT_NAMESPACE_BASE.to_string()),
        sources,
        cache_files: CacheFiles {
            genbank: config
                .genbank_cache_file
                .unwrap_or_else(|| GENBANK_CACHE_FILE.to_string()),
            sbol2: config
                .sbol2_cache_file
                .unwrap_or_else(|| IGEM_SBOL2_CACHE_FILE.to_string()),
            fasta: config
                .fasta_cache_file
                .unwrap_or_else(|| IGEM_FASTA_CACHE_FILE.to_string()),
        },
        endpoints: Endpoints {
            ncbi_base_url: config
                .ncbi_base_url
                .unwrap_or_else(|| DEFAULT_NCBI_BASE_URL.to_string()),
            synbiohub_url: config
                .synbiohub_url
                .unwrap_or_else(|| SYNBIOHUB_PREFIX.to_string()),
            registry_url: config
                .registry_url
                .unwrap_or_else(|| IGEM_REGISTRY_PREFIX.to_string()),
        },
        timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        registry_timeout: Duration::from_secs(
            config
                .registry_timeout_secs
                .unwrap_or(DEFAULT_REGISTRY_TIMEOUT_SECS),
        ),
    }
}

fn resolve_source(entry: SourceEntry) -> Result<SourceRule, PartsError> {
    match entry {
        SourceEntry::Shorthand(prefix) => {
            let retriever = RetrieverKind::default_for_prefix(&prefix)
                .ok_or_else(|| PartsError::UnknownSource(prefix.clone()))?;
            Ok(SourceRule { prefix, retriever })
        }
        SourceEntry::Detailed(obj) => {
            let retriever = match obj.retriever {
                Some(name) => name.parse().map_err(|_| PartsError::UnknownRetriever {
                    prefix: obj.prefix.clone(),
                    retriever: name,
                })?,
                None => RetrieverKind::default_for_prefix(&obj.prefix)
                    .ok_or_else(|| PartsError::UnknownSource(obj.prefix.clone()))?,
            };
            Ok(SourceRule {
                prefix: obj.prefix,
                retriever,
            })
        }
    }
}

pub fn default_sources() -> Vec<SourceRule> {
    vec![
        SourceRule {
            prefix: NCBI_PREFIX.to_string(),
            retriever: RetrieverKind::Genbank,
        },
        SourceRule {
            prefix: SYNBIOHUB_PREFIX.to_string(),
            retriever: RetrieverKind::Igem,
        },
        SourceRule {
            prefix: IGEM_REGISTRY_PREFIX.to_string(),
            retriever: RetrieverKind::Igem,
        },
    ]
}
