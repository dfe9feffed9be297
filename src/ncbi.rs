use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::accession::{accession_to_ncbi_uri, ncbi_uri_to_accession};
use crate::app::{ProgressEvent, ProgressSink};
use crate::config::ResolvedConfig;
use crate::domain::Package;
use crate::error::PartsError;
use crate::seqio::{append_genbank, genbank_record_id, parse_genbank};
use crate::sources::PartRetriever;

pub const TOOL_NAME: &str = "igem-parts-import";

pub trait EntrezClient: Send + Sync {
    fn efetch_genbank(&self, accessions: &[String]) -> Result<String, PartsError>;
}

#[derive(Clone)]
pub struct EntrezHttpClient {
    client: Client,
    base_url: String,
    email: String,
    api_key: Option<String>,
}

impl EntrezHttpClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self, PartsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("{TOOL_NAME}/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| PartsError::NcbiHttp(err.to_string()))?,
        );

        let api_key = std::env::var("NCBI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| PartsError::NcbiHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.endpoints.ncbi_base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            api_key,
        })
    }

    fn efetch_url(&self) -> String {
        format!("{}/efetch.fcgi", self.base_url)
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, PartsError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "NCBI request failed".to_string());
        Err(PartsError::NcbiStatus { status, message })
    }
}

impl EntrezClient for EntrezHttpClient {
    fn efetch_genbank(&self, accessions: &[String]) -> Result<String, PartsError> {
        let ids = accessions.join(",");
        let mut request = self.client.get(self.efetch_url()).query(&[
            ("db", "nucleotide"),
            ("id", ids.as_str()),
            ("rettype", "gb"),
            ("retmode", "text"),
            ("tool", TOOL_NAME),
            ("email", self.email.as_str()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }
        let response = request
            .send()
            .map_err(|err| PartsError::NcbiHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| PartsError::NcbiHttp(err.to_string()))
    }
}

pub struct GenBankRetriever<E: EntrezClient> {
    client: E,
    cache_file: String,
}

impl<E: EntrezClient> GenBankRetriever<E> {
    pub fn new(client: E, cache_file: impl Into<String>) -> Self {
        Self {
            client,
            cache_file: cache_file.into(),
        }
    }
}

impl<E: EntrezClient> PartRetriever for GenBankRetriever<E> {
    fn retrieve(
        &self,
        ids: &[String],
        package: &Package,
        sink: &dyn ProgressSink,
    ) -> Vec<String> {
        let accessions: Vec<String> = ids.iter().map(|id| ncbi_uri_to_accession(id)).collect();
        sink.event(ProgressEvent::new(format!(
            "Attempting to retrieve {} parts from NCBI: {}",
            ids.len(),
            accessions.join(",")
        )));

        let start = std::time::Instant::now();
        let text = match self.client.efetch_genbank(&accessions) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "NCBI efetch failed");
                sink.event(ProgressEvent::new("NCBI retrieval failed"));
                return Vec::new();
            }
        };
        let elapsed = start.elapsed();
        debug!(latency_ms = elapsed.as_millis() as u64, "ncbi.response");

        let records = match parse_genbank(text.as_bytes()) {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "NCBI response is not GenBank");
                sink.event(ProgressEvent::new("NCBI retrieval failed"));
                return Vec::new();
            }
        };

        let cache = package.file(&self.cache_file);
        sink.event(ProgressEvent::with_elapsed(
            format!(
                "Retrieved {} records from NCBI; writing to {cache}",
                records.len()
            ),
            elapsed,
        ));
        if let Err(err) = append_genbank(&cache, &records) {
            warn!(error = %err, cache = %cache, "could not write GenBank cache");
            return Vec::new();
        }

        records
            .iter()
            .filter_map(genbank_record_id)
            .map(|accession| accession_to_ncbi_uri(&accession))
            .collect()
    }
}
