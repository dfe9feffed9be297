use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::app::{ProgressEvent, ProgressSink};
use crate::config::ResolvedConfig;
use crate::domain::{Package, igem_part_name};
use crate::error::PartsError;
use crate::ncbi::TOOL_NAME;
use crate::sbol::merge_sbol2_document;
use crate::seqio::{append_text, fasta_ids};
use crate::sources::PartRetriever;

pub trait SynBioHubClient: Send + Sync {
    fn pull(&self, uri: &str) -> Result<Vec<u8>, PartsError>;
}

pub trait RegistryClient: Send + Sync {
    fn fetch_fasta(&self, part: &str) -> Result<String, PartsError>;
}

fn client_headers() -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&format!("{TOOL_NAME}/{}", env!("CARGO_PKG_VERSION")))
            .map_err(|err| err.to_string())?,
    );
    Ok(headers)
}

#[derive(Clone)]
pub struct SynBioHubHttpClient {
    client: Client,
}

impl SynBioHubHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, PartsError> {
        let mut headers = client_headers().map_err(PartsError::SynBioHubHttp)?;
        headers.insert(ACCEPT, HeaderValue::from_static("application/rdf+xml"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| PartsError::SynBioHubHttp(err.to_string()))?;
        Ok(Self { client })
    }

    pub fn sbol_url(uri: &str) -> String {
        format!("{}/sbol", uri.trim_end_matches('/'))
    }
}

impl SynBioHubClient for SynBioHubHttpClient {
    fn pull(&self, uri: &str) -> Result<Vec<u8>, PartsError> {
        let response = self
            .client
            .get(Self::sbol_url(uri))
            .send()
            .map_err(|err| PartsError::SynBioHubHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "SynBioHub request failed".to_string());
            return Err(PartsError::SynBioHubStatus { status, message });
        }
        let bytes = response
            .bytes()
            .map_err(|err| PartsError::SynBioHubHttp(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Clone)]
pub struct RegistryHttpClient {
    client: Client,
    base_url: String,
}

impl RegistryHttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PartsError> {
        let headers = client_headers().map_err(PartsError::RegistryHttp)?;
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| PartsError::RegistryHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn fasta_url(&self, part: &str) -> String {
        format!(
            "{}/cgi/partsdb/composite_edit/putseq.cgi?part={part}",
            self.base_url
        )
    }
}

impl RegistryClient for RegistryHttpClient {
    fn fetch_fasta(&self, part: &str) -> Result<String, PartsError> {
        let response = self
            .client
            .get(self.fasta_url(part))
            .send()
            .map_err(|err| PartsError::RegistryHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "iGEM Registry request failed".to_string());
            return Err(PartsError::RegistryStatus { status, message });
        }
        let text = response
            .text()
            .map_err(|err| PartsError::RegistryHttp(err.to_string()))?;
        if text.trim().is_empty() {
            return Err(PartsError::RegistryHttp(format!("empty response for {part}")));
        }
        Ok(text)
    }
}

// SynBioHub rejects a whole batch if one member is missing, so parts go one by one.
pub struct IgemRetriever<S: SynBioHubClient, R: RegistryClient> {
    synbiohub: S,
    registry: R,
    synbiohub_url: String,
    sbol2_cache_file: String,
    fasta_cache_file: String,
}

impl<S: SynBioHubClient, R: RegistryClient> IgemRetriever<S, R> {
    pub fn new(synbiohub: S, registry: R, config: &ResolvedConfig) -> Self {
        Self {
            synbiohub,
            registry,
            synbiohub_url: config
                .endpoints
                .synbiohub_url
                .trim_end_matches('/')
                .to_string(),
            sbol2_cache_file: config.cache_files.sbol2.clone(),
            fasta_cache_file: config.cache_files.fasta.clone(),
        }
    }

    fn synbiohub_uri(&self, id: &str, part: &str) -> String {
        if id.starts_with(&self.synbiohub_url) {
            id.trim_end_matches('/').to_string()
        } else {
            format!("{}/public/igem/{part}", self.synbiohub_url)
        }
    }
}

impl<S: SynBioHubClient, R: RegistryClient> PartRetriever for IgemRetriever<S, R> {
    fn retrieve(
        &self,
        ids: &[String],
        package: &Package,
        sink: &dyn ProgressSink,
    ) -> Vec<String> {
        let sbol2_cache = package.file(&self.sbol2_cache_file);
        let fasta_cache = package.file(&self.fasta_cache_file);

        let mut retrieved = Vec::new();
        let mut from_registry = Vec::new();
        let mut fasta = String::new();

        for id in ids {
            let Some(part) = igem_part_name(id) else {
                warn!(id = %id, "cannot derive an iGEM part name");
                continue;
            };
            let url = self.synbiohub_uri(id, part);
            debug!(url = %url, "Attempting to retrieve from SynBioHub");

            match self.synbiohub.pull(&url) {
                Ok(document) => match merge_sbol2_document(&sbol2_cache, &document) {
                    Ok(added) => {
                        debug!(added, cache = %sbol2_cache, "merged SynBioHub document");
                        retrieved.push(id.clone());
                    }
                    Err(err) => {
                        warn!(error = %err, url = %url, "could not store SynBioHub document");
                    }
                },
                Err(err) if err.is_not_found() => {
                    debug!(part, "Could not retrieve from SynBioHub; trying iGEM Registry");
                    match self.registry.fetch_fasta(part) {
                        Ok(text) => {
                            match fasta_ids(text.as_bytes()) {
                                Ok(ids) if !ids.is_empty() => {}
                                Ok(_) => {
                                    warn!(part, "iGEM Registry returned no FASTA records");
                                    continue;
                                }
                                Err(err) => {
                                    warn!(error = %err, part, "iGEM Registry reply is not FASTA");
                                    continue;
                                }
                            }
                            fasta.push_str(&text);
                            if !text.ends_with('\n') {
                                fasta.push('\n');
                            }
                            from_registry.push(id.clone());
                        }
                        Err(err) => {
                            warn!(error = %err, part, "Could not retrieve from iGEM Registry");
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, url = %url, "Could not retrieve from SynBioHub");
                }
            }
        }

        if !fasta.is_empty() {
            match append_text(&fasta_cache, &fasta) {
                Ok(()) => retrieved.extend(from_registry),
                Err(err) => {
                    warn!(error = %err, cache = %fasta_cache, "could not write iGEM FASTA cache");
                }
            }
        }

        sink.event(ProgressEvent::new(format!(
            "Retrieved {} of {} iGEM parts",
            retrieved.len(),
            ids.len()
        )));
        retrieved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_url_uses_part_name() {
        let client =
            RegistryHttpClient::new("http://parts.igem.org/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.fasta_url("BBa_J23101"),
            "http://parts.igem.org/cgi/partsdb/composite_edit/putseq.cgi?part=BBa_J23101"
        );
    }

    #[test]
    fn sbol_url_appends_suffix() {
        assert_eq!(
            SynBioHubHttpClient::sbol_url("https://synbiohub.org/public/igem/BBa_J23101/"),
            "https://synbiohub.org/public/igem/BBa_J23101/sbol"
        );
    }
}
