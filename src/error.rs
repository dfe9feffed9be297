use camino::Utf8PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PartsError {
    #[error("package directory not found: {0}")]
    PackageNotFound(Utf8PathBuf),

    #[error("package specification not found at {0}")]
    #[diagnostic(help("export the package specification before importing parts"))]
    MissingSpecification(Utf8PathBuf),

    #[error("collection {collection} not found in package specification {path}")]
    MissingCollection {
        collection: String,
        path: Utf8PathBuf,
    },

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("unknown retriever for source {prefix}: {retriever}")]
    UnknownRetriever { prefix: String, retriever: String },

    #[error("no default retriever for source prefix: {0}")]
    UnknownSource(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(Utf8PathBuf),

    #[error("failed to parse {path}: {message}")]
    Parse { path: Utf8PathBuf, message: String },

    #[error("NCBI request failed: {0}")]
    NcbiHttp(String),

    #[error("NCBI returned status {status}: {message}")]
    NcbiStatus { status: u16, message: String },

    #[error("SynBioHub request failed: {0}")]
    SynBioHubHttp(String),

    #[error("SynBioHub returned status {status}: {message}")]
    SynBioHubStatus { status: u16, message: String },

    #[error("iGEM Registry request failed: {0}")]
    RegistryHttp(String),

    #[error("iGEM Registry returned status {status}: {message}")]
    RegistryStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl PartsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PartsError::SynBioHubStatus { status: 404, .. })
    }

    pub fn parse(path: impl Into<Utf8PathBuf>, err: impl ToString) -> Self {
        PartsError::Parse {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
