pub mod accession;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod fs_util;
pub mod igem;
pub mod inventory;
pub mod ncbi;
pub mod output;
pub mod sbol;
pub mod seqio;
pub mod sources;
pub mod specification;

pub use accession::{accession_to_sbol_uri, sbol_uri_to_accession};
pub use app::{App, ImportReport};
pub use domain::Package;
pub use error::PartsError;
pub use inventory::package_parts_inventory;
pub use sources::{PartRetriever, SourceRegistry};
