use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PartsError;

pub const NCBI_PREFIX: &str = "https://www.ncbi.nlm.nih.gov/nuccore/";
pub const SYNBIOHUB_PREFIX: &str = "https://synbiohub.org";
pub const IGEM_REGISTRY_PREFIX: &str = "http://parts.igem.org";

pub const DEFAULT_NAMESPACE_BASE: &str = "https://github.com/iGEM-Engineering/iGEM-distribution/";

pub const GENBANK_CACHE_FILE: &str = "GenBank_imports.gb";
pub const IGEM_SBOL2_CACHE_FILE: &str = "iGEM_SBOL2_imports.xml";
pub const IGEM_FASTA_CACHE_FILE: &str = "iGEM_raw_imports.fasta";

pub const EXPORT_DIRECTORY: &str = "export";
pub const SBOL_EXPORT_NAME: &str = "package_specification.nt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverKind {
    Genbank,
    Igem,
}

impl RetrieverKind {
    pub fn default_for_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            NCBI_PREFIX => Some(RetrieverKind::Genbank),
            SYNBIOHUB_PREFIX | IGEM_REGISTRY_PREFIX => Some(RetrieverKind::Igem),
            _ => None,
        }
    }
}

impl fmt::Display for RetrieverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrieverKind::Genbank => write!(f, "genbank"),
            RetrieverKind::Igem => write!(f, "igem"),
        }
    }
}

impl FromStr for RetrieverKind {
    type Err = PartsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "genbank" | "ncbi" => Ok(RetrieverKind::Genbank),
            "igem" | "synbiohub" => Ok(RetrieverKind::Igem),
            other => Err(PartsError::UnknownRetriever {
                prefix: String::new(),
                retriever: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Package {
    root: Utf8PathBuf,
    stem: String,
}

impl Package {
    pub fn new(root: impl Into<Utf8PathBuf>, namespace_base: &str) -> Self {
        let root = root.into();
        let stem = package_stem(&root, namespace_base);
        Self { root, stem }
    }

    pub fn open(root: impl Into<Utf8PathBuf>, namespace_base: &str) -> Result<Self, PartsError> {
        let package = Self::new(root, namespace_base);
        if !package.root.is_dir() {
            return Err(PartsError::PackageNotFound(package.root));
        }
        Ok(package)
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn name(&self) -> &str {
        self.root.file_name().unwrap_or(self.root.as_str())
    }

    pub fn file(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub fn specification_path(&self) -> Utf8PathBuf {
        self.root.join(EXPORT_DIRECTORY).join(SBOL_EXPORT_NAME)
    }
}

pub fn package_stem(root: &Utf8Path, namespace_base: &str) -> String {
    let name = root.file_name().unwrap_or(root.as_str());
    let base = namespace_base.trim_end_matches('/');
    format!("{base}/{name}/")
}

pub fn igem_part_name(uri: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"(?:Part:)?(?P<name>[A-Za-z0-9_\-]+)(?:/\d+)?/?$")
            .expect("part name pattern is valid")
    });
    pattern
        .captures(uri)
        .and_then(|caps| caps.name("name"))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_uses_directory_name() {
        let package = Package::new("distribution/Anderson Promoters", DEFAULT_NAMESPACE_BASE);
        assert_eq!(
            package.stem(),
            "https://github.com/iGEM-Engineering/iGEM-distribution/Anderson Promoters/"
        );
        assert_eq!(package.name(), "Anderson Promoters");
    }

    #[test]
    fn stem_tolerates_base_without_slash() {
        let stem = package_stem(Utf8Path::new("pkgs/demo"), "https://example.org/ns");
        assert_eq!(stem, "https://example.org/ns/demo/");
    }

    #[test]
    fn part_names_from_uris() {
        assert_eq!(
            igem_part_name("https://synbiohub.org/public/igem/BBa_J23101/1"),
            Some("BBa_J23101")
        );
        assert_eq!(
            igem_part_name("https://synbiohub.org/public/igem/pSB1C3"),
            Some("pSB1C3")
        );
        assert_eq!(
            igem_part_name("http://parts.igem.org/Part:BBa_K1234567"),
            Some("BBa_K1234567")
        );
        assert_eq!(igem_part_name("https://synbiohub.org/public/igem/%%"), None);
    }

    #[test]
    fn default_retrievers() {
        assert_eq!(
            RetrieverKind::default_for_prefix(NCBI_PREFIX),
            Some(RetrieverKind::Genbank)
        );
        assert_eq!(
            RetrieverKind::default_for_prefix(IGEM_REGISTRY_PREFIX),
            Some(RetrieverKind::Igem)
        );
        assert_eq!(RetrieverKind::default_for_prefix("https://example.org"), None);
    }
}
