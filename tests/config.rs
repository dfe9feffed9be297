use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use igem_parts_import::config::{CONFIG_FILE_NAME, ConfigLoader, SourceRule};
use igem_parts_import::domain::{NCBI_PREFIX, RetrieverKind};
use igem_parts_import::error::PartsError;

fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, root)
}

#[test]
fn package_config_is_picked_up() {
    let (_temp, root) = temp_root();
    fs::write(
        root.join(CONFIG_FILE_NAME),
        r#"{
  "schema_version": 1,
  "email": "lab@example.org",
  "sources": [
    "https://www.ncbi.nlm.nih.gov/nuccore/",
    { "prefix": "https://example.org/igem/", "retriever": "igem" }
  ],
  "genbank_cache_file": "ncbi.gb",
  "registry_timeout_secs": 2
}"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(None, &root).unwrap();
    assert_eq!(resolved.email, "lab@example.org");
    assert_eq!(
        resolved.sources,
        vec![
            SourceRule {
                prefix: NCBI_PREFIX.to_string(),
                retriever: RetrieverKind::Genbank,
            },
            SourceRule {
                prefix: "https://example.org/igem/".to_string(),
                retriever: RetrieverKind::Igem,
            },
        ]
    );
    assert_eq!(resolved.cache_files.genbank, "ncbi.gb");
    assert_eq!(resolved.registry_timeout, Duration::from_secs(2));
    assert_eq!(resolved.timeout, Duration::from_secs(60));
}

#[test]
fn unknown_retriever_is_rejected() {
    let (_temp, root) = temp_root();
    let path = root.join("custom.json");
    fs::write(
        &path,
        r#"{ "sources": [{ "prefix": "https://example.org/", "retriever": "addgene" }] }"#,
    )
    .unwrap();

    let err = ConfigLoader::resolve(Some(&path), &root).unwrap_err();
    assert_matches!(err, PartsError::UnknownRetriever { retriever, .. } if retriever == "addgene");
}

#[test]
fn shorthand_without_default_is_rejected() {
    let (_temp, root) = temp_root();
    let path = root.join("custom.json");
    fs::write(&path, r#"{ "sources": ["https://example.org/"] }"#).unwrap();

    let err = ConfigLoader::resolve(Some(&path), &root).unwrap_err();
    assert_matches!(err, PartsError::UnknownSource(prefix) if prefix == "https://example.org/");
}

#[test]
fn explicit_missing_config_is_an_error() {
    let (_temp, root) = temp_root();
    let path = root.join("absent.json");

    let err = ConfigLoader::resolve(Some(&path), &root).unwrap_err();
    assert_matches!(err, PartsError::ConfigRead(_));
}

#[test]
fn malformed_config_is_an_error() {
    let (_temp, root) = temp_root();
    fs::write(root.join(CONFIG_FILE_NAME), "{ not json").unwrap();

    let err = ConfigLoader::resolve(None, &root).unwrap_err();
    assert_matches!(err, PartsError::ConfigParse(_));
}
