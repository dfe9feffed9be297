use tracing::debug;

use crate::accession::accession_to_sbol_uri;
use crate::config::CONFIG_FILE_NAME;
use crate::domain::{GENBANK_CACHE_FILE, NCBI_PREFIX, Package};
use crate::error::PartsError;
use crate::fs_util::files_with_extensions;
use crate::sbol::{RdfSyntax, sbol2_component_definitions, sbol3_components};
use crate::seqio::{read_fasta_ids, read_genbank_ids};

pub const FASTA_EXTENSIONS: &[&str] = &["fasta", "fa"];
pub const GENBANK_EXTENSIONS: &[&str] = &["genbank", "gb"];
pub const SBOL2_EXTENSIONS: &[&str] = &["xml"];

pub fn package_parts_inventory(package: &Package) -> Result<Vec<String>, PartsError> {
    scan_inventory(package, GENBANK_CACHE_FILE)
}

pub fn scan_inventory(
    package: &Package,
    genbank_cache_file: &str,
) -> Result<Vec<String>, PartsError> {
    let mut inventory = Vec::new();
    let root = package.root();

    for file in files_with_extensions(root, FASTA_EXTENSIONS)? {
        let ids = read_fasta_ids(&file)?;
        debug!(file = %file, records = ids.len(), "scanned FASTA");
        inventory.extend(
            ids.iter()
                .map(|id| accession_to_sbol_uri(id, package.stem())),
        );
    }

    for file in files_with_extensions(root, GENBANK_EXTENSIONS)? {
        let is_ncbi_cache = file.file_name() == Some(genbank_cache_file);
        let prefix = if is_ncbi_cache {
            NCBI_PREFIX
        } else {
            package.stem()
        };
        let ids = read_genbank_ids(&file)?;
        debug!(file = %file, records = ids.len(), is_ncbi_cache, "scanned GenBank");
        inventory.extend(ids.iter().map(|id| accession_to_sbol_uri(id, prefix)));
    }

    for file in files_with_extensions(root, SBOL2_EXTENSIONS)? {
        let ids = sbol2_component_definitions(&file)?;
        debug!(file = %file, components = ids.len(), "scanned SBOL2");
        inventory.extend(ids);
    }

    for syntax in RdfSyntax::SBOL3 {
        for file in files_with_extensions(root, syntax.extensions())? {
            if file.file_name() == Some(CONFIG_FILE_NAME) {
                continue;
            }
            let ids = sbol3_components(&file, syntax)?;
            debug!(file = %file, components = ids.len(), ?syntax, "scanned SBOL3");
            inventory.extend(ids);
        }
    }

    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_NAMESPACE_BASE;
    use camino::Utf8PathBuf;

    #[test]
    fn empty_directory_has_no_parts() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let package = Package::new(root, DEFAULT_NAMESPACE_BASE);
        assert!(package_parts_inventory(&package).unwrap().is_empty());
    }
}
