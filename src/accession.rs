use crate::domain::NCBI_PREFIX;

// SBOL display ids carry the version "." as "_"; lossy for accessions containing "_".
pub fn sbol_uri_to_accession(uri: &str, prefix: &str) -> String {
    uri.strip_prefix(prefix).unwrap_or(uri).replace('_', ".")
}

pub fn accession_to_sbol_uri(accession: &str, prefix: &str) -> String {
    let accession = accession.replace('.', "_");
    if prefix.ends_with('/') {
        format!("{prefix}{accession}")
    } else {
        format!("{prefix}/{accession}")
    }
}

pub fn ncbi_uri_to_accession(uri: &str) -> String {
    sbol_uri_to_accession(uri, NCBI_PREFIX)
}

pub fn accession_to_ncbi_uri(accession: &str) -> String {
    accession_to_sbol_uri(accession, NCBI_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_and_restores_version() {
        let uri = "https://www.ncbi.nlm.nih.gov/nuccore/JWYZ01000115_1";
        assert_eq!(ncbi_uri_to_accession(uri), "JWYZ01000115.1");
    }

    #[test]
    fn unknown_prefix_passes_through() {
        assert_eq!(
            sbol_uri_to_accession("https://example.org/x_1", NCBI_PREFIX),
            "https://example.org/x.1"
        );
    }

    #[test]
    fn adds_missing_slash() {
        assert_eq!(
            accession_to_sbol_uri("Y1.2", "https://example.org/pkg"),
            "https://example.org/pkg/Y1_2"
        );
    }
}
