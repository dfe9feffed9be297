use igem_parts_import::accession::{
    accession_to_ncbi_uri, accession_to_sbol_uri, ncbi_uri_to_accession, sbol_uri_to_accession,
};
use igem_parts_import::domain::NCBI_PREFIX;

#[test]
fn uri_round_trip() {
    let uris = [
        "https://www.ncbi.nlm.nih.gov/nuccore/JWYZ01000115_1",
        "https://www.ncbi.nlm.nih.gov/nuccore/PVOS01000173_1",
        "https://www.ncbi.nlm.nih.gov/nuccore/NC_000913_3",
    ];
    for uri in uris {
        let accession = sbol_uri_to_accession(uri, NCBI_PREFIX);
        assert_eq!(accession_to_sbol_uri(&accession, NCBI_PREFIX), uri);
    }
}

#[test]
fn accession_round_trip_without_underscores() {
    for accession in ["JWYZ01000115.1", "X1.1", "Y1"] {
        let uri = accession_to_ncbi_uri(accession);
        assert_eq!(ncbi_uri_to_accession(&uri), accession);
    }
}

#[test]
fn underscore_accessions_are_lossy() {
    let uri = accession_to_ncbi_uri("NC_000913.3");
    assert_eq!(uri, "https://www.ncbi.nlm.nih.gov/nuccore/NC_000913_3");
    assert_eq!(ncbi_uri_to_accession(&uri), "NC.000913.3");
}

#[test]
fn package_prefix_gets_trailing_slash() {
    assert_eq!(
        accession_to_sbol_uri("Y1", "https://github.com/iGEM-Engineering/iGEM-distribution/demo"),
        "https://github.com/iGEM-Engineering/iGEM-distribution/demo/Y1"
    );
}
