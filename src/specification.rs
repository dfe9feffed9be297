use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::domain::Package;
use crate::error::PartsError;
use crate::sbol::{
    Graph, Node, RdfSyntax, SBOL3_COLLECTION, SBOL3_DISPLAY_ID, SBOL3_HAS_SEQUENCE, SBOL3_MEMBER,
};

pub const BASIC_PARTS_COLLECTION: &str = "BasicParts";
pub const COMPOSITE_PARTS_COLLECTION: &str = "CompositeParts";
pub const LINEAR_PRODUCTS_COLLECTION: &str = "LinearDNAProducts";
pub const FINAL_PRODUCTS_COLLECTION: &str = "FinalProducts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredPart {
    pub identity: String,
    pub has_sequence: bool,
}

#[derive(Debug)]
pub struct PackageSpecification {
    path: Utf8PathBuf,
    graph: Graph,
}

impl PackageSpecification {
    pub fn load(package: &Package) -> Result<Self, PartsError> {
        Self::read(&package.specification_path())
    }

    pub fn read(path: &Utf8Path) -> Result<Self, PartsError> {
        if !path.is_file() {
            return Err(PartsError::MissingSpecification(path.to_path_buf()));
        }
        let syntax = RdfSyntax::from_path(path)
            .ok_or_else(|| PartsError::UnsupportedFormat(path.to_path_buf()))?;
        let graph = Graph::read(path, syntax)?;
        Ok(Self::from_graph(path, graph))
    }

    pub fn from_graph(path: impl Into<Utf8PathBuf>, graph: Graph) -> Self {
        Self {
            path: path.into(),
            graph,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn collection(&self, name: &str) -> Option<&str> {
        self.graph
            .subjects_of_type(SBOL3_COLLECTION)
            .into_iter()
            .find(|subject| {
                let named = self
                    .graph
                    .objects(subject, SBOL3_DISPLAY_ID)
                    .any(|node| node.as_str() == name);
                named || subject.trim_end_matches('/').rsplit('/').next() == Some(name)
            })
    }

    pub fn members(&self, collection: &str) -> Result<Vec<DeclaredPart>, PartsError> {
        let identity =
            self.collection(collection)
                .ok_or_else(|| PartsError::MissingCollection {
                    collection: collection.to_string(),
                    path: self.path.clone(),
                })?;

        let mut seen = HashSet::new();
        Ok(self
            .graph
            .objects(identity, SBOL3_MEMBER)
            .filter_map(|node| match node {
                Node::Iri(iri) | Node::Literal(iri) => Some(iri.as_str()),
                Node::Blank(_) => None,
            })
            .filter(|member| seen.insert(*member))
            .map(|member| DeclaredPart {
                identity: member.to_string(),
                has_sequence: self.graph.has_property(member, SBOL3_HAS_SEQUENCE),
            })
            .collect())
    }

    pub fn basic_parts(&self) -> Result<Vec<DeclaredPart>, PartsError> {
        self.members(BASIC_PARTS_COLLECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = "\
<https://example.org/pkg/BasicParts> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://sbols.org/v3#Collection> .
<https://example.org/pkg/BasicParts> <http://sbols.org/v3#displayId> \"BasicParts\" .
<https://example.org/pkg/BasicParts> <http://sbols.org/v3#member> <https://example.org/pkg/A> .
<https://example.org/pkg/BasicParts> <http://sbols.org/v3#member> <https://example.org/pkg/B> .
<https://example.org/pkg/A> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://sbols.org/v3#Component> .
<https://example.org/pkg/A> <http://sbols.org/v3#hasSequence> <https://example.org/pkg/A_seq> .
<https://example.org/pkg/B> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://sbols.org/v3#Component> .
";

    fn spec() -> PackageSpecification {
        let graph = Graph::from_reader(SPEC.as_bytes(), RdfSyntax::NTriples).unwrap();
        PackageSpecification::from_graph("package_specification.nt", graph)
    }

    #[test]
    fn basic_parts_record_sequence_presence() {
        let parts = spec().basic_parts().unwrap();
        assert_eq!(
            parts,
            vec![
                DeclaredPart {
                    identity: "https://example.org/pkg/A".to_string(),
                    has_sequence: true,
                },
                DeclaredPart {
                    identity: "https://example.org/pkg/B".to_string(),
                    has_sequence: false,
                },
            ]
        );
    }

    #[test]
    fn missing_collection_is_an_error() {
        let err = spec().members(FINAL_PRODUCTS_COLLECTION).unwrap_err();
        assert!(matches!(err, PartsError::MissingCollection { .. }));
    }
}
