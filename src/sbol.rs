use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};

use camino::Utf8Path;
use oxrdf::{Quad, Term};
use oxrdfio::{JsonLdProfileSet, RdfFormat, RdfParseError, RdfParser, RdfSerializer};

use crate::error::PartsError;
use crate::fs_util::write_bytes_atomic;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const SBOL2_NS: &str = "http://sbols.org/v2#";
pub const SBOL3_NS: &str = "http://sbols.org/v3#";

pub const SBOL2_COMPONENT_DEFINITION: &str = "http://sbols.org/v2#ComponentDefinition";
pub const SBOL2_PERSISTENT_IDENTITY: &str = "http://sbols.org/v2#persistentIdentity";
pub const SBOL3_COMPONENT: &str = "http://sbols.org/v3#Component";
pub const SBOL3_COLLECTION: &str = "http://sbols.org/v3#Collection";
pub const SBOL3_MEMBER: &str = "http://sbols.org/v3#member";
pub const SBOL3_HAS_SEQUENCE: &str = "http://sbols.org/v3#hasSequence";
pub const SBOL3_DISPLAY_ID: &str = "http://sbols.org/v3#displayId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfSyntax {
    NTriples,
    RdfXml,
    Turtle,
    JsonLd,
}

impl RdfSyntax {
    pub const SBOL3: [RdfSyntax; 4] = [
        RdfSyntax::NTriples,
        RdfSyntax::RdfXml,
        RdfSyntax::Turtle,
        RdfSyntax::JsonLd,
    ];

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            RdfSyntax::NTriples => &["nt"],
            RdfSyntax::RdfXml => &["rdf"],
            RdfSyntax::Turtle => &["ttl"],
            RdfSyntax::JsonLd => &["json", "jsonld"],
        }
    }

    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        let ext = path.extension()?;
        match ext {
            "xml" => Some(RdfSyntax::RdfXml),
            _ => Self::SBOL3
                .into_iter()
                .find(|syntax| syntax.extensions().contains(&ext)),
        }
    }

    fn rdf_format(self) -> RdfFormat {
        match self {
            RdfSyntax::NTriples => RdfFormat::NTriples,
            RdfSyntax::RdfXml => RdfFormat::RdfXml,
            RdfSyntax::Turtle => RdfFormat::Turtle,
            RdfSyntax::JsonLd => RdfFormat::JsonLd {
                profile: JsonLdProfileSet::empty(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Iri(String),
    Blank(String),
    Literal(String),
}

impl Node {
    pub fn as_str(&self) -> &str {
        match self {
            Node::Iri(value) | Node::Blank(value) | Node::Literal(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub subject: String,
    pub predicate: String,
    pub object: Node,
}

#[derive(Debug, Default)]
pub struct Graph {
    statements: Vec<Statement>,
}

impl Graph {
    pub fn read(path: &Utf8Path, syntax: RdfSyntax) -> Result<Self, PartsError> {
        let file = File::open(path).map_err(|err| PartsError::parse(path, err))?;
        Self::from_reader(BufReader::new(file), syntax).map_err(|err| PartsError::parse(path, err))
    }

    pub fn from_reader<R: Read>(reader: R, syntax: RdfSyntax) -> Result<Self, String> {
        let quads = parse_quads(reader, syntax.rdf_format()).map_err(|err| err.to_string())?;
        Ok(Self {
            statements: quads.iter().map(statement).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn subjects_of_type(&self, type_iri: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.statements
            .iter()
            .filter(|st| st.predicate == RDF_TYPE && st.object.as_str() == type_iri)
            .map(|st| st.subject.as_str())
            .filter(|subject| seen.insert(*subject))
            .collect()
    }

    pub fn objects<'a>(
        &'a self,
        subject: &'a str,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.statements
            .iter()
            .filter(move |st| st.subject == subject && st.predicate == predicate)
            .map(|st| &st.object)
    }

    pub fn has_property(&self, subject: &str, predicate: &str) -> bool {
        self.objects(subject, predicate).next().is_some()
    }
}

pub fn sbol2_component_definitions(path: &Utf8Path) -> Result<Vec<String>, PartsError> {
    let graph = Graph::read(path, RdfSyntax::RdfXml)?;
    Ok(graph
        .subjects_of_type(SBOL2_COMPONENT_DEFINITION)
        .into_iter()
        .map(|subject| {
            graph
                .objects(subject, SBOL2_PERSISTENT_IDENTITY)
                .next()
                .map(|node| node.as_str())
                .unwrap_or(subject)
                .to_string()
        })
        .collect())
}

pub fn sbol3_components(path: &Utf8Path, syntax: RdfSyntax) -> Result<Vec<String>, PartsError> {
    let graph = Graph::read(path, syntax)?;
    Ok(graph
        .subjects_of_type(SBOL3_COMPONENT)
        .into_iter()
        .map(str::to_string)
        .collect())
}

// RDF/XML cannot be appended to; the cache is re-serialized with new triples added.
pub fn merge_sbol2_document(cache: &Utf8Path, document: &[u8]) -> Result<usize, PartsError> {
    let incoming = parse_quads(document, RdfFormat::RdfXml).map_err(|err| PartsError::Parse {
        path: cache.to_path_buf(),
        message: format!("incoming document: {err}"),
    })?;

    let mut merged = if cache.exists() {
        let file = File::open(cache).map_err(|err| PartsError::parse(cache, err))?;
        parse_quads(BufReader::new(file), RdfFormat::RdfXml)
            .map_err(|err| PartsError::parse(cache, err))?
    } else {
        Vec::new()
    };

    let mut seen: HashSet<Quad> = merged.iter().cloned().collect();
    let mut added = 0;
    for quad in incoming {
        if seen.insert(quad.clone()) {
            merged.push(quad);
            added += 1;
        }
    }

    let mut serializer = RdfSerializer::from_format(RdfFormat::RdfXml).for_writer(Vec::new());
    for quad in &merged {
        serializer
            .serialize_quad(quad)
            .map_err(|err| PartsError::Filesystem(err.to_string()))?;
    }
    let content = serializer
        .finish()
        .map_err(|err| PartsError::Filesystem(err.to_string()))?;
    write_bytes_atomic(cache, &content)?;
    Ok(added)
}

fn parse_quads<R: Read>(reader: R, format: RdfFormat) -> Result<Vec<Quad>, RdfParseError> {
    RdfParser::from_format(format).for_reader(reader).collect()
}

fn statement(quad: &Quad) -> Statement {
    let subject = match Term::from(quad.subject.clone()) {
        Term::NamedNode(node) => node.into_string(),
        other => other.to_string(),
    };
    let object = match &quad.object {
        Term::NamedNode(node) => Node::Iri(node.as_str().to_string()),
        Term::Literal(literal) => Node::Literal(literal.value().to_string()),
        other => Node::Blank(other.to_string()),
    };
    Statement {
        subject,
        predicate: quad.predicate.as_str().to_string(),
        object,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SBOL2_DOC: &str = r#"<?xml version="1.0" ?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:sbol="http://sbols.org/v2#">
  <sbol:ComponentDefinition rdf:about="https://synbiohub.org/public/igem/BBa_J23101/1">
    <sbol:persistentIdentity rdf:resource="https://synbiohub.org/public/igem/BBa_J23101"/>
    <sbol:displayId>BBa_J23101</sbol:displayId>
  </sbol:ComponentDefinition>
</rdf:RDF>
"#;

    #[test]
    fn ntriples_components() {
        let doc = "<https://example.org/pkg/A> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://sbols.org/v3#Component> .\n\
                   <https://example.org/pkg/A> <http://sbols.org/v3#displayId> \"A\" .\n";
        let graph = Graph::from_reader(doc.as_bytes(), RdfSyntax::NTriples).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(
            graph.subjects_of_type(SBOL3_COMPONENT),
            vec!["https://example.org/pkg/A"]
        );
    }

    #[test]
    fn sbol2_prefers_persistent_identity() {
        let graph = Graph::from_reader(SBOL2_DOC.as_bytes(), RdfSyntax::RdfXml).unwrap();
        let subjects = graph.subjects_of_type(SBOL2_COMPONENT_DEFINITION);
        assert_eq!(subjects, vec!["https://synbiohub.org/public/igem/BBa_J23101/1"]);
        let persistent = graph
            .objects(subjects[0], SBOL2_PERSISTENT_IDENTITY)
            .next()
            .unwrap();
        assert_eq!(persistent.as_str(), "https://synbiohub.org/public/igem/BBa_J23101");
    }

    #[test]
    fn json_ld_expanded_and_compact() {
        let expanded = r#"[{"@id": "https://example.org/pkg/A",
            "@type": ["http://sbols.org/v3#Component"]}]"#;
        let graph = Graph::from_reader(expanded.as_bytes(), RdfSyntax::JsonLd).unwrap();
        assert_eq!(
            graph.subjects_of_type(SBOL3_COMPONENT),
            vec!["https://example.org/pkg/A"]
        );

        let compact = r#"{"@context": {
              "@vocab": "http://sbols.org/v3#",
              "sbol": "http://sbols.org/v3#",
              "ex": "https://example.org/pkg/",
              "hasSequence": {"@id": "sbol:hasSequence", "@type": "@id"}
            },
            "@graph": [
              {"@id": "ex:B", "@type": "sbol:Component", "hasSequence": "ex:B_seq"},
              {"@id": "ex:C", "@type": "Component"},
              {"@id": "ex:B_seq", "@type": "Sequence"}
            ]}"#;
        let graph = Graph::from_reader(compact.as_bytes(), RdfSyntax::JsonLd).unwrap();
        assert_eq!(
            graph.subjects_of_type(SBOL3_COMPONENT),
            vec!["https://example.org/pkg/B", "https://example.org/pkg/C"]
        );
        assert!(graph.has_property("https://example.org/pkg/B", SBOL3_HAS_SEQUENCE));
    }

    #[test]
    fn syntax_from_extension() {
        assert_eq!(
            RdfSyntax::from_path(Utf8Path::new("a/b.jsonld")),
            Some(RdfSyntax::JsonLd)
        );
        assert_eq!(
            RdfSyntax::from_path(Utf8Path::new("a/b.xml")),
            Some(RdfSyntax::RdfXml)
        );
        assert_eq!(RdfSyntax::from_path(Utf8Path::new("a/b.gb")), None);
    }

    #[test]
    fn merge_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let root = camino::Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let cache = root.join("iGEM_SBOL2_imports.xml");

        let first = merge_sbol2_document(&cache, SBOL2_DOC.as_bytes()).unwrap();
        let second = merge_sbol2_document(&cache, SBOL2_DOC.as_bytes()).unwrap();
        assert_eq!(first, 3);
        assert_eq!(second, 0);
        assert_eq!(
            sbol2_component_definitions(&cache).unwrap(),
            vec!["https://synbiohub.org/public/igem/BBa_J23101"]
        );
    }
}
