//! Read-only caches of vocabulary data consumed by the workspace.
//!
//! The [`TermCache`] maps term IRIs to their types, labels and scheme. The
//! [`RelationshipCatalog`] lists the relationship types that may appear as
//! link predicates. Both are populated elsewhere; the workspace and the view
//! layer only read them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::Iri;
use crate::model::LinkType;
use crate::vocab;

/// An alternative label in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AltLabel {
    pub label: String,
    pub language: String,
}

/// Cached description of one vocabulary term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Stereotype IRIs (`rdf:type`) of the term.
    pub types: Vec<Iri>,
    /// Preferred label per language code.
    pub labels: BTreeMap<String, String>,
    pub alt_labels: Vec<AltLabel>,
    pub definitions: BTreeMap<String, String>,
    /// Concept scheme (vocabulary) the term belongs to.
    pub in_scheme: Iri,
    pub domain: Option<Iri>,
    pub range: Option<Iri>,
}

impl Term {
    pub fn new(in_scheme: Iri) -> Self {
        Term {
            in_scheme,
            ..Term::default()
        }
    }

    pub fn with_type(mut self, ty: &str) -> Self {
        self.types.push(Iri::from(ty));
        self
    }

    pub fn with_label(mut self, language: &str, label: &str) -> Self {
        self.labels.insert(language.to_string(), label.to_string());
        self
    }

    pub fn has_type(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t.as_str() == ty)
    }

    /// The term reifies a relationship as a node.
    pub fn is_relationship_class(&self) -> bool {
        self.has_type(vocab::RELATIONSHIP_CLASS)
    }

    /// The term is a single-valued property class.
    pub fn is_property_class(&self) -> bool {
        self.has_type(vocab::PROPERTY_CLASS)
    }

    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(String::as_str)
    }

    pub fn alt_label(&self, language: &str) -> Option<&str> {
        self.alt_labels
            .iter()
            .find(|alt| alt.language == language)
            .map(|alt| alt.label.as_str())
    }
}

/// Term data keyed by IRI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermCache {
    terms: BTreeMap<Iri, Term>,
}

impl TermCache {
    pub fn new() -> Self {
        TermCache::default()
    }

    pub fn insert(&mut self, iri: Iri, term: Term) {
        self.terms.insert(iri, term);
    }

    /// Merges freshly fetched terms, replacing existing entries.
    pub fn extend(&mut self, terms: impl IntoIterator<Item = (Iri, Term)>) {
        self.terms.extend(terms);
    }

    pub fn get(&self, iri: &Iri) -> Option<&Term> {
        self.terms.get(iri)
    }

    pub fn contains(&self, iri: &Iri) -> bool {
        self.terms.contains_key(iri)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A relationship type that links may use as their predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipType {
    pub labels: BTreeMap<String, String>,
    pub in_scheme: Iri,
    pub kind: LinkType,
}

impl RelationshipType {
    pub fn new(in_scheme: Iri, kind: LinkType) -> Self {
        RelationshipType {
            labels: BTreeMap::new(),
            in_scheme,
            kind,
        }
    }

    pub fn with_label(mut self, language: &str, label: &str) -> Self {
        self.labels.insert(language.to_string(), label.to_string());
        self
    }
}

/// Catalog of recognized relationship types.
///
/// A type is *local* when its scheme lives under the project's own namespace
/// rather than in an imported read-only vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipCatalog {
    types: BTreeMap<Iri, RelationshipType>,
    local_scheme_prefix: String,
}

impl RelationshipCatalog {
    pub fn new(local_scheme_prefix: impl Into<String>) -> Self {
        RelationshipCatalog {
            types: BTreeMap::new(),
            local_scheme_prefix: local_scheme_prefix.into(),
        }
    }

    pub fn insert(&mut self, iri: Iri, ty: RelationshipType) {
        self.types.insert(iri, ty);
    }

    pub fn get(&self, iri: &Iri) -> Option<&RelationshipType> {
        self.types.get(iri)
    }

    pub fn is_recognized(&self, iri: &Iri) -> bool {
        self.types.contains_key(iri)
    }

    /// Recognized and scoped to the local project.
    pub fn is_local(&self, iri: &Iri) -> bool {
        !self.local_scheme_prefix.is_empty()
            && self
                .types
                .get(iri)
                .is_some_and(|ty| ty.in_scheme.starts_with(&self.local_scheme_prefix))
    }

    /// Recognized with the DEFAULT link type.
    pub fn is_default_kind(&self, iri: &Iri) -> bool {
        self.types
            .get(iri)
            .is_some_and(|ty| ty.kind == LinkType::Default)
    }

    pub fn label(&self, iri: &Iri, language: &str) -> Option<&str> {
        self.types
            .get(iri)
            .and_then(|ty| ty.labels.get(language))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Iri, &RelationshipType)> {
        self.types.iter()
    }
}
