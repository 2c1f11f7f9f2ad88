//! Reserved vocabulary IRIs that drive representation switching.

/// Namespace of the foundational vocabulary.
pub const Z_SGOV_POJEM: &str = "https://slovník.gov.cz/základní/pojem/";

/// Type of terms that reify a relationship as a node.
pub const RELATIONSHIP_CLASS: &str = "https://slovník.gov.cz/základní/pojem/typ-vztahu";

/// Type of single-valued property terms.
pub const PROPERTY_CLASS: &str = "https://slovník.gov.cz/základní/pojem/typ-vlastnosti";

/// Structural property pointing from a reified relationship to its first element.
pub const RELATED_ELEMENT_1: &str = "https://slovník.gov.cz/základní/pojem/má-vztažený-prvek-1";

/// Structural property pointing from a reified relationship to its second element.
pub const RELATED_ELEMENT_2: &str = "https://slovník.gov.cz/základní/pojem/má-vztažený-prvek-2";

/// Entity-to-property link.
pub const HAS_PROPERTY: &str = "https://slovník.gov.cz/základní/pojem/má-vlastnost";

/// Property-to-entity link.
pub const IS_PROPERTY_OF: &str = "https://slovník.gov.cz/základní/pojem/je-vlastností";

/// Default namespace of the application vocabulary used in persisted records.
pub const OG: &str = "http://onto.fel.cvut.cz/ontologies/application/ontoGrapher/";

/// Returns `true` for the two structural predicates of a reified relationship.
pub fn is_structural(predicate: &str) -> bool {
    predicate == RELATED_ELEMENT_1 || predicate == RELATED_ELEMENT_2
}
