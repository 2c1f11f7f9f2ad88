//! Records held in the workspace pools: entities, links and diagrams.
//!
//! Per-diagram state is stored as explicit view records ([`EntityView`],
//! [`LinkView`]). A missing record reads as the deterministic default: an
//! entity that was never placed on a diagram is hidden and unpositioned, a
//! link that was never drawn has no vertices.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::cardinality::Cardinality;
use crate::geometry::{Point, Size, Vertices};
use crate::id::{DiagramId, EntityId, Iri, LinkId, PackageId};

/// Link type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    #[default]
    Default,
    Generalization,
}

/// How a diagram renders reified relationships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Relationship-class entities are nodes with two structural edges.
    #[default]
    Full,
    /// Relationship-class entities collapse into one direct edge.
    Compact,
}

/// State of one entity on one diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub position: Option<Point>,
    pub hidden: bool,
}

impl Default for EntityView {
    fn default() -> Self {
        EntityView {
            position: None,
            hidden: true,
        }
    }
}

/// A workspace element placed from the term cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Term reference. Immutable once set.
    pub iri: Iri,
    /// Soft-delete flag.
    pub active: bool,
    pub package: PackageId,
    /// Active links touching this entity, outgoing and incoming, in creation order.
    pub(crate) connections: Vec<LinkId>,
    pub(crate) views: BTreeMap<DiagramId, EntityView>,
    /// Diagrams the entity has ever appeared on.
    pub diagrams: BTreeSet<DiagramId>,
    /// Display-label override per language code.
    pub selected_label: BTreeMap<String, String>,
    /// Bounding box measured by the renderer, if known.
    pub size: Option<Size>,
}

impl Entity {
    pub(crate) fn new(iri: Iri, package: PackageId) -> Self {
        Entity {
            iri,
            active: true,
            package,
            connections: Vec::new(),
            views: BTreeMap::new(),
            diagrams: BTreeSet::new(),
            selected_label: BTreeMap::new(),
            size: None,
        }
    }

    pub fn connections(&self) -> &[LinkId] {
        &self.connections
    }

    pub fn view(&self, diagram: DiagramId) -> EntityView {
        self.views.get(&diagram).copied().unwrap_or_default()
    }

    pub fn position(&self, diagram: DiagramId) -> Option<Point> {
        self.view(diagram).position
    }

    pub fn is_hidden(&self, diagram: DiagramId) -> bool {
        self.view(diagram).hidden
    }

    /// Active and not hidden on `diagram`.
    pub fn is_visible(&self, diagram: DiagramId) -> bool {
        self.active && !self.is_hidden(diagram)
    }

    pub(crate) fn view_mut(&mut self, diagram: DiagramId) -> &mut EntityView {
        self.views.entry(diagram).or_default()
    }
}

/// State of one link on one diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkView {
    pub vertices: Vertices,
    pub drawn: bool,
}

/// A relationship instance between two entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Predicate or relationship-type reference.
    pub iri: Iri,
    pub source: EntityId,
    pub target: EntityId,
    pub source_cardinality: Cardinality,
    pub target_cardinality: Cardinality,
    pub kind: LinkType,
    pub active: bool,
    pub(crate) views: BTreeMap<DiagramId, LinkView>,
}

impl Link {
    pub(crate) fn new(iri: Iri, source: EntityId, target: EntityId, kind: LinkType) -> Self {
        Link {
            iri,
            source,
            target,
            source_cardinality: Cardinality::none(),
            target_cardinality: Cardinality::none(),
            kind,
            active: true,
            views: BTreeMap::new(),
        }
    }

    /// Stored routing waypoints on `diagram`; empty when none were stored.
    pub fn vertices(&self, diagram: DiagramId) -> &[Point] {
        self.views
            .get(&diagram)
            .map(|v| v.vertices.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_drawn(&self, diagram: DiagramId) -> bool {
        self.views.get(&diagram).is_some_and(|v| v.drawn)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn touches(&self, entity: EntityId) -> bool {
        self.source == entity || self.target == entity
    }

    /// The endpoint opposite to `entity`.
    pub fn other_end(&self, entity: EntityId) -> EntityId {
        if self.source == entity {
            self.target
        } else {
            self.source
        }
    }

    /// Diagrams on which this link has stored state.
    pub fn view_diagrams(&self) -> impl Iterator<Item = DiagramId> + '_ {
        self.views.keys().copied()
    }

    pub(crate) fn view_mut(&mut self, diagram: DiagramId) -> &mut LinkView {
        self.views.entry(diagram).or_default()
    }
}

/// Viewport of a diagram. Only carried through persistence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub origin: Point,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            origin: Point::default(),
            scale: 1.0,
        }
    }
}

/// A named view over the shared workspace graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagram {
    pub name: String,
    pub representation: Representation,
    pub active: bool,
    pub viewport: Viewport,
    /// Entities hidden by the last collapse, awaiting expansion.
    pub(crate) collapsed: BTreeSet<EntityId>,
}

impl Diagram {
    pub(crate) fn new(name: String) -> Self {
        Diagram {
            name,
            representation: Representation::Full,
            active: true,
            viewport: Viewport::default(),
            collapsed: BTreeSet::new(),
        }
    }

    pub fn collapsed(&self) -> &BTreeSet<EntityId> {
        &self.collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unplaced_entity_reads_as_hidden() {
        let entity = Entity::new(Iri::from("urn:a"), PackageId(0));
        assert!(entity.is_hidden(DiagramId(3)));
        assert!(!entity.is_visible(DiagramId(3)));
        assert_eq!(entity.position(DiagramId(3)), None);
    }

    #[test]
    fn undrawn_link_has_no_vertices() {
        let link = Link::new(Iri::from("urn:p"), EntityId(0), EntityId(0), LinkType::Default);
        assert!(link.vertices(DiagramId(0)).is_empty());
        assert!(!link.is_drawn(DiagramId(0)));
        assert!(link.is_self_loop());
    }

    #[test]
    fn other_end() {
        let link = Link::new(Iri::from("urn:p"), EntityId(1), EntityId(2), LinkType::Default);
        assert_eq!(link.other_end(EntityId(1)), EntityId(2));
        assert_eq!(link.other_end(EntityId(2)), EntityId(1));
        assert!(link.touches(EntityId(2)));
        assert!(!link.touches(EntityId(3)));
    }

    #[test]
    fn link_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LinkType::Generalization).unwrap(), "\"generalization\"");
        assert_eq!(serde_json::to_string(&Representation::Compact).unwrap(), "\"compact\"");
    }
}
