//! Workspace: the authoritative pools of entities, links and diagrams.
//!
//! [`Workspace`] is the single owner of all workspace state for one open
//! project. Entities and links live in a `StableGraph` so that ids stay valid
//! forever; nothing is ever physically removed, only deactivated.
//!
//! # Connections invariant
//!
//! A link id is present in the `connections` of both its endpoints exactly
//! while the link is active, and an active link always has two active
//! endpoints. Every mutation below preserves this; debug builds re-check it
//! after each structural change.

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use crate::cardinality::Cardinality;
use crate::error::CoreError;
use crate::geometry::{Point, Size, Vertices};
use crate::id::{DiagramId, EntityId, Iri, LinkId, PackageId};
use crate::model::{Diagram, Entity, Link, LinkType, Representation, Viewport};
use crate::package::PackageTree;
use crate::terms::{RelationshipCatalog, TermCache};
use crate::vocab;

/// Text drawn along a link: the centre label and the two cardinality labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkLabels {
    pub centre: String,
    pub source: String,
    pub target: String,
}

/// The workspace graph shared by every diagram of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    /// Entities as nodes, links as edges.
    graph: StableGraph<Entity, Link, Directed, u32>,
    /// Diagrams indexed by `DiagramId`.
    diagrams: Vec<Diagram>,
    /// Display grouping of entities.
    pub packages: PackageTree,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace::default()
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    /// Returns a read-only reference to the entity/link graph.
    pub fn graph(&self) -> &StableGraph<Entity, Link, Directed, u32> {
        &self.graph
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity, CoreError> {
        self.graph
            .node_weight(id.into())
            .ok_or(CoreError::EntityNotFound { id })
    }

    pub fn link(&self, id: LinkId) -> Result<&Link, CoreError> {
        self.graph
            .edge_weight(id.into())
            .ok_or(CoreError::LinkNotFound { id })
    }

    pub fn diagram(&self, id: DiagramId) -> Result<&Diagram, CoreError> {
        self.diagrams
            .get(id.index())
            .ok_or(CoreError::DiagramNotFound { id })
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.graph
            .node_indices()
            .map(move |idx| (EntityId::from(idx), &self.graph[idx]))
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.graph
            .edge_indices()
            .map(move |idx| (LinkId::from(idx), &self.graph[idx]))
    }

    pub fn diagrams(&self) -> impl Iterator<Item = (DiagramId, &Diagram)> {
        self.diagrams
            .iter()
            .enumerate()
            .map(|(i, d)| (DiagramId(i as u32), d))
    }

    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn diagram_count(&self) -> usize {
        self.diagrams.len()
    }

    /// First active entity placed from `iri`.
    pub fn find_entity(&self, iri: &Iri) -> Option<EntityId> {
        self.entities()
            .find(|(_, e)| e.active && &e.iri == iri)
            .map(|(id, _)| id)
    }

    /// Active link with predicate `iri` running from `source` to `target`.
    pub fn find_link(&self, iri: &Iri, source: EntityId, target: EntityId) -> Option<LinkId> {
        let source_idx: NodeIndex<u32> = source.into();
        self.graph.node_weight(source_idx)?;
        self.graph
            .edges_directed(source_idx, Direction::Outgoing)
            .find(|e| {
                let link = e.weight();
                link.active && &link.iri == iri && link.target == target
            })
            .map(|e| LinkId::from(e.id()))
    }

    pub fn connections(&self, id: EntityId) -> Result<&[LinkId], CoreError> {
        Ok(self.entity(id)?.connections())
    }

    /// Active links whose source is `id`, in creation order.
    pub fn active_outgoing(&self, id: EntityId) -> Result<Vec<LinkId>, CoreError> {
        let entity = self.entity(id)?;
        Ok(entity
            .connections
            .iter()
            .copied()
            .filter(|l| self.graph[EdgeIndex::from(*l)].source == id)
            .collect())
    }

    /// Every active link touching `id`, in creation order.
    pub fn links_touching(&self, id: EntityId) -> Result<Vec<LinkId>, CoreError> {
        let idx: NodeIndex<u32> = id.into();
        self.entity(id)?;
        let mut links: Vec<LinkId> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .filter(|e| e.weight().active)
            .map(|e| LinkId::from(e.id()))
            .collect();
        links.sort();
        links.dedup();
        Ok(links)
    }

    /// Display label of an entity in `language`.
    ///
    /// Falls back from the entity's selected label to the term's alternative
    /// label, then to its preferred label. Never mutates the workspace.
    pub fn label(&self, id: EntityId, language: &str, terms: &TermCache) -> Result<String, CoreError> {
        let entity = self.entity(id)?;
        if let Some(label) = entity.selected_label.get(language).filter(|l| !l.is_empty()) {
            return Ok(label.clone());
        }
        let term = terms
            .get(&entity.iri)
            .ok_or_else(|| CoreError::TermNotFound {
                iri: entity.iri.clone(),
            })?;
        Ok(term
            .alt_label(language)
            .or_else(|| term.label(language))
            .unwrap_or_default()
            .to_string())
    }

    /// Property names shown inside an entity in the compact representation.
    pub fn compact_attributes(
        &self,
        id: EntityId,
        language: &str,
        terms: &TermCache,
    ) -> Result<Vec<String>, CoreError> {
        let entity = self.entity(id)?;
        let mut names: Vec<String> = Vec::new();
        for link_id in &entity.connections {
            let link = &self.graph[EdgeIndex::from(*link_id)];
            let property = if link.source == id && link.iri.as_str() == vocab::HAS_PROPERTY {
                link.target
            } else if link.target == id && link.iri.as_str() == vocab::IS_PROPERTY_OF {
                link.source
            } else {
                continue;
            };
            let iri = &self.graph[NodeIndex::from(property)].iri;
            if let Some(label) = terms.get(iri).and_then(|t| t.label(language)) {
                if !names.iter().any(|n| n == label) {
                    names.push(label.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Labels of a link in `language`.
    ///
    /// Generalizations carry no text. A DEFAULT link takes its centre label
    /// from the relationship-type catalog, else from the term cache.
    pub fn link_labels(
        &self,
        id: LinkId,
        language: &str,
        terms: &TermCache,
        catalog: &RelationshipCatalog,
    ) -> Result<LinkLabels, CoreError> {
        let link = self.link(id)?;
        if link.kind == LinkType::Generalization {
            return Ok(LinkLabels::default());
        }
        let centre = catalog
            .label(&link.iri, language)
            .or_else(|| terms.get(&link.iri).and_then(|t| t.label(language)))
            .unwrap_or_default()
            .to_string();
        Ok(LinkLabels {
            centre,
            source: link.source_cardinality.as_string(),
            target: link.target_cardinality.as_string(),
        })
    }

    /// Whether the entity's package (or an ancestor) is read-only.
    pub fn is_read_only(&self, id: EntityId) -> Result<bool, CoreError> {
        let entity = self.entity(id)?;
        Ok(self.packages.is_read_only(entity.package))
    }

    // -----------------------------------------------------------------------
    // Diagram methods
    // -----------------------------------------------------------------------

    /// Appends a diagram in the FULL representation.
    pub fn add_diagram(&mut self, name: impl Into<String>) -> DiagramId {
        self.diagrams.push(Diagram::new(name.into()));
        DiagramId((self.diagrams.len() - 1) as u32)
    }

    pub fn rename_diagram(&mut self, id: DiagramId, name: impl Into<String>) -> Result<(), CoreError> {
        self.diagram_mut(id)?.name = name.into();
        Ok(())
    }

    /// Marks a diagram deleted. Its index is never reused.
    pub fn deactivate_diagram(&mut self, id: DiagramId) -> Result<(), CoreError> {
        self.diagram_mut(id)?.active = false;
        Ok(())
    }

    pub fn set_representation(
        &mut self,
        id: DiagramId,
        representation: Representation,
    ) -> Result<(), CoreError> {
        self.diagram_mut(id)?.representation = representation;
        Ok(())
    }

    pub fn set_viewport(&mut self, id: DiagramId, viewport: Viewport) -> Result<(), CoreError> {
        self.diagram_mut(id)?.viewport = viewport;
        Ok(())
    }

    /// Records that `entity` was hidden by a collapse on `diagram`.
    pub fn mark_collapsed(&mut self, diagram: DiagramId, entity: EntityId) -> Result<(), CoreError> {
        self.entity(entity)?;
        self.diagram_mut(diagram)?.collapsed.insert(entity);
        Ok(())
    }

    /// Drains the set of entities awaiting expansion on `diagram`.
    pub fn take_collapsed(&mut self, diagram: DiagramId) -> Result<Vec<EntityId>, CoreError> {
        let collapsed = std::mem::take(&mut self.diagram_mut(diagram)?.collapsed);
        Ok(collapsed.into_iter().collect())
    }

    fn diagram_mut(&mut self, id: DiagramId) -> Result<&mut Diagram, CoreError> {
        self.diagrams
            .get_mut(id.index())
            .ok_or(CoreError::DiagramNotFound { id })
    }

    // -----------------------------------------------------------------------
    // Entity methods
    // -----------------------------------------------------------------------

    /// Adds an active entity for term `iri`, filed under `package`.
    pub fn add_entity(&mut self, iri: Iri, package: PackageId) -> Result<EntityId, CoreError> {
        if self.packages.get(package).is_none() {
            return Err(CoreError::PackageNotFound { id: package });
        }
        let idx = self.graph.add_node(Entity::new(iri, package));
        let id = EntityId::from(idx);
        self.packages.add_element(package, id)?;
        Ok(id)
    }

    /// Soft-deletes an entity and every link touching it.
    ///
    /// Returns the links deactivated by this call. Calling it again on an
    /// inactive entity changes nothing and returns an empty list.
    pub fn deactivate_entity(&mut self, id: EntityId) -> Result<Vec<LinkId>, CoreError> {
        let touching = self.links_touching(id)?;
        let mut deactivated = Vec::with_capacity(touching.len());
        for link in touching {
            if self.deactivate_link(link)? {
                deactivated.push(link);
            }
        }
        let entity = self.entity_mut(id)?;
        entity.active = false;
        entity.connections.clear();

        #[cfg(debug_assertions)]
        self.assert_consistency();

        Ok(deactivated)
    }

    pub fn set_position(&mut self, id: EntityId, diagram: DiagramId, position: Point) -> Result<(), CoreError> {
        self.diagram(diagram)?;
        self.entity_mut(id)?.view_mut(diagram).position = Some(position);
        Ok(())
    }

    /// Sets visibility on a diagram. Showing an entity records the diagram
    /// in its appearance set.
    pub fn set_hidden(&mut self, id: EntityId, diagram: DiagramId, hidden: bool) -> Result<(), CoreError> {
        self.diagram(diagram)?;
        let entity = self.entity_mut(id)?;
        entity.view_mut(diagram).hidden = hidden;
        if !hidden {
            entity.diagrams.insert(diagram);
        }
        Ok(())
    }

    /// Positions and shows an entity on a diagram.
    pub fn place(&mut self, id: EntityId, diagram: DiagramId, position: Point) -> Result<(), CoreError> {
        self.set_position(id, diagram, position)?;
        self.set_hidden(id, diagram, false)
    }

    pub fn set_size(&mut self, id: EntityId, size: Size) -> Result<(), CoreError> {
        self.entity_mut(id)?.size = Some(size);
        Ok(())
    }

    /// Overrides the display label of an entity in `language`.
    pub fn select_label(&mut self, id: EntityId, language: &str, label: &str) -> Result<(), CoreError> {
        self.entity_mut(id)?
            .selected_label
            .insert(language.to_string(), label.to_string());
        Ok(())
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, CoreError> {
        self.graph
            .node_weight_mut(id.into())
            .ok_or(CoreError::EntityNotFound { id })
    }

    // -----------------------------------------------------------------------
    // Link methods
    // -----------------------------------------------------------------------

    /// Adds an active link between two active entities.
    ///
    /// The link is registered in the connections of both endpoints.
    pub fn add_link(
        &mut self,
        iri: Iri,
        source: EntityId,
        target: EntityId,
        kind: LinkType,
    ) -> Result<LinkId, CoreError> {
        for end in [source, target] {
            if !self.entity(end)?.active {
                return Err(CoreError::InactiveEndpoint { id: end });
            }
        }
        let idx = self
            .graph
            .add_edge(source.into(), target.into(), Link::new(iri, source, target, kind));
        let id = LinkId::from(idx);
        self.attach(id, source, target);

        #[cfg(debug_assertions)]
        self.assert_consistency();

        Ok(id)
    }

    /// Soft-deletes a link and evicts it from its endpoints' connections.
    ///
    /// Returns `false` when the link was already inactive.
    pub fn deactivate_link(&mut self, id: LinkId) -> Result<bool, CoreError> {
        let link = self
            .graph
            .edge_weight_mut(id.into())
            .ok_or(CoreError::LinkNotFound { id })?;
        if !link.active {
            return Ok(false);
        }
        link.active = false;
        let (source, target) = (link.source, link.target);
        for end in [source, target] {
            self.graph[NodeIndex::from(end)]
                .connections
                .retain(|l| *l != id);
        }
        Ok(true)
    }

    /// Reactivates a link whose endpoints are both active.
    pub fn activate_link(&mut self, id: LinkId) -> Result<(), CoreError> {
        let (source, target, active) = {
            let link = self.link(id)?;
            (link.source, link.target, link.active)
        };
        if active {
            return Ok(());
        }
        for end in [source, target] {
            if !self.entity(end)?.active {
                return Err(CoreError::InactiveEndpoint { id: end });
            }
        }
        self.link_mut(id)?.active = true;
        self.attach(id, source, target);

        #[cfg(debug_assertions)]
        self.assert_consistency();

        Ok(())
    }

    pub fn set_cardinalities(
        &mut self,
        id: LinkId,
        source: Cardinality,
        target: Cardinality,
    ) -> Result<(), CoreError> {
        let link = self.link_mut(id)?;
        link.source_cardinality = source;
        link.target_cardinality = target;
        Ok(())
    }

    /// Replaces the stored routing vertices of a link on a diagram.
    pub fn set_vertices(&mut self, id: LinkId, diagram: DiagramId, vertices: Vertices) -> Result<(), CoreError> {
        self.diagram(diagram)?;
        self.link_mut(id)?.view_mut(diagram).vertices = vertices;
        Ok(())
    }

    /// Marks a link drawn or removed on a diagram.
    pub fn set_drawn(&mut self, id: LinkId, diagram: DiagramId, drawn: bool) -> Result<(), CoreError> {
        self.diagram(diagram)?;
        self.link_mut(id)?.view_mut(diagram).drawn = drawn;
        Ok(())
    }

    fn link_mut(&mut self, id: LinkId) -> Result<&mut Link, CoreError> {
        self.graph
            .edge_weight_mut(id.into())
            .ok_or(CoreError::LinkNotFound { id })
    }

    fn attach(&mut self, id: LinkId, source: EntityId, target: EntityId) {
        for end in [source, target] {
            let connections = &mut self.graph[NodeIndex::from(end)].connections;
            if !connections.contains(&id) {
                connections.push(id);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Consistency
    // -----------------------------------------------------------------------

    /// Checks the connections invariant and the cross references between
    /// records.
    ///
    /// Every id in an entity's `connections` must name an active link that
    /// touches the entity; every link record must agree with its graph edge;
    /// an active link must be listed by, and point at, two active entities.
    /// Entities must belong to a known package. Run this on workspaces read
    /// from outside before using them.
    pub fn validate(&self) -> Result<(), CoreError> {
        for node in self.graph.node_indices() {
            let id = EntityId::from(node);
            let entity = &self.graph[node];
            if self.packages.get(entity.package).is_none() {
                return Err(inconsistency(format!(
                    "entity {} is filed in unknown package {}",
                    id, entity.package
                )));
            }
            for &link_id in &entity.connections {
                let link = self
                    .graph
                    .edge_weight(link_id.into())
                    .ok_or_else(|| inconsistency(format!("entity {} lists unknown link {}", id, link_id)))?;
                if !link.active {
                    return Err(inconsistency(format!(
                        "entity {} lists inactive link {}",
                        id, link_id
                    )));
                }
                if !link.touches(id) {
                    return Err(inconsistency(format!(
                        "entity {} lists link {} which does not touch it",
                        id, link_id
                    )));
                }
            }
        }

        for edge in self.graph.edge_references() {
            let id = LinkId::from(edge.id());
            let link = edge.weight();
            if (EntityId::from(edge.source()), EntityId::from(edge.target())) != (link.source, link.target) {
                return Err(inconsistency(format!(
                    "link {} endpoints disagree with its graph edge",
                    id
                )));
            }
            for end in [link.source, link.target] {
                let entity = &self.graph[NodeIndex::from(end)];
                if entity.connections.contains(&id) != link.active {
                    return Err(inconsistency(format!(
                        "presence of link {} in connections of entity {} does not match its active flag",
                        id, end
                    )));
                }
                if link.active && !entity.active {
                    return Err(inconsistency(format!(
                        "active link {} points to inactive entity {}",
                        id, end
                    )));
                }
            }
        }

        for (index, diagram) in self.diagrams.iter().enumerate() {
            if let Some(missing) = diagram
                .collapsed
                .iter()
                .find(|e| self.graph.node_weight(NodeIndex::from(**e)).is_none())
            {
                return Err(inconsistency(format!(
                    "diagram {} remembers unknown entity {}",
                    index, missing
                )));
            }
        }
        Ok(())
    }

    /// Debug-build check run after every structural change.
    #[cfg(debug_assertions)]
    fn assert_consistency(&self) {
        if let Err(err) = self.validate() {
            panic!("{}", err);
        }
    }
}

fn inconsistency(reason: String) -> CoreError {
    CoreError::Inconsistency { reason }
}
