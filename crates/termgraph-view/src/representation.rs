//! FULL <-> COMPACT representation switching.
//!
//! In FULL a relationship-class entity is a node with two structural links
//! (`má-vztažený-prvek-1` and `-2`). In COMPACT it folds into one direct link
//! between the two elements those structural links point at.
//!
//! Collapse captures cardinalities and routing in the same pass that hides the
//! reified node. Entities hidden by a collapse are remembered on the diagram
//! so expansion can bring them back.

use termgraph_core::{
    vocab, CoreError, DiagramId, EntityId, LinkId, LinkType, Point, RelationshipCatalog,
    Representation, TermCache, UpdateBatch, UpdateOp, Workspace,
};

use crate::sync::{RestoreOptions, Synchronizer, VertexPolicy};

/// Outcome of a representation switch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Whether any entity or link was taken off the diagram.
    pub removed_any: bool,
    /// Remote updates describing the settled state.
    pub updates: UpdateBatch,
}

/// How a visible entity takes part in a collapse.
enum Fold {
    /// Relationship class: may become a direct link.
    Relationship,
    /// Property class: has no compact form.
    Property,
}

/// Switches diagrams between representations.
#[derive(Debug, Clone, Copy)]
pub struct Transformer<'a> {
    terms: &'a TermCache,
    catalog: &'a RelationshipCatalog,
}

impl<'a> Transformer<'a> {
    pub fn new(terms: &'a TermCache, catalog: &'a RelationshipCatalog) -> Self {
        Transformer { terms, catalog }
    }

    /// Sets the representation of `diagram` and transforms its topology.
    ///
    /// The returned updates start with the diagram settings record.
    pub fn set_representation(
        &self,
        ws: &mut Workspace,
        diagram: DiagramId,
        representation: Representation,
    ) -> Result<Transition, CoreError> {
        let inner = match representation {
            Representation::Compact => self.collapse(ws, diagram)?,
            Representation::Full => self.expand(ws, diagram)?,
        };
        let mut updates = UpdateBatch::new();
        updates.push(UpdateOp::Diagram { diagram });
        updates.merge(inner.updates);
        tracing::info!(
            "Diagram {} switched to {:?} ({} update(s))",
            diagram,
            representation,
            updates.len()
        );
        Ok(Transition {
            removed_any: inner.removed_any,
            updates,
        })
    }

    /// FULL -> COMPACT.
    pub fn collapse(&self, ws: &mut Workspace, diagram: DiagramId) -> Result<Transition, CoreError> {
        ws.set_representation(diagram, Representation::Compact)?;
        let sync = Synchronizer::new(self.terms, self.catalog);
        let mut transition = Transition::default();

        let candidates: Vec<(EntityId, Fold)> = ws
            .entities()
            .filter(|(_, e)| e.is_visible(diagram))
            .filter_map(|(id, e)| {
                let term = self.terms.get(&e.iri)?;
                if term.is_relationship_class() {
                    Some((id, Fold::Relationship))
                } else if term.is_property_class() {
                    Some((id, Fold::Property))
                } else {
                    None
                }
            })
            .collect();

        for (entity, fold) in candidates {
            if let Fold::Relationship = fold {
                match structural_pair(ws, entity)? {
                    Structure::Pair(first, second) => {
                        self.fold_into_link(ws, &sync, entity, first, second, diagram, &mut transition.updates)?;
                    }
                    Structure::Excess => {
                        tracing::debug!(
                            "Relationship {} has more than two structural links, hiding without edge",
                            entity
                        );
                    }
                    Structure::Incomplete => {
                        tracing::warn!(
                            "Relationship {} is missing a structural link, left out of collapse",
                            entity
                        );
                        continue;
                    }
                }
            }
            sync.hide_entity(ws, entity, diagram)?;
            ws.mark_collapsed(diagram, entity)?;
            transition.removed_any = true;
        }

        let redundant: Vec<LinkId> = ws
            .links()
            .filter(|(_, l)| l.active && l.is_drawn(diagram) && self.catalog.is_default_kind(&l.iri))
            .map(|(id, _)| id)
            .collect();
        for link in redundant {
            ws.set_drawn(link, diagram, false)?;
            transition.removed_any = true;
        }
        Ok(transition)
    }

    /// COMPACT -> FULL.
    pub fn expand(&self, ws: &mut Workspace, diagram: DiagramId) -> Result<Transition, CoreError> {
        ws.set_representation(diagram, Representation::Full)?;
        let sync = Synchronizer::new(self.terms, self.catalog);
        let mut transition = Transition::default();

        for entity in ws.take_collapsed(diagram)? {
            let (active, stored) = {
                let e = ws.entity(entity)?;
                (e.active, e.position(diagram))
            };
            if !active {
                continue;
            }
            let position = match stored.or(structural_midpoint(ws, entity, diagram)?) {
                Some(position) => position,
                None => {
                    tracing::debug!("No position for collapsed entity {}, leaving hidden", entity);
                    continue;
                }
            };
            ws.set_position(entity, diagram, position)?;
            let options = RestoreOptions {
                restore_reified: false,
                ..RestoreOptions::default()
            };
            transition
                .updates
                .merge(sync.restore_entity(ws, entity, diagram, options)?);
        }

        let visible: Vec<EntityId> = ws
            .entities()
            .filter(|(_, e)| e.is_visible(diagram))
            .map(|(id, _)| id)
            .collect();
        for entity in visible {
            transition
                .updates
                .merge(sync.restore_links(ws, entity, diagram, RestoreOptions::default())?);
        }

        let stale: Vec<LinkId> = ws
            .links()
            .filter(|(_, l)| l.is_drawn(diagram) && (!l.active || !self.catalog.is_recognized(&l.iri)))
            .map(|(id, _)| id)
            .collect();
        for link in stale {
            ws.set_drawn(link, diagram, false)?;
            transition.removed_any = true;
        }
        Ok(transition)
    }

    /// Draws the direct link standing in for a reified relationship.
    ///
    /// An existing active link with the relationship's IRI between the same
    /// endpoints is reused. A new one inherits the target cardinality of the
    /// element-1 link as its source cardinality and the source cardinality of
    /// the element-2 link as its target cardinality.
    #[allow(clippy::too_many_arguments)]
    fn fold_into_link(
        &self,
        ws: &mut Workspace,
        sync: &Synchronizer<'_>,
        relationship: EntityId,
        first: LinkId,
        second: LinkId,
        diagram: DiagramId,
        updates: &mut UpdateBatch,
    ) -> Result<(), CoreError> {
        let (source, source_cardinality) = {
            let l = ws.link(first)?;
            (l.target, l.target_cardinality.clone())
        };
        let (target, target_cardinality) = {
            let l = ws.link(second)?;
            (l.target, l.source_cardinality.clone())
        };
        let endpoints_drawn = [source, target]
            .iter()
            .all(|e| ws.entity(*e).is_ok_and(|e| e.is_visible(diagram)));
        if !endpoints_drawn {
            tracing::debug!(
                "Endpoints of relationship {} are not on diagram {}, no edge drawn",
                relationship,
                diagram
            );
            return Ok(());
        }

        let iri = ws.entity(relationship)?.iri.clone();
        let link = match ws.find_link(&iri, source, target) {
            Some(existing) => existing,
            None => {
                let link = ws.add_link(iri, source, target, LinkType::Default)?;
                ws.set_cardinalities(link, source_cardinality, target_cardinality)?;
                updates.push(UpdateOp::Link { link });
                link
            }
        };
        sync.draw_link(ws, link, diagram, VertexPolicy::Restore, updates)
    }
}

enum Structure {
    Pair(LinkId, LinkId),
    Excess,
    Incomplete,
}

/// Finds the element-1 and element-2 links among an entity's active outgoing links.
fn structural_pair(ws: &Workspace, entity: EntityId) -> Result<Structure, CoreError> {
    let mut first = None;
    let mut second = None;
    let mut count = 0;
    for link_id in ws.active_outgoing(entity)? {
        let link = ws.link(link_id)?;
        match link.iri.as_str() {
            vocab::RELATED_ELEMENT_1 => {
                count += 1;
                first = first.or(Some(link_id));
            }
            vocab::RELATED_ELEMENT_2 => {
                count += 1;
                second = second.or(Some(link_id));
            }
            _ => {}
        }
    }
    Ok(match (first, second) {
        _ if count > 2 => Structure::Excess,
        (Some(first), Some(second)) => Structure::Pair(first, second),
        _ => Structure::Incomplete,
    })
}

/// Midpoint of the positions of an entity's two structural targets.
fn structural_midpoint(ws: &Workspace, entity: EntityId, diagram: DiagramId) -> Result<Option<Point>, CoreError> {
    let mut points = Vec::with_capacity(2);
    for link_id in ws.active_outgoing(entity)? {
        let link = ws.link(link_id)?;
        if !vocab::is_structural(link.iri.as_str()) {
            continue;
        }
        if let Some(p) = ws.entity(link.target)?.position(diagram) {
            points.push(p);
        }
    }
    Ok(match points.as_slice() {
        [a, b, ..] => Some(a.midpoint(*b)),
        _ => None,
    })
}
