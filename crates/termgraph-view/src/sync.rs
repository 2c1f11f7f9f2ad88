//! Diagram synchronizer.
//!
//! When an entity becomes visible on a diagram the synchronizer decides which
//! of its links are drawn there, restores or synthesizes their routing and
//! reports the remote updates the change implies. It never executes them.
//!
//! Drawing rules, for a link whose two endpoints are visible:
//! - FULL: the predicate is a recognized relationship type.
//! - COMPACT: the predicate is not recognized, or it is recognized and scoped
//!   to the local project.
//!
//! A link whose endpoint is missing from the workspace is never drawn.

use termgraph_core::geometry::{circle_positions, self_loop_vertices};
use termgraph_core::{
    vocab, CoreError, DiagramId, EntityId, Iri, LinkId, Point, RelationshipCatalog, Representation,
    TermCache, UpdateBatch, UpdateOp, Vertices, Workspace,
};

use crate::representation::Transformer;

/// What happens to stored routing vertices when a link is drawn again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VertexPolicy {
    /// Keep stored vertices. Self-loops without any get a synthesized path.
    #[default]
    Restore,
    /// Discard stored vertices. Self-loops get a fresh synthesized path.
    Reset,
}

/// Options for [`Synchronizer::restore_links`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    pub vertices: VertexPolicy,
    /// In FULL, bring back a hidden relationship-class node whose two
    /// structural targets are both visible.
    pub restore_reified: bool,
    /// Place a brought-back relationship node at its stored position instead
    /// of the midpoint of its targets, and keep its links' vertices.
    pub keep_reified_position: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        RestoreOptions {
            vertices: VertexPolicy::Restore,
            restore_reified: true,
            keep_reified_position: false,
        }
    }
}

/// Computes per-diagram link visibility and routing.
#[derive(Debug, Clone, Copy)]
pub struct Synchronizer<'a> {
    terms: &'a TermCache,
    catalog: &'a RelationshipCatalog,
}

impl<'a> Synchronizer<'a> {
    pub fn new(terms: &'a TermCache, catalog: &'a RelationshipCatalog) -> Self {
        Synchronizer { terms, catalog }
    }

    /// Whether a predicate may be drawn under `representation`.
    pub fn admits(&self, representation: Representation, iri: &Iri) -> bool {
        match representation {
            Representation::Full => self.catalog.is_recognized(iri),
            Representation::Compact => {
                !self.catalog.is_recognized(iri) || self.catalog.is_local(iri)
            }
        }
    }

    /// Whether `link` should be drawn on `diagram` in its current representation.
    pub fn is_drawable(&self, ws: &Workspace, link: LinkId, diagram: DiagramId) -> Result<bool, CoreError> {
        let representation = ws.diagram(diagram)?.representation;
        let link = ws.link(link)?;
        Ok(link.active
            && endpoint_visible(ws, link.source, diagram)
            && endpoint_visible(ws, link.target, diagram)
            && self.admits(representation, &link.iri))
    }

    /// Makes an entity visible on a diagram and restores its links.
    ///
    /// An inactive entity is left untouched and yields no updates.
    pub fn restore_entity(
        &self,
        ws: &mut Workspace,
        entity: EntityId,
        diagram: DiagramId,
        options: RestoreOptions,
    ) -> Result<UpdateBatch, CoreError> {
        let mut updates = UpdateBatch::new();
        let (active, appeared_before) = {
            let e = ws.entity(entity)?;
            (e.active, e.diagrams.contains(&diagram))
        };
        ws.diagram(diagram)?;
        if !active {
            tracing::debug!("Skipping restore of inactive entity {} on diagram {}", entity, diagram);
            return Ok(updates);
        }

        ws.set_hidden(entity, diagram, false)?;
        updates.push(UpdateOp::ElementDiagram { diagram, entity });
        if !appeared_before {
            updates.push(UpdateOp::Element { entity });
        }
        updates.merge(self.restore_links(ws, entity, diagram, options)?);
        Ok(updates)
    }

    /// Draws every drawable link touching a visible entity.
    pub fn restore_links(
        &self,
        ws: &mut Workspace,
        entity: EntityId,
        diagram: DiagramId,
        options: RestoreOptions,
    ) -> Result<UpdateBatch, CoreError> {
        let mut updates = UpdateBatch::new();
        let representation = ws.diagram(diagram)?.representation;
        for link in ws.links_touching(entity)? {
            if self.is_drawable(ws, link, diagram)? {
                self.draw_link(ws, link, diagram, options.vertices, &mut updates)?;
            } else if options.restore_reified && representation == Representation::Full {
                self.restore_reified(ws, link, entity, diagram, options.keep_reified_position, &mut updates)?;
            }
        }
        Ok(updates)
    }

    /// Hides an entity on a diagram along with every link drawn to it.
    pub fn hide_entity(&self, ws: &mut Workspace, entity: EntityId, diagram: DiagramId) -> Result<(), CoreError> {
        ws.set_hidden(entity, diagram, true)?;
        for link in ws.links_touching(entity)? {
            ws.set_drawn(link, diagram, false)?;
        }
        Ok(())
    }

    /// Places `entities` on a circle around `anchor` and restores them.
    ///
    /// The circle is centred on the anchor's bounding box. In COMPACT the
    /// diagram is collapsed again afterwards so newly shown reified nodes fold
    /// into edges.
    pub fn spread(
        &self,
        ws: &mut Workspace,
        anchor: EntityId,
        entities: &[EntityId],
        diagram: DiagramId,
    ) -> Result<UpdateBatch, CoreError> {
        let centre = {
            let a = ws.entity(anchor)?;
            let origin = a.position(diagram).unwrap_or_default();
            match a.size {
                Some(size) => origin.translate(size.width / 2.0, size.height / 2.0),
                None => origin,
            }
        };
        let representation = ws.diagram(diagram)?.representation;
        let options = RestoreOptions {
            vertices: VertexPolicy::Reset,
            ..RestoreOptions::default()
        };

        let mut updates = UpdateBatch::new();
        for (&entity, position) in entities.iter().zip(circle_positions(centre, entities.len())) {
            if !ws.entity(entity)?.active {
                continue;
            }
            ws.set_position(entity, diagram, position)?;
            updates.merge(self.restore_entity(ws, entity, diagram, options)?);
            updates.push(UpdateOp::Element { entity });
        }
        if representation == Representation::Compact {
            let transition = Transformer::new(self.terms, self.catalog).collapse(ws, diagram)?;
            updates.merge(transition.updates);
        }
        Ok(updates)
    }

    /// Moves visible entities by a screen-space delta.
    ///
    /// The delta is divided by the diagram scale. Vertices of drawn links
    /// touching a moved entity shift once, however many of their endpoints
    /// moved. Entities whose position does not change emit nothing.
    pub fn move_entities(
        &self,
        ws: &mut Workspace,
        diagram: DiagramId,
        entities: &[EntityId],
        dx: f64,
        dy: f64,
    ) -> Result<UpdateBatch, CoreError> {
        let scale = ws.diagram(diagram)?.viewport.scale;
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let (dx, dy) = (dx / scale, dy / scale);

        let mut updates = UpdateBatch::new();
        let mut moved_links: Vec<LinkId> = Vec::new();
        for &entity in entities {
            let old = {
                let e = ws.entity(entity)?;
                if !e.is_visible(diagram) {
                    continue;
                }
                e.position(diagram).unwrap_or_default()
            };
            let new = old.translate(dx, dy);
            if new == old {
                continue;
            }
            ws.set_position(entity, diagram, new)?;
            updates.push(UpdateOp::ElementDiagram { diagram, entity });

            for link in ws.links_touching(entity)? {
                if moved_links.contains(&link) {
                    continue;
                }
                let shifted: Vertices = {
                    let l = ws.link(link)?;
                    if !l.is_drawn(diagram) || l.vertices(diagram).is_empty() {
                        continue;
                    }
                    l.vertices(diagram).iter().map(|v| v.translate(dx, dy)).collect()
                };
                ws.set_vertices(link, diagram, shifted)?;
                moved_links.push(link);
            }
        }
        updates.extend(
            moved_links
                .into_iter()
                .map(|link| UpdateOp::LinkVertices { diagram, link }),
        );
        Ok(updates)
    }

    /// Marks a link drawn and settles its routing under `policy`.
    ///
    /// Synthesized self-loop paths are written back to the workspace so the
    /// next restore finds them.
    pub(crate) fn draw_link(
        &self,
        ws: &mut Workspace,
        link: LinkId,
        diagram: DiagramId,
        policy: VertexPolicy,
        updates: &mut UpdateBatch,
    ) -> Result<(), CoreError> {
        let (self_loop, anchor, size, stored) = {
            let l = ws.link(link)?;
            let source = ws.entity(l.source)?;
            (
                l.is_self_loop(),
                source.position(diagram).unwrap_or_default(),
                source.size,
                l.vertices(diagram).len(),
            )
        };

        match policy {
            VertexPolicy::Restore => {
                if stored == 0 && self_loop {
                    ws.set_vertices(link, diagram, self_loop_vertices(anchor, size))?;
                    updates.push(UpdateOp::LinkVertices { diagram, link });
                }
            }
            VertexPolicy::Reset => {
                let fresh = if self_loop {
                    self_loop_vertices(anchor, size)
                } else {
                    Vertices::new()
                };
                if stored > 0 {
                    updates.push(UpdateOp::DeleteLinkVertices {
                        diagram,
                        link,
                        from: 0,
                        count: stored,
                    });
                }
                // The list record names its vertex nodes, so it is rewritten
                // whenever old vertices are dropped, even when empty.
                if stored > 0 || !fresh.is_empty() {
                    updates.push(UpdateOp::LinkVertices { diagram, link });
                }
                ws.set_vertices(link, diagram, fresh)?;
            }
        }
        ws.set_drawn(link, diagram, true)
    }

    /// Brings back the relationship node at the source of a structural link
    /// pointing at `entity`, if its other structural target is visible.
    fn restore_reified(
        &self,
        ws: &mut Workspace,
        link: LinkId,
        entity: EntityId,
        diagram: DiagramId,
        keep_position: bool,
        updates: &mut UpdateBatch,
    ) -> Result<bool, CoreError> {
        let relationship = {
            let l = ws.link(link)?;
            if l.target != entity || l.is_self_loop() || !vocab::is_structural(l.iri.as_str()) {
                return Ok(false);
            }
            l.source
        };

        let (partner, stored_position) = {
            let rel = ws.entity(relationship)?;
            let is_relationship_class = self
                .terms
                .get(&rel.iri)
                .is_some_and(|t| t.is_relationship_class());
            if !rel.active || rel.is_visible(diagram) || !is_relationship_class {
                return Ok(false);
            }
            let partner = rel.connections().iter().copied().find(|other| {
                *other != link
                    && ws.link(*other).is_ok_and(|o| {
                        o.source == relationship
                            && o.target != entity
                            && vocab::is_structural(o.iri.as_str())
                            && endpoint_visible(ws, o.target, diagram)
                    })
            });
            let stored = rel
                .position(diagram)
                .filter(|p| p.x != 0.0 && p.y != 0.0);
            (partner, stored)
        };
        let Some(partner) = partner else {
            return Ok(false);
        };

        let position = match stored_position {
            Some(p) if keep_position => p,
            _ => {
                let a = position_of(ws, entity, diagram)?;
                let b = position_of(ws, ws.link(partner)?.target, diagram)?;
                a.midpoint(b)
            }
        };
        ws.place(relationship, diagram, position)?;
        updates.push(UpdateOp::ElementDiagram {
            diagram,
            entity: relationship,
        });
        updates.push(UpdateOp::Element { entity: relationship });

        let policy = if keep_position {
            VertexPolicy::Restore
        } else {
            VertexPolicy::Reset
        };
        for structural in [link, partner] {
            self.draw_link(ws, structural, diagram, policy, updates)?;
        }
        tracing::debug!(
            "Restored relationship {} on diagram {} at ({}, {})",
            relationship,
            diagram,
            position.x,
            position.y
        );
        Ok(true)
    }
}

fn endpoint_visible(ws: &Workspace, entity: EntityId, diagram: DiagramId) -> bool {
    ws.entity(entity).is_ok_and(|e| e.is_visible(diagram))
}

fn position_of(ws: &Workspace, entity: EntityId, diagram: DiagramId) -> Result<Point, CoreError> {
    Ok(ws.entity(entity)?.position(diagram).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termgraph_core::{LinkType, RelationshipType, Size, Term};

    const LOCAL: &str = "https://project.example/";

    struct Fixture {
        ws: Workspace,
        terms: TermCache,
        catalog: RelationshipCatalog,
        diagram: DiagramId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut ws = Workspace::new();
            let diagram = ws.add_diagram("main");
            let mut catalog = RelationshipCatalog::new(LOCAL);
            catalog.insert(
                Iri::from("urn:imported"),
                RelationshipType::new(Iri::from("https://vocab.example/"), LinkType::Default),
            );
            catalog.insert(
                Iri::from("urn:local"),
                RelationshipType::new(Iri::from("https://project.example/s"), LinkType::Default),
            );
            Fixture {
                ws,
                terms: TermCache::new(),
                catalog,
                diagram,
            }
        }

        fn entity(&mut self, name: &str, at: Option<Point>) -> EntityId {
            let iri = Iri::new(format!("urn:{}", name));
            self.terms.insert(iri.clone(), Term::new(Iri::from("urn:s")).with_label("en", name));
            let root = self.ws.packages.root_id();
            let id = self.ws.add_entity(iri, root).unwrap();
            if let Some(p) = at {
                self.ws.place(id, self.diagram, p).unwrap();
            }
            id
        }
    }

    #[test]
    fn full_draws_only_recognized_links() {
        let mut f = Fixture::new();
        let a = f.entity("a", Some(Point::new(0.0, 0.0)));
        let b = f.entity("b", None);
        let known = f.ws.add_link(Iri::from("urn:imported"), a, b, LinkType::Default).unwrap();
        let unknown = f.ws.add_link(Iri::from("urn:other"), a, b, LinkType::Default).unwrap();
        f.ws.set_position(b, f.diagram, Point::new(100.0, 0.0)).unwrap();

        let sync = Synchronizer::new(&f.terms, &f.catalog);
        let updates = sync
            .restore_entity(&mut f.ws, b, f.diagram, RestoreOptions::default())
            .unwrap();

        assert!(f.ws.link(known).unwrap().is_drawn(f.diagram));
        assert!(!f.ws.link(unknown).unwrap().is_drawn(f.diagram));
        assert_eq!(
            updates.into_vec(),
            vec![
                UpdateOp::ElementDiagram { diagram: f.diagram, entity: b },
                UpdateOp::Element { entity: b },
            ]
        );
    }

    #[test]
    fn compact_rule_admits_unrecognized_and_local() {
        let f = Fixture::new();
        let sync = Synchronizer::new(&f.terms, &f.catalog);
        assert!(sync.admits(Representation::Compact, &Iri::from("urn:other")));
        assert!(sync.admits(Representation::Compact, &Iri::from("urn:local")));
        assert!(!sync.admits(Representation::Compact, &Iri::from("urn:imported")));
        assert!(sync.admits(Representation::Full, &Iri::from("urn:imported")));
        assert!(!sync.admits(Representation::Full, &Iri::from("urn:other")));
    }

    #[test]
    fn link_to_hidden_endpoint_is_not_drawable() {
        let mut f = Fixture::new();
        let a = f.entity("a", Some(Point::new(0.0, 0.0)));
        let b = f.entity("b", None);
        let l = f.ws.add_link(Iri::from("urn:imported"), a, b, LinkType::Default).unwrap();
        let sync = Synchronizer::new(&f.terms, &f.catalog);
        assert!(!sync.is_drawable(&f.ws, l, f.diagram).unwrap());
    }

    #[test]
    fn self_loop_gets_synthesized_vertices_once() {
        let mut f = Fixture::new();
        let a = f.entity("a", None);
        f.ws.set_size(a, Size::new(80.0, 40.0)).unwrap();
        f.ws.set_position(a, f.diagram, Point::new(10.0, 10.0)).unwrap();
        let l = f.ws.add_link(Iri::from("urn:imported"), a, a, LinkType::Default).unwrap();

        let sync = Synchronizer::new(&f.terms, &f.catalog);
        let updates = sync
            .restore_entity(&mut f.ws, a, f.diagram, RestoreOptions::default())
            .unwrap();
        assert!(updates.contains(&UpdateOp::LinkVertices { diagram: f.diagram, link: l }));
        assert_eq!(
            f.ws.link(l).unwrap().vertices(f.diagram),
            &[Point::new(10.0, 110.0), Point::new(100.0, 110.0), Point::new(100.0, 10.0)]
        );

        // Moving the node does not re-synthesize a stored path.
        f.ws.set_position(a, f.diagram, Point::new(500.0, 500.0)).unwrap();
        let again = sync
            .restore_links(&mut f.ws, a, f.diagram, RestoreOptions::default())
            .unwrap();
        assert!(again.is_empty());
        assert_eq!(f.ws.link(l).unwrap().vertices(f.diagram)[0], Point::new(10.0, 110.0));
    }

    #[test]
    fn reset_policy_discards_stored_vertices() {
        let mut f = Fixture::new();
        let a = f.entity("a", Some(Point::new(0.0, 0.0)));
        let b = f.entity("b", Some(Point::new(100.0, 0.0)));
        let l = f.ws.add_link(Iri::from("urn:imported"), a, b, LinkType::Default).unwrap();
        f.ws
            .set_vertices(l, f.diagram, [Point::new(1.0, 1.0), Point::new(2.0, 2.0)].into_iter().collect())
            .unwrap();

        let sync = Synchronizer::new(&f.terms, &f.catalog);
        let options = RestoreOptions {
            vertices: VertexPolicy::Reset,
            ..RestoreOptions::default()
        };
        let updates = sync.restore_links(&mut f.ws, a, f.diagram, options).unwrap();
        assert_eq!(
            updates.into_vec(),
            vec![
                UpdateOp::DeleteLinkVertices {
                    diagram: f.diagram,
                    link: l,
                    from: 0,
                    count: 2
                },
                UpdateOp::LinkVertices {
                    diagram: f.diagram,
                    link: l
                },
            ]
        );
        assert!(f.ws.link(l).unwrap().vertices(f.diagram).is_empty());
        assert!(f.ws.link(l).unwrap().is_drawn(f.diagram));
    }

    #[test]
    fn restore_brings_back_reified_relationship_at_midpoint() {
        let mut f = Fixture::new();
        f.catalog.insert(
            Iri::from(vocab::RELATED_ELEMENT_1),
            RelationshipType::new(Iri::from("https://vocab.example/"), LinkType::Default),
        );
        f.catalog.insert(
            Iri::from(vocab::RELATED_ELEMENT_2),
            RelationshipType::new(Iri::from("https://vocab.example/"), LinkType::Default),
        );
        let a = f.entity("a", Some(Point::new(0.0, 0.0)));
        let b = f.entity("b", None);
        f.ws.set_position(b, f.diagram, Point::new(200.0, 100.0)).unwrap();
        let r = f.entity("r", None);
        f.terms.insert(
            Iri::from("urn:r"),
            Term::new(Iri::from("urn:s")).with_type(vocab::RELATIONSHIP_CLASS),
        );
        let l1 = f.ws.add_link(Iri::from(vocab::RELATED_ELEMENT_1), r, a, LinkType::Default).unwrap();
        let l2 = f.ws.add_link(Iri::from(vocab::RELATED_ELEMENT_2), r, b, LinkType::Default).unwrap();

        let sync = Synchronizer::new(&f.terms, &f.catalog);
        let updates = sync
            .restore_entity(&mut f.ws, b, f.diagram, RestoreOptions::default())
            .unwrap();

        let rel = f.ws.entity(r).unwrap();
        assert!(rel.is_visible(f.diagram));
        assert_eq!(rel.position(f.diagram), Some(Point::new(100.0, 50.0)));
        assert!(f.ws.link(l1).unwrap().is_drawn(f.diagram));
        assert!(f.ws.link(l2).unwrap().is_drawn(f.diagram));
        assert!(updates.contains(&UpdateOp::ElementDiagram { diagram: f.diagram, entity: r }));
    }

    #[test]
    fn reified_restore_can_be_disabled() {
        let mut f = Fixture::new();
        let a = f.entity("a", Some(Point::new(0.0, 0.0)));
        let b = f.entity("b", Some(Point::new(10.0, 10.0)));
        let r = f.entity("r", None);
        f.terms.insert(
            Iri::from("urn:r"),
            Term::new(Iri::from("urn:s")).with_type(vocab::RELATIONSHIP_CLASS),
        );
        f.ws.add_link(Iri::from(vocab::RELATED_ELEMENT_1), r, a, LinkType::Default).unwrap();
        f.ws.add_link(Iri::from(vocab::RELATED_ELEMENT_2), r, b, LinkType::Default).unwrap();

        let sync = Synchronizer::new(&f.terms, &f.catalog);
        let options = RestoreOptions {
            restore_reified: false,
            ..RestoreOptions::default()
        };
        sync.restore_links(&mut f.ws, b, f.diagram, options).unwrap();
        assert!(f.ws.entity(r).unwrap().is_hidden(f.diagram));
    }

    #[test]
    fn inactive_entity_restore_is_a_no_op() {
        let mut f = Fixture::new();
        let a = f.entity("a", None);
        f.ws.deactivate_entity(a).unwrap();
        let sync = Synchronizer::new(&f.terms, &f.catalog);
        let updates = sync
            .restore_entity(&mut f.ws, a, f.diagram, RestoreOptions::default())
            .unwrap();
        assert!(updates.is_empty());
        assert!(f.ws.entity(a).unwrap().is_hidden(f.diagram));
    }

    #[test]
    fn move_scales_delta_and_shifts_vertices_once() {
        let mut f = Fixture::new();
        let a = f.entity("a", Some(Point::new(0.0, 0.0)));
        let b = f.entity("b", Some(Point::new(100.0, 0.0)));
        let hidden = f.entity("c", None);
        let l = f.ws.add_link(Iri::from("urn:imported"), a, b, LinkType::Default).unwrap();
        f.ws.set_vertices(l, f.diagram, [Point::new(50.0, 50.0)].into_iter().collect()).unwrap();
        f.ws.set_drawn(l, f.diagram, true).unwrap();
        f.ws
            .set_viewport(
                f.diagram,
                termgraph_core::Viewport {
                    origin: Point::default(),
                    scale: 2.0,
                },
            )
            .unwrap();

        let sync = Synchronizer::new(&f.terms, &f.catalog);
        let updates = sync
            .move_entities(&mut f.ws, f.diagram, &[a, b, hidden], 20.0, 10.0)
            .unwrap();

        assert_eq!(f.ws.entity(a).unwrap().position(f.diagram), Some(Point::new(10.0, 5.0)));
        assert_eq!(f.ws.entity(b).unwrap().position(f.diagram), Some(Point::new(110.0, 5.0)));
        assert_eq!(f.ws.link(l).unwrap().vertices(f.diagram), &[Point::new(60.0, 55.0)]);
        assert_eq!(
            updates.into_vec(),
            vec![
                UpdateOp::ElementDiagram { diagram: f.diagram, entity: a },
                UpdateOp::ElementDiagram { diagram: f.diagram, entity: b },
                UpdateOp::LinkVertices { diagram: f.diagram, link: l },
            ]
        );
    }

    #[test]
    fn zero_move_emits_nothing() {
        let mut f = Fixture::new();
        let a = f.entity("a", Some(Point::new(3.0, 4.0)));
        let sync = Synchronizer::new(&f.terms, &f.catalog);
        let updates = sync.move_entities(&mut f.ws, f.diagram, &[a], 0.0, 0.0).unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn spread_places_on_circle_around_anchor_centre() {
        let mut f = Fixture::new();
        let anchor = f.entity("anchor", Some(Point::new(0.0, 0.0)));
        f.ws.set_size(anchor, Size::new(100.0, 50.0)).unwrap();
        let a = f.entity("a", None);
        let b = f.entity("b", None);
        f.ws.add_link(Iri::from("urn:imported"), anchor, a, LinkType::Default).unwrap();

        let sync = Synchronizer::new(&f.terms, &f.catalog);
        let updates = sync.spread(&mut f.ws, anchor, &[a, b], f.diagram).unwrap();

        // Radius 300 around (50, 25).
        let pa = f.ws.entity(a).unwrap().position(f.diagram).unwrap();
        let pb = f.ws.entity(b).unwrap().position(f.diagram).unwrap();
        assert!((pa.x - 350.0).abs() < 1e-9 && (pa.y - 25.0).abs() < 1e-9);
        assert!((pb.x + 250.0).abs() < 1e-9 && (pb.y - 25.0).abs() < 1e-9);
        assert!(f.ws.entity(a).unwrap().is_visible(f.diagram));
        assert!(f.ws.entity(b).unwrap().is_visible(f.diagram));
        assert!(f.ws.links().all(|(_, l)| l.is_drawn(f.diagram)));
        assert!(updates.contains(&UpdateOp::Element { entity: b }));
    }
}
