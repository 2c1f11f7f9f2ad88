//! Local save format of a single diagram.
//!
//! The format is plain JSON:
//!
//! ```json
//! {"offsetX":0,"offsetY":0,"zoom":100,"gridSize":0,"selectedLink":"",
//!  "language":"en","links":[...],"nodes":[...]}
//! ```
//!
//! Nodes and links carry a `type` discriminator. Tags are checked before the
//! typed records are built, so an unknown tag is reported with its path
//! rather than as a generic parse failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use termgraph_core::{
    Cardinality, CoreError, DiagramId, EntityId, Iri, LinkId, LinkType, Point, Representation,
    TermCache, UpdateBatch, UpdateOp, Viewport, Workspace,
};

use crate::error::DeserializationError;

const DEFAULT_COLOR: &str = "white";
const NODE_TAGS: [&str; 3] = ["concept", "relationship", "property"];
const LINK_TAGS: [&str; 2] = ["default", "generalization"];

/// Discriminator of a saved node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Concept,
    Relationship,
    Property,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedNode {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub iri: Iri,
    pub name: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
    /// `[name, value]` pairs.
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLink {
    pub id: LinkId,
    #[serde(rename = "type")]
    pub kind: LinkType,
    pub iri: Iri,
    pub source: EntityId,
    pub target: EntityId,
    #[serde(default)]
    pub vertices: Vec<Point>,
    #[serde(default)]
    pub source_cardinality: String,
    #[serde(default)]
    pub target_cardinality: String,
}

/// One diagram in the save format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSave {
    pub offset_x: f64,
    pub offset_y: f64,
    /// Percent; 100 is scale 1.
    pub zoom: f64,
    #[serde(default)]
    pub grid_size: f64,
    #[serde(default)]
    pub selected_link: String,
    pub language: String,
    pub links: Vec<SavedLink>,
    pub nodes: Vec<SavedNode>,
}

impl DiagramSave {
    /// Captures the visible part of `diagram`.
    ///
    /// Nodes are the visible entities; links are the drawn active links
    /// whose endpoints are both visible. Attribute pairs are only filled in
    /// the compact representation, where properties are not nodes.
    pub fn capture(
        ws: &Workspace,
        diagram: DiagramId,
        terms: &TermCache,
        language: &str,
    ) -> Result<Self, CoreError> {
        let d = ws.diagram(diagram)?;
        let compact = d.representation == Representation::Compact;

        let mut nodes = Vec::new();
        for (id, entity) in ws.entities().filter(|(_, e)| e.is_visible(diagram)) {
            let term = terms.get(&entity.iri).ok_or_else(|| CoreError::TermNotFound {
                iri: entity.iri.clone(),
            })?;
            let kind = if term.is_relationship_class() {
                NodeKind::Relationship
            } else if term.is_property_class() {
                NodeKind::Property
            } else {
                NodeKind::Concept
            };
            let attributes = if compact {
                ws.compact_attributes(id, language, terms)?
                    .into_iter()
                    .map(|name| (name, String::new()))
                    .collect()
            } else {
                Vec::new()
            };
            let position = entity.position(diagram).unwrap_or_default();
            nodes.push(SavedNode {
                id,
                kind,
                iri: entity.iri.clone(),
                name: ws.label(id, language, terms)?,
                color: DEFAULT_COLOR.to_string(),
                x: position.x,
                y: position.y,
                attributes,
            });
        }

        let mut links = Vec::new();
        for (id, link) in ws.links() {
            if !link.active || !link.is_drawn(diagram) {
                continue;
            }
            let ends_visible = ws.entity(link.source)?.is_visible(diagram)
                && ws.entity(link.target)?.is_visible(diagram);
            if !ends_visible {
                continue;
            }
            links.push(SavedLink {
                id,
                kind: link.kind,
                iri: link.iri.clone(),
                source: link.source,
                target: link.target,
                vertices: link.vertices(diagram).to_vec(),
                source_cardinality: link.source_cardinality.as_string(),
                target_cardinality: link.target_cardinality.as_string(),
            });
        }

        Ok(DiagramSave {
            offset_x: d.viewport.origin.x,
            offset_y: d.viewport.origin.y,
            zoom: d.viewport.scale * 100.0,
            grid_size: 0.0,
            selected_link: String::new(),
            language: language.to_string(),
            links,
            nodes,
        })
    }

    /// Parses and validates a saved diagram.
    pub fn from_json(text: &str) -> Result<Self, DeserializationError> {
        let value: Value = serde_json::from_str(text)?;
        let root = value.as_object().ok_or_else(|| DeserializationError::Shape {
            path: "$".to_string(),
            expected: "object",
        })?;
        check_tags(root.get("nodes"), "$.nodes", "node", &NODE_TAGS)?;
        check_tags(root.get("links"), "$.links", "link", &LINK_TAGS)?;

        let save: DiagramSave = serde_json::from_value(value)?;
        for (i, link) in save.links.iter().enumerate() {
            for (field, text) in [
                ("sourceCardinality", &link.source_cardinality),
                ("targetCardinality", &link.target_cardinality),
            ] {
                if let Err(err) = text.parse::<Cardinality>() {
                    return Err(DeserializationError::InvalidValue {
                        path: format!("$.links[{}].{}", i, field),
                        reason: err.to_string(),
                    });
                }
            }
        }
        if !save.zoom.is_finite() || save.zoom <= 0.0 {
            return Err(DeserializationError::InvalidValue {
                path: "$.zoom".to_string(),
                reason: format!("zoom must be positive, got {}", save.zoom),
            });
        }
        Ok(save)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Re-applies positions, visibility, vertices and cardinalities to
    /// `diagram` and returns the descriptors that persist them.
    ///
    /// Records whose id is unknown or whose IRI no longer matches the
    /// workspace are skipped. Links whose endpoints are inactive are
    /// skipped as well.
    pub fn restore_into(&self, ws: &mut Workspace, diagram: DiagramId) -> Result<UpdateBatch, CoreError> {
        ws.diagram(diagram)?;
        ws.set_viewport(
            diagram,
            Viewport {
                origin: Point::new(self.offset_x, self.offset_y),
                scale: self.zoom / 100.0,
            },
        )?;
        let mut updates = UpdateBatch::new();
        updates.push(UpdateOp::Diagram { diagram });

        for node in &self.nodes {
            let matches = ws.entity(node.id).map(|e| e.active && e.iri == node.iri);
            if !matches.unwrap_or(false) {
                tracing::debug!("Skipping saved node {} <{}>", node.id, node.iri);
                continue;
            }
            let first_appearance = !ws.entity(node.id)?.diagrams.contains(&diagram);
            ws.place(node.id, diagram, Point::new(node.x, node.y))?;
            updates.push(UpdateOp::ElementDiagram {
                diagram,
                entity: node.id,
            });
            if first_appearance {
                updates.push(UpdateOp::Element { entity: node.id });
            }
        }

        for saved in &self.links {
            let matches = ws.link(saved.id).map(|l| {
                l.iri == saved.iri && l.source == saved.source && l.target == saved.target
            });
            if !matches.unwrap_or(false) {
                tracing::debug!("Skipping saved link {} <{}>", saved.id, saved.iri);
                continue;
            }
            if !ws.link(saved.id)?.active && ws.activate_link(saved.id).is_err() {
                tracing::debug!("Saved link {} has an inactive endpoint", saved.id);
                continue;
            }
            ws.set_cardinalities(
                saved.id,
                saved.source_cardinality.parse()?,
                saved.target_cardinality.parse()?,
            )?;
            let old = ws.link(saved.id)?.vertices(diagram).len();
            if old > saved.vertices.len() {
                updates.push(UpdateOp::DeleteLinkVertices {
                    diagram,
                    link: saved.id,
                    from: saved.vertices.len(),
                    count: old - saved.vertices.len(),
                });
            }
            ws.set_vertices(saved.id, diagram, saved.vertices.iter().copied().collect())?;
            ws.set_drawn(saved.id, diagram, true)?;
            updates.push(UpdateOp::Link { link: saved.id });
            updates.push(UpdateOp::LinkVertices {
                diagram,
                link: saved.id,
            });
        }
        Ok(updates)
    }
}

fn check_tags(
    items: Option<&Value>,
    path: &str,
    kind: &'static str,
    known: &[&str],
) -> Result<(), DeserializationError> {
    let items = items
        .and_then(Value::as_array)
        .ok_or_else(|| DeserializationError::Shape {
            path: path.to_string(),
            expected: "array",
        })?;
    for (i, item) in items.iter().enumerate() {
        let tag = item
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DeserializationError::Shape {
                path: format!("{}[{}].type", path, i),
                expected: "string",
            })?;
        if !known.contains(&tag) {
            return Err(DeserializationError::UnknownTag {
                kind,
                tag: tag.to_string(),
                path: format!("{}[{}].type", path, i),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use termgraph_core::{vocab, Term};

    fn fixture() -> (Workspace, TermCache, DiagramId, EntityId, EntityId, LinkId) {
        let mut ws = Workspace::new();
        let d = ws.add_diagram("Main");
        let root = ws.packages.root_id();
        let mut terms = TermCache::new();
        terms.insert(Iri::from("urn:a"), Term::new(Iri::from("urn:s")).with_label("en", "Alpha"));
        terms.insert(
            Iri::from("urn:r"),
            Term::new(Iri::from("urn:s"))
                .with_type(vocab::RELATIONSHIP_CLASS)
                .with_label("en", "Rel"),
        );
        let a = ws.add_entity(Iri::from("urn:a"), root).unwrap();
        let r = ws.add_entity(Iri::from("urn:r"), root).unwrap();
        ws.place(a, d, Point::new(10.0, 20.0)).unwrap();
        ws.place(r, d, Point::new(200.0, 20.0)).unwrap();
        let l = ws
            .add_link(Iri::from(vocab::RELATED_ELEMENT_1), r, a, LinkType::Default)
            .unwrap();
        ws.set_cardinalities(l, Cardinality::none(), "1..1".parse().unwrap())
            .unwrap();
        ws.set_vertices(l, d, [Point::new(100.0, 50.0)].into_iter().collect())
            .unwrap();
        ws.set_drawn(l, d, true).unwrap();
        (ws, terms, d, a, r, l)
    }

    #[test]
    fn capture_tags_nodes_and_links() {
        let (ws, terms, d, a, r, l) = fixture();
        let save = DiagramSave::capture(&ws, d, &terms, "en").unwrap();

        assert_eq!(save.zoom, 100.0);
        assert_eq!(save.nodes.len(), 2);
        let alpha = save.nodes.iter().find(|n| n.id == a).unwrap();
        assert_eq!(alpha.kind, NodeKind::Concept);
        assert_eq!(alpha.name, "Alpha");
        let rel = save.nodes.iter().find(|n| n.id == r).unwrap();
        assert_eq!(rel.kind, NodeKind::Relationship);

        assert_eq!(save.links.len(), 1);
        assert_eq!(save.links[0].id, l);
        assert_eq!(save.links[0].target_cardinality, "1..1");
        assert_eq!(save.links[0].vertices, vec![Point::new(100.0, 50.0)]);
    }

    #[test]
    fn json_uses_camel_case_and_type_tags() {
        let (ws, terms, d, _, _, _) = fixture();
        let text = DiagramSave::capture(&ws, d, &terms, "en")
            .unwrap()
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("offsetX").is_some());
        assert!(value.get("gridSize").is_some());
        assert_eq!(value["links"][0]["type"], "default");
        assert_eq!(value["links"][0]["targetCardinality"], "1..1");
        assert!(value["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["type"] == "relationship"));

        let back = DiagramSave::from_json(&text).unwrap();
        assert_eq!(back.nodes.len(), 2);
    }

    #[test]
    fn unknown_node_tag_is_reported_with_path() {
        let text = json!({
            "offsetX": 0, "offsetY": 0, "zoom": 100, "language": "en",
            "links": [],
            "nodes": [{"id": 0, "type": "subkind", "iri": "urn:a", "name": "A",
                       "color": "white", "x": 0, "y": 0}]
        })
        .to_string();
        match DiagramSave::from_json(&text).unwrap_err() {
            DeserializationError::UnknownTag { kind, tag, path } => {
                assert_eq!(kind, "node");
                assert_eq!(tag, "subkind");
                assert_eq!(path, "$.nodes[0].type");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_links_array_is_a_shape_error() {
        let text = r#"{"offsetX":0,"offsetY":0,"zoom":100,"language":"en","nodes":[]}"#;
        assert!(matches!(
            DiagramSave::from_json(text).unwrap_err(),
            DeserializationError::Shape { expected: "array", .. }
        ));
    }

    #[test]
    fn bad_cardinality_is_rejected() {
        let text = json!({
            "offsetX": 0, "offsetY": 0, "zoom": 100, "language": "en", "nodes": [],
            "links": [{"id": 0, "type": "default", "iri": "urn:p", "source": 0, "target": 1,
                       "sourceCardinality": "0..many"}]
        })
        .to_string();
        match DiagramSave::from_json(&text).unwrap_err() {
            DeserializationError::InvalidValue { path, .. } => {
                assert_eq!(path, "$.links[0].sourceCardinality")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn restore_reapplies_geometry() {
        let (mut ws, terms, d, a, _, l) = fixture();
        let mut save = DiagramSave::capture(&ws, d, &terms, "en").unwrap();
        save.zoom = 50.0;
        save.nodes.iter_mut().for_each(|n| n.x += 5.0);
        save.links[0].vertices.clear();

        ws.set_hidden(a, d, true).unwrap();
        let updates = save.restore_into(&mut ws, d).unwrap();

        assert!(ws.entity(a).unwrap().is_visible(d));
        assert_eq!(ws.entity(a).unwrap().position(d), Some(Point::new(15.0, 20.0)));
        assert_eq!(ws.diagram(d).unwrap().viewport.scale, 0.5);
        assert!(ws.link(l).unwrap().vertices(d).is_empty());
        assert!(updates.contains(&UpdateOp::DeleteLinkVertices {
            diagram: d,
            link: l,
            from: 0,
            count: 1
        }));
        assert!(updates.contains(&UpdateOp::ElementDiagram { diagram: d, entity: a }));
    }

    #[test]
    fn restore_skips_records_with_changed_iri() {
        let (mut ws, terms, d, a, _, _) = fixture();
        let mut save = DiagramSave::capture(&ws, d, &terms, "en").unwrap();
        for node in save.nodes.iter_mut().filter(|n| n.id == a) {
            node.iri = Iri::from("urn:other");
            node.x = 999.0;
        }
        save.restore_into(&mut ws, d).unwrap();
        assert_eq!(ws.entity(a).unwrap().position(d), Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn restore_skips_ids_missing_from_the_workspace() {
        let (mut ws, terms, d, a, _, _) = fixture();
        let mut save = DiagramSave::capture(&ws, d, &terms, "en").unwrap();
        let mut ghost = save.nodes[0].clone();
        ghost.id = EntityId(40);
        save.nodes.push(ghost);
        let mut stray = save.links[0].clone();
        stray.id = LinkId(40);
        save.links.push(stray);

        let updates = save.restore_into(&mut ws, d).unwrap();
        assert_eq!(ws.entity_count(), 2);
        assert_eq!(ws.link_count(), 1);
        assert!(!updates.contains(&UpdateOp::ElementDiagram { diagram: d, entity: EntityId(40) }));
        assert!(updates.contains(&UpdateOp::ElementDiagram { diagram: d, entity: a }));
        assert!(ws.validate().is_ok());
    }
}
