//! Turns remote-update descriptors into per-subject JSON-LD documents.
//!
//! Every record lives in the application-context graph. Subjects:
//!
//! | record | subject |
//! |---|---|
//! | element | `<iri>/diagram` |
//! | element placement | `<iri>/diagram-<n+1>` |
//! | link | `<context>-<id>` |
//! | link vertices | `<link>/diagram-<n+1>` and `<link>/diagram-<n+1>/vertex-<i+1>` |
//! | diagram | `<context>/diagram-<n+1>` |
//!
//! Documents are built from the workspace as it is when the descriptor is
//! resolved, never from state captured when it was emitted.

use serde_json::{json, Map, Value};
use termgraph_core::{
    Cardinality, CoreError, DiagramId, EntityId, Iri, LinkId, LinkType, Representation, UpdateOp,
    Workspace,
};

use crate::config::StoreConfig;
use crate::jsonld::{og_context, JsonLdDocument};

/// New statements for one subject. An empty document deletes the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectUpdate {
    pub subject: Iri,
    pub document: JsonLdDocument,
}

/// Builds documents for one workspace and store configuration.
#[derive(Debug, Clone, Copy)]
pub struct DocumentBuilder<'a> {
    ws: &'a Workspace,
    config: &'a StoreConfig,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(ws: &'a Workspace, config: &'a StoreConfig) -> Self {
        DocumentBuilder { ws, config }
    }

    /// Subject updates that persist `op`.
    pub fn subject_updates(&self, op: &UpdateOp) -> Result<Vec<SubjectUpdate>, CoreError> {
        match *op {
            UpdateOp::Element { entity } => Ok(vec![self.element(entity)?]),
            UpdateOp::ElementDiagram { diagram, entity } => Ok(vec![self.element_diagram(diagram, entity)?]),
            UpdateOp::Link { link } => Ok(vec![self.link(link)?]),
            UpdateOp::LinkVertices { diagram, link } => self.link_vertices(diagram, link),
            UpdateOp::DeleteLinkVertices {
                diagram,
                link,
                from,
                count,
            } => {
                self.ws.link(link)?;
                self.ws.diagram(diagram)?;
                let list = self.link_diagram_subject(link, diagram);
                Ok((from..from + count)
                    .map(|i| SubjectUpdate {
                        subject: vertex_subject(&list, i),
                        document: self.document(Vec::new()),
                    })
                    .collect())
            }
            UpdateOp::Diagram { diagram } => Ok(vec![self.diagram(diagram)?]),
        }
    }

    pub fn link_subject(&self, link: LinkId) -> Iri {
        Iri::new(format!("{}-{}", self.config.application_context, link))
    }

    fn link_diagram_subject(&self, link: LinkId, diagram: DiagramId) -> Iri {
        self.link_subject(link)
            .join(&format!("/diagram-{}", diagram.ordinal()))
    }

    fn element(&self, id: EntityId) -> Result<SubjectUpdate, CoreError> {
        let entity = self.ws.entity(id)?;
        let subject = entity.iri.join("/diagram");
        let diagrams: Vec<String> = entity
            .diagrams
            .iter()
            .map(|d| entity.iri.join(&format!("/diagram-{}", d.ordinal())).to_string())
            .collect();
        let node = json!({
            "@id": subject.as_str(),
            "@type": "og:element",
            "og:id": id.to_string(),
            "og:iri": entity.iri.as_str(),
            "og:active": entity.active,
            "og:diagram": diagrams,
        });
        Ok(self.update(subject, vec![node]))
    }

    fn element_diagram(&self, diagram: DiagramId, id: EntityId) -> Result<SubjectUpdate, CoreError> {
        self.ws.diagram(diagram)?;
        let entity = self.ws.entity(id)?;
        let subject = entity.iri.join(&format!("/diagram-{}", diagram.ordinal()));
        let view = entity.view(diagram);
        let position = view.position.unwrap_or_default();
        let node = json!({
            "@id": subject.as_str(),
            "@type": "og:elementDiagram",
            "og:index": diagram.0,
            "og:position-x": position.x.round() as i64,
            "og:position-y": position.y.round() as i64,
            "og:hidden": view.hidden,
        });
        Ok(self.update(subject, vec![node]))
    }

    fn link(&self, id: LinkId) -> Result<SubjectUpdate, CoreError> {
        let link = self.ws.link(id)?;
        let source = self.ws.entity(link.source)?;
        let target = self.ws.entity(link.target)?;
        let subject = self.link_subject(id);

        let mut node = Map::new();
        node.insert("@id".into(), subject.as_str().into());
        node.insert("@type".into(), "og:link".into());
        node.insert("og:id".into(), id.to_string().into());
        node.insert("og:iri".into(), link.iri.as_str().into());
        node.insert("og:source-id".into(), link.source.to_string().into());
        node.insert("og:target-id".into(), link.target.to_string().into());
        node.insert("og:source".into(), source.iri.as_str().into());
        node.insert("og:target".into(), target.iri.as_str().into());
        node.insert("og:type".into(), link_type_tag(link.kind).into());
        node.insert("og:active".into(), link.active.into());
        insert_cardinality(&mut node, "og:sourceCardinality", &link.source_cardinality);
        insert_cardinality(&mut node, "og:targetCardinality", &link.target_cardinality);

        Ok(self.update(subject, vec![Value::Object(node)]))
    }

    fn link_vertices(&self, diagram: DiagramId, id: LinkId) -> Result<Vec<SubjectUpdate>, CoreError> {
        self.ws.diagram(diagram)?;
        let link = self.ws.link(id)?;
        let list = self.link_diagram_subject(id, diagram);
        let vertices = link.vertices(diagram);

        let vertex_ids: Vec<String> = (0..vertices.len())
            .map(|i| vertex_subject(&list, i).to_string())
            .collect();
        let mut updates = vec![self.update(
            list.clone(),
            vec![json!({
                "@id": list.as_str(),
                "@type": "og:linkDiagram",
                "og:index": diagram.0,
                "og:vertex": vertex_ids,
            })],
        )];
        for (i, vertex) in vertices.iter().enumerate() {
            let subject = vertex_subject(&list, i);
            let node = json!({
                "@id": subject.as_str(),
                "@type": "og:vertex",
                "og:index": i,
                "og:position-x": vertex.x.round() as i64,
                "og:position-y": vertex.y.round() as i64,
            });
            updates.push(self.update(subject, vec![node]));
        }
        Ok(updates)
    }

    fn diagram(&self, id: DiagramId) -> Result<SubjectUpdate, CoreError> {
        let diagram = self.ws.diagram(id)?;
        let subject = self
            .config
            .application_context
            .join(&format!("/diagram-{}", id.ordinal()));
        let node = json!({
            "@id": subject.as_str(),
            "@type": "og:diagram",
            "og:index": id.0,
            "og:name": diagram.name,
            "og:representation": representation_tag(diagram.representation),
            "og:active": diagram.active,
        });
        Ok(self.update(subject, vec![node]))
    }

    fn update(&self, subject: Iri, nodes: Vec<Value>) -> SubjectUpdate {
        SubjectUpdate {
            subject,
            document: self.document(nodes),
        }
    }

    fn document(&self, nodes: Vec<Value>) -> JsonLdDocument {
        JsonLdDocument::graph(
            &self.config.application_context,
            og_context(&self.config.vocabulary),
            nodes,
        )
    }
}

fn vertex_subject(list: &Iri, index: usize) -> Iri {
    list.join(&format!("/vertex-{}", index + 1))
}

fn insert_cardinality(node: &mut Map<String, Value>, prefix: &str, cardinality: &Cardinality) {
    if cardinality.is_none() {
        return;
    }
    node.insert(format!("{}1", prefix), cardinality.first().into());
    node.insert(format!("{}2", prefix), cardinality.second().into());
}

pub fn link_type_tag(kind: LinkType) -> &'static str {
    match kind {
        LinkType::Default => "default",
        LinkType::Generalization => "generalization",
    }
}

pub fn representation_tag(representation: Representation) -> &'static str {
    match representation {
        Representation::Full => "full",
        Representation::Compact => "compact",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termgraph_core::Point;

    fn fixture() -> (Workspace, StoreConfig, EntityId, EntityId, LinkId, DiagramId) {
        let mut ws = Workspace::new();
        let d = ws.add_diagram("Main");
        let root = ws.packages.root_id();
        let a = ws.add_entity(Iri::from("https://v.example/a"), root).unwrap();
        let b = ws.add_entity(Iri::from("https://v.example/b"), root).unwrap();
        ws.place(a, d, Point::new(10.4, 20.6)).unwrap();
        let l = ws
            .add_link(Iri::from("https://v.example/p"), a, b, LinkType::Default)
            .unwrap();
        let config = StoreConfig::new("http://store/repo", Iri::from("https://app.example/ctx"));
        (ws, config, a, b, l, d)
    }

    fn node(update: &SubjectUpdate) -> &Map<String, Value> {
        update.document.nodes()[0]
    }

    #[test]
    fn element_record_lists_diagram_placements() {
        let (ws, config, a, _, _, _) = fixture();
        let updates = DocumentBuilder::new(&ws, &config)
            .subject_updates(&UpdateOp::Element { entity: a })
            .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].subject, Iri::from("https://v.example/a/diagram"));
        let n = node(&updates[0]);
        assert_eq!(n["og:active"], true);
        assert_eq!(n["og:diagram"], json!(["https://v.example/a/diagram-1"]));
        assert_eq!(updates[0].document.as_value()["@id"], "https://app.example/ctx");
    }

    #[test]
    fn placement_rounds_position() {
        let (ws, config, a, b, _, d) = fixture();
        let builder = DocumentBuilder::new(&ws, &config);
        let updates = builder
            .subject_updates(&UpdateOp::ElementDiagram { diagram: d, entity: a })
            .unwrap();
        let n = node(&updates[0]);
        assert_eq!(updates[0].subject, Iri::from("https://v.example/a/diagram-1"));
        assert_eq!(n["og:position-x"], 10);
        assert_eq!(n["og:position-y"], 21);
        assert_eq!(n["og:hidden"], false);

        let hidden = builder
            .subject_updates(&UpdateOp::ElementDiagram { diagram: d, entity: b })
            .unwrap();
        assert_eq!(node(&hidden[0])["og:hidden"], true);
    }

    #[test]
    fn link_record_omits_none_cardinalities() {
        let (mut ws, config, _, _, l, _) = fixture();
        ws.set_cardinalities(l, "0..*".parse().unwrap(), Cardinality::none())
            .unwrap();
        let updates = DocumentBuilder::new(&ws, &config)
            .subject_updates(&UpdateOp::Link { link: l })
            .unwrap();
        let n = node(&updates[0]);
        assert_eq!(updates[0].subject, Iri::from(format!("https://app.example/ctx-{}", l).as_str()));
        assert_eq!(n["og:sourceCardinality1"], "0");
        assert_eq!(n["og:sourceCardinality2"], "*");
        assert!(!n.contains_key("og:targetCardinality1"));
        assert_eq!(n["og:type"], "default");
        assert_eq!(n["og:source"], "https://v.example/a");
    }

    #[test]
    fn vertices_get_one_subject_each() {
        let (mut ws, config, _, _, l, d) = fixture();
        ws.set_vertices(l, d, [Point::new(1.0, 2.0), Point::new(3.0, 4.0)].into_iter().collect())
            .unwrap();
        let updates = DocumentBuilder::new(&ws, &config)
            .subject_updates(&UpdateOp::LinkVertices { diagram: d, link: l })
            .unwrap();
        let list = format!("https://app.example/ctx-{}/diagram-1", l);
        let subjects: Vec<String> = updates.iter().map(|u| u.subject.to_string()).collect();
        assert_eq!(
            subjects,
            vec![list.clone(), format!("{}/vertex-1", list), format!("{}/vertex-2", list)]
        );
        assert_eq!(node(&updates[2])["og:position-y"], 4);
    }

    #[test]
    fn vertex_deletion_yields_empty_documents() {
        let (ws, config, _, _, l, d) = fixture();
        let updates = DocumentBuilder::new(&ws, &config)
            .subject_updates(&UpdateOp::DeleteLinkVertices {
                diagram: d,
                link: l,
                from: 1,
                count: 2,
            })
            .unwrap();
        assert_eq!(updates.len(), 2);
        assert!(updates[0].subject.as_str().ends_with("/vertex-2"));
        assert!(updates.iter().all(|u| u.document.is_empty()));
    }

    #[test]
    fn diagram_record() {
        let (mut ws, config, _, _, _, d) = fixture();
        ws.set_representation(d, Representation::Compact).unwrap();
        let updates = DocumentBuilder::new(&ws, &config)
            .subject_updates(&UpdateOp::Diagram { diagram: d })
            .unwrap();
        assert_eq!(updates[0].subject, Iri::from("https://app.example/ctx/diagram-1"));
        let n = node(&updates[0]);
        assert_eq!(n["og:name"], "Main");
        assert_eq!(n["og:representation"], "compact");
    }

    #[test]
    fn unknown_ids_fail() {
        let (ws, config, _, _, _, _) = fixture();
        let err = DocumentBuilder::new(&ws, &config)
            .subject_updates(&UpdateOp::Link { link: LinkId(42) })
            .unwrap_err();
        assert_eq!(err, CoreError::LinkNotFound { id: LinkId(42) });
    }
}
