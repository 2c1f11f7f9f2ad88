//! Snapshot files on disk.

use termgraph_core::{
    vocab, Iri, LinkType, Point, RelationshipCatalog, RelationshipType, Term, TermCache, Workspace,
};
use serde_json::Value;
use termgraph_store::{DeserializationError, ProjectSnapshot, StoreError};

fn project() -> ProjectSnapshot {
    let mut ws = Workspace::new();
    let d = ws.add_diagram("Main");
    let root = ws.packages.root_id();
    let a = ws.add_entity(Iri::from("urn:a"), root).unwrap();
    let b = ws.add_entity(Iri::from("urn:b"), root).unwrap();
    ws.place(a, d, Point::new(1.0, 2.0)).unwrap();
    ws.add_link(Iri::from("urn:p"), a, b, LinkType::Default).unwrap();

    let mut terms = TermCache::new();
    terms.insert(
        Iri::from("urn:a"),
        Term::new(Iri::from("urn:s"))
            .with_type(vocab::RELATIONSHIP_CLASS)
            .with_label("cs", "A"),
    );
    let mut catalog = RelationshipCatalog::new("https://project.example/");
    catalog.insert(
        Iri::from("urn:p"),
        RelationshipType::new(Iri::from("https://project.example/s"), LinkType::Default),
    );
    ProjectSnapshot::new(ws, terms, catalog)
}

#[test]
fn snapshot_survives_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    project().save(&path).unwrap();

    let loaded = ProjectSnapshot::load(&path).unwrap();
    let ws = &loaded.workspace;
    assert_eq!(ws.entity_count(), 2);
    assert_eq!(ws.link_count(), 1);
    assert_eq!(ws.diagram_count(), 1);

    let a = ws.find_entity(&Iri::from("urn:a")).unwrap();
    let d = ws.diagrams().next().unwrap().0;
    assert_eq!(ws.entity(a).unwrap().position(d), Some(Point::new(1.0, 2.0)));
    assert_eq!(ws.connections(a).unwrap().len(), 1);
    assert!(loaded.terms.get(&Iri::from("urn:a")).unwrap().is_relationship_class());
    assert!(loaded.catalog.is_local(&Iri::from("urn:p")));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProjectSnapshot::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
    assert!(err.is_io());
}

#[test]
fn garbage_file_is_a_deserialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"workspace\": 3}").unwrap();
    let err = ProjectSnapshot::load(&path).unwrap_err();
    assert!(matches!(err, StoreError::Deserialization(_)));
    assert!(!err.is_io());
}

/// Returns the first object in `value` (depth first) that has `key`.
fn first_with_key<'a>(value: &'a mut Value, key: &str) -> Option<&'a mut serde_json::Map<String, Value>> {
    if matches!(value, Value::Object(map) if map.contains_key(key)) {
        return value.as_object_mut();
    }
    match value {
        Value::Object(map) => map.values_mut().find_map(|v| first_with_key(v, key)),
        Value::Array(items) => items.iter_mut().find_map(|v| first_with_key(v, key)),
        _ => None,
    }
}

fn rewrite(path: &std::path::Path, edit: impl FnOnce(&mut Value)) {
    let mut json: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    edit(&mut json);
    std::fs::write(path, serde_json::to_string(&json).unwrap()).unwrap();
}

#[test]
fn dangling_connection_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    project().save(&path).unwrap();
    rewrite(&path, |json| {
        let entity = first_with_key(&mut json["workspace"], "connections").unwrap();
        entity.insert("connections".to_string(), serde_json::json!([7]));
    });

    let err = ProjectSnapshot::load(&path).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Deserialization(DeserializationError::InvalidValue { .. })
    ));
    assert!(!err.is_io());
}

#[test]
fn active_link_to_inactive_entity_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    project().save(&path).unwrap();
    rewrite(&path, |json| {
        let entity = first_with_key(&mut json["workspace"], "connections").unwrap();
        entity.insert("active".to_string(), Value::Bool(false));
    });

    match ProjectSnapshot::load(&path).unwrap_err() {
        StoreError::Deserialization(DeserializationError::InvalidValue { path, reason }) => {
            assert_eq!(path, "$.workspace");
            assert!(reason.contains("inactive entity"), "{}", reason);
        }
        other => panic!("unexpected error: {}", other),
    }
}
