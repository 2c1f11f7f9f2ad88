//! JSON-LD documents exchanged with the store.
//!
//! Bodies returned by a GET step are validated once at the boundary and then
//! carried verbatim into the DELETE step of the following transaction.

use serde::Serialize;
use serde_json::{json, Map, Value};
use termgraph_core::Iri;

use crate::error::DeserializationError;

/// A JSON-LD document whose shape has been checked.
///
/// Accepted shapes: an array of node objects (optionally wrapping named
/// graphs as `{"@id": g, "@graph": [...]}`), or a single object that is
/// either a graph wrapper or a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonLdDocument(Value);

impl JsonLdDocument {
    /// Parses a response body. A blank body means "no statements".
    pub fn parse(body: &str) -> Result<Option<Self>, DeserializationError> {
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value).map(Some)
    }

    pub fn from_value(value: Value) -> Result<Self, DeserializationError> {
        match &value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    check_node_or_graph(item, &format!("$[{}]", i))?;
                }
            }
            Value::Object(_) => check_node_or_graph(&value, "$")?,
            _ => {
                return Err(DeserializationError::Shape {
                    path: "$".to_string(),
                    expected: "JSON-LD array or object",
                })
            }
        }
        Ok(JsonLdDocument(value))
    }

    /// Builds a document placing `nodes` in the named graph `graph`.
    pub fn graph(graph: &Iri, context: Value, nodes: Vec<Value>) -> Self {
        JsonLdDocument(json!({
            "@context": context,
            "@id": graph.as_str(),
            "@graph": nodes,
        }))
    }

    /// Node objects of the document, with graph wrappers flattened away.
    pub fn nodes(&self) -> Vec<&Map<String, Value>> {
        let mut nodes = Vec::new();
        match &self.0 {
            Value::Array(items) => {
                for item in items {
                    collect_nodes(item, &mut nodes);
                }
            }
            other => collect_nodes(other, &mut nodes),
        }
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// `@id` of every node that has one.
    pub fn subjects(&self) -> Vec<&str> {
        self.nodes()
            .into_iter()
            .filter_map(|n| n.get("@id").and_then(Value::as_str))
            .collect()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

fn check_node_or_graph(value: &Value, path: &str) -> Result<(), DeserializationError> {
    let object = value.as_object().ok_or_else(|| DeserializationError::Shape {
        path: path.to_string(),
        expected: "node object",
    })?;
    if let Some(graph) = object.get("@graph") {
        let items = graph.as_array().ok_or_else(|| DeserializationError::Shape {
            path: format!("{}.@graph", path),
            expected: "array",
        })?;
        for (i, item) in items.iter().enumerate() {
            if !item.is_object() {
                return Err(DeserializationError::Shape {
                    path: format!("{}.@graph[{}]", path, i),
                    expected: "node object",
                });
            }
        }
    }
    if let Some(id) = object.get("@id") {
        if !id.is_string() {
            return Err(DeserializationError::Shape {
                path: format!("{}.@id", path),
                expected: "string",
            });
        }
    }
    Ok(())
}

fn collect_nodes<'a>(value: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    let Some(object) = value.as_object() else {
        return;
    };
    match object.get("@graph").and_then(Value::as_array) {
        Some(items) => out.extend(items.iter().filter_map(Value::as_object)),
        None => out.push(object),
    }
}

/// `@context` used for every document written by this crate.
///
/// Binds `og:` to `vocabulary` and marks the properties whose values are IRIs.
pub fn og_context(vocabulary: &str) -> Value {
    let id = json!({ "@type": "@id" });
    json!({
        "og": vocabulary,
        "og:iri": id,
        "og:source": id,
        "og:target": id,
        "og:vertex": id,
        "og:diagram": id,
    })
}
