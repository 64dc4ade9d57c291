//! Model document loading and saving.
//!
//! Handles loading supermodel XML from files, strings, and HTTP URLs, and
//! walking the `<schema>` nodes the people annotations are attached to.

use std::path::Path;

use serde_json::Value;
use xmltree::{Element, EmitterConfig, Namespace, XMLNode};

use crate::codec::{text, SchemaMetadataCodec};
use crate::error::LoadError;
use crate::schema::{Schema, SchemaAnnotations};
use crate::types::SCHEMA_NAMESPACE;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

fn read_file(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a model document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidXml` if the file isn't well-formed XML.
pub fn load_model(path: &Path) -> Result<Element, LoadError> {
    let content = read_file(path)?;
    load_model_str(&content)
}

/// Load a model document from an XML string.
///
/// # Errors
///
/// Returns `LoadError::InvalidXml` if the string isn't well-formed XML.
pub fn load_model_str(content: &str) -> Result<Element, LoadError> {
    Element::parse(content.as_bytes()).map_err(|source| LoadError::InvalidXml { source })
}

/// Load a model document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails,
/// or `LoadError::InvalidXml` if the response isn't well-formed XML.
#[cfg(feature = "remote")]
pub fn load_model_url(url: &str) -> Result<Element, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network_error)?;

    load_model_str(&body)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a model document from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_model_auto(source: &str) -> Result<Element, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_model_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_model(Path::new(source))
    }
}

/// Load annotation entries from a JSON file.
///
/// The file holds either one annotations object or an array of them.
pub fn load_annotations(path: &Path) -> Result<Vec<SchemaAnnotations>, LoadError> {
    let content = read_file(path)?;
    load_annotations_str(&content)
}

/// Load annotation entries from a JSON string. See [`load_annotations`].
pub fn load_annotations_str(content: &str) -> Result<Vec<SchemaAnnotations>, LoadError> {
    let value: Value =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;

    let entries = match &value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| SchemaAnnotations::from_value(item, &format!("/{}", i)))
            .collect::<Result<Vec<_>, _>>()?,
        other => vec![SchemaAnnotations::from_value(other, "")?],
    };
    Ok(entries)
}

/// True for elements of the host schema vocabulary (default or explicit namespace).
fn is_host_element(element: &Element, name: &str) -> bool {
    element.name == name
        && matches!(element.namespace.as_deref(), None | Some(SCHEMA_NAMESPACE))
}

/// The `<schema>` nodes of a model, in document order.
///
/// A document whose root is itself a `<schema>` yields just the root.
pub fn schema_nodes(model: &Element) -> Vec<&Element> {
    if is_host_element(model, "schema") {
        return vec![model];
    }
    model
        .children
        .iter()
        .filter_map(|child| match child {
            XMLNode::Element(e) if is_host_element(e, "schema") => Some(e),
            _ => None,
        })
        .collect()
}

/// Mutable variant of [`schema_nodes`].
pub fn schema_nodes_mut(model: &mut Element) -> Vec<&mut Element> {
    if is_host_element(model, "schema") {
        return vec![model];
    }
    model
        .children
        .iter_mut()
        .filter_map(|child| match child {
            XMLNode::Element(e) if is_host_element(e, "schema") => Some(e),
            _ => None,
        })
        .collect()
}

/// The base schema of a node: its name and declared field names.
pub fn schema_from_node(node: &Element) -> Schema {
    let name = node.attributes.get("name").cloned().unwrap_or_default();
    let fields = node.children.iter().filter_map(|child| match child {
        XMLNode::Element(e) if is_host_element(e, "field") => e.attributes.get("name").cloned(),
        _ => None,
    });
    Schema::new(name).with_fields(fields)
}

/// Loads every schema of a model, including its people annotations.
pub fn read_model(model: &Element, codec: &SchemaMetadataCodec) -> Vec<Schema> {
    schema_nodes(model)
        .into_iter()
        .map(|node| {
            let mut schema = schema_from_node(node);
            codec.read(node, &mut schema);
            tracing::debug!(schema = %schema.name, fields = schema.fields.len(), "read schema");
            schema
        })
        .collect()
}

/// Rewrites the people annotations of every schema node in canonical form.
///
/// Each node's annotations are read, removed, and written back, so repeated
/// tags collapse into one. Returns the schemas that were read.
pub fn normalize_model(model: &mut Element, codec: &SchemaMetadataCodec) -> Vec<Schema> {
    schema_nodes_mut(model)
        .into_iter()
        .map(|node| {
            let mut schema = schema_from_node(node);
            codec.read(node, &mut schema);
            let removed = codec.strip(node);
            codec.write(node, &schema);
            tracing::debug!(schema = %schema.name, removed, "normalized schema");
            schema
        })
        .collect()
}

/// Builds a model document holding one `<schema>` per entry.
pub fn build_model(schemas: &[Schema], codec: &SchemaMetadataCodec) -> Element {
    let mut model = host_element("model");
    let mut namespaces = Namespace::empty();
    namespaces.put("", SCHEMA_NAMESPACE);
    model.namespaces = Some(namespaces);

    for schema in schemas {
        let mut node = host_element("schema");
        if !schema.name.is_empty() {
            node.attributes
                .insert("name".to_string(), schema.name.clone());
        }
        for field in &schema.fields {
            let mut field_el = host_element("field");
            field_el.attributes.insert("name".to_string(), field.clone());
            node.children.push(XMLNode::Element(field_el));
        }
        codec.write(&mut node, schema);
        model.children.push(XMLNode::Element(node));
    }
    model
}

fn host_element(name: &str) -> Element {
    let mut element = Element::new(name);
    element.namespace = Some(SCHEMA_NAMESPACE.to_string());
    element
}

/// Serialize a model document as indented XML.
///
/// # Errors
///
/// Returns `LoadError::WriteError` if the XML writer rejects the tree.
pub fn write_model(model: &Element) -> Result<String, LoadError> {
    let mut buffer = Vec::new();
    let config = EmitterConfig::new().perform_indent(true);
    model
        .write_with_config(&mut buffer, config)
        .map_err(|e| LoadError::WriteError {
            message: e.to_string(),
        })?;

    String::from_utf8(buffer).map_err(|e| LoadError::WriteError {
        message: e.to_string(),
    })
}

/// Text content of the first host-vocabulary child named `name`.
pub fn child_text(node: &Element, name: &str) -> Option<String> {
    node.children.iter().find_map(|child| match child {
        XMLNode::Element(e) if is_host_element(e, name) => Some(text(e)),
        _ => None,
    })
}
