//! Reading and writing people annotations on supermodel schema nodes.
//!
//! The annotations live as namespaced children of a `<schema>` element:
//!
//! ```xml
//! <schema xmlns:people="http://namespaces.plone.org/supermodel/people">
//!   <people:title>
//!     <people:item>first_name</people:item>
//!     <people:item>last_name</people:item>
//!   </people:title>
//!   <people:details position="right">
//!     <people:item>email</people:item>
//!   </people:details>
//!   <people:columns>
//!     <people:column><people:item>first_name</people:item><people:item>last_name</people:item></people:column>
//!     <people:column selectable="true"><people:item>town</people:item></people:column>
//!   </people:columns>
//! </schema>
//! ```
//!
//! Several `title` or `order` tags are concatenated on read, but write always
//! produces a single tag.

use xmltree::{Element, Namespace, XMLNode};

use crate::schema::{
    get_columns, get_detail_fields, get_order, get_selectable_fields, get_title_fields,
    set_columns, set_detail_fields, set_order, set_selectable_fields, set_title_fields,
    DetailFields, Schema,
};
use crate::types::{tags, XmlNamespace, DEFAULT_POSITION};

/// A list-valued annotation mapped by an item list handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAnnotation {
    Title,
    Order,
}

impl ListAnnotation {
    fn get(self, schema: &Schema) -> Vec<String> {
        match self {
            ListAnnotation::Title => get_title_fields(schema),
            ListAnnotation::Order => get_order(schema),
        }
    }

    fn set(self, schema: &mut Schema, values: Vec<String>) {
        match self {
            ListAnnotation::Title => set_title_fields(schema, values),
            ListAnnotation::Order => set_order(schema, values),
        }
    }
}

/// Maps one annotation between a schema node and a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataHandler {
    /// `<title>` / `<order>`: a flat list of items.
    ItemList {
        tag: &'static str,
        annotation: ListAnnotation,
    },
    /// `<details position="…">`: items per panel position.
    Details { tag: &'static str },
    /// `<columns>` of `<column>` groups.
    Columns { tag: &'static str },
}

impl MetadataHandler {
    pub fn tag(&self) -> &'static str {
        match self {
            MetadataHandler::ItemList { tag, .. }
            | MetadataHandler::Details { tag }
            | MetadataHandler::Columns { tag } => *tag,
        }
    }

    /// Reads this handler's tags from `node` into `schema`.
    ///
    /// Leaves `schema` untouched when `node` has no such tag.
    pub fn parse(&self, ns: &XmlNamespace, node: &Element, schema: &mut Schema) {
        let found: Vec<&Element> = children(node, ns, self.tag()).collect();
        if found.is_empty() {
            return;
        }
        tracing::debug!(tag = self.tag(), count = found.len(), "parsing people tags");

        match *self {
            MetadataHandler::ItemList { annotation, .. } => {
                let values = found
                    .into_iter()
                    .flat_map(|tag| item_texts(tag, ns))
                    .collect();
                annotation.set(schema, values);
            }
            MetadataHandler::Details { .. } => {
                let mut details = DetailFields::new();
                for tag in found {
                    let position = tag
                        .attributes
                        .get(tags::POSITION)
                        .filter(|p| !p.is_empty())
                        .cloned()
                        .unwrap_or_else(|| DEFAULT_POSITION.to_string());
                    details.insert(position, item_texts(tag, ns).collect());
                }
                set_detail_fields(schema, details);
            }
            MetadataHandler::Columns { .. } => {
                let mut columns = Vec::new();
                let mut selectable_fields = Vec::new();

                for tag in found {
                    for column in children(tag, ns, tags::COLUMN) {
                        let values: Vec<String> = item_texts(column, ns).collect();
                        let marked = column
                            .attributes
                            .get(tags::SELECTABLE)
                            .is_some_and(|v| !v.is_empty());

                        if marked && values.len() == 1 {
                            selectable_fields.extend(values.iter().cloned());
                        } else if marked {
                            tracing::debug!(
                                items = values.len(),
                                "ignoring selectable on multi-field column"
                            );
                        }
                        columns.push(values);
                    }
                }

                set_columns(schema, columns);
                set_selectable_fields(schema, selectable_fields);
            }
        }
    }

    /// Appends this handler's tags for `schema` to `node`.
    ///
    /// Writes nothing when the annotation is empty.
    pub fn write(&self, ns: &XmlNamespace, node: &mut Element, schema: &Schema) {
        match *self {
            MetadataHandler::ItemList { tag, annotation } => {
                let values = annotation.get(schema);
                if values.is_empty() {
                    return;
                }
                node.children
                    .push(XMLNode::Element(item_list(ns, tag, &values)));
            }
            MetadataHandler::Details { tag } => {
                for (position, fields) in get_detail_fields(schema) {
                    let mut element = item_list(ns, tag, &fields);
                    element
                        .attributes
                        .insert(tags::POSITION.to_string(), position);
                    node.children.push(XMLNode::Element(element));
                }
            }
            MetadataHandler::Columns { tag } => {
                let columns = get_columns(schema);
                if columns.is_empty() {
                    return;
                }
                // Selectability is re-derived from the selectable list, not stored per column.
                let selectable_fields = get_selectable_fields(schema);

                let mut element = new_element(ns, tag);
                for column in &columns {
                    let mut column_el = item_list(ns, tags::COLUMN, column);
                    if column.len() == 1 && selectable_fields.contains(&column[0]) {
                        column_el
                            .attributes
                            .insert(tags::SELECTABLE.to_string(), "true".to_string());
                    }
                    element.children.push(XMLNode::Element(column_el));
                }
                node.children.push(XMLNode::Element(element));
            }
        }
    }
}

/// Handlers in processing order.
pub const HANDLERS: [MetadataHandler; 4] = [
    MetadataHandler::ItemList {
        tag: tags::TITLE,
        annotation: ListAnnotation::Title,
    },
    MetadataHandler::ItemList {
        tag: tags::ORDER,
        annotation: ListAnnotation::Order,
    },
    MetadataHandler::Details { tag: tags::DETAILS },
    MetadataHandler::Columns { tag: tags::COLUMNS },
];

/// Schema metadata handler for the people vocabulary.
///
/// Plugged into schema loading after the base schema has been parsed
/// ([`read`](Self::read)) and into schema serialization
/// ([`write`](Self::write)).
#[derive(Debug, Clone)]
pub struct SchemaMetadataCodec {
    namespace: XmlNamespace,
}

impl SchemaMetadataCodec {
    /// Codec bound to the `people` namespace.
    pub fn new() -> Self {
        Self::with_namespace(XmlNamespace::people())
    }

    pub fn with_namespace(namespace: XmlNamespace) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &XmlNamespace {
        &self.namespace
    }

    pub fn handlers(&self) -> &'static [MetadataHandler] {
        &HANDLERS
    }

    /// Reads all people annotations of `node` into `schema`.
    pub fn read(&self, node: &Element, schema: &mut Schema) {
        for handler in self.handlers() {
            handler.parse(&self.namespace, node, schema);
        }
    }

    /// Appends the people annotations of `schema` to `node`.
    ///
    /// The namespace prefix is declared on `node` when anything was written.
    pub fn write(&self, node: &mut Element, schema: &Schema) {
        let before = node.children.len();
        for handler in self.handlers() {
            handler.write(&self.namespace, node, schema);
        }

        if node.children.len() > before {
            declare_namespace(node, &self.namespace);
            tracing::debug!(
                schema = %schema.name,
                tags = node.children.len() - before,
                "wrote people tags"
            );
        }
    }

    /// Removes every child of `node` in this codec's namespace.
    ///
    /// Returns the number of removed elements.
    pub fn strip(&self, node: &mut Element) -> usize {
        let before = node.children.len();
        node.children
            .retain(|child| !matches!(child, XMLNode::Element(e) if in_namespace(e, &self.namespace)));
        before - node.children.len()
    }
}

impl Default for SchemaMetadataCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Binds `ns.prefix` to `ns.uri` on `node`.
///
/// A prefix already bound to another URI is rebound, since the written
/// elements would otherwise serialize under the wrong namespace.
pub fn declare_namespace(node: &mut Element, ns: &XmlNamespace) {
    let namespaces = node.namespaces.get_or_insert_with(Namespace::empty);
    if let Some(previous) = namespaces.force_put(ns.prefix.clone(), ns.uri.clone()) {
        if previous != ns.uri {
            tracing::warn!(
                prefix = %ns.prefix,
                previous = %previous,
                uri = %ns.uri,
                "rebinding namespace prefix"
            );
        }
    }
}

fn in_namespace(element: &Element, ns: &XmlNamespace) -> bool {
    element.namespace.as_deref() == Some(ns.uri.as_str())
}

/// Child elements of `node` named `name` in namespace `ns`, in document order.
pub(crate) fn children<'a>(
    node: &'a Element,
    ns: &'a XmlNamespace,
    name: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    node.children.iter().filter_map(move |child| match child {
        XMLNode::Element(e) if e.name == name && in_namespace(e, ns) => Some(e),
        _ => None,
    })
}

/// Text content of `element`, surrounding whitespace removed.
pub(crate) fn text(element: &Element) -> String {
    let mut content = String::new();
    for child in &element.children {
        match child {
            XMLNode::Text(t) | XMLNode::CData(t) => content.push_str(t),
            _ => {}
        }
    }
    content.trim().to_string()
}

fn item_texts<'a>(tag: &'a Element, ns: &'a XmlNamespace) -> impl Iterator<Item = String> + 'a {
    children(tag, ns, tags::ITEM).map(text)
}

fn new_element(ns: &XmlNamespace, name: &str) -> Element {
    let mut element = Element::new(name);
    element.prefix = Some(ns.prefix.clone());
    element.namespace = Some(ns.uri.clone());
    element
}

fn item_list(ns: &XmlNamespace, name: &str, values: &[String]) -> Element {
    let mut element = new_element(ns, name);
    for value in values {
        let mut item = new_element(ns, tags::ITEM);
        item.children.push(XMLNode::Text(value.clone()));
        element.children.push(XMLNode::Element(item));
    }
    element
}
