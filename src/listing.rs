//! Table columns of a people listing.

use serde::Serialize;

use crate::schema::{get_columns, get_selectable_fields, Schema};

/// One rendered table column: a group of fields shown together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub fields: Vec<String>,
    pub selectable: bool,
}

impl TableColumn {
    /// Column heading key, the field names joined by a space.
    pub fn label(&self) -> String {
        self.fields.join(" ")
    }
}

/// Columns a listing renders for the people type it is configured with.
///
/// A listing without a type has no columns.
pub fn list_columns(used_type: Option<&Schema>) -> Vec<TableColumn> {
    let Some(schema) = used_type else {
        return Vec::new();
    };

    let selectable_fields = get_selectable_fields(schema);
    get_columns(schema)
        .into_iter()
        .map(|fields| {
            let selectable = fields.len() == 1 && selectable_fields.contains(&fields[0]);
            TableColumn { fields, selectable }
        })
        .collect()
}
