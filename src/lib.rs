//! People Schema
//!
//! People and membership annotations for supermodel XML schemas.
//!
//! This library reads and writes the `people` annotation vocabulary that
//! configures how a people content type is listed and displayed, and resolves
//! a person's current role from their memberships.
//!
//! # Example
//!
//! ```
//! use people_schema::{get_columns, get_title_fields, load_model_str, read_model, SchemaMetadataCodec};
//!
//! let model = load_model_str(r#"
//!   <model xmlns="http://namespaces.plone.org/supermodel/schema"
//!          xmlns:people="http://namespaces.plone.org/supermodel/people">
//!     <schema name="member">
//!       <people:title>
//!         <people:item>first_name</people:item>
//!         <people:item>last_name</people:item>
//!       </people:title>
//!       <people:columns>
//!         <people:column selectable="true"><people:item>town</people:item></people:column>
//!       </people:columns>
//!     </schema>
//!   </model>
//! "#).unwrap();
//!
//! let schemas = read_model(&model, &SchemaMetadataCodec::new());
//! assert_eq!(get_title_fields(&schemas[0]), vec!["first_name", "last_name"]);
//! assert_eq!(get_columns(&schemas[0]), vec![vec!["town"]]);
//! ```
//!
//! # Vocabulary
//!
//! | Element | Content | Annotation |
//! |---------|---------|------------|
//! | `people:title` | `item`s | fields composing the display title |
//! | `people:order` | `item`s | display order |
//! | `people:details position="…"` | `item`s | detail panel fields per position (default `left`) |
//! | `people:columns` | `column`s of `item`s | listing table columns, `selectable` on single-field columns |
//!
//! # Current role
//!
//! ```
//! use chrono::NaiveDate;
//! use people_schema::{current_role_on, Membership};
//!
//! let memberships = vec![
//!     Membership::new("Member").ending(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
//!     Membership::new("Chair"),
//! ];
//! let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! assert_eq!(current_role_on(&memberships, today), "Chair");
//! ```

mod codec;
mod error;
mod linter;
mod listing;
mod loader;
mod membership;
mod schema;
pub mod telemetry;
mod types;

pub use codec::{declare_namespace, ListAnnotation, MetadataHandler, SchemaMetadataCodec, HANDLERS};
pub use error::{AnnotationError, LoadError};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use listing::{list_columns, TableColumn};
pub use loader::{
    build_model, child_text, is_url, load_annotations, load_annotations_str, load_model,
    load_model_auto, load_model_str, normalize_model, read_model, schema_from_node, schema_nodes,
    schema_nodes_mut, write_model,
};
pub use membership::{
    active_memberships, active_memberships_on, current_role, current_role_on, today, Membership,
    Person,
};
pub use schema::{
    columns_from_value, get_columns, get_detail_fields, get_order, get_selectable_fields,
    get_title_fields, set_columns, set_detail_fields, set_order, set_selectable_fields,
    set_title_fields, DetailFields, Schema, SchemaAnnotations, TaggedValue,
};
pub use types::{
    json_type_name, keys, tags, XmlNamespace, DEFAULT_POSITION, PEOPLE_NAMESPACE, PEOPLE_PREFIX,
    SCHEMA_NAMESPACE,
};

#[cfg(feature = "remote")]
pub use loader::load_model_url;
