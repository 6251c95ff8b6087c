mod attribute;
mod schema;

pub use attribute::{AttrKind, AttributeSpec, Vocabulary};
pub use schema::{AttributeSchema, SchemaError};
