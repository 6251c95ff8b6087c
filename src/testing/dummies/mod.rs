mod schemas;

pub use schemas::{schema_binary, schema_numeric, schema_regression};
