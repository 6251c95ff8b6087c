use crate::core::attributes::{AttributeSchema, AttributeSpec};
use std::sync::Arc;

/// One binary input attribute plus a binary class.
pub fn schema_binary() -> Arc<AttributeSchema> {
    Arc::new(
        AttributeSchema::new(
            "binary",
            vec![
                AttributeSpec::discrete("flag", ["f", "t"]),
                AttributeSpec::discrete("class", ["neg", "pos"]),
            ],
        )
        .expect("fixture schema is well formed"),
    )
}

/// One continuous input attribute plus a binary class.
pub fn schema_numeric() -> Arc<AttributeSchema> {
    Arc::new(
        AttributeSchema::new(
            "numeric",
            vec![
                AttributeSpec::continuous("x"),
                AttributeSpec::discrete("class", ["neg", "pos"]),
            ],
        )
        .expect("fixture schema is well formed"),
    )
}

/// One continuous input attribute plus a continuous target.
pub fn schema_regression() -> Arc<AttributeSchema> {
    Arc::new(
        AttributeSchema::new(
            "regression",
            vec![
                AttributeSpec::continuous("x"),
                AttributeSpec::continuous("y"),
            ],
        )
        .expect("fixture schema is well formed"),
    )
}
