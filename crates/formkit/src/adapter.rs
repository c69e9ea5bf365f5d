// File: src/adapter.rs
// Purpose: Schema adapter - required/label facts for a field path

use crate::schema::{FieldMeta, Schema};

/// Metadata for `field`, treating a missing schema or unknown path as
/// "not required, no label"
pub fn describe(schema: Option<&dyn Schema>, field: &str) -> FieldMeta {
    schema
        .and_then(|schema| schema.describe(field))
        .unwrap_or_default()
}

/// Whether the schema marks `field` as required
pub fn is_required(schema: Option<&dyn Schema>, field: &str) -> bool {
    describe(schema, field).required
}

/// Label the schema declares for `field`, if any
pub fn label_for(schema: Option<&dyn Schema>, field: &str) -> Option<String> {
    describe(schema, field).label
}
