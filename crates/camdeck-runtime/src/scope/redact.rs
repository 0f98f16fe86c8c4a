//! Post-fetch field redaction.

use super::Record;
use camdeck_auth::FieldSet;

/// Removes every key of `record` the caller may not see.
///
/// Keys that do not name a known field are removed as well.
///
/// # Example
///
/// ```
/// use camdeck_auth::FieldSet;
/// use camdeck_runtime::scope::redact;
/// use serde_json::json;
///
/// let mut record = json!({"camera_number": "C7", "full_name": "Ada", "x": 1})
///     .as_object()
///     .cloned()
///     .unwrap();
/// redact(&mut record, FieldSet::CAMERA_NUMBER);
/// assert_eq!(record.len(), 1);
/// assert!(record.contains_key("camera_number"));
/// ```
pub fn redact(record: &mut Record, visible: FieldSet) {
    record.retain(|key, _| visible.allows_key(key));
}

/// Redacts every record in place and returns them.
#[must_use]
pub fn redact_all(mut records: Vec<Record>, visible: FieldSet) -> Vec<Record> {
    for record in &mut records {
        redact(record, visible);
    }
    records
}
