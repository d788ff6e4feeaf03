//! Deterministic UUIDv5 identifiers for batches and operations.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that `batch_id` and `op_id` are
//! reproducible across runs for the same operation sequence, independent of the workspace root.
use std::fmt::Write;
use uuid::Uuid;

use super::ops::FileOperation;
use crate::constants::NS_TAG;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

// Content is folded in via its length only; ids identify the shape of a batch, not its payload.
fn serialize_op(op: &FileOperation) -> String {
    format!(
        "{}:{}:{}",
        op.action.as_str(),
        op.path,
        op.content.as_ref().map_or(0, String::len)
    )
}

/// Compute a deterministic UUIDv5 for a batch by serializing operations in order.
#[must_use]
pub fn batch_id(ops: &[FileOperation]) -> Uuid {
    let mut s = String::new();
    for op in ops {
        s.push_str(&serialize_op(op));
        s.push('\n');
    }
    Uuid::new_v5(&namespace(), s.as_bytes())
}

/// Compute a deterministic UUIDv5 for an operation from its batch, its form and its position.
#[must_use]
pub fn op_id(batch_id: &Uuid, op: &FileOperation, idx: usize) -> Uuid {
    let mut s = serialize_op(op);
    let _ = write!(s, "#{idx}");
    Uuid::new_v5(batch_id, s.as_bytes())
}
