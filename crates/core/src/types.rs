use std::fmt;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Template identifiers are opaque strings assigned by the store.
pub type TemplateId = String;

/// Stable in-memory identity of a task while it is being edited.
///
/// Never serialized: the store only knows tasks by their position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey(Uuid);

impl TaskKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Convert a list index into a stored `order`, saturating at `u32::MAX`.
pub(crate) fn order_at(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// Deserialize a field that the API may send as `null`, falling back to
/// the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
