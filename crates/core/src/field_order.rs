//! Ordered custom-field name list.
//!
//! A template stores its custom fields as a map keyed by field reference,
//! each entry carrying an `order`. Editing works on the projection of that
//! map into a plain name sequence; saving projects the sequence back into a
//! map whose orders are the 1-based positions.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::reference::CustomFieldDefinition;
use crate::template::CustomFieldSlot;
use crate::types::order_at;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOrder {
    names: Vec<String>,
}

impl FieldOrder {
    /// Project a template's custom-field map into names sorted by `order`.
    ///
    /// Entries without an order sort last, by name.
    pub fn from_custom_fields(fields: &BTreeMap<String, CustomFieldSlot>) -> Self {
        let mut entries: Vec<(&String, Option<u32>)> =
            fields.iter().map(|(name, slot)| (name, slot.order)).collect();
        entries.sort_by_key(|(_, order)| (order.is_none(), *order));

        Self {
            names: entries.into_iter().map(|(name, _)| name.clone()).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Append `name`. Returns `false` without change when already present.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Remove `name`. Returns `false` when it was not in the list.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.names.iter().position(|n| n == name) {
            Some(index) => {
                self.names.remove(index);
                true
            }
            None => false,
        }
    }

    /// Move the field at `from` so that it ends up at position `to`.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        let len = self.names.len();
        if from >= len || to >= len {
            return Err(CoreError::Validation(format!(
                "Cannot move custom field from {from} to {to}: list has {len} entries"
            )));
        }
        let name = self.names.remove(from);
        self.names.insert(to, name);
        Ok(())
    }

    /// Re-project into the persisted map shape `{name: {<type>: null, order}}`.
    ///
    /// Each field's type comes from `definitions`; `order` is the 1-based
    /// position in the list.
    pub fn project(
        &self,
        definitions: &BTreeMap<String, CustomFieldDefinition>,
    ) -> Result<BTreeMap<String, CustomFieldSlot>, CoreError> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let definition = definitions
                    .get(name)
                    .ok_or_else(|| CoreError::UnknownCustomField(name.clone()))?;
                Ok((
                    name.clone(),
                    CustomFieldSlot::empty(definition.field_type.clone(), order_at(index + 1)),
                ))
            })
            .collect()
    }

    /// Renumber `current` to follow the list, keeping each stored slot's type
    /// and value.
    ///
    /// Only names missing from `current` (fields added since the template
    /// was loaded) are looked up in `definitions`.
    pub fn arrange(
        &self,
        current: &BTreeMap<String, CustomFieldSlot>,
        definitions: &BTreeMap<String, CustomFieldDefinition>,
    ) -> Result<BTreeMap<String, CustomFieldSlot>, CoreError> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let order = order_at(index + 1);
                let slot = match (current.get(name), definitions.get(name)) {
                    (Some(slot), _) => CustomFieldSlot {
                        order: Some(order),
                        ..slot.clone()
                    },
                    (None, Some(definition)) => {
                        CustomFieldSlot::empty(definition.field_type.clone(), order)
                    }
                    (None, None) => return Err(CoreError::UnknownCustomField(name.clone())),
                };
                Ok((name.clone(), slot))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
