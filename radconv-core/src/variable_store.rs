use crate::FloatValue;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableItem {
    pub name: String,
    pub values: Array1<FloatValue>,
}

/// A collection of named diagnostic arrays.
///
/// Each component owns one store and publishes its diagnostics into it during
/// a call. Callers read them back by name once the call returns. Creating a
/// variable that already exists replaces its values, so every call leaves the
/// latest diagnostics behind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableStore {
    items: Vec<VariableItem>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or overwrite) a variable
    pub fn create_variable(&mut self, name: &str, values: Array1<FloatValue>) {
        match self.get_by_name_mut(name) {
            Some(item) => item.values = values,
            None => self.items.push(VariableItem {
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Store a scalar as a one-element array
    pub fn create_scalar(&mut self, name: &str, value: FloatValue) {
        self.create_variable(name, Array1::from_elem(1, value));
    }

    pub fn get(&self, name: &str) -> Option<&Array1<FloatValue>> {
        self.get_by_name(name).map(|item| &item.values)
    }

    /// First value of a variable, the convention for scalar diagnostics
    pub fn get_scalar(&self, name: &str) -> Option<FloatValue> {
        self.get(name).and_then(|values| values.first().copied())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableItem> {
        self.items.iter()
    }

    fn get_by_name(&self, name: &str) -> Option<&VariableItem> {
        self.items.iter().find(|item| item.name == name)
    }

    fn get_by_name_mut(&mut self, name: &str) -> Option<&mut VariableItem> {
        self.items.iter_mut().find(|item| item.name == name)
    }
}

impl IntoIterator for VariableStore {
    type Item = VariableItem;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
