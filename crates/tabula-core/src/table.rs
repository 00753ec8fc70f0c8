//! Compiled tables: bound entries indexed by row id and key.

use std::collections::HashMap;

use serde::Serialize;

use crate::record::DecodeError;
use crate::schema::TableSchema;
use crate::value::Value;

/// Polymorphic read access shared by [`CompiledTable`] and generated
/// [`TypedTable`](crate::record::TypedTable)s.
pub trait DataTable {
    type Entry;

    fn table_name(&self) -> &str;

    /// Entry at data-row index `id`.
    fn get(&self, id: usize) -> Option<&Self::Entry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One bound data row. `values` are in schema field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: usize,
    pub key: String,
    pub values: Vec<Value>,
}

impl Entry {
    /// Value of the field at `index`.
    pub fn field(&self, index: usize) -> Result<&Value, DecodeError> {
        self.values
            .get(index)
            .ok_or(DecodeError::MissingField { index })
    }
}

/// The immutable result of compiling one table.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledTable {
    name: String,
    #[serde(skip)]
    schema: TableSchema,
    entries: Vec<Entry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CompiledTable {
    /// Assemble a table. Entry ids must equal their position; keys must be
    /// unique (the schema step guarantees both).
    pub(crate) fn new(schema: TableSchema, entries: Vec<Entry>) -> Self {
        let index = entries
            .iter()
            .map(|e| (e.key.clone(), e.id))
            .collect();
        Self {
            name: schema.table_name.clone(),
            schema,
            entries,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn get(&self, id: usize) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn get_by_key(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).and_then(|&id| self.entries.get(id))
    }

    /// Value of `field` in the row keyed `key`.
    pub fn value(&self, key: &str, field: &str) -> Option<&Value> {
        let column = self.schema.field_index(field)?;
        self.get_by_key(key)?.values.get(column)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DataTable for CompiledTable {
    type Entry = Entry;

    fn table_name(&self) -> &str {
        &self.name
    }

    fn get(&self, id: usize) -> Option<&Entry> {
        self.entries.get(id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<'a> IntoIterator for &'a CompiledTable {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
