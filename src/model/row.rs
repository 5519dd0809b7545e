use crate::core::{DalError, Result};
use crate::model::capability::{FieldNameValidator, Nullable, NULL_SENTINEL};
use crate::model::entry::Entry;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// An ordered set of uniquely-named fields and their entries.
///
/// `fields[i]` always names `entries[i]`. Names are stored normalized, so
/// every lookup is case-insensitive and ignores outer whitespace.
///
/// Two removals are distinct:
/// - `remove_entry` nulls the value and keeps the slot (`len` unchanged)
/// - `remove_field` drops the field and its entry (`len` shrinks by one)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    fields: Vec<String>,
    entries: Vec<Entry>,
}

impl FieldNameValidator for Row {}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Row::default()
    }

    /// Builds a row from entries, skipping entries whose field repeats.
    pub fn from_entries<I: IntoIterator<Item = Entry>>(entries: I) -> Self {
        let mut row = Row::new();
        for entry in entries {
            row.add_entry(entry);
        }
        row
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Ordinal position of `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let name = Self::normalize_field(name).ok()?;
        self.fields.iter().position(|f| *f == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// True if an entry with the same field and value exists.
    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries.iter().any(|e| e == entry)
    }

    /// Appends a null entry for `name`.
    ///
    /// Returns `Ok(false)` without touching the row when the field exists.
    pub fn add_field(&mut self, name: &str) -> Result<bool> {
        Ok(self.add_entry(Entry::new(name)?))
    }

    /// Appends `entry`. Returns `false` when its field already exists.
    pub fn add_entry(&mut self, entry: Entry) -> bool {
        if self.has_field(entry.field()) {
            return false;
        }
        self.fields.push(entry.field().to_string());
        self.entries.push(entry);
        true
    }

    /// Appends a `name`/`value` entry. Returns `Ok(false)` when `name` exists.
    pub fn add_value(&mut self, name: &str, value: impl Into<String>) -> Result<bool> {
        Ok(self.add_entry(Entry::with_value(name, value)?))
    }

    /// Inserts a null entry for `name` at `index`, shifting later fields right.
    pub fn insert_field(&mut self, index: usize, name: &str) -> Result<bool> {
        self.insert_entry(index, Entry::new(name)?)
    }

    /// Inserts `entry` at `index`, shifting later fields right.
    ///
    /// `index == len()` appends. Returns `Ok(false)` when the field exists.
    ///
    /// # Errors
    ///
    /// Returns `DalError::IndexOutOfRange` if `index > len()`.
    pub fn insert_entry(&mut self, index: usize, entry: Entry) -> Result<bool> {
        if index > self.len() {
            return Err(self.out_of_range(index));
        }
        if self.has_field(entry.field()) {
            return Ok(false);
        }
        self.fields.insert(index, entry.field().to_string());
        self.entries.insert(index, entry);
        Ok(true)
    }

    /// Inserts a `name`/`value` entry at `index`.
    pub fn insert_value(
        &mut self,
        index: usize,
        name: &str,
        value: impl Into<String>,
    ) -> Result<bool> {
        self.insert_entry(index, Entry::with_value(name, value)?)
    }

    /// Removes the field and its entry. Unknown names are a no-op.
    pub fn remove_field(&mut self, name: &str) -> Option<Entry> {
        let index = self.index_of(name)?;
        self.fields.remove(index);
        Some(self.entries.remove(index))
    }

    /// Removes the field and entry at `index`.
    pub fn remove_field_at(&mut self, index: usize) -> Result<Entry> {
        if index >= self.len() {
            return Err(self.out_of_range(index));
        }
        self.fields.remove(index);
        Ok(self.entries.remove(index))
    }

    /// Nulls the value stored under `name`, keeping the field slot.
    ///
    /// Returns `false` when the field does not exist.
    pub fn remove_entry(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Some(index) => {
                self.entries[index].make_null();
                true
            }
            None => false,
        }
    }

    /// Nulls the value at `index`, keeping the field slot.
    pub fn remove_entry_at(&mut self, index: usize) -> Result<()> {
        self.entry_at_mut(index)?.make_null();
        Ok(())
    }

    /// Value stored under `name`, or the null sentinel when absent.
    pub fn get_value(&self, name: &str) -> &str {
        self.entry(name).map(Entry::value).unwrap_or(NULL_SENTINEL)
    }

    pub fn value_at(&self, index: usize) -> Result<&str> {
        self.entry_at(index).map(Entry::value)
    }

    pub fn field_at(&self, index: usize) -> Result<&str> {
        self.fields
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.index_of(name).map(|i| &self.entries[i])
    }

    pub fn entry_at(&self, index: usize) -> Result<&Entry> {
        self.entries.get(index).ok_or_else(|| self.out_of_range(index))
    }

    fn entry_at_mut(&mut self, index: usize) -> Result<&mut Entry> {
        let len = self.len();
        self.entries
            .get_mut(index)
            .ok_or(DalError::IndexOutOfRange { index, len })
    }

    /// Updates the value stored under `name`. Returns `false` when absent.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.index_of(name) {
            Some(index) => {
                self.entries[index].set_value(value);
                true
            }
            None => false,
        }
    }

    pub fn set_value_at(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.entry_at_mut(index)?.set_value(value);
        Ok(())
    }

    /// Replaces the entry whose field matches `entry`'s. Returns `false` when
    /// the row has no such field.
    pub fn set_entry(&mut self, entry: Entry) -> bool {
        match self.index_of(entry.field()) {
            Some(index) => {
                self.entries[index] = entry;
                true
            }
            None => false,
        }
    }

    /// Projects the named fields into a new row, in the order given.
    ///
    /// Names missing from this row appear as null entries so the projection
    /// keeps a fixed shape. Duplicate names collapse to their first position.
    pub fn get_row_range(&self, names: &[&str]) -> Result<Row> {
        let mut projected = Row::new();
        for name in names {
            let entry = match self.entry(name) {
                Some(entry) => entry.clone(),
                None => Entry::new(name)?,
            };
            projected.add_entry(entry);
        }
        Ok(projected)
    }

    /// Copies `count` fields starting at `index`; `count` is truncated to the
    /// available tail.
    pub fn range(&self, index: usize, count: usize) -> Result<Row> {
        if index >= self.len() {
            return Err(self.out_of_range(index));
        }
        let end = index.saturating_add(count).min(self.len());
        Ok(Row {
            fields: self.fields[index..end].to_vec(),
            entries: self.entries[index..end].to_vec(),
        })
    }

    /// Drops every field.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.entries.clear();
    }

    fn out_of_range(&self, index: usize) -> DalError {
        DalError::IndexOutOfRange {
            index,
            len: self.len(),
        }
    }
}

impl Nullable for Row {
    /// A row is null when every value is null (an empty row is null).
    fn is_null(&self) -> bool {
        self.entries.iter().all(Nullable::is_null)
    }

    fn make_null(&mut self) {
        self.entries.iter_mut().for_each(Nullable::make_null);
    }
}

/// Serializes as a map of field to value, in field order.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.field(), entry.value())?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Row {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        let mut row = Row::new();
        row.add_value("id", "7").unwrap();
        row.add_value("name", "Ada").unwrap();
        row.add_value("grade", "A").unwrap();
        row
    }

    #[test]
    fn test_add_is_once_per_name() {
        let mut row = sample_row();
        assert!(!row.add_value(" NAME ", "Grace").unwrap());
        assert!(!row.add_field("Grade").unwrap());
        assert_eq!(row.len(), 3);
        assert_eq!(row.get_value("name"), "Ada");
    }

    #[test]
    fn test_fields_and_entries_stay_aligned() {
        let row = sample_row();
        for (field, entry) in row.fields().iter().zip(row.entries()) {
            assert_eq!(field, entry.field());
        }
        assert_eq!(row.fields(), ["ID", "NAME", "GRADE"]);
    }

    #[test]
    fn test_insert_shifts_right() {
        let mut row = sample_row();
        assert!(row.insert_value(1, "term", "fall").unwrap());
        assert_eq!(row.fields(), ["ID", "TERM", "NAME", "GRADE"]);
        assert_eq!(row.value_at(2).unwrap(), "Ada");

        assert!(!row.insert_field(0, "term").unwrap());
        assert!(row.insert_field(4, "credits").unwrap());
        assert_eq!(row.field_at(4).unwrap(), "CREDITS");
        assert!(matches!(
            row.insert_field(9, "late"),
            Err(DalError::IndexOutOfRange { index: 9, len: 5 })
        ));
    }

    #[test]
    fn test_remove_entry_keeps_slot() {
        let mut row = sample_row();
        assert!(row.remove_entry("name"));
        assert_eq!(row.len(), 3);
        assert!(row.has_field("name"));
        assert_eq!(row.get_value("name"), "NULL");

        row.remove_entry_at(0).unwrap();
        assert!(row.entry_at(0).unwrap().is_null());
        assert!(row.remove_entry_at(3).is_err());
        assert!(!row.remove_entry("missing"));
    }

    #[test]
    fn test_remove_field_shrinks() {
        let mut row = sample_row();
        let removed = row.remove_field("NAME").unwrap();
        assert_eq!(removed.value(), "Ada");
        assert_eq!(row.len(), 2);
        assert!(!row.has_field("name"));

        assert!(row.remove_field("name").is_none());
        assert_eq!(row.len(), 2);

        assert_eq!(row.remove_field_at(1).unwrap().field(), "GRADE");
        assert!(matches!(
            row.remove_field_at(1),
            Err(DalError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_missing_name_lookups_do_not_raise() {
        let row = sample_row();
        assert_eq!(row.get_value("missing"), "NULL");
        assert_eq!(row.get_value(""), "NULL");
        assert!(row.entry("missing").is_none());
        assert!(row.value_at(3).is_err());
        assert!(row.field_at(10).is_err());
    }

    #[test]
    fn test_set_value_and_entry() {
        let mut row = sample_row();
        assert!(row.set_value("grade", "B+"));
        assert_eq!(row.get_value("GRADE"), "B+");
        assert!(!row.set_value("credits", "3"));
        assert!(!row.has_field("credits"));

        assert!(row.set_entry(Entry::with_value("id", "8").unwrap()));
        assert_eq!(row.value_at(0).unwrap(), "8");
        row.set_value_at(1, "Grace").unwrap();
        assert_eq!(row.get_value("name"), "Grace");
    }

    #[test]
    fn test_get_row_range_keeps_missing_fields() {
        let row = sample_row();
        let projected = row.get_row_range(&["grade", "credits", "id"]).unwrap();
        assert_eq!(projected.fields(), ["GRADE", "CREDITS", "ID"]);
        assert_eq!(projected.get_value("grade"), "A");
        assert!(projected.entry("credits").unwrap().is_null());
        assert!(row.get_row_range(&[" "]).is_err());
    }

    #[test]
    fn test_index_range_truncates() {
        let row = sample_row();
        let tail = row.range(1, 10).unwrap();
        assert_eq!(tail.fields(), ["NAME", "GRADE"]);
        assert!(row.range(3, 1).is_err());
    }

    #[test]
    fn test_contains_is_exact() {
        let row = sample_row();
        assert!(row.contains(&Entry::with_value("name", "Ada").unwrap()));
        assert!(!row.contains(&Entry::with_value("name", "ada").unwrap()));
    }

    #[test]
    fn test_row_nullable() {
        let mut row = sample_row();
        assert!(!row.is_null());
        row.make_null();
        assert!(row.is_null());
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_from_entries_skips_duplicates() {
        let row = Row::from_entries(vec![
            Entry::with_value("a", "1").unwrap(),
            Entry::with_value("A", "2").unwrap(),
            Entry::with_value("b", "3").unwrap(),
        ]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_value("a"), "1");
    }

    #[test]
    fn test_serializes_in_field_order() {
        let mut row = sample_row();
        row.make_null();
        row.set_value("name", "Ada");
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"ID":"NULL","NAME":"Ada","GRADE":"NULL"}"#
        );
    }
}
