/// Statement Parameters Module
///
/// Named parameters bound into prepared statements. Every key follows the
/// `@name` convention: it starts with `@`, has at least one character after
/// it, and contains no whitespace.
use crate::core::{DalError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

static PARAMETER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@\S+$").expect("parameter key pattern is valid"));

/// Returns true if `key` follows the `@name` convention.
pub fn is_valid_key(key: &str) -> bool {
    PARAMETER_KEY.is_match(key)
}

/// A validated map of parameter keys to their string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: BTreeMap<String, String>,
}

impl Parameters {
    pub fn new() -> Self {
        Parameters::default()
    }

    /// Builds parameters from a raw map, dropping keys that do not follow the
    /// `@name` convention.
    pub fn from_map(raw: HashMap<String, String>) -> Self {
        raw.into_iter().collect()
    }

    /// Adds or replaces a parameter.
    ///
    /// # Errors
    ///
    /// Returns `DalError::Validation` if `key` does not follow the `@name`
    /// convention.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        if !is_valid_key(key) {
            return Err(DalError::Validation(format!(
                "invalid parameter name '{}': expected '@name' without whitespace",
                key
            )));
        }
        self.values.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Builder form of `insert`.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut values = BTreeMap::new();
        for (key, value) in iter {
            if is_valid_key(&key) {
                values.insert(key, value);
            } else {
                debug!("Dropping parameter with invalid name '{}'", key);
            }
        }
        Parameters { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_convention() {
        assert!(is_valid_key("@id"));
        assert!(is_valid_key("@student_id"));
        assert!(!is_valid_key("id"));
        assert!(!is_valid_key("@"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("@first name"));
        assert!(!is_valid_key("@id\n"));
    }

    #[test]
    fn test_from_map_filters_invalid_keys() {
        let mut raw = HashMap::new();
        raw.insert("@id".to_string(), "7".to_string());
        raw.insert("id".to_string(), "8".to_string());

        let params = Parameters::from_map(raw);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("@id"), Some("7"));
        assert!(!params.contains_key("id"));
    }

    #[test]
    fn test_insert_rejects_invalid_key() {
        let mut params = Parameters::new();
        assert!(matches!(
            params.insert("name", "Ada"),
            Err(DalError::Validation(_))
        ));
        assert!(params.is_empty());

        params.insert("@name", "Ada").unwrap();
        params.insert("@name", "Grace").unwrap();
        assert_eq!(params.get("@name"), Some("Grace"));
    }

    #[test]
    fn test_builder() {
        let params = Parameters::new()
            .with("@username", "ada")
            .and_then(|p| p.with("@password", "secret"))
            .unwrap();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["@password", "@username"]);
    }
}
