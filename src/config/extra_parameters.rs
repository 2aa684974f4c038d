//! Extra parameters passed through to the operation untouched.
//!
//! Parsed once from a `key1=value1,key2=value2` string. Entries without an `=`
//! or with an empty key are skipped; they never fail configuration loading.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::constants::extra_parameters::{KEY_VALUE_SEPARATOR, PAIR_SEPARATOR};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtraParameters {
    parameters: HashMap<String, String>,
}

impl ExtraParameters {
    pub fn parse(raw: &str) -> Self {
        let mut parameters = HashMap::new();
        if raw.trim().is_empty() {
            return Self { parameters };
        }

        for entry in raw.split(PAIR_SEPARATOR) {
            let Some((key, value)) = entry.split_once(KEY_VALUE_SEPARATOR) else {
                debug!(entry = %entry.trim(), "Skipping extra parameter without '='");
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                debug!(entry = %entry.trim(), "Skipping extra parameter with empty key");
                continue;
            }
            parameters.insert(key.to_string(), value.trim().to_string());
        }

        Self { parameters }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.parameters
    }
}

impl std::str::FromStr for ExtraParameters {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_malformed_entries() {
        let params = ExtraParameters::parse("a=1, b = 2,bad,  c=3");

        let expected: HashMap<String, String> = [("a", "1"), ("b", "2"), ("c", "3")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(params.as_map(), &expected);
    }

    #[test]
    fn test_parse_blank_input() {
        assert!(ExtraParameters::parse("").is_empty());
        assert!(ExtraParameters::parse("   ").is_empty());
    }

    #[test]
    fn test_parse_skips_empty_key() {
        let params = ExtraParameters::parse("=orphan, =x,k=v");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("k"), Some("v"));
    }

    #[test]
    fn test_value_keeps_later_separators() {
        let params = ExtraParameters::parse("fq=type:book, q=title=rust");
        assert_eq!(params.get("fq"), Some("type:book"));
        assert_eq!(params.get("q"), Some("title=rust"));
    }

    #[test]
    fn test_empty_value_and_duplicate_keys() {
        let params = ExtraParameters::parse("debug=,rows=10,rows=20");
        assert_eq!(params.get("debug"), Some(""));
        assert_eq!(params.get("rows"), Some("20"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let params = ExtraParameters::parse("wt=json");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({"wt": "json"}));
    }
}
