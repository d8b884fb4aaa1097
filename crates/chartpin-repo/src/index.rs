//! Classic repository index document
//!
//! Only the parts of a Helm-compatible `index.yaml` needed for version
//! discovery are modelled: `entries`, keyed by chart name, each entry with a
//! `version`. Every other field is ignored. JSON indexes parse too, since
//! YAML is a superset.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

use crate::error::{RepoError, Result};

/// Repository index (Helm-compatible subset)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryIndex {
    #[serde(default)]
    pub api_version: Option<String>,

    /// Charts by name; a chart listed with no entries maps to `None`
    #[serde(default, deserialize_with = "null_as_default")]
    entries: HashMap<String, Option<Vec<IndexEntry>>>,
}

/// One published version of a chart
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexEntry {
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,
}

impl RepositoryIndex {
    /// Parse an index body; `source` names it in errors
    pub fn from_bytes(bytes: &[u8], source: &str) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| RepoError::IndexParseError {
            url: source.to_string(),
            message: format!("invalid UTF-8: {}", e),
        })?;

        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(text).map_err(|e| RepoError::IndexParseError {
            url: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Raw versions of a chart in listed order, `None` if the chart is absent
    pub fn versions(&self, chart: &str) -> Option<Vec<String>> {
        self.entries.get(chart).map(|entries| {
            entries
                .iter()
                .flatten()
                .map(|entry| entry.version.clone())
                .collect()
        })
    }

    /// Chart names present in the index
    pub fn chart_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept unquoted numeric versions (`version: 1`) as strings
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar version, found {:?}",
            other
        ))),
    }
}
