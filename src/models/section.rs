//! Section identifiers and the ordered section registry
//!
//! The registry is the only thing the detector and the layout engine share.
//! Its order defines dot order top-to-bottom and the line's endpoints.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{GliderError, GliderResult};

/// Opaque key of one tracked section (the DOM id of its backing region)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for SectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered, duplicate-free sequence of section identifiers
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct SectionRegistry {
    ids: Vec<SectionId>,
}

impl SectionRegistry {
    /// Build a registry, rejecting empty and repeated identifiers
    pub fn new<I, S>(ids: I) -> GliderResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SectionId>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (index, id) in ids.into_iter().enumerate() {
            let id = id.into();
            if id.as_str().is_empty() {
                return Err(GliderError::EmptySectionId(index));
            }
            if !seen.insert(id.clone()) {
                return Err(GliderError::DuplicateSection(id.0));
            }
            out.push(id);
        }

        Ok(Self { ids: out })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SectionId> {
        self.ids.get(index)
    }

    pub fn contains(&self, id: &SectionId) -> bool {
        self.ids.contains(id)
    }

    /// Index of an identifier in registry order
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|s| s.as_str() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SectionId> {
        self.ids.iter()
    }

    pub fn as_slice(&self) -> &[SectionId] {
        &self.ids
    }
}

impl<'de> Deserialize<'de> for SectionRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let ids = Vec::<String>::deserialize(deserializer)?;
        SectionRegistry::new(ids).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a SectionRegistry {
    type Item = &'a SectionId;
    type IntoIter = std::slice::Iter<'a, SectionId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keeps_order() {
        let registry = SectionRegistry::new(["intro", "about", "contact"]).unwrap();
        let ids: Vec<&str> = registry.iter().map(|s| s.as_str()).collect();
        assert_eq!(ids, vec!["intro", "about", "contact"]);
        assert_eq!(registry.index_of("contact"), Some(2));
        assert_eq!(registry.index_of("pricing"), None);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let err = SectionRegistry::new(["intro", "about", "intro"]).unwrap_err();
        assert_eq!(err, GliderError::DuplicateSection("intro".to_string()));
    }

    #[test]
    fn test_registry_rejects_empty_id() {
        let err = SectionRegistry::new(["intro", ""]).unwrap_err();
        assert_eq!(err, GliderError::EmptySectionId(1));
    }

    #[test]
    fn test_registry_deserializes_from_json_array() {
        let registry: SectionRegistry = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(serde_json::from_str::<SectionRegistry>(r#"["a","a"]"#).is_err());
    }
}
