//! Concept catalog: the concepts a module graph can draw from.

use crate::Result;
use async_trait::async_trait;
use conceptdag_graph::ConceptId;
use serde::{Deserialize, Serialize};

/// Difficulty tier of a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    /// Introductory material.
    Basic,
    /// Builds on basic concepts.
    Intermediate,
    /// Specialised material.
    Advanced,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    /// Identifier referenced by graph nodes.
    pub id: ConceptId,
    /// Display name.
    pub name: String,
    /// Difficulty tier.
    pub complexity: ComplexityTier,
}

impl Concept {
    /// Create a catalog entry.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, complexity: ComplexityTier) -> Self {
        Self {
            id: ConceptId(id),
            name: name.into(),
            complexity,
        }
    }
}

/// Source of selectable concepts.
#[async_trait]
pub trait ConceptCatalog: Send + Sync {
    /// Every concept in the catalog.
    async fn concepts(&self) -> Result<Vec<Concept>>;
}

/// Catalog backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    concepts: Vec<Concept>,
}

impl StaticCatalog {
    /// Create a catalog from `concepts`.
    #[must_use]
    pub fn new(concepts: Vec<Concept>) -> Self {
        Self { concepts }
    }

    /// Parse a catalog from a JSON array of concepts.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

#[async_trait]
impl ConceptCatalog for StaticCatalog {
    async fn concepts(&self) -> Result<Vec<Concept>> {
        Ok(self.concepts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_catalog_from_json() {
        let catalog = StaticCatalog::from_json(
            r#"[
                {"id": 1, "name": "Variables", "complexity": "basic"},
                {"id": 2, "name": "Closures", "complexity": "advanced"}
            ]"#,
        )
        .unwrap();

        let concepts = catalog.concepts().await.unwrap();
        assert_eq!(concepts.len(), 2);
        assert_eq!(concepts[1], Concept::new(2, "Closures", ComplexityTier::Advanced));
    }

    #[test]
    fn test_bad_catalog_json() {
        assert!(StaticCatalog::from_json("[{\"id\": \"x\"}]").is_err());
    }
}
