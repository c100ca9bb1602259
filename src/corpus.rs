// Phrase lists for puzzle generation, built from scene-graph relationship data
// (subject / predicate / object triples such as "man riding horse").

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::oracle::WordOracle;

/// One annotated image with its relationships
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RelationshipItem {
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Relationship {
    #[serde(default)]
    pub subject: Entity,
    #[serde(default)]
    pub predicate: String,
    #[serde(default)]
    pub object: Entity,
}

/// An annotated object; some records carry `name`, others a `names` list
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Entity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub names: Vec<String>,
}

impl Entity {
    /// First of `names` if present, else `name`, else empty
    pub fn label(&self) -> &str {
        self.names
            .first()
            .map(String::as_str)
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

/// Lowercase and keep only `a-z` and spaces
fn clean(part: &str) -> String {
    part.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == ' ')
        .collect()
}

/// Build de-duplicated, sorted `"subject predicate object"` phrases.
/// Relationships whose parts are not all words are skipped.
pub fn build_phrases(items: &[RelationshipItem], words: &dyn WordOracle) -> Vec<String> {
    let mut phrases = BTreeSet::new();
    let mut skipped = 0usize;

    for relationship in items.iter().flat_map(|item| &item.relationships) {
        let subject = clean(relationship.subject.name.as_deref().unwrap_or(""));
        let predicate = clean(&relationship.predicate);
        let object = clean(relationship.object.label());

        if ![&subject, &predicate, &object].iter().all(|part| words.is_word(part)) {
            skipped += 1;
            continue;
        }

        let phrase = format!("{subject} {predicate} {object}").trim().to_string();
        phrases.insert(phrase);
    }

    debug!(skipped, "Skipped relationships with non-word parts");
    phrases.into_iter().collect()
}

/// Read a relationships JSON file (an array of items)
pub async fn load_relationships(path: &Path) -> Result<Vec<RelationshipItem>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read relationships {}", path.display()))?;
    let items: Vec<RelationshipItem> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid relationships JSON {}", path.display()))?;
    info!(path = %path.display(), items = items.len(), "Loaded relationships");
    Ok(items)
}
