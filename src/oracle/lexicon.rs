use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use super::{MeaningOracle, WordOracle};

/// On-disk lexicon layout
#[derive(Deserialize, Debug, Default)]
struct LexiconFile {
    #[serde(default)]
    words: Vec<String>,
    /// word -> sense ids
    #[serde(default)]
    senses: HashMap<String, Vec<String>>,
    /// sense id -> direct hypernym sense ids
    #[serde(default)]
    hypernyms: HashMap<String, Vec<String>>,
}

/// Local dictionary with a sense graph, answering word validity and relatedness
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: HashSet<String>,
    senses: HashMap<String, HashSet<String>>,
    hypernyms: HashMap<String, HashSet<String>>,
    /// Inverse of `hypernyms`
    hyponyms: HashMap<String, HashSet<String>>,
}

fn lookup_key(word: &str) -> String {
    word.trim().to_lowercase()
}

impl Lexicon {
    /// Parse a lexicon from its JSON form
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: LexiconFile =
            serde_json::from_str(content).context("Failed to parse lexicon JSON")?;

        let mut lexicon = Self::default();
        for word in &file.words {
            lexicon.insert_word(word);
        }
        for (word, senses) in &file.senses {
            for sense in senses {
                lexicon.insert_sense(word, sense);
            }
        }
        for (sense, parents) in &file.hypernyms {
            for parent in parents {
                lexicon.insert_hypernym(sense, parent);
            }
        }
        Ok(lexicon)
    }

    /// Load a lexicon file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read lexicon {}", path.display()))?;
        let lexicon = Self::from_json_str(&content)
            .with_context(|| format!("Invalid lexicon {}", path.display()))?;
        info!(
            path = %path.display(),
            words = lexicon.word_count(),
            "Loaded lexicon"
        );
        Ok(lexicon)
    }

    pub fn with_word(mut self, word: &str) -> Self {
        self.insert_word(word);
        self
    }

    pub fn with_sense(mut self, word: &str, sense: &str) -> Self {
        self.insert_sense(word, sense);
        self
    }

    /// Record `parent` as a direct hypernym of `sense`
    pub fn with_hypernym(mut self, sense: &str, parent: &str) -> Self {
        self.insert_hypernym(sense, parent);
        self
    }

    pub fn insert_word(&mut self, word: &str) {
        let key = lookup_key(word);
        if !key.is_empty() {
            self.words.insert(key);
        }
    }

    pub fn insert_sense(&mut self, word: &str, sense: &str) {
        let key = lookup_key(word);
        if key.is_empty() {
            return;
        }
        self.senses.entry(key).or_default().insert(sense.to_string());
    }

    pub fn insert_hypernym(&mut self, sense: &str, parent: &str) {
        self.hypernyms
            .entry(sense.to_string())
            .or_default()
            .insert(parent.to_string());
        self.hyponyms
            .entry(parent.to_string())
            .or_default()
            .insert(sense.to_string());
    }

    /// Number of distinct known words, with or without senses
    pub fn word_count(&self) -> usize {
        self.words
            .iter()
            .chain(self.senses.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    fn senses_of(&self, word: &str) -> Option<&HashSet<String>> {
        self.senses.get(&lookup_key(word)).filter(|s| !s.is_empty())
    }

    fn one_step_apart(&self, a: &str, b: &str) -> bool {
        let is_hypernym = self.hypernyms.get(a).is_some_and(|p| p.contains(b));
        let is_hyponym = self.hyponyms.get(a).is_some_and(|c| c.contains(b));
        is_hypernym || is_hyponym
    }
}

impl WordOracle for Lexicon {
    fn is_word(&self, token: &str) -> bool {
        let key = lookup_key(token);
        !key.is_empty() && (self.words.contains(&key) || self.senses.contains_key(&key))
    }
}

impl MeaningOracle for Lexicon {
    fn same_meaning(&self, a: &str, b: &str) -> bool {
        let (Some(senses_a), Some(senses_b)) = (self.senses_of(a), self.senses_of(b)) else {
            return false;
        };

        // hyponyms mirror hypernyms, so checking from `a` covers both directions
        senses_a.iter().any(|sense_a| {
            senses_b
                .iter()
                .any(|sense_b| sense_a == sense_b || self.one_step_apart(sense_a, sense_b))
        })
    }
}
