// Oracle facade: the three judgements the scanner asks about every candidate.
// Implementations are injected so scans can run against local tables, remote models or test doubles.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub mod lexicon;
pub mod llm;
pub mod retry;
pub mod visual;

pub use lexicon::Lexicon;
pub use llm::{parse_answer, visual_prompt, CommandCompletionClient, CompletionClient, PromptVisualOracle};
pub use retry::{retry, RetryPolicy};
pub use visual::{CachedVisualOracle, VisualWordList};

/// Errors raised by oracle backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Rate limit, timeout or transport failure; worth retrying
    #[error("transient oracle failure: {0}")]
    Transient(String),

    /// Misconfiguration that no retry will fix
    #[error("oracle unavailable: {0}")]
    Fatal(String),

    /// Retry budget spent on transient failures
    #[error("oracle gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

impl OracleError {
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Transient(_))
    }

    /// The backend's own message, without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            OracleError::Transient(message) | OracleError::Fatal(message) => message,
            OracleError::Exhausted { last, .. } => last,
        }
    }
}

/// Dictionary membership
pub trait WordOracle: Send + Sync {
    /// True iff `token` is a recognized word. Unknown or malformed input is `false`.
    fn is_word(&self, token: &str) -> bool;
}

/// Semantic relatedness between two words
pub trait MeaningOracle: Send + Sync {
    /// True iff the sense sets of `a` and `b` intersect or are one hypernym/hyponym step apart.
    /// A word without senses is never related to anything.
    fn same_meaning(&self, a: &str, b: &str) -> bool;
}

/// Whether a word can be drawn without text
#[async_trait]
pub trait VisualOracle: Send + Sync {
    async fn is_visual(&self, token: &str) -> Result<bool, OracleError>;
}

impl<T: WordOracle + ?Sized> WordOracle for Arc<T> {
    fn is_word(&self, token: &str) -> bool {
        (**self).is_word(token)
    }
}

impl<T: MeaningOracle + ?Sized> MeaningOracle for Arc<T> {
    fn same_meaning(&self, a: &str, b: &str) -> bool {
        (**self).same_meaning(a, b)
    }
}

#[async_trait]
impl<T: VisualOracle + ?Sized> VisualOracle for Arc<T> {
    async fn is_visual(&self, token: &str) -> Result<bool, OracleError> {
        (**self).is_visual(token).await
    }
}

/// The capability set handed to the scanner
#[derive(Clone)]
pub struct Oracles {
    pub words: Arc<dyn WordOracle>,
    pub meaning: Arc<dyn MeaningOracle>,
    pub visual: Arc<dyn VisualOracle>,
}

impl Oracles {
    pub fn new(
        words: Arc<dyn WordOracle>,
        meaning: Arc<dyn MeaningOracle>,
        visual: Arc<dyn VisualOracle>,
    ) -> Self {
        Self {
            words,
            meaning,
            visual,
        }
    }

    /// Use one lexicon for both word validity and relatedness
    pub fn from_lexicon(lexicon: Arc<Lexicon>, visual: Arc<dyn VisualOracle>) -> Self {
        Self {
            words: lexicon.clone(),
            meaning: lexicon,
            visual,
        }
    }
}
