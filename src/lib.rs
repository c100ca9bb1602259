pub mod config;
pub mod corpus;
pub mod eval;
pub mod normalize;
pub mod oracle;
pub mod parent;
pub mod puzzle;
pub mod scanner;

// Re-export main types for convenient access
pub use normalize::{normalize, normalize_into, NormalizedPhrase};
pub use parent::resolve_parent;
pub use puzzle::{RebusPuzzle, RebusSubstring, Span};
pub use scanner::{segment, Segmenter};

// Re-export oracle contracts and the bundled implementations
pub use config::{Config, SegmenterConfig};
pub use eval::{evaluate, EvalCase, EvalReport};
pub use oracle::{
    CachedVisualOracle, Lexicon, MeaningOracle, OracleError, Oracles, RetryPolicy, VisualOracle,
    VisualWordList, WordOracle,
};
