// Integration test utilities and common code
// WHY: stub oracles and temp-file fixtures are shared by every integration test binary
#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rebus::{MeaningOracle, OracleError, Oracles, VisualOracle, WordOracle};
use tempfile::TempDir;

/// Temporary directory holding lexicon, word list and phrase files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Write a file under the fixture root and return its path
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }
}

/// Word oracle accepting an exact, case-sensitive set
pub struct StubWords(pub HashSet<String>);

impl StubWords {
    pub fn of(words: &[&str]) -> Self {
        Self(words.iter().map(|w| w.to_string()).collect())
    }
}

impl WordOracle for StubWords {
    fn is_word(&self, token: &str) -> bool {
        self.0.contains(token)
    }
}

/// Meaning oracle that never relates two words
pub struct NeverRelated;

impl MeaningOracle for NeverRelated {
    fn same_meaning(&self, _a: &str, _b: &str) -> bool {
        false
    }
}

/// Meaning oracle that relates everything, including the empty parent
pub struct AlwaysRelated;

impl MeaningOracle for AlwaysRelated {
    fn same_meaning(&self, _a: &str, _b: &str) -> bool {
        true
    }
}

/// Visual oracle that answers from a set (or says yes to everything) and records each question
pub struct StubVisual {
    visual: Option<HashSet<String>>,
    pub asked: Mutex<Vec<String>>,
    delay: Duration,
}

impl StubVisual {
    pub fn always() -> Self {
        Self {
            visual: None,
            asked: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn of(words: &[&str]) -> Self {
        Self {
            visual: Some(words.iter().map(|w| w.to_string()).collect()),
            asked: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisualOracle for StubVisual {
    async fn is_visual(&self, token: &str) -> Result<bool, OracleError> {
        self.asked.lock().unwrap().push(token.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self
            .visual
            .as_ref()
            .map_or(true, |visual| visual.contains(token)))
    }
}

/// Visual oracle that fails with `error` for the listed words and says yes otherwise
pub struct FailingVisual {
    failing: HashSet<String>,
    error: OracleError,
    pub calls: AtomicU32,
}

impl FailingVisual {
    pub fn new(failing: &[&str], error: OracleError) -> Self {
        Self {
            failing: failing.iter().map(|w| w.to_string()).collect(),
            error,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisualOracle for FailingVisual {
    async fn is_visual(&self, token: &str) -> Result<bool, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(token) {
            Err(self.error.clone())
        } else {
            Ok(true)
        }
    }
}

/// Oracles built from stubs: exact word set, no relatedness, the given visual oracle
pub fn stub_oracles(words: &[&str], visual: Arc<dyn VisualOracle>) -> Oracles {
    Oracles::new(Arc::new(StubWords::of(words)), Arc::new(NeverRelated), visual)
}
