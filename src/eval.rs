// Scores a visual oracle against hand-labelled words.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::oracle::{OracleError, VisualOracle};

/// A word and whether it should be judged drawable
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EvalCase {
    pub word: String,
    pub expected: bool,
}

impl EvalCase {
    pub fn new(word: impl Into<String>, expected: bool) -> Self {
        Self {
            word: word.into(),
            expected,
        }
    }
}

/// A case the oracle answered wrongly
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub word: String,
    pub expected: bool,
    pub got: bool,
}

/// Confusion counts over a set of cases
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalReport {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// Wrong answers, in case order
    pub mismatches: Vec<Mismatch>,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

impl EvalReport {
    pub fn record(&mut self, case: &EvalCase, got: bool) {
        match (case.expected, got) {
            (true, true) => self.true_positives += 1,
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_positives += 1,
            (true, false) => self.false_negatives += 1,
        }
        if case.expected != got {
            self.mismatches.push(Mismatch {
                word: case.word.clone(),
                expected: case.expected,
                got,
            });
        }
    }

    pub fn total(&self) -> usize {
        self.correct() + self.false_positives + self.false_negatives
    }

    pub fn correct(&self) -> usize {
        self.true_positives + self.true_negatives
    }

    /// Cases labelled drawable
    pub fn actual_positives(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    /// Cases labelled not drawable
    pub fn actual_negatives(&self) -> usize {
        self.true_negatives + self.false_positives
    }

    /// Percent of cases answered correctly; 0 with no cases
    pub fn accuracy(&self) -> f64 {
        percent(self.correct(), self.total())
    }

    /// Percent of non-drawable cases called drawable; 0 with no such cases
    pub fn false_positive_rate(&self) -> f64 {
        percent(self.false_positives, self.actual_negatives())
    }

    /// Percent of drawable cases called not drawable; 0 with no such cases
    pub fn false_negative_rate(&self) -> f64 {
        percent(self.false_negatives, self.actual_positives())
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Accuracy: {:.1}% ({}/{} correct)",
            self.accuracy(),
            self.correct(),
            self.total()
        )?;
        writeln!(
            f,
            "False Positive Rate: {:.1}% ({}/{} cases)",
            self.false_positive_rate(),
            self.false_positives,
            self.actual_negatives()
        )?;
        write!(
            f,
            "False Negative Rate: {:.1}% ({}/{} cases)",
            self.false_negative_rate(),
            self.false_negatives,
            self.actual_positives()
        )?;
        for mismatch in &self.mismatches {
            write!(
                f,
                "\n  '{}': expected {}, got {}",
                mismatch.word, mismatch.expected, mismatch.got
            )?;
        }
        Ok(())
    }
}

/// Ask `oracle` about every case, `concurrency` at a time. A fatal oracle error
/// ends the run; fail-closed answers count as `false`.
pub async fn evaluate(
    cases: &[EvalCase],
    oracle: &dyn VisualOracle,
    concurrency: usize,
) -> Result<EvalReport, OracleError> {
    let mut verdicts: Vec<(usize, bool)> = stream::iter(cases.iter().enumerate())
        .map(move |(index, case)| async move {
            oracle.is_visual(&case.word).await.map(|got| (index, got))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;
    verdicts.sort_by_key(|(index, _)| *index);

    let mut report = EvalReport::default();
    for (index, got) in verdicts {
        report.record(&cases[index], got);
    }

    info!(
        cases = report.total(),
        accuracy = report.accuracy(),
        false_positive_rate = report.false_positive_rate(),
        false_negative_rate = report.false_negative_rate(),
        "Visual oracle evaluated"
    );
    Ok(report)
}

/// Read labelled cases: a JSON array of `{ "word": .., "expected": .. }`
pub async fn load_cases(path: &Path) -> Result<Vec<EvalCase>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read eval cases {}", path.display()))?;
    let cases: Vec<EvalCase> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid eval cases JSON {}", path.display()))?;
    info!(path = %path.display(), cases = cases.len(), "Loaded eval cases");
    Ok(cases)
}
