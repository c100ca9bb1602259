// Greedy left-to-right segmentation of a phrase into hidden words.
// A scan is a strict sequence of oracle calls: whether to try a longer candidate
// depends on the verdict for the shorter one.

use anyhow::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::config::SegmenterConfig;
use crate::normalize::normalize;
use crate::oracle::Oracles;
use crate::parent::resolve_parent;
use crate::puzzle::{RebusPuzzle, RebusSubstring, Span};

/// Finds hidden words in phrases using injected oracles
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Scan `phrase` and return its hidden words, ordered and non-overlapping.
    ///
    /// At each cursor position candidates are tried shortest first. A candidate is
    /// skipped when it equals its parent word, shares a meaning with it, or is not a
    /// word; otherwise the visual oracle decides. A visual candidate becomes the
    /// current best and the scan tries one letter longer. The first non-visual
    /// candidate after a best has been found ends the search at this cursor. The
    /// best, if any, is kept and the cursor jumps past it; otherwise the cursor
    /// moves one letter.
    ///
    /// Visual oracle errors propagate. Phrases without letters give an empty result.
    pub async fn segment(&self, phrase: &str, oracles: &Oracles) -> Result<Vec<RebusSubstring>> {
        let normalized = normalize(phrase);
        let total = normalized.len();
        let min_length = self.config.min_length();

        debug!(phrase, letters = total, "Starting segmentation");

        let mut found = Vec::new();
        let mut start = 0;

        while start < total {
            let remaining = total - start;
            if remaining < min_length {
                break;
            }

            let mut best: Option<RebusSubstring> = None;

            for length in min_length..=remaining {
                let span = Span::new(start, start + length);
                let text = normalized.slice(span.start, span.end);
                let parent = resolve_parent(span.start, span.end, phrase);

                if text == parent
                    || oracles.meaning.same_meaning(&text, parent)
                    || !oracles.words.is_word(&text)
                {
                    continue;
                }

                if oracles.visual.is_visual(&text).await? {
                    best = Some(RebusSubstring::at(text, span));
                } else if best.is_some() {
                    break;
                }
            }

            match best {
                Some(hit) => {
                    debug!(word = %hit.text, start = hit.start, end = hit.end, "Accepted hidden word");
                    start = hit.end;
                    found.push(hit);
                }
                None => start += 1,
            }
        }

        info!(phrase, found = found.len(), "Segmentation complete");
        Ok(found)
    }

    /// Scan `phrase` and pair it with its hidden words
    pub async fn puzzle(&self, phrase: &str, oracles: &Oracles) -> Result<RebusPuzzle> {
        let substrings = self.segment(phrase, oracles).await?;
        Ok(RebusPuzzle::new(phrase, substrings))
    }

    /// Scan `phrases` with up to `concurrency` scans in flight, returning puzzles in
    /// input order. The first error ends the run and drops the scans still pending.
    pub async fn puzzles(
        &self,
        phrases: Vec<String>,
        oracles: &Oracles,
        concurrency: usize,
    ) -> Result<Vec<RebusPuzzle>> {
        let mut indexed: Vec<(usize, RebusPuzzle)> = stream::iter(phrases.into_iter().enumerate())
            .map(move |(index, phrase)| async move {
                self.puzzle(&phrase, oracles).await.map(|puzzle| (index, puzzle))
            })
            .buffer_unordered(concurrency.max(1))
            .try_collect()
            .await?;

        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, puzzle)| puzzle).collect())
    }
}

/// Segment `phrase` with the default minimum length of two letters
pub async fn segment(phrase: &str, oracles: &Oracles) -> Result<Vec<RebusSubstring>> {
    Segmenter::default().segment(phrase, oracles).await
}
