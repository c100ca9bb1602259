// Visual judgement delegated to a language model. The model sees a fixed prompt and must
// answer inside <answer></answer> tags; anything else reads as "not visual".

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{OracleError, VisualOracle};

static ANSWER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<answer>\s*(yes|no)\s*</answer>").expect("valid answer pattern"));

const VISUAL_PROMPT: &str = "\
You are helping build rebus puzzles, where every word must be drawn as a picture.

Decide whether the word below can be drawn so that most people would recognize it \
without any text, letters or numbers in the picture. Concrete objects (apple, tree, \
house), visible actions (run, climb) and shapes (round, square) are drawable. Function \
words (the, and), abstract ideas (theory, freedom) and relations that need context \
(between, during) are not. A word with several meanings counts as drawable if any \
common meaning is.

Word: {word}

Think briefly, then give your verdict as <answer>yes</answer> or <answer>no</answer>.";

/// Prompt asking whether `word` can be drawn
pub fn visual_prompt(word: &str) -> String {
    VISUAL_PROMPT.replace("{word}", word)
}

/// Extract the verdict from a model reply; a missing or malformed answer is `false`
pub fn parse_answer(reply: &str) -> bool {
    ANSWER
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .is_some_and(|m| m.as_str().eq_ignore_ascii_case("yes"))
}

/// Something that turns a prompt into a model reply
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Visual oracle that asks a language model through a [`CompletionClient`]
pub struct PromptVisualOracle<C> {
    client: C,
}

impl<C: CompletionClient> PromptVisualOracle<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: CompletionClient> VisualOracle for PromptVisualOracle<C> {
    async fn is_visual(&self, token: &str) -> Result<bool, OracleError> {
        let reply = self.client.complete(&visual_prompt(token)).await?;
        let verdict = parse_answer(&reply);
        debug!(word = token, verdict, "Model judged word");
        Ok(verdict)
    }
}

/// Runs an external program per prompt: prompt on stdin, reply on stdout.
///
/// A program that cannot be found is fatal. Timeouts, non-zero exits and pipe
/// errors are transient.
#[derive(Debug, Clone)]
pub struct CommandCompletionClient {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCompletionClient {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Build from a command line split into program and arguments
    pub fn from_command_line(command: &[String], timeout: Duration) -> Result<Self, OracleError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| OracleError::Fatal("empty completion command".into()))?;
        Ok(Self::new(program.clone(), args.to_vec(), timeout))
    }

    async fn run(&self, prompt: &str) -> Result<String, OracleError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    OracleError::Fatal(format!("cannot start {}: {e}", self.program))
                }
                _ => OracleError::Transient(format!("failed to spawn {}: {e}", self.program)),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| OracleError::Transient(format!("failed to write prompt: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| OracleError::Transient(format!("failed to read reply: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OracleError::Transient(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl CompletionClient for CommandCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        tokio::time::timeout(self.timeout, self.run(prompt))
            .await
            .map_err(|_| {
                OracleError::Transient(format!(
                    "{} timed out after {}ms",
                    self.program,
                    self.timeout.as_millis()
                ))
            })?
    }
}
