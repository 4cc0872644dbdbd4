use std::future::Future;
use std::io;

use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

/// Source of answers to console prompts.
///
/// The caller prints the question itself; a prompter only supplies the
/// line typed in reply.
pub trait Prompter: Send {
    /// Read one reply, without its line terminator.
    fn answer(&mut self) -> impl Future<Output = io::Result<String>> + Send;

    /// Returns `false` if answers are produced without a human typing them.
    fn is_interactive(&self) -> bool {
        true
    }
}

/// Reads replies from standard input.
pub struct ConsolePrompter {
    stdin: BufReader<Stdin>,
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self {
            stdin: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Prompter for ConsolePrompter {
    async fn answer(&mut self) -> io::Result<String> {
        let mut line = String::new();
        // EOF reads as an empty reply, which every prompt treats as the default.
        self.stdin.read_line(&mut line).await?;
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }
}

/// Answers every prompt with an empty reply (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoPrompter;

impl Prompter for AutoPrompter {
    async fn answer(&mut self) -> io::Result<String> {
        Ok(String::new())
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Replays a fixed list of replies, then empty ones.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    replies: std::collections::VecDeque<String>,
    asked: usize,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            asked: 0,
        }
    }

    /// Number of prompts answered so far.
    pub fn asked(&self) -> usize {
        self.asked
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    async fn answer(&mut self) -> io::Result<String> {
        self.asked += 1;
        Ok(self.replies.pop_front().unwrap_or_default())
    }
}
