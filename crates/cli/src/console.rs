use std::future::Future;
use std::io::Write;

use aci_core::parse_confirmation;
use aci_poller::{Observation, ReadinessPoller, progress_channel};
use serde::Serialize;

use crate::OutputFormat;
use crate::prompt::Prompter;

/// Where narration goes and where replies come from.
pub struct Console<P, W> {
    prompter: P,
    out: W,
    format: OutputFormat,
}

impl<P: Prompter, W: Write + Send> Console<P, W> {
    pub fn new(prompter: P, out: W, format: OutputFormat) -> Self {
        Self {
            prompter,
            out,
            format,
        }
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (P, W) {
        (self.prompter, self.out)
    }

    /// End a line of progress dots.
    pub fn end_progress(&mut self) -> anyhow::Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out)?;
        }
        Ok(())
    }

    /// Write free-form narration. Narration is dropped in JSON mode.
    pub fn narrate<F>(&mut self, write: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut W) -> std::io::Result<()>,
    {
        if self.format == OutputFormat::Text {
            write(&mut self.out)?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Write one line of narration.
    pub fn say(&mut self, line: impl std::fmt::Display) -> anyhow::Result<()> {
        self.narrate(|out| writeln!(out, "{line}"))
    }

    /// Questions are hidden only when nobody reads them.
    fn shows_prompts(&self) -> bool {
        self.format == OutputFormat::Text || self.prompter.is_interactive()
    }

    /// Print `question` without a newline and read the reply.
    pub async fn ask(&mut self, question: &str) -> anyhow::Result<String> {
        let shown = self.shows_prompts();
        if shown {
            write!(self.out, "{question}")?;
            self.out.flush()?;
        }
        let reply = self.prompter.answer().await?;
        if shown && !self.prompter.is_interactive() {
            // Nobody typed the newline that ends the prompt line.
            writeln!(self.out)?;
        }
        Ok(reply)
    }

    /// Print `line` and wait for ENTER.
    pub async fn pause(&mut self, line: &str) -> anyhow::Result<()> {
        if self.shows_prompts() {
            writeln!(self.out, "{line}")?;
            self.out.flush()?;
        }
        self.prompter.answer().await?;
        Ok(())
    }

    /// Ask a `[yes] no` question.
    pub async fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        Ok(parse_confirmation(&self.ask(question).await?))
    }

    /// Print `value` as pretty JSON, or through `text` in text mode.
    pub fn emit<T, F>(&mut self, value: &T, text: F) -> anyhow::Result<()>
    where
        T: Serialize,
        F: FnOnce(&mut W, &T) -> std::io::Result<()>,
    {
        match self.format {
            OutputFormat::Json => writeln!(self.out, "{}", serde_json::to_string_pretty(value)?)?,
            OutputFormat::Text => text(&mut self.out, value)?,
        }
        Ok(())
    }

    /// Run a wait, printing a dot for every check that did not succeed.
    ///
    /// `wait` receives a clone of `poller` that reports progress. Dots are
    /// only printed in text mode.
    pub async fn with_progress_dots<T, F, Fut>(&mut self, poller: &ReadinessPoller, wait: F) -> T
    where
        F: FnOnce(ReadinessPoller) -> Fut,
        Fut: Future<Output = T>,
    {
        let (tx, mut rx) = progress_channel();
        let wait = wait(poller.clone().with_progress(tx));
        let show = self.format == OutputFormat::Text;
        let out = &mut self.out;
        let dots = async move {
            while let Some(event) = rx.recv().await {
                if show && event.observation != Observation::Ready {
                    // Dots are cosmetic; a failed write must not end the wait.
                    let _ = write!(out, ".").and_then(|()| out.flush());
                }
            }
        };
        let (result, ()) = tokio::join!(wait, dots);
        result
    }
}
