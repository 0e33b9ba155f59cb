//! Line-based terminal input.
//!
//! A single reader is shared by every screen of a run so that a read
//! abandoned by the payment countdown never swallows the next answer.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

/// How long [`Prompt::discard_pending`] waits for each buffered line.
const DISCARD_WINDOW: Duration = Duration::from_millis(20);

pub struct Prompt {
    lines: Lines<Box<dyn AsyncBufRead + Send + Unpin>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    fn from_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        let reader: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: reader.lines(),
        }
    }

    #[cfg(test)]
    pub fn from_bytes(input: &'static [u8]) -> Self {
        Self::from_reader(input)
    }

    /// Prints `label` and reads one line. `None` on end of input.
    pub async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        print!("{label}");
        std::io::stdout().flush().context("flush stdout")?;
        self.read_line().await
    }

    /// Like [`Prompt::ask`] but treats end of input as an error.
    pub async fn ask_required(&mut self, label: &str) -> Result<String> {
        self.ask(label)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Input closed"))
    }

    /// Reads one line without printing anything. Cancel safe.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let line = self.lines.next_line().await.context("read stdin")?;
        Ok(line.map(|l| l.trim_end_matches('\r').to_string()))
    }

    /// Drops lines that were typed ahead of the current prompt.
    /// Returns how many were dropped.
    pub async fn discard_pending(&mut self) -> usize {
        let mut dropped = 0;
        while let Ok(Ok(Some(_))) =
            tokio::time::timeout(DISCARD_WINDOW, self.lines.next_line()).await
        {
            dropped += 1;
        }
        dropped
    }

    /// Asks a yes/no question; anything but `y`/`yes` is no.
    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} [y/N] ")).await?;
        Ok(answer.is_some_and(|a| {
            let a = a.trim();
            a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes")
        }))
    }
}
