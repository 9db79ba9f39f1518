//! Progress reporting for blob transfers
//!
//! Bridges the byte counts observed while streaming transfer chunks to a
//! rendered console progress bar. In quiet mode the bar is hidden but byte
//! accounting still works, so callers can print a summary either way.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Byte-count progress for a single transfer
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    /// Create a byte-styled progress bar for a transfer of known size.
    ///
    /// `description` is shown next to the bar, e.g. "Downloading model.bin".
    pub fn bytes(total: u64, description: impl Into<String>, quiet: bool) -> Self {
        let bar = if quiet {
            let hidden = ProgressBar::hidden();
            hidden.set_length(total);
            hidden
        } else {
            ProgressBar::new(total)
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                .expect("Progress bar template should be valid")
                .progress_chars("=>-"),
        );
        bar.set_message(description.into());

        Self { bar }
    }

    /// Create a spinner for operations without a known length
    pub fn spinner(description: impl Into<String>, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg}")
                .expect("Progress bar template should be valid"),
        );
        bar.set_message(description.into());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Advance by a number of bytes just transferred
    pub fn advance(&self, delta: u64) {
        self.bar.inc(delta);
    }

    /// Set the absolute number of bytes transferred so far
    pub fn set(&self, transferred: u64) {
        self.bar.set_position(transferred);
    }

    /// Bytes counted so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Total expected bytes, if known
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    /// Stop rendering and clear the bar from the console
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
