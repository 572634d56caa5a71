//! Progress reporting styles for downloads.
//!
//! The style is injected into the fetcher rather than hard-wired to a
//! rendering library: `None` for quiet contexts, `PercentageOnly` for the
//! `--numeric-progress` flag, and `Default` for the interactive bar.

use indicatif::{ProgressBar, ProgressStyle as BarTemplate};

/// How download progress is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStyle {
    /// No progress output.
    None,
    /// A bare percentage, suitable for non-TTY logs.
    PercentageOnly,
    /// The full progress bar.
    #[default]
    Default,
}

impl ProgressStyle {
    /// Build the progress bar for a transfer of `total` bytes, if this
    /// style renders one. A zero `total` falls back to a spinner-less bar
    /// with unknown length.
    pub fn bar(&self, total: u64) -> Option<ProgressBar> {
        let template = match self {
            Self::None => return None,
            Self::PercentageOnly => "  {percent:>3}%",
            Self::Default => "  [{bar:30}] {bytes}/{total_bytes}",
        };
        let bar = if total > 0 {
            ProgressBar::new(total)
        } else {
            ProgressBar::no_length()
        };
        bar.set_style(
            BarTemplate::with_template(template)
                .expect("progress template is valid")
                .progress_chars("=> "),
        );
        Some(bar)
    }
}
