//! Themed terminal output.
//!
//! Styling is decided by the [`Ui`] handed to each screen; colors are only
//! emitted when stdout is a terminal.

use std::fmt::Display;
use std::io::IsTerminal;

use crossterm::style::{Color, Stylize};
use skillcert_core::theme::Theme;

#[derive(Debug, Clone, Copy)]
struct Palette {
    accent: Color,
    success: Color,
    error: Color,
    muted: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                accent: Color::DarkBlue,
                success: Color::DarkGreen,
                error: Color::DarkRed,
                muted: Color::DarkGrey,
            },
            Theme::Dark => Palette {
                accent: Color::Cyan,
                success: Color::Green,
                error: Color::Red,
                muted: Color::Grey,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ui {
    palette: Palette,
    color: bool,
}

impl Ui {
    pub fn new(theme: Theme) -> Self {
        Self {
            palette: Palette::for_theme(theme),
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn paint(&self, text: impl Display, color: Color, bold: bool) -> String {
        let text = text.to_string();
        if !self.color {
            return text;
        }
        let styled = text.with(color);
        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }

    pub fn heading(&self, text: impl Display) {
        println!();
        println!("{}", self.paint(text, self.palette.accent, true));
    }

    pub fn success(&self, text: impl Display) {
        println!("{}", self.paint(format!("✓ {text}"), self.palette.success, false));
    }

    pub fn error(&self, text: impl Display) {
        println!("{}", self.paint(format!("✗ {text}"), self.palette.error, false));
    }

    pub fn muted(&self, text: impl Display) {
        println!("{}", self.paint(text, self.palette.muted, false));
    }

    pub fn field(&self, label: &str, value: impl Display) {
        println!("  {} {value}", self.paint(format!("{label}:"), self.palette.muted, false));
    }

    /// A horizontal bar `width` cells wide at `percent` fill.
    pub fn bar(&self, percent: f64, width: usize) -> String {
        let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(width - filled));
        self.paint(bar, self.palette.accent, false)
    }
}
