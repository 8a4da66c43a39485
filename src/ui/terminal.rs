//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, AssetGateTheme, OutputMode, UserInterface};

/// Terminal UI writing status to stdout and errors to stderr.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: AssetGateTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI, colored when the terminal supports it.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_colors(mode, should_use_colors())
    }

    pub fn with_colors(mode: OutputMode, colors: bool) -> Self {
        let theme = if colors {
            AssetGateTheme::new()
        } else {
            AssetGateTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_warnings() {
            writeln!(self.out, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "\n{}", self.theme.format_header(title)).ok();
        }
    }

    fn key_value(&mut self, key: &str, value: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_key_value(key, value)).ok();
        }
    }

    fn output(&mut self, text: &str) {
        writeln!(self.out, "{}", text).ok();
    }

    fn is_interactive(&self) -> bool {
        self.out.is_term()
    }
}

/// Create the UI for the CLI.
pub fn create_ui(mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    if no_color {
        Box::new(TerminalUI::with_colors(mode, false))
    } else {
        Box::new(TerminalUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ui_output_mode() {
        let ui = TerminalUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn create_ui_respects_mode() {
        let ui = create_ui(OutputMode::Silent, true);
        assert_eq!(ui.output_mode(), OutputMode::Silent);
    }
}
