//! Terminal output.
//!
//! - [`UserInterface`] trait so commands can be tested with [`MockUI`]
//! - [`TerminalUI`] for real terminals, styled with [`AssetGateTheme`]
//! - [`Table`] for tabular listings
//!
//! # Example
//!
//! ```
//! use assetgate::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("Environment");
//! ui.key_value("Mode", "development");
//! assert_eq!(ui.key_values()[0], ("Mode".to_string(), "development".to_string()));
//! ```

pub mod mock;
pub mod output;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, AssetGateTheme};

/// Trait for user-facing output.
///
/// Status lines respect the [`OutputMode`]; [`UserInterface::output`]
/// carries command results (JSON, HTML) and is always written.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Show a section header.
    fn show_header(&mut self, title: &str);

    /// Show a labelled value.
    fn key_value(&mut self, key: &str, value: &str);

    /// Write command output verbatim.
    fn output(&mut self, text: &str);

    /// Show a detail line, only in verbose mode.
    fn detail(&mut self, msg: &str) {
        if self.output_mode().shows_details() {
            self.message(msg);
        }
    }

    /// Check if attached to a terminal.
    fn is_interactive(&self) -> bool;
}
