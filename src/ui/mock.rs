//! Mock UI for testing.
//!
//! Captures every call for later assertion. Output mode filtering is
//! applied the same way [`TerminalUI`](super::TerminalUI) applies it, so
//! tests can check what a user would actually see.

use super::{OutputMode, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    key_values: Vec<(String, String)>,
    outputs: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn key_values(&self) -> &[(String, String)] {
        &self.key_values
    }

    /// Value shown for `key`, if any.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.key_values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Check whether any captured line contains `needle`.
    pub fn has_text(&self, needle: &str) -> bool {
        self.messages
            .iter()
            .chain(&self.successes)
            .chain(&self.warnings)
            .chain(&self.errors)
            .chain(&self.headers)
            .chain(&self.outputs)
            .any(|line| line.contains(needle))
            || self
                .key_values
                .iter()
                .any(|(k, v)| k.contains(needle) || v.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            self.messages.push(msg.to_string());
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            self.successes.push(msg.to_string());
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_warnings() {
            self.warnings.push(msg.to_string());
        }
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            self.headers.push(title.to_string());
        }
    }

    fn key_value(&mut self, key: &str, value: &str) {
        if self.mode.shows_status() {
            self.key_values.push((key.to_string(), value.to_string()));
        }
    }

    fn output(&mut self, text: &str) {
        self.outputs.push(text.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
