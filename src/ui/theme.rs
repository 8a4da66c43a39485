//! Visual theme and styling.

use console::Style;

/// Styles for terminal output.
#[derive(Debug, Clone)]
pub struct AssetGateTheme {
    /// Success messages (green).
    pub success: Style,
    /// Warning messages (orange).
    pub warning: Style,
    /// Error messages (red bold).
    pub error: Style,
    /// Development mode and active servers (cyan).
    pub info: Style,
    /// Secondary text.
    pub dim: Style,
    /// Headers (bold cyan).
    pub header: Style,
    /// Labels in key-value lines (bold).
    pub key: Style,
    /// Values in key-value lines.
    pub value: Style,
}

impl Default for AssetGateTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetGateTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            key: Style::new().bold(),
            value: Style::new(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            key: Style::new(),
            value: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// Format `key: value` with the key padded to a fixed column.
    pub fn format_key_value(&self, key: &str, value: &str) -> String {
        format!(
            "  {} {}",
            self.key.apply_to(format!("{:<18}", format!("{}:", key))),
            self.value.apply_to(value)
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
