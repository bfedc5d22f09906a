use console::style;
use std::fmt::Display;

/// Green bold check mark for completed actions.
pub fn ok_mark() -> String {
    style("✓").green().bold().to_string()
}

/// Red bold cross for failed actions.
pub fn fail_mark() -> String {
    style("✗").red().bold().to_string()
}

/// White bold — titles
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim — hints and rules
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Green — accepted values, paths, names
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan bold — step counters, bullets
pub fn accent<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}

/// Yellow — commands to run next, warnings
pub fn command<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Red — field and request errors
pub fn error<D: Display>(text: D) -> String {
    style(text).red().to_string()
}

pub fn url<D: Display>(text: D) -> String {
    style(text).cyan().underlined().to_string()
}
