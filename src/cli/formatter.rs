/// Terminal output helpers shared by the subcommands
use colored::*;
use std::path::Path;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{} {}", "▶".cyan(), title.bold());
    println!("{}", "─".repeat(60).dimmed());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!(
        "\n{} {}",
        "⚠".yellow(),
        format!("Warning: {}", message).yellow()
    );
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green().bold(), message);
}

/// Print a tip
pub fn print_tip(message: &str) {
    println!("\n{} {}", "→".cyan(), format!("Tip: {}", message).dimmed());
}

/// One "label: path" line for a written file
pub fn print_output_file(label: &str, path: &Path) {
    println!("  {} {:<22} {}", "•".dimmed(), label, path.display());
}

/// Check if colors should be disabled
pub fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
        && std::env::var("CLICOLOR").unwrap_or_else(|_| "1".to_string()) != "0"
}

pub fn init() {
    if !colors_enabled() {
        colored::control::set_override(false);
    }
}
