use attrtree::{AttributeChange, ChangeKind};
use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print one attribute change, colored by kind
pub fn change(change: &AttributeChange) {
    let line = change.to_string();
    let colored = match change.kind {
        ChangeKind::Added => line.green(),
        ChangeKind::Removed => line.red(),
        ChangeKind::Modified => line.yellow(),
    };
    if change.requires_replacement {
        println!("  {}", colored.bold());
    } else {
        println!("  {colored}");
    }
}
