use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

// ---------------------------------------------------------------------------
// Colored message helpers
// ---------------------------------------------------------------------------

fn prefix() -> String {
    "[gkectl]".bold().cyan().to_string()
}

/// Print an informational message: [gkectl] message
pub fn info(msg: &str) {
    println!("{} {}", prefix(), msg);
}

/// Print a success message: [gkectl] message (in green)
pub fn success(msg: &str) {
    println!("{} {}", prefix(), msg.green());
}

/// Print an error message to stderr (in red)
pub fn error(msg: &str) {
    eprintln!("{} {}", "[gkectl]".bold().red(), msg.red());
}

/// Print a warning message (in yellow)
pub fn warn(msg: &str) {
    println!("{} {}", prefix(), msg.yellow());
}

// ---------------------------------------------------------------------------
// Hint box
// ---------------------------------------------------------------------------

/// Print a rounded box with a title and one command per line, for
/// copy-pasteable follow-ups.
pub fn hint_box(title: &str, lines: &[&str]) {
    let width = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(title.chars().count() + 2);

    println!(
        "╭─ {} {}╮",
        title.bold(),
        "─".repeat(width - title.chars().count() - 1)
    );
    for line in lines {
        println!("│ {}{} │", line, " ".repeat(width - line.chars().count()));
    }
    println!("╰{}╯", "─".repeat(width + 2));
}

// ---------------------------------------------------------------------------
// Spinners
// ---------------------------------------------------------------------------

/// Create and start a spinner with the given message.
/// Call `.finish_with_message()` or `.finish_and_clear()` when done.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
            .expect("invalid spinner template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}
