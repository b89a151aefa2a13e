use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn tagged(tag: colored::ColoredString, body: &str) -> String {
    format!("{} {}", tag, body)
}

/// Plain status line: `[forgectl] message`.
pub fn info(msg: &str) {
    println!("{}", tagged("[forgectl]".bold().cyan(), msg));
}

/// Confirmation of a completed mutation, in green.
pub fn success(msg: &str) {
    println!(
        "{}",
        tagged("[forgectl]".bold().cyan(), &msg.green().to_string())
    );
}

/// Failure line on stderr, in red.
pub fn error(msg: &str) {
    eprintln!(
        "{}",
        tagged("[forgectl]".bold().red(), &msg.red().to_string())
    );
}

/// Interactive yes/no prompt for destructive operations; declines by
/// default and on any prompt failure (e.g. no tty).
pub fn confirm(msg: &str) -> bool {
    inquire::Confirm::new(msg)
        .with_default(false)
        .prompt()
        .unwrap_or(false)
}

/// A percentage bar for one file upload; the message slot carries the
/// "Uploading..."/"Saving..." phase text.
pub fn upload_bar(multi: &MultiProgress, file_name: &str) -> ProgressBar {
    let pb = multi.add(ProgressBar::new(100));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:>24} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
            .expect("invalid progress template")
            .progress_chars("=> "),
    );
    pb.set_prefix(file_name.to_string());
    pb.set_message("Uploading...");
    pb
}
