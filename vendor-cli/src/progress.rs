use indicatif::{ProgressBar, ProgressStyle};

use vendor_fetch::{Dependency, Error};

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// A spinner labelled with `prefix` shown while a single fetch runs.
pub fn make_progress_spinner(prefix: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb.set_style(
        style("{prefix:.cyan.bold/blue.bold} 🔎 {msg:.cyan/blue} {spinner}")
            .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"),
    );
    pb.set_prefix(prefix);
    pb
}

pub fn complete_progress_bar(pb: ProgressBar, result: &Result<Dependency, Error>) {
    let template = if result.is_ok() {
        "{prefix:.cyan.bold/blue.bold} {msg:.cyan/blue}"
    } else {
        "{prefix:.cyan.bold/blue.bold} {msg:.red.bold}"
    };
    pb.set_style(style(template));
    let status = match result {
        Ok(dep) => format!("😸 {} -> {}", dep.repository, dep.revision),
        Err(_) => format!("😿 failed to fetch '{}'", pb.prefix()),
    };
    pb.finish_with_message(status);
}
