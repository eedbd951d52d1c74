//! Terminal rendering of status lines and the login panel.

use colored::{ColoredString, Colorize};

use authdemo_core::{DemoEndpoint, Notice, SessionStore, Severity};

fn paint(notice: &Notice) -> ColoredString {
    match notice.severity {
        Severity::Success => notice.text.green(),
        Severity::Failure => notice.text.red(),
        Severity::Info => notice.text.normal(),
    }
}

/// Print the status line. An empty status prints nothing.
pub fn status(notice: &Notice) {
    if !notice.text.is_empty() {
        println!("{}", paint(notice));
    }
}

/// Print either the logged-in summary or the login hint
pub fn panel(session: &SessionStore) {
    if session.is_logged_in() {
        println!("{}", session.describe().bold());
    } else {
        println!("{}", "Not logged in. Use `login <username>`.".dimmed());
    }
}

pub fn endpoint_result(endpoint: DemoEndpoint, notice: &Notice) {
    println!("{:>16}  {}", endpoint.name().cyan(), paint(notice));
}

pub fn banner(server_url: &str) {
    println!("{} {}", "authdemo".bold(), format!("({})", server_url).dimmed());
    println!("Type `help` for commands.");
}
