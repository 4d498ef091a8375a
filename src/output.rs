//! CLI output formatting.
//!
//! Status goes to stderr as `HEADER: message` lines, one per step:
//!
//! ```text
//! INFO: Building blogs...
//! MINIFY: Minifying 'hello-world' HTML
//! BUILD: Finished building blog 'hello-world'
//! TIME: Finished in 0.042 seconds with code 0
//! ```
//!
//! The post listing (`list`) goes to stdout:
//!
//! ```text
//! ID: hello-world
//! Title: "Hello, World!"
//! Version: 1
//! Time_of_creation: 2024-03-01 12:00:00
//! Keywords: rust, blog
//!
//! ```
//!
//! Each output has a `format_*` function (returns lines, no I/O) for
//! testability and a `print_*`/`log` wrapper that writes them.

use crate::generate::format_time;
use crate::store::Posts;

/// Header of lines that are shown even in quiet (CI) mode.
pub const ERROR: &str = "ERROR";

/// Format one status line.
pub fn format_status(header: &str, message: &str) -> String {
    format!("{header}: {message}")
}

/// Write a status line to stderr. In quiet mode only errors are written.
pub fn log(quiet: bool, header: &str, message: &str) {
    if quiet && header != ERROR {
        return;
    }
    eprintln!("{}", format_status(header, message));
}

/// Format the post listing, one block per post in store order.
pub fn format_post_listing(posts: &Posts) -> Vec<String> {
    let mut lines = Vec::new();
    for post in posts.iter() {
        lines.push(format!("ID: {}", post.id));
        lines.push(format!("Title: {:?}", post.title));
        lines.push(format!("Version: {}", post.version));
        lines.push(format!("Time_of_creation: {}", format_time(post.created_at)));
        lines.push(format!(
            "Keywords: {}",
            post.keyword_list().collect::<Vec<_>>().join(", ")
        ));
        lines.push(String::new());
    }
    lines
}

pub fn print_post_listing(posts: &Posts) {
    for line in format_post_listing(posts) {
        println!("{}", line);
    }
}
