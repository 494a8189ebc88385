mod board;
mod progress;
mod styling;

pub use board::{print_board, print_empty_board};
#[cfg(test)]
pub use board::render_board;
pub use progress::FetchProgress;
pub use styling::{dim, magenta_bold};

/// Prints the `ciboard` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🚦 ciboard"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab pipeline board")
    );
}
