//! Status markers shared by the explainers.
//!
//! Colored only when stdout supports it, so piped output and tests see plain
//! ASCII.

use owo_colors::{OwoColorize, Stream};

pub(super) fn ok() -> String {
    "[OK]"
        .if_supports_color(Stream::Stdout, |t| t.bright_green())
        .to_string()
}

pub(super) fn error() -> String {
    "[ERROR]"
        .if_supports_color(Stream::Stdout, |t| t.bright_red())
        .to_string()
}

pub(super) fn ignored() -> String {
    "[IGNORED]"
        .if_supports_color(Stream::Stdout, |t| t.yellow())
        .to_string()
}

pub(super) fn unreachable() -> String {
    "[UNREACHABLE]"
        .if_supports_color(Stream::Stdout, |t| t.bright_red())
        .to_string()
}

pub(super) fn skipped() -> String {
    "[SKIPPED]"
        .if_supports_color(Stream::Stdout, |t| t.cyan())
        .to_string()
}
