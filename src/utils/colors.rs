/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

/// Color of an audit log operation.
pub fn color_for_operation(op: &str) -> &'static str {
    match op {
        "confirm" => GREEN,
        "reject" | "lost" => RED,
        "retain" | "retry" => YELLOW,
        "submit" => CYAN,
        "init" => MAGENTA,
        _ => RESET,
    }
}
