//! Console output utilities for the Satchel CLI.

/// Print an error message to stderr with red color
pub fn print_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {message}");
}

/// Print a success message to stdout with green color
pub fn print_success(message: &str) {
    println!("\x1b[32mSUCCESS:\x1b[0m {message}");
}

/// Print an info message to stdout with blue color
pub fn print_info(message: &str) {
    println!("\x1b[34mINFO:\x1b[0m {message}");
}

/// Print a warning message to stdout with yellow color
#[allow(dead_code)]
pub fn print_warning(message: &str) {
    println!("\x1b[33mWARNING:\x1b[0m {message}");
}
