//! Output formatting utilities for CLI commands

use colored::Colorize;

/// Print success message
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print encoded bytes as hex on stdout, optionally grouped by byte
pub fn hex(bytes: &[u8], spaced: bool) {
    if spaced {
        let parts: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        println!("{}", parts.join(" "));
    } else {
        println!("{}", sflwire_shared::utils::bytes_to_hex(bytes));
    }
}
