//! Console output for the binary. Colors only when stdout is a terminal.

use owo_colors::OwoColorize;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn label(text: &'static str, paint: fn(&'static str) -> String) -> String {
    if is_tty() { paint(text) } else { text.to_string() }
}

pub fn print_info(msg: &str) {
    println!("{} {}", label("info:", |s| s.cyan().bold().to_string()), msg);
}

pub fn print_warn(msg: &str) {
    eprintln!("{} {}", label("warn:", |s| s.yellow().bold().to_string()), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", label("error:", |s| s.red().bold().to_string()), msg);
}

pub fn print_success(msg: &str) {
    println!("{} {}", label("ok:", |s| s.green().bold().to_string()), msg);
}
