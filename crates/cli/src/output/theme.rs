use colored::Colorize;

const LABEL_WIDTH: usize = 16;

pub fn print_header(title: &str) {
    let border = "─".repeat(title.chars().count() + 6);
    println!();
    println!("  ╭{}╮", border.cyan());
    println!("  │   {}   │", title.bright_cyan().bold());
    println!("  ╰{}╯", border.cyan());
}

pub fn print_section(title: &str) {
    println!();
    println!("  {} {}", "●".bright_cyan(), title.bold());
    println!("  {}", "─".repeat(40).dimmed());
}

fn label(text: &str) -> String {
    format!("{text:<width$}", width = LABEL_WIDTH).dimmed().to_string()
}

pub fn print_kv(key: &str, value: &str) {
    println!("    {} {}", label(key), value.bright_white());
}

/// Green when `ok`, red otherwise.
pub fn print_kv_colored(key: &str, value: &str, ok: bool) {
    let styled = if ok { value.green() } else { value.red() };
    println!("    {} {}", label(key), styled);
}

/// An empty list prints as a dimmed dash.
pub fn print_list(key: &str, items: &[String]) {
    if items.is_empty() {
        println!("    {} {}", label(key), "-".dimmed());
    } else {
        println!("    {} {}", label(key), items.join(", ").bright_white());
    }
}

pub fn print_dim(msg: &str) {
    println!("  {}", msg.dimmed());
}
