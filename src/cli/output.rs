use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "SUCCESS",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
        MessageKind::Hint => "HINT",
        MessageKind::Section => "",
    }
}

pub(crate) fn format_message(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{}: {}", label(kind), text),
    };
    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Hint => base.bright_cyan().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info => base,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = format_message(kind, message);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        MessageKind::Error => eprintln!("{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Plain line without a label, for table rows and detail listings.
pub fn line(message: impl fmt::Display) {
    println!("{message}");
}

/// Renders rows under a header with columns padded to the widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", render_table(headers, rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns() {
        colored::control::set_override(false);
        let rendered = render_table(
            &["ID", "Name"],
            &[
                vec!["1".into(), "Checking".into()],
                vec!["12".into(), "Cash".into()],
            ],
        );
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "ID  Name");
        assert_eq!(lines[1], "--  --------");
        assert_eq!(lines[2], "1   Checking");
        assert_eq!(lines[3], "12  Cash");
    }

    #[test]
    fn messages_carry_labels() {
        colored::control::set_override(false);
        assert_eq!(format_message(MessageKind::Warning, "careful"), "WARNING: careful");
        assert_eq!(format_message(MessageKind::Section, " Accounts "), "=== Accounts ===");
    }
}
