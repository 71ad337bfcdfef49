//! Colored, wrapped status messages.

use std::fmt;

use term_painter::{Color, Style, ToStyle};


macro_rules! info {
    ($($t:tt)*) => {
        crate::ui::print_msg(crate::ui::MsgKind::Info, format_args!($($t)*))
    };
}

macro_rules! warn {
    ($($t:tt)*) => {
        crate::ui::print_msg(crate::ui::MsgKind::Warning, format_args!($($t)*))
    };
}

macro_rules! error {
    ($($t:tt)*) => {
        crate::ui::print_msg(crate::ui::MsgKind::Error, format_args!($($t)*))
    };
}

/// Prints `[…] <msg> ... ` then evaluates `$body` and finishes the line with
/// the elapsed time.
macro_rules! progress {
    ([$($fmt:tt)*] => $body:expr) => {{
        use std::io::Write;
        use term_painter::ToStyle;

        let kind = crate::ui::MsgKind::Progress;
        let msg = format!($($fmt)*);
        print!("{} {} ... ", kind.icon_style().paint("[…]"), msg);
        let _ = std::io::stdout().flush();

        let before = std::time::Instant::now();
        let out = $body;
        println!(
            "\r{} {} ... {} (in {:.2?})",
            kind.icon_style().paint("[✓]"),
            msg,
            kind.icon_style().paint("done"),
            before.elapsed(),
        );

        out
    }};
}

#[derive(Debug, Clone, Copy)]
pub enum MsgKind {
    Error,
    Warning,
    Info,
    Progress,
}

impl MsgKind {
    fn icon(&self) -> char {
        match self {
            MsgKind::Error => '!',
            MsgKind::Warning => 'w',
            MsgKind::Info => 'i',
            MsgKind::Progress => '…',
        }
    }

    pub fn icon_style(&self) -> Style {
        match self {
            MsgKind::Error => Color::Red.bold(),
            MsgKind::Warning => Color::Yellow.bold(),
            MsgKind::Info => Color::Blue.bold(),
            MsgKind::Progress => Color::Green.bold(),
        }
    }

    pub fn body_style(&self) -> Style {
        match self {
            MsgKind::Error => Color::BrightRed.to_style(),
            MsgKind::Warning => Color::BrightYellow.to_style(),
            MsgKind::Info | MsgKind::Progress => Color::NotSet.to_style(),
        }
    }
}

/// Prints the message with an icon, rewrapped to the terminal width.
/// Continuation lines are indented below the icon.
pub fn print_msg(kind: MsgKind, msg: fmt::Arguments<'_>) {
    let width = msg_width(term_size::dimensions().map(|(w, _)| w));
    let lines = wrap(&msg.to_string(), width);

    let icon = format!("[{}] ", kind.icon());
    for (i, line) in lines.iter().enumerate() {
        let prefix = match i {
            0 => icon.as_str(),
            _ if i == lines.len() - 1 => "  └ ",
            _ => "  │ ",
        };
        println!("{}{}", kind.icon_style().paint(prefix), kind.body_style().paint(line));
    }
}

/// Space left for the message next to the icon. At least one column, even
/// on tiny terminals.
fn msg_width(term_width: Option<usize>) -> usize {
    term_width.unwrap_or(80).min(100).saturating_sub(6).max(1)
}

/// Splits `text` at whitespace into lines shorter than `width` characters.
/// Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() >= width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);

    lines
}

/// Formats the given integer with `,` as thousand separator.
pub fn fmt_with_thousand_sep(mut v: u64) -> String {
    let mut groups = Vec::new();
    while v >= 1000 {
        groups.push(v % 1000);
        v /= 1000;
    }

    let mut out = v.to_string();
    for group in groups.iter().rev() {
        out.push_str(&format!(",{:03}", group));
    }

    out
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_sep() {
        assert_eq!(fmt_with_thousand_sep(0), "0");
        assert_eq!(fmt_with_thousand_sep(999), "999");
        assert_eq!(fmt_with_thousand_sep(1000), "1,000");
        assert_eq!(fmt_with_thousand_sep(1_002_030), "1,002,030");
    }

    #[test]
    fn wrapping() {
        assert_eq!(wrap("a bb ccc", 6), ["a bb", "ccc"]);
        assert_eq!(wrap("", 10), [""]);
        assert_eq!(wrap("toolongword x", 4), ["toolongword", "x"]);
    }

    #[test]
    fn narrow_terminals() {
        assert_eq!(msg_width(None), 74);
        assert_eq!(msg_width(Some(200)), 94);
        assert_eq!(msg_width(Some(7)), 1);
        assert_eq!(msg_width(Some(3)), 1);
        assert_eq!(msg_width(Some(0)), 1);
        assert_eq!(wrap("a b", msg_width(Some(2))), ["a", "b"]);
    }
}
