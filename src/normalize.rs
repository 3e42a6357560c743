//! Input normalization.
//!
//! Deliberately naive: the only separators are the ASCII space and newline, every
//! other non-printable character is discarded, and there is no quoting.

/// A command line with no leading/trailing separators, no repeated separators and
/// only printable ASCII characters.
///
/// Can only be obtained from [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine(String);

impl NormalizedLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn is_separator(ch: char) -> bool {
    ch == ' ' || ch == '\n'
}

fn is_printable(ch: char) -> bool {
    ch.is_ascii_graphic() || ch == ' '
}

/// Normalize a raw line as typed by the operator.
///
/// Returns `None` when nothing printable is left, which callers treat as "prompt
/// again" rather than an error.
pub fn normalize(raw: String) -> Option<NormalizedLine> {
    let mut out = String::with_capacity(raw.len());

    for ch in raw.chars() {
        if is_separator(ch) {
            // Leading separators and runs collapse into nothing / a single space.
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
        } else if is_printable(ch) {
            out.push(ch);
        }
    }

    if out.ends_with(' ') {
        out.pop();
    }

    if out.is_empty() {
        None
    } else {
        Some(NormalizedLine(out))
    }
}
