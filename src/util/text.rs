use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of a string in terminal columns (CJK and emoji count as 2).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates a string to fit within `max_width` terminal columns.
///
/// Appends `...` when text is cut. Widths of 3 or less have no room for an
/// ellipsis, so the string is simply clipped. Returns `Cow::Borrowed` when
/// the input already fits.
///
/// # Examples
///
/// ```
/// use filmcheck::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Heat", 10), "Heat");
/// assert_eq!(truncate_to_width("The Godfather", 8), "The G...");
/// assert_eq!(truncate_to_width("Heat", 2), "He");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut width = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}

/// Removes control characters and ANSI escape sequences from remote text.
///
/// Titles, overviews and comments come from third-party services and are
/// drawn straight into the terminal. Tabs and newlines are kept.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let needs_strip = s
        .chars()
        .any(|c| c.is_control() && c != '\t' && c != '\n' && c != '\r');
    if !needs_strip {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                // CSI: ESC [ params final-byte
                Some('[') => {
                    chars.next();
                    for next in chars.by_ref() {
                        if ('@'..='~').contains(&next) {
                            break;
                        }
                    }
                }
                // OSC: ESC ] ... (BEL | ESC \)
                Some(']') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }
        if c.is_control() && c != '\t' && c != '\n' && c != '\r' {
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}
