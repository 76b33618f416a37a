//! Line-level Markdown helpers shared by the scanner, fixer, and restructure pass.
//!
//! Nothing here keeps state between calls; every helper works on the slice
//! it is given.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)([-*+]|\d+\.)[ \t]+(\S.*)$").expect("list item regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}#{1,6}(?:[ \t]|$)").expect("heading regex"));
static BOLD_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*[^*]+\*\*").expect("bold label regex"));
static CLOCK_BEFORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}\s*$").expect("clock regex"));
static CLOCK_AFTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,2}:\d{2}").expect("clock regex"));

/// Bracket pairs inside which a colon is never a title separator.
pub const BRACKET_PAIRS: [(char, char); 10] = [
    ('（', '）'),
    ('(', ')'),
    ('【', '】'),
    ('[', ']'),
    ('『', '』'),
    ('「', '」'),
    ('〈', '〉'),
    ('<', '>'),
    ('{', '}'),
    ('〔', '〕'),
];

/// A line of text with its byte range in the document. The range excludes
/// the line terminator; `text` has a trailing `\r` stripped.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub number: usize,
    pub start: usize,
    pub text: &'a str,
}

impl Line<'_> {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.text.len()
    }
}

/// Iterate the lines of `text` with 1-based numbers and byte offsets.
pub fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    let mut start = 0usize;
    text.split('\n').enumerate().map(move |(i, raw)| {
        let line = Line {
            number: i + 1,
            start,
            text: raw.strip_suffix('\r').unwrap_or(raw),
        };
        start += raw.len() + 1;
        line
    })
}

/// A parsed list item: `indent marker body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem<'a> {
    pub indent: &'a str,
    pub marker: &'a str,
    pub body: &'a str,
    /// Byte offset of `body` within the line.
    pub body_offset: usize,
}

impl ListItem<'_> {
    pub fn is_ordered(&self) -> bool {
        self.marker.ends_with('.')
    }
}

/// Parse `line` as a bullet (`-`, `*`, `+`) or ordered (`N.`) list item.
pub fn list_item(line: &str) -> Option<ListItem<'_>> {
    let caps = LIST_ITEM.captures(line)?;
    let body = caps.get(3)?;
    Some(ListItem {
        indent: caps.get(1).map_or("", |m| m.as_str()),
        marker: caps.get(2)?.as_str(),
        body: body.as_str(),
        body_offset: body.start(),
    })
}

pub fn is_heading(line: &str) -> bool {
    HEADING.is_match(line)
}

/// Length in bytes of a `**label**` prefix of `body`, if present.
pub fn bold_label_len(body: &str) -> Option<usize> {
    BOLD_LABEL.find(body).map(|m| m.end())
}

/// True when `text` is exactly one bold label, e.g. `**term**`.
pub fn is_bold_label(text: &str) -> bool {
    bold_label_len(text) == Some(text.len())
}

/// True when the colon at byte `idx` sits inside an open bracket that is
/// closed later on the line. Pairs closed before the colon do not count.
pub fn colon_in_brackets(line: &str, idx: usize) -> bool {
    let (before, after) = line.split_at(idx);
    BRACKET_PAIRS.iter().any(|&(open, close)| {
        let depth = before.chars().fold(0usize, |d, c| {
            if c == open {
                d + 1
            } else if c == close {
                d.saturating_sub(1)
            } else {
                d
            }
        });
        depth > 0 && after.contains(close)
    })
}

/// True when the byte `idx` falls inside an inline code span.
pub fn in_inline_code(line: &str, idx: usize) -> bool {
    line[..idx].matches('`').count() % 2 == 1
}

/// True when the text on both sides of a dash is an `H:MM` clock time
/// touching the dash, e.g. `9:00` | `17:00`.
pub fn clock_dash(left: &str, right: &str) -> bool {
    CLOCK_BEFORE.is_match(left) && CLOCK_AFTER.is_match(right)
}

/// 1-based character column of byte `idx` within `line`.
pub fn char_column(line: &str, idx: usize) -> usize {
    line[..idx].chars().count() + 1
}
