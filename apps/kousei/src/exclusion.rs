//! Exclusion filter: spans of a document that no rule may report on.
//!
//! Two sources of exclusion:
//! - Regions: fenced code blocks (whole block, fence lines included; an
//!   unclosed fence runs to end of document) and HTML comments.
//! - Allow-list: patterns for legitimately formatted text (listing captions,
//!   glossary entries, quoted callouts, one-line comments). A candidate is
//!   suppressed when its matched text or its containing line matches.
//!
//! All checks are independent searches on immutable input, so the answer
//! for a span never depends on which spans were tested before it.

use crate::markdown;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex"));

static ALLOW_LIST: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\*\*サンプルコード\d+-\d+\*\*",
        r#"<span class="listing-number">\*\*サンプルコード\d+-\d+\*\*</span>"#,
        r"\*\*[^*\n]+\*\* - 第\d+章",
        r"> \*\*[^*\n]+\*\*",
        r"<!-- .* -->",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("allow-list regex"))
    .collect()
});

/// Excluded regions of one document, computed once per document.
#[derive(Debug, Clone, Default)]
pub struct ExclusionZones {
    regions: Vec<Range<usize>>,
}

impl ExclusionZones {
    pub fn from_text(text: &str) -> Self {
        let mut regions = code_fence_regions(text);
        regions.extend(HTML_COMMENT.find_iter(text).map(|m| m.range()));
        regions.sort_by_key(|r| r.start);
        Self { regions }
    }

    /// True when `span` overlaps a code block or comment region.
    pub fn in_region(&self, span: &Range<usize>) -> bool {
        self.regions.iter().any(|r| {
            if span.is_empty() {
                r.contains(&span.start)
            } else {
                span.start < r.end && r.start < span.end
            }
        })
    }

    /// Full exclusion test for a candidate match at `span` in `text`.
    pub fn is_excluded(&self, text: &str, span: Range<usize>) -> bool {
        if self.in_region(&span) {
            return true;
        }
        let matched = text.get(span.clone()).unwrap_or("");
        allow_listed(matched, containing_line(text, span.start))
    }
}

/// Pure exclusion predicate over a document and a candidate span.
pub fn is_excluded(text: &str, span: Range<usize>) -> bool {
    ExclusionZones::from_text(text).is_excluded(text, span)
}

/// True when either the matched text or its line is allow-listed.
pub fn allow_listed(matched: &str, line: &str) -> bool {
    ALLOW_LIST
        .iter()
        .any(|re| re.is_match(line) || re.is_match(matched))
}

fn containing_line(text: &str, offset: usize) -> &str {
    let offset = offset.min(text.len());
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    let line = &text[start..end];
    line.strip_suffix('\r').unwrap_or(line)
}

fn code_fence_regions(text: &str) -> Vec<Range<usize>> {
    let mut regions = Vec::new();
    // (fence char, run length, region start)
    let mut open: Option<(char, usize, usize)> = None;
    for line in markdown::lines(text) {
        let trimmed = line.text.trim_start();
        match open {
            None => {
                if let Some((ch, len)) = fence_run(trimmed) {
                    open = Some((ch, len, line.start));
                }
            }
            Some((ch, len, start)) => {
                if let Some((c, l)) = fence_run(trimmed) {
                    let rest = &trimmed[l * c.len_utf8()..];
                    if c == ch && l >= len && rest.trim().is_empty() {
                        regions.push(start..line.start + line.text.len());
                        open = None;
                    }
                }
            }
        }
    }
    if let Some((_, _, start)) = open {
        regions.push(start..text.len());
    }
    regions
}

fn fence_run(line: &str) -> Option<(char, usize)> {
    let ch = line.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let len = line.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}
