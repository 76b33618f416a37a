//! Scanner: applies every rule of a `RuleSet` to one document.
//!
//! Pattern rules are matched over the whole text; each match is located by
//! counting line breaks before its offset. Contextual rules walk the text
//! line by line, skipping code blocks and comments, and keep their state
//! (e.g. the bold-item counter of the current section) local to one call.
//! Output order is rule order, then position.

use crate::exclusion::ExclusionZones;
use crate::markdown::{self, ListItem};
use crate::models::Violation;
use crate::rules::{ContextualCheck, Rule, RuleKind, RuleSet};
use regex::Regex;
use std::ops::Range;

/// Bold-labelled list items tolerated per section before reporting.
const BOLD_ITEMS_PER_SECTION: usize = 2;

/// Scan `text` (the contents of `file`) with every rule in `rules`.
pub fn scan_document(file: &str, text: &str, rules: &RuleSet) -> Vec<Violation> {
    let zones = ExclusionZones::from_text(text);
    let index = LineIndex::new(text);
    let mut out = Vec::new();
    for rule in rules.iter() {
        match &rule.kind {
            RuleKind::Pattern(re) => scan_pattern(rule, re, file, text, &zones, &index, &mut out),
            RuleKind::Contextual(check) => {
                scan_contextual(rule, *check, file, text, &zones, &mut out)
            }
        }
    }
    out
}

fn scan_pattern(
    rule: &Rule,
    re: &Regex,
    file: &str,
    text: &str,
    zones: &ExclusionZones,
    index: &LineIndex<'_>,
    out: &mut Vec<Violation>,
) {
    for m in re.find_iter(text) {
        if m.is_empty() || zones.is_excluded(text, m.range()) {
            continue;
        }
        let (line, column) = index.locate(m.start());
        out.push(violation(
            rule,
            file,
            line,
            column,
            m.as_str(),
            index.line_text(line),
        ));
    }
}

fn scan_contextual(
    rule: &Rule,
    check: ContextualCheck,
    file: &str,
    text: &str,
    zones: &ExclusionZones,
    out: &mut Vec<Violation>,
) {
    let mut bold_items = 0usize;
    for line in markdown::lines(text) {
        if zones.in_region(&line.range()) {
            continue;
        }
        if markdown::is_heading(line.text) {
            bold_items = 0;
            continue;
        }
        let Some(item) = markdown::list_item(line.text) else {
            continue;
        };
        // (byte span within the line, byte offset of the reported column, matched text)
        let hit: Option<(Range<usize>, usize, &str)> = match check {
            ContextualCheck::TitleColonList => title_colon(line.text)
                .filter(|tc| !tc.description.is_empty())
                .map(|tc| {
                    let span = item.body_offset..tc.colon + tc.colon_len;
                    (span.clone(), item.body_offset, &line.text[span])
                }),
            // allow-listed items (glossary entries) do not count toward the limit
            ContextualCheck::ExcessiveBoldList => markdown::bold_label_len(item.body)
                .map(|len| item.body_offset..item.body_offset + len)
                .filter(|span| {
                    !zones.is_excluded(text, line.start + span.start..line.start + span.end)
                })
                .and_then(|span| {
                    bold_items += 1;
                    (bold_items > BOLD_ITEMS_PER_SECTION)
                        .then(|| (span.clone(), item.body_offset, &line.text[span]))
                }),
            ContextualCheck::ListDashStructure => dash_separator(&item)
                .map(|dash| (item.body_offset..line.text.len(), dash, item.body)),
        };
        let Some((span, column_at, matched)) = hit else {
            continue;
        };
        let abs = line.start + span.start..line.start + span.end;
        if zones.is_excluded(text, abs) {
            continue;
        }
        out.push(violation(
            rule,
            file,
            line.number,
            markdown::char_column(line.text, column_at),
            matched,
            line.text,
        ));
    }
}

fn violation(
    rule: &Rule,
    file: &str,
    line: usize,
    column: usize,
    matched: &str,
    line_text: &str,
) -> Violation {
    Violation {
        file: file.to_string(),
        line,
        column,
        rule_id: rule.id.clone(),
        severity: rule.severity,
        description: rule.description.clone(),
        suggestion: rule.suggestion.clone(),
        matched_text: matched.to_string(),
        line_text: line_text.trim().to_string(),
    }
}

/// A list line of the form `marker title：description`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleColon<'a> {
    pub item: ListItem<'a>,
    pub title: &'a str,
    /// Trimmed text after the colon; may be empty.
    pub description: &'a str,
    /// Byte offset of the colon within the line.
    pub colon: usize,
    pub colon_len: usize,
}

/// Split a list line at the first colon (full or half width) that separates
/// a title from a description.
///
/// Colons inside a bracket pair or inline code, and those belonging to a
/// clock time or URL, are passed over. Returns `None` when no colon is left
/// or when the title is a bold label (that shape belongs to `bold-colon-list`).
pub fn title_colon(line: &str) -> Option<TitleColon<'_>> {
    let item = markdown::list_item(line)?;
    let (rel, ch) = item
        .body
        .char_indices()
        .filter(|(_, c)| *c == '：' || *c == ':')
        .find(|&(rel, ch)| is_title_separator(line, item.body_offset + rel, ch))?;
    let colon = item.body_offset + rel;
    let title = item.body[..rel].trim();
    if title.is_empty() || markdown::is_bold_label(title) {
        return None;
    }
    Some(TitleColon {
        item,
        title,
        description: item.body[rel + ch.len_utf8()..].trim(),
        colon,
        colon_len: ch.len_utf8(),
    })
}

fn is_title_separator(line: &str, colon: usize, ch: char) -> bool {
    if markdown::colon_in_brackets(line, colon) || markdown::in_inline_code(line, colon) {
        return false;
    }
    if ch == ':' {
        let after = &line[colon + 1..];
        let digit_before = line[..colon].chars().last().is_some_and(|c| c.is_ascii_digit());
        let digit_after = after.chars().next().is_some_and(|c| c.is_ascii_digit());
        if (digit_before && digit_after) || after.starts_with("//") {
            return false;
        }
    }
    true
}

/// Byte offset (within the line) of the dash in the last ` - ` of the item.
///
/// A dash with a clock time directly on both sides (`9:00 - 17:00`) is a
/// range, not a separator.
fn dash_separator(item: &ListItem<'_>) -> Option<usize> {
    let rel = item.body.rfind(" - ")?;
    let (left, right) = (&item.body[..rel], &item.body[rel + 3..]);
    if left.trim().is_empty() || right.trim().is_empty() || markdown::clock_dash(left, right) {
        return None;
    }
    Some(item.body_offset + rel + 1)
}

/// Maps byte offsets to 1-based line/column positions.
struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, starts }
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&s| s <= offset);
        let start = self.starts[line - 1];
        (line, self.text[start..offset].chars().count() + 1)
    }

    fn line_text(&self, line: usize) -> &'a str {
        let start = self.starts[line - 1];
        let end = self
            .starts
            .get(line)
            .map_or(self.text.len(), |next| next - 1);
        let raw = &self.text[start..end];
        raw.strip_suffix('\r').unwrap_or(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn scan(text: &str) -> Vec<Violation> {
        scan_document("doc.md", text, &RuleSet::builtin())
    }

    fn ids(vs: &[Violation]) -> Vec<&str> {
        vs.iter().map(|v| v.rule_id.as_str()).collect()
    }

    #[test]
    fn test_clean_document_has_no_violations() {
        let text = "# 第1章\n\nJavaは広く使われている言語です。\n\n- 変数\n    + 値を格納する\n";
        assert!(scan(text).is_empty());
    }

    #[test]
    fn test_pattern_rule_location_and_text() {
        let text = "# 見出し\n\n本文です。**リスト1-2**を参照\n";
        let vs = scan(text);
        assert_eq!(ids(&vs), vec!["incorrect-code-listing"]);
        let v = &vs[0];
        assert_eq!(v.line, 3);
        assert_eq!(v.column, 6);
        assert_eq!(v.matched_text, "**リスト1-2**");
        assert_eq!(v.line_text, "本文です。**リスト1-2**を参照");
        assert_eq!(v.severity, Severity::Error);
    }

    #[test]
    fn test_code_blocks_suppress_all_rules() {
        let text = "```\n- **注意**：x\n**見出し**\n以下の通り：\n- 概要 - 説明です\n```\n";
        assert!(scan(text).is_empty());
    }

    #[test]
    fn test_matches_after_many_fences_still_reported() {
        let mut text = String::new();
        for _ in 0..4 {
            text.push_str("```\n**リスト1-1**\n```\n");
        }
        text.push_str("本文**リスト9-9**です\n");
        let vs = scan(&text);
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].line, 13);
    }

    #[test]
    fn test_title_colon_list() {
        let vs = scan("- 重要な注意：これは説明です\n");
        assert_eq!(ids(&vs), vec!["title-colon-list"]);
        assert_eq!(vs[0].matched_text, "重要な注意：");
        assert_eq!(vs[0].column, 3);

        assert!(scan("- 関数（a:b）の説明\n").is_empty());
        assert!(scan("- https://example.com を参照\n").is_empty());
        assert!(scan("- `Map<K:V>`の説明\n").is_empty());
        assert_eq!(ids(&scan("1. 手順: 実行する\n")), vec!["title-colon-list"]);
    }

    #[test]
    fn test_title_colon_split() {
        let tc = title_colon("  - 項目名： 説明文 ").unwrap();
        assert_eq!(tc.title, "項目名");
        assert_eq!(tc.description, "説明文");
        assert_eq!(tc.item.indent, "  ");
        assert!(title_colon("- **用語**：説明").is_none());
        assert!(title_colon("本文：説明").is_none());
    }

    #[test]
    fn test_excessive_bold_flags_third_and_later() {
        let text = "## 節\n\n- **項目1**\n- **項目2**\n- **項目3**\n- **項目4**\n";
        let vs = scan(text);
        assert_eq!(ids(&vs), vec!["excessive-bold-list", "excessive-bold-list"]);
        assert_eq!(vs[0].line, 5);
        assert_eq!(vs[1].line, 6);
        assert_eq!(vs[0].matched_text, "**項目3**");
    }

    #[test]
    fn test_excessive_bold_resets_at_heading() {
        let text = "- **a**\n- **b**\n## 次\n- **c**\n- **d**\n";
        assert!(scan(text).is_empty());
    }

    #[test]
    fn test_list_dash_structure() {
        assert!(scan("- 営業時間 - 9:00 - 17:00\n").is_empty());
        let vs = scan("- 概要 - これは説明です\n");
        assert_eq!(ids(&vs), vec!["list-dash-structure"]);
        assert_eq!(vs[0].column, 6);
        // glossary entries are allow-listed
        assert!(scan("- **用語** - 第3章\n").is_empty());
    }

    #[test]
    fn test_list_dash_clock_must_touch_separator() {
        let vs = scan("- 営業時間 - 9:00-17:00\n");
        assert_eq!(ids(&vs), vec!["list-dash-structure"]);
        assert_eq!(vs[0].column, 8);
        assert!(scan("  - 受付 - 9:00 - 12:00\n").is_empty());
    }

    #[test]
    fn test_title_colon_after_bracketed_colon() {
        let vs = scan("- 設定（key:value）：キーと値の組です\n");
        assert_eq!(ids(&vs), vec!["title-colon-list"]);
        assert_eq!(vs[0].matched_text, "設定（key:value）：");

        let vs = scan("- 時刻（9:00）：説明\n");
        assert_eq!(ids(&vs), vec!["title-colon-list"]);
        assert_eq!(vs[0].matched_text, "時刻（9:00）：");

        let tc = title_colon("- 設定（key:value）：キーと値の組です").unwrap();
        assert_eq!(tc.title, "設定（key:value）");
        assert_eq!(tc.description, "キーと値の組です");
    }

    #[test]
    fn test_closed_bracket_before_colon_does_not_hide_it() {
        let vs = scan("- main()の役割：開始点(エントリ)\n");
        assert_eq!(ids(&vs), vec!["title-colon-list"]);
        assert_eq!(vs[0].matched_text, "main()の役割：");
    }

    #[test]
    fn test_glossary_items_do_not_use_up_bold_allowance() {
        let text = "## 用語集\n\n- **クラス** - 第1章\n- **変数** - 第2章\n- **配列** - 第3章\n- **例外**\n- **注釈**\n";
        assert!(scan(text).is_empty());
        let vs = scan(&format!("{text}- **総称型**\n"));
        assert_eq!(ids(&vs), vec!["excessive-bold-list"]);
        assert_eq!(vs[0].line, 8);
    }

    #[test]
    fn test_line_anchored_rules_match_crlf() {
        let lf = "以下の項目があります：\n\n- 項目：\n**見出し**\n";
        let crlf = lf.replace('\n', "\r\n");
        let expected = vec!["colon-continuation", "bold-as-heading", "list-colon-ending"];
        assert_eq!(ids(&scan(lf)), expected);
        let vs = scan(&crlf);
        assert_eq!(ids(&vs), expected);
        assert_eq!(vs[0].matched_text, "以下の項目があります：");
        assert_eq!(vs[1].matched_text, "**見出し**");
        assert_eq!(vs[1].line, 4);
    }

    #[test]
    fn test_colon_continuation_and_list_colon_ending() {
        let vs = scan("以下の項目があります：\n\n- 項目：\n");
        assert_eq!(ids(&vs), vec!["colon-continuation", "list-colon-ending"]);
        assert_eq!(vs[1].line, 3);
    }

    #[test]
    fn test_quoted_callout_is_excluded() {
        assert!(scan("> **注意** ファイルを閉じること\n").is_empty());
        assert_eq!(ids(&scan("**注意** ファイルを閉じること\n")), vec!["bold-info-prefix"]);
    }

    #[test]
    fn test_scan_is_reproducible() {
        let text = "**見出し**\n- **a**：b\n- 概要 - 説明\n";
        assert_eq!(scan(text), scan(text));
    }

    #[test]
    fn test_line_index_crlf() {
        let text = "a\r\n本文**リスト1-1**\r\n";
        let vs = scan(text);
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].line, 2);
        assert_eq!(vs[0].column, 3);
        assert_eq!(vs[0].line_text, "本文**リスト1-1**");
    }
}
