//! Rule registry: the ordered set of style rules, the auto-fix list, and
//! the manual-suggestion list.
//!
//! Key components:
//! - `Rule`: id, detection method (`RuleKind`), severity, description,
//!   suggestion, and whether the fixer has a deterministic rewrite for it.
//! - `FixRule`: a regex plus replacement template (`${1}` back-references)
//!   tied to the rule it repairs. Applied in declaration order.
//! - `ManualSuggestion`: patterns that are reported for review with an
//!   example rewrite, never applied.
//!
//! Rule order only affects report order.

use crate::error::{Error, Result};
use crate::models::Severity;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Line-by-line checks that carry state within one document.
pub enum ContextualCheck {
    /// `- title：description` lines that should become a nested list.
    TitleColonList,
    /// Third and later bold-labelled list items within one section.
    ExcessiveBoldList,
    /// `- item - description` lines.
    ListDashStructure,
}

#[derive(Debug, Clone)]
/// How a rule finds candidates.
pub enum RuleKind {
    /// Evaluated over the whole document; every non-overlapping match is a candidate.
    Pattern(Regex),
    Contextual(ContextualCheck),
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub kind: RuleKind,
    pub description: String,
    pub severity: Severity,
    pub suggestion: String,
    pub fixable: bool,
}

impl Rule {
    /// Build a pattern rule, reporting an invalid regex against the rule id.
    pub fn pattern(
        id: &str,
        pattern: &str,
        severity: Severity,
        description: &str,
        suggestion: &str,
    ) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            id: id.to_string(),
            source,
        })?;
        Ok(Self {
            id: id.to_string(),
            kind: RuleKind::Pattern(re),
            description: description.to_string(),
            severity,
            suggestion: suggestion.to_string(),
            fixable: false,
        })
    }

    pub fn contextual(
        id: &str,
        check: ContextualCheck,
        severity: Severity,
        description: &str,
        suggestion: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            kind: RuleKind::Contextual(check),
            description: description.to_string(),
            severity,
            suggestion: suggestion.to_string(),
            fixable: false,
        }
    }

    fn with_fix(mut self) -> Self {
        self.fixable = true;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            RuleKind::Pattern(_) => "pattern",
            RuleKind::Contextual(_) => "contextual",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
/// A user-defined pattern rule from `[[rules.custom]]`.
pub struct CustomRule {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    pub description: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
/// Rule selection loaded from the `[rules]` config section.
pub struct RulesCfg {
    #[serde(default)]
    pub disable: Vec<String>,
    #[serde(default)]
    pub custom: Vec<CustomRule>,
}

/// An ordered, enumerable rule collection.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// The built-in rules in report order.
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN.to_vec(),
        }
    }

    /// Built-in rules minus `disable`, followed by custom rules.
    pub fn from_config(cfg: &RulesCfg) -> Result<Self> {
        let disabled: HashSet<&str> = cfg.disable.iter().map(String::as_str).collect();
        let mut rules: Vec<Rule> = BUILTIN
            .iter()
            .filter(|r| !disabled.contains(r.id.as_str()))
            .cloned()
            .collect();
        for c in &cfg.custom {
            if rules.iter().any(|r| r.id == c.id) || BUILTIN.iter().any(|r| r.id == c.id) {
                return Err(Error::DuplicateRule(c.id.clone()));
            }
            rules.push(Rule::pattern(
                &c.id,
                &c.pattern,
                c.severity.unwrap_or(Severity::Warning),
                &c.description,
                c.suggestion.as_deref().unwrap_or(""),
            )?);
        }
        Ok(Self { rules })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn builtin_pattern(
    id: &str,
    pattern: &str,
    severity: Severity,
    description: &str,
    suggestion: &str,
) -> Rule {
    Rule::pattern(id, pattern, severity, description, suggestion)
        .unwrap_or_else(|e| panic!("built-in rule is invalid: {e}"))
}

static BUILTIN: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        builtin_pattern(
            "bold-colon-list",
            r"- \*\*[^*\n]+\*\*：",
            Severity::Error,
            "リスト項目での強調（**）とコロン（：）の組み合わせ使用",
            "強調表記を削除し、自然な文章に変更してください",
        )
        .with_fix(),
        builtin_pattern(
            "colon-continuation",
            r"(?mR)(以下.*：|次.*：|下記.*：)$",
            Severity::Error,
            "「以下〜：」「次〜：」などのコロンで終わるリスト導入",
            "「次のようになります。」「以下の通りです。」などの自然な表現に変更してください",
        )
        .with_fix(),
        builtin_pattern(
            "bold-as-heading",
            r"(?mR)^\*\*[^*\n]+\*\*$",
            Severity::Error,
            "強調表記（**）を見出しとして使用",
            "適切なMarkdown見出し記法（#、##、###）を使用してください",
        ),
        builtin_pattern(
            "incorrect-code-listing",
            r"\*\*リスト\d+-\d+\*\*",
            Severity::Error,
            "コードリスト番号での「リスト」形式使用",
            "「サンプルコードX-Y」形式に統一してください",
        )
        .with_fix(),
        builtin_pattern(
            "bold-info-prefix",
            r"\*\*(注意|重要|ポイント|警告)\*\*",
            Severity::Warning,
            "太字の情報プレフィックス（**注意**、**重要**など）",
            "より自然な表現を検討してください",
        ),
        builtin_pattern(
            "list-colon-ending",
            r"(?mR)^- [^：\n]*：$",
            Severity::Warning,
            "リスト項目の末尾コロン使用",
            "リスト項目の末尾にコロンは使用しないでください",
        ),
        // Not auto-fixable: nesting needs a human to pick the split. See `restructure`.
        Rule::contextual(
            "title-colon-list",
            ContextualCheck::TitleColonList,
            Severity::Error,
            "「項目タイトル：説明文」形式のリスト",
            "「- タイトル」と「    + 説明文」の階層化リストに変更してください",
        ),
        Rule::contextual(
            "excessive-bold-list",
            ContextualCheck::ExcessiveBoldList,
            Severity::Warning,
            "同一セクション内のリスト項目での強調の多用（3項目目以降）",
            "強調は各セクション2項目までにとどめ、通常のテキストにしてください",
        ),
        Rule::contextual(
            "list-dash-structure",
            ContextualCheck::ListDashStructure,
            Severity::Warning,
            "「- 項目 - 説明」形式のリスト",
            "説明文を入れ子のリストか自然な文章に変更してください",
        ),
    ]
});

#[derive(Debug)]
/// A deterministic rewrite for one rule.
pub struct FixRule {
    pub id: &'static str,
    /// The rule this rewrite repairs.
    pub rule_id: &'static str,
    pub pattern: Regex,
    /// Replacement template, expanded with `Captures::expand`.
    pub replacement: &'static str,
    pub description: &'static str,
}

fn fix(
    id: &'static str,
    rule_id: &'static str,
    pattern: &str,
    replacement: &'static str,
    description: &'static str,
) -> FixRule {
    FixRule {
        id,
        rule_id,
        pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("fix rule {id} is invalid: {e}")),
        replacement,
        description,
    }
}

static AUTO_FIXES: LazyLock<Vec<FixRule>> = LazyLock::new(|| {
    vec![
        fix(
            "colon-continuation-basic",
            "colon-continuation",
            r"(?mR)以下のような(.+)があります：$",
            "以下のような${1}があります。",
            "基本的なコロン導入文の修正",
        ),
        fix(
            "colon-continuation-list",
            "colon-continuation",
            r"(?mR)以下(.*)：$",
            "以下${1}は次の通りです。",
            "リスト導入でのコロン修正",
        ),
        fix(
            "colon-continuation-next",
            "colon-continuation",
            r"(?mR)次のような(.+)です：$",
            "次のような${1}があります。",
            "「次のような〜：」パターンの修正",
        ),
        fix(
            "incorrect-code-listing",
            "incorrect-code-listing",
            r"\*\*リスト(\d+-\d+)\*\*",
            "**サンプルコード${1}**",
            "コードリスト番号の「リスト」→「サンプルコード」修正",
        ),
        fix(
            "list-colon-technical-terms",
            "bold-colon-list",
            r"(?mR)^([ \t]*)- \*\*([^*\n]+)\*\*：(.+)$",
            "${1}- ${2}：${3}",
            "リスト項目の技術用語強調とコロンの修正",
        ),
    ]
});

/// Auto-fix rules in application order.
pub fn auto_fixes() -> &'static [FixRule] {
    &AUTO_FIXES
}

#[derive(Debug)]
/// A pattern reported for manual review together with an example rewrite.
pub struct ManualSuggestion {
    /// Rule whose review item receives the example, when that rule also matched.
    pub rule_id: &'static str,
    pub pattern: Regex,
    pub suggestion: &'static str,
    pub example: &'static str,
}

static MANUAL_SUGGESTIONS: LazyLock<Vec<ManualSuggestion>> = LazyLock::new(|| {
    vec![
        ManualSuggestion {
            rule_id: "bold-colon-list",
            pattern: Regex::new(r"- \*\*[^*\n]+\*\*：").expect("manual suggestion regex"),
            suggestion: "リスト項目の強調表記とコロンを削除し、自然な文章に変更してください",
            example: "- **保守性の低下**：同じロジック... → - 保守性の低下により、同じロジック...",
        },
        ManualSuggestion {
            rule_id: "bold-as-heading",
            pattern: Regex::new(r"(?mR)^\*\*[^*\n]+\*\*$").expect("manual suggestion regex"),
            suggestion: "強調表記を見出し記法に変更してください",
            example: "**重要なポイント** → ### 重要なポイント",
        },
    ]
});

pub fn manual_suggestions() -> &'static [ManualSuggestion] {
    &MANUAL_SUGGESTIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_unique_and_ordered() {
        let rs = RuleSet::builtin();
        let ids: Vec<_> = rs.iter().map(|r| r.id.as_str()).collect();
        let uniq: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), uniq.len());
        assert_eq!(ids[0], "bold-colon-list");
        assert_eq!(rs.get("title-colon-list").unwrap().kind_name(), "contextual");
        assert!(!rs.get("title-colon-list").unwrap().fixable);
    }

    #[test]
    fn test_every_fix_targets_a_fixable_rule() {
        let rs = RuleSet::builtin();
        for fx in auto_fixes() {
            let rule = rs.get(fx.rule_id).expect("fix references a known rule");
            assert!(rule.fixable, "{} repairs non-fixable {}", fx.id, fx.rule_id);
        }
        for rule in rs.iter().filter(|r| r.fixable) {
            assert!(auto_fixes().iter().any(|f| f.rule_id == rule.id));
        }
    }

    #[test]
    fn test_from_config_disable_and_custom() {
        let cfg = RulesCfg {
            disable: vec!["bold-info-prefix".into()],
            custom: vec![CustomRule {
                id: "no-todo".into(),
                pattern: "TODO".into(),
                severity: None,
                description: "Leftover TODO".into(),
                suggestion: None,
            }],
        };
        let rs = RuleSet::from_config(&cfg).unwrap();
        assert!(!rs.contains("bold-info-prefix"));
        let custom = rs.get("no-todo").unwrap();
        assert_eq!(custom.severity, Severity::Warning);
        assert_eq!(rs.iter().last().unwrap().id, "no-todo");
    }

    #[test]
    fn test_from_config_rejects_bad_custom_rules() {
        let mut cfg = RulesCfg::default();
        cfg.custom.push(CustomRule {
            id: "broken".into(),
            pattern: "(".into(),
            severity: Some(Severity::Error),
            description: "x".into(),
            suggestion: None,
        });
        assert!(matches!(
            RuleSet::from_config(&cfg),
            Err(Error::InvalidPattern { .. })
        ));

        let mut cfg = RulesCfg::default();
        cfg.custom.push(CustomRule {
            id: "bold-as-heading".into(),
            pattern: "x".into(),
            severity: None,
            description: "x".into(),
            suggestion: None,
        });
        assert!(matches!(
            RuleSet::from_config(&cfg),
            Err(Error::DuplicateRule(_))
        ));
    }
}
