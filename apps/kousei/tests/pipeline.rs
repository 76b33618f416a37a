use chrono::Local;
use kousei::check::run_check;
use kousei::discover::collect_markdown;
use kousei::fix::run_fix;
use kousei::output::compose_report;
use kousei::rules::RuleSet;
use std::fs;
use tempfile::tempdir;

const CHAPTER: &str = "# 第1章\n\n本文**リスト1-1**を示します。\n\n```java\n**リスト9-9**\n```\n";

#[test]
fn check_fix_verify_round() {
    let dir = tempdir().unwrap();
    let ms = dir.path().join("manuscripts");
    fs::create_dir_all(ms.join("part1")).unwrap();
    let ch01 = ms.join("ch01.md");
    fs::write(&ch01, CHAPTER).unwrap();
    fs::write(ms.join("part1/ch02.md"), "# 第2章\n\n問題のない本文です。\n").unwrap();
    fs::write(ms.join("notes.txt"), "**リスト1-1**").unwrap();

    let rules = RuleSet::builtin();
    let files = collect_markdown(&ms).unwrap();
    assert_eq!(files.len(), 2);

    let run = run_check(&files, &rules);
    assert_eq!(run.files.len(), 2);
    assert_eq!(run.violations.len(), 1);
    assert_eq!(run.violations[0].rule_id, "incorrect-code-listing");
    assert_eq!(run.violations[0].line, 3);
    assert!(!run.all_clear());

    let report = serde_json::to_value(compose_report(&run, &Local::now())).unwrap();
    let total = report["summary"]["totalViolations"].as_u64().unwrap();
    assert_eq!(total as usize, report["violations"].as_array().unwrap().len());
    assert_eq!(
        total,
        report["summary"]["errors"].as_u64().unwrap() + report["summary"]["warnings"].as_u64().unwrap()
    );
    assert_eq!(report["fileStats"].as_object().unwrap().len(), 2);

    let fixed = run_fix(&files, &rules, "backup", &Local::now());
    assert!(fixed.failures.is_empty());
    assert_eq!(fixed.modified.len(), 1);
    assert_eq!(fixed.backups.len(), 1);

    let after = fs::read_to_string(&ch01).unwrap();
    assert!(after.contains("本文**サンプルコード1-1**を示します。"));
    assert!(after.contains("```java\n**リスト9-9**\n```"));

    let backups: Vec<_> = fs::read_dir(ms.join("backup"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), CHAPTER);

    let files = collect_markdown(&ms).unwrap();
    assert_eq!(files.len(), 2);
    let verification = run_check(&files, &rules);
    assert!(verification.all_clear());
    assert!(verification.violations.is_empty());

    let again = run_fix(&files, &rules, "backup", &Local::now());
    assert!(again.modified.is_empty());
    assert_eq!(fs::read_to_string(&ch01).unwrap(), after);
}

#[test]
fn single_file_target_and_missing_target() {
    let dir = tempdir().unwrap();
    let f = dir.path().join("only.md");
    fs::write(&f, "- 重要な注意：これは説明です\n").unwrap();
    let files = collect_markdown(&f).unwrap();
    let run = run_check(&files, &RuleSet::builtin());
    assert!(run.violations.iter().any(|v| v.rule_id == "title-colon-list"));

    assert!(collect_markdown(&dir.path().join("nope")).is_err());
}

#[test]
fn crlf_manuscript_checks_and_fixes_like_lf() {
    let dir = tempdir().unwrap();
    let lf = "**まとめ**\n\n以下のような特徴があります：\n\n- 設定（key:value）：キーと値の組です\n";
    let crlf = lf.replace('\n', "\r\n");
    fs::write(dir.path().join("lf.md"), lf).unwrap();
    fs::write(dir.path().join("crlf.md"), &crlf).unwrap();

    let rules = RuleSet::builtin();
    let files = collect_markdown(dir.path()).unwrap();
    let run = run_check(&files, &rules);
    let per_file = |name: &str| -> Vec<String> {
        run.violations
            .iter()
            .filter(|v| v.file.ends_with(name))
            .map(|v| format!("{}:{}", v.rule_id, v.line))
            .collect()
    };
    let expected = vec![
        "colon-continuation:3".to_string(),
        "bold-as-heading:1".to_string(),
        "title-colon-list:5".to_string(),
    ];
    assert_eq!(per_file("/lf.md"), expected);
    assert_eq!(per_file("/crlf.md"), expected);

    let fixed = run_fix(&files, &rules, "backup", &Local::now());
    assert_eq!(fixed.modified.len(), 2);
    let after = fs::read_to_string(dir.path().join("crlf.md")).unwrap();
    assert!(after.contains("以下のような特徴があります。\r\n"));
}
