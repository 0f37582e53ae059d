use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_lintkit")))
}

fn fixture_root() -> String {
    format!("{}/tests/fixtures/wiki", env!("CARGO_MANIFEST_DIR"))
}

fn run_json(args: &[&str]) -> Value {
    let assert = cmd().args(args).assert().success();
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

/// (ruleId, file name relative to the fixture root, startLine)
fn results(log: &Value) -> Vec<(String, String, u64)> {
    let root = format!("{}/", fixture_root());
    log["runs"][0]["results"]
        .as_array()
        .map(|rs| {
            rs.iter()
                .map(|r| {
                    let loc = &r["locations"][0]["physicalLocation"];
                    let uri = loc["artifactLocation"]["uri"].as_str().unwrap();
                    (
                        r["ruleId"].as_str().unwrap().to_string(),
                        uri.trim_start_matches(&root).to_string(),
                        loc["region"]["startLine"].as_u64().unwrap_or(0),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn fixture_corpus_findings_in_order() {
    let root = fixture_root();
    let log = run_json(&["wikifmt", root.as_str()]);

    assert_eq!(log["version"], "2.1.0");
    assert_eq!(log["runs"][0]["tool"]["driver"]["name"], "lintkit-wikifmt");

    let got = results(&log);
    let expected: Vec<(String, String, u64)> = [
        ("wiki-date-format", "bad-date.md", 3),
        ("wiki-frontmatter-yaml", "bad-yaml.md", 3),
        ("wiki-frontmatter-required", "missing-tags.md", 1),
        ("wiki-tag-case-variant", "api-guide.md", 5),
        ("wiki-tag-case-variant", "good.md", 5),
        ("wiki-tag-orphan", "orphan.md", 6),
        ("wiki-link-broken", "broken-links.md", 7),
        ("wiki-link-broken", "broken-links.md", 9),
    ]
    .iter()
    .map(|(r, f, l)| (r.to_string(), f.to_string(), *l))
    .collect();
    assert_eq!(got, expected);
}

#[test]
fn levels_follow_rule_kind() {
    let log = run_json(&["wikifmt", fixture_root().as_str()]);
    for r in log["runs"][0]["results"].as_array().unwrap() {
        let rule = r["ruleId"].as_str().unwrap();
        let want = if rule.starts_with("wiki-tag-") { "warning" } else { "error" };
        assert_eq!(r["level"], want, "{rule}");
    }
}

#[test]
fn output_is_byte_identical_across_runs() {
    let root = fixture_root();
    let stdout = || {
        cmd()
            .args(["wikifmt", root.as_str()])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    let first = stdout();
    let second = stdout();
    assert_eq!(first, second);
    assert!(String::from_utf8(first).unwrap().starts_with("{\n  \"version\""));
}

#[test]
fn exclude_flag_drops_files() {
    let root = fixture_root();
    let log = run_json(&["wikifmt", "--exclude", "broken-links.md", root.as_str()]);
    assert!(results(&log).iter().all(|(rule, ..)| rule != "wiki-link-broken"));
}

#[test]
fn config_file_excludes() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("lintkit.toml");
    fs::write(&config, "[wikifmt]\nexclude = [\"bad-*.md\"]\n").unwrap();

    let root = fixture_root();
    let log = run_json(&["--config", config.to_str().unwrap(), "wikifmt", root.as_str()]);
    let files: Vec<_> = results(&log).into_iter().map(|(_, f, _)| f).collect();
    assert!(!files.iter().any(|f| f.starts_with("bad-")));
    assert!(files.iter().any(|f| f == "missing-tags.md"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["--config", dir.path().join("nope.toml").to_str().unwrap()])
        .args(["wikifmt".to_string(), fixture_root()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read config"));
}

#[test]
fn output_flag_writes_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.sarif");

    cmd()
        .args(["wikifmt", "-o", out.to_str().unwrap(), fixture_root().as_str()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let log: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(results(&log).len(), 8);
}

#[test]
fn missing_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["wikifmt", dir.path().join("absent").to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cannot walk"));
}

#[test]
fn roots_are_required() {
    cmd().arg("wikifmt").assert().failure();
}

#[test]
fn clean_corpus_has_no_results() {
    let dir = TempDir::new().unwrap();
    for name in ["one", "two"] {
        fs::write(
            dir.path().join(format!("{name}.md")),
            "---\ntitle: Page\ndate: 2024-01-01\ntags:\n  - common\n---\n[[one]] [[two]]\n",
        )
        .unwrap();
    }

    let log = run_json(&["wikifmt", dir.path().to_str().unwrap()]);
    assert!(log["runs"][0].get("results").is_none());
}
