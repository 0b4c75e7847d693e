use std::io::Cursor;
use wptlog::aggregate::StatusPolicy;
use wptlog::report::{write_detail, write_detail_file, Report};
use wptlog::scan::{parse_reader, ScanOutput};

fn scan(lines: &[&str]) -> ScanOutput {
    parse_reader(Cursor::new(lines.join("\n")), usize::MAX).unwrap()
}

const MIXED: &[&str] = &[
    r#"{"action":"test_start","test":"/dom/a.html"}"#,
    r#"{"action":"test_end","test":"/dom/a.html","status":"TIMEOUT"}"#,
    r#"{"action":"test_start","test":"/css/a.html"}"#,
    r#"{"action":"process_output","data":"VERIFICATION FAILED 1"}"#,
    r#"{"action":"test_end","test":"/css/a.html","status":"TIMEOUT"}"#,
    r#"{"action":"test_start","test":"/html/a.html"}"#,
    r#"{"action":"process_output","data":"VERIFICATION FAILED 2"}"#,
    r#"{"action":"test_end","test":"/html/a.html","status":"PASS"}"#,
    r#"{"action":"test_start","test":"/svg/a.html"}"#,
    r#"{"action":"test_end","test":"/svg/a.html","status":"TIMEOUT"}"#,
    r#"{"action":"test_start","test":"/svg/b.html"}"#,
    r#"{"action":"test_end","test":"/svg/b.html","status":"TIMEOUT"}"#,
    r#"{"action":"test_start","test":"/css/b/c.html"}"#,
    r#"{"action":"process_output","data":"line one"}"#,
    r#"{"action":"process_output","data":"VERIFICATION FAILED 3"}"#,
    r#"{"action":"test_end","test":"/css/b/c.html","status":"FAIL"}"#,
];

#[test]
fn directories_sorted_by_timeouts_with_stable_ties() {
    let report = Report::build(&scan(MIXED), StatusPolicy::Widen).unwrap();
    let order: Vec<&str> = report.results.iter().map(|r| r.directory.as_str()).collect();
    // svg has 2; dom and css tie at 1 and keep first-seen order
    assert_eq!(order, vec!["svg", "dom", "css", "html"]);
}

#[test]
fn flagged_groups_sorted_by_size() {
    let report = Report::build(&scan(MIXED), StatusPolicy::Widen).unwrap();
    assert_eq!(report.flagged_total, 3);
    let groups: Vec<(&str, usize)> = report.flagged.iter().map(|g| (g.directory.as_str(), g.tests.len())).collect();
    assert_eq!(groups, vec![("css", 2), ("html", 1)]);
    assert!(report.flagged_in("dom").is_none());
}

#[test]
fn text_rendering() {
    let report = Report::build(&scan(MIXED), StatusPolicy::Widen).unwrap();
    let mut buf = Vec::new();
    report.render_text(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let expected = "\nSorted Aggregated Test Results by Number of TIMEOUT:\n\
svg: PASS=0 TIMEOUT=2 FAIL=0 SKIP=0 ERROR=0 OK=0 CRASH=0\n\
dom: PASS=0 TIMEOUT=1 FAIL=0 SKIP=0 ERROR=0 OK=0 CRASH=0\n\
css: PASS=0 TIMEOUT=1 FAIL=1 SKIP=0 ERROR=0 OK=0 CRASH=0\n\
html: PASS=1 TIMEOUT=0 FAIL=0 SKIP=0 ERROR=0 OK=0 CRASH=0\n\
\nFlagged Tests: 3\n\
css: 2\n\
html: 1\n";
    assert_eq!(text, expected);
}

#[test]
fn text_rendering_mentions_skipped_lines() {
    let report = Report::build(&scan(&["garbage", "{}"]), StatusPolicy::Widen).unwrap();
    let mut buf = Vec::new();
    report.render_text(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("Flagged Tests: 0"));
    assert!(text.ends_with("Malformed lines skipped: 1\n"));
}

#[test]
fn json_rendering() {
    let report = Report::build(&scan(MIXED), StatusPolicy::Widen).unwrap();
    let mut buf = Vec::new();
    report.render_json(&mut buf).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(v["results"][0]["directory"], "svg");
    assert_eq!(v["results"][0]["counts"]["TIMEOUT"], 2);
    assert_eq!(v["results"][2]["counts"]["FAIL"], 1);
    assert_eq!(v["flagged_total"], 3);
    assert_eq!(v["flagged"][0]["tests"][1], "/css/b/c.html");
    assert_eq!(v["parse_errors"]["total"], 0);
}

#[test]
fn detail_blocks() {
    let out = scan(MIXED);
    let report = Report::build(&out, StatusPolicy::Widen).unwrap();
    let group = report.flagged_in("css").unwrap();
    let mut buf = Vec::new();
    let n = write_detail(&mut buf, &group.tests, &out.results).unwrap();
    assert_eq!(n, 2);
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "/css/a.html\nVERIFICATION FAILED 1\n\n/css/b/c.html\nline one\nVERIFICATION FAILED 3\n\n"
    );
}

#[test]
fn detail_uses_last_result_for_repeated_names() {
    let out = scan(&[
        r#"{"action":"test_start","test":"/css/a.html"}"#,
        r#"{"action":"process_output","data":"first VERIFICATION FAILED"}"#,
        r#"{"action":"test_end","test":"/css/a.html","status":"FAIL"}"#,
        r#"{"action":"test_start","test":"/css/a.html"}"#,
        r#"{"action":"process_output","data":"second"}"#,
        r#"{"action":"test_end","test":"/css/a.html","status":"PASS"}"#,
    ]);
    let tests: Vec<String> = out.flagged.iter().cloned().collect();
    let mut buf = Vec::new();
    write_detail(&mut buf, &tests, &out.results).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "/css/a.html\nsecond\n\n");
}

#[test]
fn detail_skips_flagged_tests_that_never_ended() {
    let out = scan(&[
        r#"{"action":"test_start","test":"/css/a.html"}"#,
        r#"{"action":"process_output","data":"VERIFICATION FAILED"}"#,
    ]);
    assert!(out.flagged.contains("/css/a.html"));
    let tests: Vec<String> = out.flagged.iter().cloned().collect();
    let mut buf = Vec::new();
    assert_eq!(write_detail(&mut buf, &tests, &out.results).unwrap(), 0);
    assert!(buf.is_empty());
}

#[test]
fn detail_file_only_written_for_flagged_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = scan(MIXED);
    let report = Report::build(&out, StatusPolicy::Widen).unwrap();

    let svg = dir.path().join("svg.txt");
    assert_eq!(write_detail_file(&svg, "svg", &report, &out.results).unwrap(), None);
    assert!(!svg.exists());

    let html = dir.path().join("html.txt");
    assert_eq!(write_detail_file(&html, "html", &report, &out.results).unwrap(), Some(1));
    assert_eq!(std::fs::read_to_string(&html).unwrap(), "/html/a.html\nVERIFICATION FAILED 2\n\n");
}
