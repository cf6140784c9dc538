use hdump_root::fixture::{FixtureHistogram, RootFileBuilder};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_hdump"))
}

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("hdump_cli_{}_{}_{}", std::process::id(), nanos, name));
    std::fs::create_dir_all(&p).unwrap();
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn fixture(dir: &std::path::Path) -> PathBuf {
    let input = dir.join("hists.root");
    RootFileBuilder::new()
        .compressed(true)
        .histogram(&FixtureHistogram::uniform("h", 0.0, 2.0, &[5.0, 3.0]).with_sumw2(&[4.0, 2.25]))
        .object("events", "TTree", 1, vec![0u8; 16])
        .histogram(&FixtureHistogram::uniform("g", 10.0, 13.0, &[1.0, 2.0, 3.0]))
        .write_to(&input)
        .unwrap();
    input
}

#[test]
fn basic_writes_three_columns() {
    let dir = tmp_dir("basic");
    let input = fixture(&dir);
    let out_dir = dir.join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let out = run(&["basic", input.to_str().unwrap(), out_dir.to_str().unwrap()]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    assert_eq!(std::fs::read_to_string(out_dir.join("h.txt")).unwrap(), "0 5 1\n1 3 1\n");
    assert_eq!(std::fs::read_to_string(out_dir.join("g.txt")).unwrap(), "10 1 1\n11 2 1\n12 3 1\n");
    assert!(!out_dir.join("events.txt").exists());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Wrote 2 histogram(s)"), "stderr={}", stderr);
    assert!(stderr.contains("1 skipped"), "stderr={}", stderr);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn errors_writes_four_columns_and_summary() {
    let dir = tmp_dir("errors");
    let input = fixture(&dir);
    let out_dir = dir.join("out");
    std::fs::create_dir(&out_dir).unwrap();
    let summary = dir.join("summary.json");

    let out = run(&[
        "errors",
        input.to_str().unwrap(),
        out_dir.to_str().unwrap(),
        "--summary",
        summary.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    assert_eq!(std::fs::read_to_string(out_dir.join("h.txt")).unwrap(), "0 5 1 2\n1 3 1 1.5\n");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(json["mode"], "with_errors");
    assert_eq!(json["written"].as_array().unwrap().len(), 2);
    assert_eq!(json["skipped"][0]["name"], "events");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn precision_flag() {
    let dir = tmp_dir("precision");
    let input = fixture(&dir);
    let out_dir = dir.join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let out = run(&["basic", input.to_str().unwrap(), out_dir.to_str().unwrap(), "--precision", "2"]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        std::fs::read_to_string(out_dir.join("h.txt")).unwrap(),
        "0.00 5.00 1.00\n1.00 3.00 1.00\n"
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_fails_naming_the_path() {
    let dir = tmp_dir("missing");
    let missing = dir.join("missing.root");

    let out = run(&["basic", missing.to_str().unwrap(), dir.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("missing.root"), "stderr={}", stderr);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_output_dir_is_not_fatal() {
    let dir = tmp_dir("no_out");
    let input = fixture(&dir);
    let out_dir = dir.join("absent");

    let out = run(&["basic", input.to_str().unwrap(), out_dir.to_str().unwrap()]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert!(!out_dir.exists());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Wrote 0 histogram(s)"), "stderr={}", stderr);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn list_prints_keys() {
    let dir = tmp_dir("list");
    let input = fixture(&dir);

    let out = run(&["list", input.to_str().unwrap()]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["h TH1D 1", "events TTree 1", "g TH1D 1"]);

    let _ = std::fs::remove_dir_all(&dir);
}
