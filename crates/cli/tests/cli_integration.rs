//! CLI integration tests for the `dfn` binary.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, and stderr content, with fixtures written to temp dirs.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GOOD_DFN: &str = "\
begin options
name print_input
type keyword
optional true

begin period transient
name stress_period_data
type recarray cellid value

name value
type double precision
in_record true

name cellid
type string
in_record true
";

const BAD_DFN: &str = "\
begin period
name stress_period_data
type recarray nosuch
";

fn dfn() -> Command {
    cargo_bin_cmd!("dfn")
}

fn write_fixture(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    dfn()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Definition file (DFN) toolchain"));
}

#[test]
fn version_exits_0() {
    dfn()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dfn"));
}

#[test]
fn convert_help_exits_0() {
    dfn()
        .args(["convert", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Directory containing .dfn files"));
}

// ──────────────────────────────────────────────
// 2. Convert subcommand
// ──────────────────────────────────────────────

#[test]
fn convert_writes_one_toml_per_input() {
    let tmp = TempDir::new().unwrap();
    let indir = tmp.path().join("dfn");
    let outdir = tmp.path().join("toml");
    fs::create_dir(&indir).unwrap();
    write_fixture(&indir, "chd.dfn", GOOD_DFN);
    write_fixture(&indir, "wel.dfn", GOOD_DFN);

    dfn()
        .args(["convert"])
        .arg(&indir)
        .arg(&outdir)
        .assert()
        .success()
        .stdout(predicate::str::contains("converted 2 of 2 files"));

    let chd = fs::read_to_string(outdir.join("chd.toml")).unwrap();
    assert!(chd.contains("name = \"chd\""));
    assert!(chd.contains("[options.print_input]"));
    assert!(chd.contains("[period.stress_period_data.cellid]"));
    assert!(outdir.join("wel.toml").exists());
}

#[test]
fn convert_output_round_trips() {
    let tmp = TempDir::new().unwrap();
    let indir = tmp.path().join("dfn");
    let outdir = tmp.path().join("toml");
    fs::create_dir(&indir).unwrap();
    write_fixture(&indir, "chd.dfn", GOOD_DFN);

    dfn()
        .args(["convert"])
        .arg(&indir)
        .arg(&outdir)
        .assert()
        .success();

    let text = fs::read_to_string(outdir.join("chd.toml")).unwrap();
    let def = dfn_interchange::from_str(&text, Some("chd")).unwrap();
    assert_eq!(def.blocks.len(), 2);
    let spd = &def.blocks[1].vars[0];
    let names: Vec<&str> = spd.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["cellid", "value"]);
}

#[test]
fn convert_partial_failure_writes_good_files_and_exits_1() {
    let tmp = TempDir::new().unwrap();
    let indir = tmp.path().join("dfn");
    let outdir = tmp.path().join("toml");
    fs::create_dir(&indir).unwrap();
    write_fixture(&indir, "a.dfn", GOOD_DFN);
    write_fixture(&indir, "b.dfn", BAD_DFN);
    write_fixture(&indir, "c.dfn", GOOD_DFN);

    dfn()
        .args(["convert"])
        .arg(&indir)
        .arg(&outdir)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("converted 2 of 3 files"))
        .stderr(predicate::str::contains("b.dfn"))
        .stderr(predicate::str::contains("unresolved child"));

    assert!(outdir.join("a.toml").exists());
    assert!(!outdir.join("b.toml").exists());
    assert!(outdir.join("c.toml").exists());
}

#[test]
fn convert_failure_reports_json_records() {
    let tmp = TempDir::new().unwrap();
    let indir = tmp.path().join("dfn");
    let outdir = tmp.path().join("toml");
    fs::create_dir(&indir).unwrap();
    write_fixture(&indir, "b.dfn", BAD_DFN);

    dfn()
        .args(["--output", "json", "convert"])
        .arg(&indir)
        .arg(&outdir)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("\"failed\":1"))
        .stderr(predicate::str::contains("\"kind\":\"unresolved_child\""));
}

#[test]
fn convert_nonexistent_indir_exits_1() {
    let tmp = TempDir::new().unwrap();
    dfn()
        .args(["convert", "nonexistent_dir_xyz"])
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read input directory"));
}

#[test]
fn convert_ignores_non_dfn_files() {
    let tmp = TempDir::new().unwrap();
    let indir = tmp.path().join("dfn");
    let outdir = tmp.path().join("toml");
    fs::create_dir(&indir).unwrap();
    write_fixture(&indir, "chd.dfn", GOOD_DFN);
    write_fixture(&indir, "readme.txt", "not a definition");

    dfn()
        .args(["convert"])
        .arg(&indir)
        .arg(&outdir)
        .assert()
        .success()
        .stdout(predicate::str::contains("converted 1 of 1 files"));
}

// ──────────────────────────────────────────────
// 3. Check subcommand
// ──────────────────────────────────────────────

#[test]
fn check_valid_file_exits_0() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path(), "chd.dfn", GOOD_DFN);

    dfn()
        .arg("check")
        .arg(tmp.path().join("chd.dfn"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: chd (2 blocks)"));
}

#[test]
fn check_invalid_file_exits_1_and_names_the_error() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path(), "bad.dfn", "begin options\nname x\n");

    dfn()
        .arg("check")
        .arg(tmp.path().join("bad.dfn"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing type"));
}

#[test]
fn check_nonexistent_file_exits_1() {
    dfn()
        .args(["check", "nonexistent_file_xyz.dfn"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn check_json_output_reports_kind() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path(), "bad.dfn", "just-one-word\n");

    dfn()
        .args(["--output", "json", "check"])
        .arg(tmp.path().join("bad.dfn"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"kind\":\"malformed_line\""));
}

#[test]
fn quiet_still_reports_errors() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path(), "bad.dfn", "begin options\nname x\n");

    dfn()
        .args(["--quiet", "check"])
        .arg(tmp.path().join("bad.dfn"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing type"));
}

#[test]
fn quiet_suppresses_success_output() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path(), "chd.dfn", GOOD_DFN);

    dfn()
        .args(["--quiet", "check"])
        .arg(tmp.path().join("chd.dfn"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
