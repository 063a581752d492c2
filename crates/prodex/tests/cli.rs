use assert_cmd::Command;
use std::fs;
use std::path::Path;

fn prodex(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("prodex").unwrap();
    cmd.env("PRODEX_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

const CATALOG_CSV: &str = "\
code,class,category,name,spec
ZZ01,x,Misc,Discontinued valve,
V100,x,Valves,Check valve,10mm
V200,x,Valves,Ball valve,
待900,x,Valves,Pending valve,
";

#[test]
fn test_search_seed_catalog() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout(prodex(home.path()).args(["search", "0163"]));
    assert!(out.contains("0163NA"));
    assert!(out.contains("0163ND"));
    assert!(!out.contains("0185NA"));
    // A single page shows no pager
    assert!(!out.contains("Page "));
}

#[test]
fn test_blank_and_missing_terms() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout(prodex(home.path()).args(["search", "  "]));
    assert_eq!(out.trim(), "enter a search term");

    let out = stdout(prodex(home.path()).args(["search", "no-such-product"]));
    assert_eq!(out.trim(), "no results");
}

#[test]
fn test_search_json() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout(prodex(home.path()).args(["search", "PEROUSE", "--format", "json"]));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["total"], 4);
    assert_eq!(json["page"], 1);
    assert_eq!(json["page_count"], 1);
    assert_eq!(json["records"][0]["code"], "0137NE");
    assert_eq!(json["records"][0]["categoryName"], "Syringes");
}

#[test]
fn test_import_from_stdin_then_search() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout(
        prodex(home.path())
            .arg("import")
            .write_stdin(CATALOG_CSV),
    );
    assert!(out.contains("imported 2 records"));
    assert!(out.contains("skipped 0 short and 2 excluded rows"));
    assert!(home.path().join("store/product_data.json").exists());

    let out = stdout(prodex(home.path()).args(["search", "valve"]));
    assert!(out.contains("V100"));
    assert!(out.contains("V200"));
    assert!(!out.contains("ZZ01"));

    let out = stdout(prodex(home.path()).args(["search", "perouse"]));
    assert_eq!(out.trim(), "no results");
}

#[test]
fn test_import_file_and_reset() {
    let home = tempfile::tempdir().unwrap();
    let csv = home.path().join("catalog.csv");
    fs::write(&csv, CATALOG_CSV).unwrap();
    prodex(home.path()).arg("import").arg(&csv).assert().success();

    let out = stdout(prodex(home.path()).arg("reset"));
    assert!(out.contains("catalog reset to 4 default records"));
    let out = stdout(prodex(home.path()).args(["search", "0185"]));
    assert!(out.contains("0185NA"));
}

#[test]
fn test_rejected_import_keeps_catalog() {
    let home = tempfile::tempdir().unwrap();
    let output = prodex(home.path())
        .arg("import")
        .write_stdin("code,a,b,c,d\nZZ1,x,c,n,s\n")
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).unwrap();
    assert!(stderr.contains("Import failed, catalog unchanged"));
    assert!(stderr.contains("No valid rows to import (0 too short, 1 excluded)"));

    prodex(home.path())
        .arg("import")
        .write_stdin("")
        .assert()
        .failure();

    let out = stdout(prodex(home.path()).args(["search", "0137"]));
    assert!(out.contains("0137NE"));
}

#[test]
fn test_paged_search() {
    let home = tempfile::tempdir().unwrap();
    let mut csv = String::from("code,class,category,name,spec\n");
    for i in 1..=25 {
        csv.push_str(&format!("T{i:02},x,Tubes,Tube {i},\n"));
    }
    prodex(home.path()).arg("import").write_stdin(csv).assert().success();

    let out = stdout(prodex(home.path()).args(["search", "tube"]));
    assert!(out.contains("Page 1 / 2 (25 results)"));
    assert!(out.contains("T20"));
    assert!(!out.contains("T21"));

    let out = stdout(prodex(home.path()).args(["search", "tube", "--page", "2"]));
    assert!(out.contains("Page 2 / 2 (25 results)"));
    assert!(out.contains("T25"));

    prodex(home.path())
        .args(["search", "tube", "--page", "3"])
        .assert()
        .failure();
}

#[test]
fn test_info_json() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout(prodex(home.path()).args(["info", "--format", "json"]));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["records"], 4);
    assert!(json["terms"].as_u64().unwrap() > 0);
    assert_eq!(
        json["terms"].as_u64(),
        Some(json["words"].as_u64().unwrap() + json["prefixes"].as_u64().unwrap())
    );
}
