use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn grn_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("grn"));
    cmd.env_remove("GRN_LOG");
    cmd
}

fn init(config_path: &Path) {
    grn_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
}

fn run(config_path: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    grn_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(args)
        .assert()
}

#[test]
fn test_help() {
    grn_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("goods received notes"));
}

#[test]
fn test_version() {
    grn_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("grn"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");

    grn_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized grn config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("master.toml").exists());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");

    init(&config_path);

    run(&config_path, &["init"])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    run(&config_path, &["status"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(&config_path, &["status"])
        .success()
        .stdout(predicate::str::contains("GRN Status"))
        .stdout(predicate::str::contains("Master rows:      4"))
        .stdout(predicate::str::contains("Next GRN:         GRN-"));
}

#[test]
fn test_master_without_filters_shows_all_rows() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(&config_path, &["master"])
        .success()
        .stdout(predicate::str::contains("NAME"))
        .stdout(predicate::str::contains("Paracetamol 500mg"))
        .stdout(predicate::str::contains("Cetirizine 10mg"))
        .stdout(predicate::str::contains("Showing 4 of 4 rows"));
}

#[test]
fn test_master_like_filter() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(&config_path, &["master", "--where", "name:LIKE:PARA"])
        .success()
        .stdout(predicate::str::contains("Paracetamol 500mg"))
        .stdout(predicate::str::contains("Ibuprofen").not())
        .stdout(predicate::str::contains("Showing 1 of 4 rows"));
}

#[test]
fn test_master_combined_filters() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(
        &config_path,
        &[
            "master",
            "-w",
            "category:IN:Analgesic,Antibiotic",
            "-w",
            "stock:LESS_THAN:50",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Ibuprofen 400mg"))
    .stdout(predicate::str::contains("Amoxicillin 250mg"))
    .stdout(predicate::str::contains("Paracetamol").not())
    .stdout(predicate::str::contains("Showing 2 of 4 rows"));
}

#[test]
fn test_master_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(
        &config_path,
        &["master", "--where", "status:NOT_IN:ACTIVE", "--json"],
    )
    .success()
    .stdout(predicate::str::contains("\"Amoxicillin 250mg\""))
    .stdout(predicate::str::contains("\"Cetirizine 10mg\""))
    .stdout(predicate::str::contains("Ibuprofen").not());
}

#[test]
fn test_master_rejects_unknown_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(&config_path, &["master", "--where", "name:ABOUT:x"])
        .failure()
        .stderr(predicate::str::contains("Unknown filter prefix 'ABOUT'"));

    run(&config_path, &["master", "--where", "name"])
        .failure()
        .stderr(predicate::str::contains("Invalid filter"));
}

#[test]
fn test_filter_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let rows_path = temp_dir.path().join("rows.json");
    fs::write(
        &rows_path,
        r#"[
  {"name": "John", "ward": "A", "age": 41},
  {"name": "Jane", "ward": "B", "age": 29},
  {"name": "Joan", "ward": null, "age": "n/a"}
]"#,
    )
    .unwrap();

    grn_cmd()
        .args([
            "filter",
            "--input",
            rows_path.to_str().unwrap(),
            "--where",
            "name:LIKE:jo",
            "--where",
            "age:GREATER_THAN:30",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("John"))
        .stdout(predicate::str::contains("Joan"))
        .stdout(predicate::str::contains("Jane").not())
        .stdout(predicate::str::contains("Showing 2 of 3 rows"));

    grn_cmd()
        .args([
            "filter",
            "--input",
            rows_path.to_str().unwrap(),
            "--where",
            "ward:NOT_LIKE:b",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("John"))
        .stdout(predicate::str::contains("Showing 1 of 3 rows"));
}

#[test]
fn test_grn_line_item_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(
        &config_path,
        &["new", "--supplier", "Medline", "--date", "2026-03-01"],
    )
    .success()
    .stdout(predicate::str::contains("Created GRN-"));

    run(
        &config_path,
        &[
            "add-item",
            "1",
            "--product",
            "Paracetamol 500mg",
            "--set",
            "quantity=10",
            "--set",
            "rate=5",
            "--set",
            "mrp=6",
            "--set",
            "taxPercentage=10",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Added line 1"))
    .stdout(predicate::str::contains("55.00"));

    run(&config_path, &["set", "1", "1", "quantity", "20"])
        .success()
        .stdout(predicate::str::contains("110.00"))
        .stdout(predicate::str::contains("Net payable:    $110.00"));

    run(&config_path, &["charge", "1", "overAllDiscountPercentage", "10"])
        .success()
        .stdout(predicate::str::contains("Net amount:     $99.00"))
        .stdout(predicate::str::contains("Net payable:    $99.00"));

    run(&config_path, &["charge", "1", "credit_note_amount", "9"])
        .success()
        .stdout(predicate::str::contains("Net payable:    $90.00"));

    run(&config_path, &["set", "1", "1", "batch", "B-12"])
        .success()
        .stdout(predicate::str::contains("Net payable:    $90.00"));

    run(&config_path, &["set", "1", "1", "mrp", "7"])
        .success()
        .stdout(predicate::str::contains("Net payable:    $90.00"));

    run(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("Medline"))
        .stdout(predicate::str::contains("$90.00"));

    let state = fs::read_to_string(config_path.join("state.toml")).unwrap();
    assert!(state.contains("Paracetamol 500mg"));
}

#[test]
fn test_set_rejects_derived_field() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(&config_path, &["new", "--supplier", "Medline"]).success();
    run(&config_path, &["add-item", "1", "--product", "Ibuprofen"]).success();

    run(&config_path, &["set", "1", "1", "amount", "500"])
        .failure()
        .stderr(predicate::str::contains("is derived"));

    run(&config_path, &["charge", "1", "netPayable", "10"])
        .failure()
        .stderr(predicate::str::contains("is derived"));
}

#[test]
fn test_zero_pack_and_bad_input_do_not_fail() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(&config_path, &["new", "--supplier", "Medline"]).success();
    run(
        &config_path,
        &["add-item", "1", "--set", "mrp=6", "--set", "pack=0"],
    )
    .success()
    .stdout(predicate::str::contains("Infinity"));

    run(&config_path, &["set", "1", "1", "rate", "abc"])
        .success()
        .stdout(predicate::str::contains("NaN"));

    run(&config_path, &["show", "1"]).success();
}

#[test]
fn test_remove_last_item_keeps_totals() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(&config_path, &["new", "--supplier", "Medline"]).success();
    run(
        &config_path,
        &["add-item", "1", "-p", "Cetirizine", "-s", "quantity=4", "-s", "rate=25"],
    )
    .success();

    run(&config_path, &["remove-item", "1", "1"])
        .success()
        .stdout(predicate::str::contains("Removed 'Cetirizine'"))
        .stdout(predicate::str::contains("No items."))
        .stdout(predicate::str::contains("Net payable:    $100.00"));

    run(&config_path, &["remove-item", "1", "1"])
        .failure()
        .stderr(predicate::str::contains("Invalid line 1"));
}

#[test]
fn test_unknown_grn() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("grn-config");
    init(&config_path);

    run(&config_path, &["show", "GRN-1999-0001"])
        .failure()
        .stderr(predicate::str::contains("GRN 'GRN-1999-0001' not found"));

    run(&config_path, &["show", "3"])
        .failure()
        .stderr(predicate::str::contains("Invalid GRN index"));
}
