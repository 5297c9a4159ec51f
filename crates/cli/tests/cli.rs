// Integration tests for the `fgrid` binary.
// Run with: cargo test -p facetgrid-cli --test cli -- --nocapture
//
// Every test points --schema at the fixture (or at an empty config dir) so a
// user's own ~/.config/facetgrid/schema.toml never leaks in.

use std::process::{Command, Output};

fn fgrid() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fgrid"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("FACETGRID_SCHEMA");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// `fgrid <command> -d products.csv --schema schema.toml <extra...>`
fn run(command: &str, extra: &[&str]) -> Output {
    fgrid()
        .arg(command)
        .args([
            "--data",
            "tests/fixtures/products.csv",
            "--schema",
            "tests/fixtures/schema.toml",
        ])
        .args(extra)
        .output()
        .expect("run fgrid")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        stderr(output)
    );
}

/// First CSV column of every data row
fn first_column(csv: &str) -> Vec<String> {
    csv.lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap_or_default().to_string())
        .collect()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_str(stdout(output).trim())
        .unwrap_or_else(|e| panic!("stdout must be JSON: {e}\n{}", stdout(output)))
}

// ===========================================================================
// records
// ===========================================================================

#[test]
fn records_filtered_in_file_order() {
    let output = run("records", &["--select", "Chipset Vendor=Nordic"]);
    assert_success(&output);

    let out = stdout(&output);
    assert_eq!(
        out.lines().next(),
        Some("Model No.,SoCset,Chipset Vendor,Certification,GPIO,RAM (KB)")
    );
    assert_eq!(first_column(&out), vec!["MDBT42Q", "MDBT50Q", "BT840"]);
}

#[test]
fn records_or_within_field_and_across_fields() {
    let output = run(
        "records",
        &[
            "-s", "Certification=KC",
            "-s", "Certification=TELEC",
            "-s", "GPIO=25",
        ],
    );
    assert_success(&output);
    assert_eq!(first_column(&stdout(&output)), vec!["BGM13P"]);
}

#[test]
fn records_unfiltered_prints_notice_only() {
    let output = run("records", &[]);
    assert_success(&output);
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("No filters selected"));
}

#[test]
fn records_all_as_json() {
    let output = run("records", &["--all", "--format", "json"]);
    assert_success(&output);

    let rows = json(&output);
    let rows = rows.as_array().expect("array of records");
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["Model No."], "MDBT42Q");
    // Empty cells come back as null
    assert!(rows[5]["Chipset Vendor"].is_null());
}

#[test]
fn records_tsv() {
    let output = run("records", &["-s", "Chipset Vendor=TI", "-f", "tsv"]);
    assert_success(&output);
    assert_eq!(
        stdout(&output).lines().nth(1),
        Some("CC2640R2F-Q1\tCC2640R2F\tTI\tFCC\t31\t20")
    );
}

// ===========================================================================
// options / facets
// ===========================================================================

#[test]
fn options_follow_other_selections() {
    let output = run("options", &["Certification", "-s", "Chipset Vendor=Nordic"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "CE\nFCC\nTELEC\n");
}

#[test]
fn options_ignore_own_selection() {
    let output = run("options", &["Chipset Vendor", "-s", "Chipset Vendor=TI"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "Nordic\nSilicon Labs\nTI\n");
}

#[test]
fn options_numeric_field_sorts_numerically() {
    let output = run("options", &["GPIO"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "4\n25\n31\n32\n48\n");

    let output = run("options", &["GPIO", "--json"]);
    assert_success(&output);
    let options = json(&output);
    assert_eq!(options[0]["value"], "4");
    assert_eq!(options[0]["number"], 4.0);
}

#[test]
fn facets_json_shape() {
    let output = run("facets", &["--json", "-s", "Chipset Vendor=Nordic"]);
    assert_success(&output);

    let snapshot = json(&output);
    assert_eq!(snapshot["unfiltered"], false);
    assert_eq!(
        snapshot["tags"],
        serde_json::json!([{ "field": "Chipset Vendor", "value": "Nordic" }])
    );

    let facets = snapshot["facets"].as_array().expect("facets array");
    let names: Vec<&str> = facets.iter().filter_map(|f| f["field"].as_str()).collect();
    // RAM (KB) is hidden by the schema
    assert_eq!(
        names,
        vec!["Model No.", "SoCset", "Chipset Vendor", "Certification", "GPIO"]
    );

    let vendor = &facets[2];
    assert_eq!(vendor["active"], true);
    let selected: Vec<&str> = vendor["entries"]
        .as_array()
        .expect("entries")
        .iter()
        .filter(|e| e["selected"] == true)
        .filter_map(|e| e["value"].as_str())
        .collect();
    assert_eq!(selected, vec!["Nordic"]);
}

#[test]
fn facets_text_marks_selection() {
    let output = run("facets", &["-s", "GPIO=48"]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.starts_with("selected: GPIO=48\n"));
    assert!(out.contains("GPIO (numeric) *\n"));
    assert!(out.contains("  [x] 48\n"));
    assert!(out.contains("  [ ] 4\n"));
}

// ===========================================================================
// compare
// ===========================================================================

#[test]
fn compare_groups_largest_vendor_first() {
    let output = run(
        "compare",
        &[
            "-p", "BGM13P__EFR32BG13",
            "-p", "MDBT50Q__nRF52840",
            "-p", "RN4871__IS1871",
            "-p", "BT840__nRF52840",
            // Pins are independent of the filter
            "-s", "Chipset Vendor=TI",
        ],
    );
    assert_success(&output);
    assert_eq!(
        first_column(&stdout(&output)),
        vec!["BT840", "MDBT50Q", "BGM13P", "RN4871"]
    );
}

#[test]
fn compare_warns_on_stale_pin() {
    let output = run("compare", &["-p", "GONE__X", "-p", "BT840__nRF52840"]);
    assert_success(&output);
    assert_eq!(first_column(&stdout(&output)), vec!["BT840"]);
    assert!(stderr(&output).contains("matches no record"));
}

#[test]
fn compare_without_pins_prints_notice() {
    let output = run("compare", &[]);
    assert_success(&output);
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("No records pinned"));
}

// ===========================================================================
// fields / schema resolution
// ===========================================================================

#[test]
fn fields_lists_kinds_and_roles() {
    let output = run("fields", &[]);
    assert_success(&output);
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Model No.\ttext\tidentity");
    assert_eq!(lines[2], "Chipset Vendor\ttext\tgroup");
    assert_eq!(lines[3], "Certification\tmulti_text");
    assert_eq!(lines[5], "RAM (KB)\tnumeric\thidden");
}

#[test]
fn builtin_schema_when_no_config_file() {
    let config_home = tempfile::tempdir().unwrap();
    let output = fgrid()
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .args(["fields", "--json", "--data", "tests/fixtures/products.csv"])
        .output()
        .expect("run fgrid");
    assert_success(&output);

    let fields = json(&output);
    let fields = fields.as_array().expect("array");
    let kind = |name: &str| {
        fields
            .iter()
            .find(|f| f["name"] == name)
            .map(|f| f["kind"].clone())
            .unwrap_or_default()
    };
    assert_eq!(kind("Certification"), "multi_text");
    assert_eq!(kind("GPIO"), "numeric");
    assert_eq!(kind("RAM (KB)"), "numeric");
    assert_eq!(kind("Chipset Vendor"), "text");
}

// ===========================================================================
// Ingestion
// ===========================================================================

#[test]
fn mismatched_rows_are_skipped_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("broken.csv");
    std::fs::write(
        &data,
        "Model No.;SoCset;Chipset Vendor\nA1;S1;Nordic\nA2;S2\nA3;S3;TI;\n",
    )
    .unwrap();

    let output = fgrid()
        .args(["records", "--all", "--schema", "tests/fixtures/schema.toml", "--data"])
        .arg(&data)
        .output()
        .expect("run fgrid");
    assert_success(&output);
    assert_eq!(
        stdout(&output).lines().map(|l| l.split(',').next().unwrap_or_default()).collect::<Vec<_>>(),
        vec!["Model No.", "A1", "A3"]
    );
    assert!(stderr(&output).contains("row skipped"));
}

#[test]
fn explicit_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("piped.txt");
    std::fs::write(&data, "Model No.|SoCset|GPIO\nA1|S1|7\n").unwrap();

    let output = fgrid()
        .args(["options", "GPIO", "--delimiter", "|", "--schema", "tests/fixtures/schema.toml", "--data"])
        .arg(&data)
        .output()
        .expect("run fgrid");
    assert_success(&output);
    assert_eq!(stdout(&output), "7\n");
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn exit_usage_for_malformed_selection() {
    let output = run("records", &["-s", "Chipset Vendor"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("FIELD=VALUE"));
}

#[test]
fn exit_usage_for_malformed_pin() {
    let output = run("compare", &["-p", "BT840"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn exit_unknown_field() {
    let output = run("records", &["-s", "Colour=red"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Colour"));

    let output = run("options", &["Colour"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn exit_config_for_invalid_schema() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("schema.toml");
    std::fs::write(&schema, "identity = [\"Model No.\"]\n").unwrap();

    let output = fgrid()
        .args(["fields", "--data", "tests/fixtures/products.csv", "--schema"])
        .arg(&schema)
        .output()
        .expect("run fgrid");
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn exit_ingest_for_missing_data() {
    let output = fgrid()
        .args([
            "fields",
            "--data",
            "tests/fixtures/nope.csv",
            "--schema",
            "tests/fixtures/schema.toml",
        ])
        .output()
        .expect("run fgrid");
    assert_eq!(output.status.code(), Some(5));
}
