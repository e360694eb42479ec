use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn medsql_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("medsql"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG");
    cmd
}

fn write_entities(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("entities.json");
    fs::write(
        &path,
        r#"{
  "DRUG": [{"text": "aspirin", "query_arg": "1191"}],
  "GENDER": [{"text": "women", "query_arg": "FEMALE"}]
}"#,
    )
    .expect("write entities");
    path
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_uses_default_schema_without_config() {
    let home = TempDir::new().expect("home");
    medsql_cmd(home.path())
        .args(["render", "SELECT count(*) FROM <SCHEMA>.person"])
        .assert()
        .success()
        .stdout("SELECT count(*) FROM cmsdesynpuf23m.person\n");
}

#[test]
fn render_merges_argument_sources_in_order() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    let args_path = work.path().join("args.yaml");
    fs::write(&args_path, "DAYS: ['30']\n").expect("write args");

    medsql_cmd(home.path())
        .args(["render", "<ARG-DAYS><0> <ARG-DAYS><1> <ARG-DRUG><0>", "--args"])
        .arg(&args_path)
        .arg("--entities")
        .arg(write_entities(work.path()))
        .args(["--arg", "DAYS=60"])
        .assert()
        .success()
        .stdout("30 60 1191\n");
}

#[test]
fn render_reads_skeleton_from_stdin() {
    let home = TempDir::new().expect("home");
    assert_cmd::Command::from_std(medsql_cmd(home.path()))
        .args(["render", "--schema", "synpuf", "--arg", "GENDER=MALE"])
        .write_stdin("SELECT 1 FROM <SCHEMA>.person WHERE g IN <GENDER-TEMPLATE><ARG-GENDER><0>\n")
        .assert()
        .success()
        .stdout(contains("FROM synpuf.person"))
        .stdout(contains("concept_name='MALE' AND domain_id='Gender'"));
}

#[test]
fn render_lookup_failure_exits_nonzero() {
    let home = TempDir::new().expect("home");
    medsql_cmd(home.path())
        .args(["render", "<ARG-DRUG><5>", "--arg", "DRUG=1191"])
        .assert()
        .failure()
        .stderr(contains("out of range"));
}

#[test]
fn render_strict_rejects_leftover_tokens() {
    let home = TempDir::new().expect("home");
    medsql_cmd(home.path())
        .args(["render", "SELECT <ARG-DRUG><>"])
        .assert()
        .success()
        .stdout(contains("<ARG-DRUG><>"));

    medsql_cmd(home.path())
        .args(["render", "--strict", "SELECT <ARG-DRUG><>"])
        .assert()
        .failure()
        .stderr(contains("<ARG-DRUG>"));
}

#[test]
fn render_rejects_malformed_assignment() {
    let home = TempDir::new().expect("home");
    medsql_cmd(home.path())
        .args(["render", "x", "--arg", "DRUG"])
        .assert()
        .failure()
        .stderr(contains("DOMAIN=VALUE"));
}

#[test]
fn render_rejects_blank_schema() {
    let home = TempDir::new().expect("home");
    for schema in ["", "   "] {
        medsql_cmd(home.path())
            .args(["render", "<SCHEMA>.person", "--schema", schema])
            .assert()
            .failure()
            .stderr(contains("schema must not be empty"));
    }
}

#[test]
fn render_logs_argument_sources_at_debug() {
    let home = TempDir::new().expect("home");
    medsql_cmd(home.path())
        .env("RUST_LOG", "debug")
        .args(["render", "<ARG-DRUG><0>", "--arg", "DRUG=1191"])
        .assert()
        .success()
        .stdout("1191\n")
        .stderr(contains("appended --arg"));
}

#[test]
fn render_honors_config_file_overrides() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    fs::create_dir_all(work.path().join("sql")).expect("mkdir");
    fs::write(
        work.path().join("sql").join("drug_name.sql.tera"),
        "( SELECT id FROM {{ schema }}.drug_names WHERE name='{{ concept | sql_string }}' )",
    )
    .expect("write template");
    let config_path = work.path().join("medsql.yaml");
    fs::write(
        &config_path,
        "schema: warehouse\ntemplate_dir: sql\nwith_arg:\n  DRUG: drug_name.sql.tera\n",
    )
    .expect("write config");

    medsql_cmd(home.path())
        .args(["render", "<DRUG-TEMPLATE><ARG-DRUG><0>", "--arg", "DRUG=O'Brien", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout("( SELECT id FROM warehouse.drug_names WHERE name='O''Brien' )\n");
}

// ---------------------------------------------------------------------------
// mask
// ---------------------------------------------------------------------------

#[test]
fn mask_prints_placeholder_question() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    medsql_cmd(home.path())
        .args(["mask", "How many women took Aspirin?", "--entities"])
        .arg(write_entities(work.path()))
        .assert()
        .success()
        .stdout("How many <ARG-GENDER><0> took <ARG-DRUG><0>?\n");
}

#[test]
fn mask_json_includes_argument_dictionary() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    let output = medsql_cmd(home.path())
        .args(["mask", "aspirin for women", "--json", "--entities"])
        .arg(write_entities(work.path()))
        .output()
        .expect("run");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["question"], "<ARG-DRUG><0> for <ARG-GENDER><0>");
    assert_eq!(json["args"]["DRUG"][0], "1191");
    assert_eq!(json["args"]["GENDER"][0], "FEMALE");
}

// ---------------------------------------------------------------------------
// templates / init
// ---------------------------------------------------------------------------

#[test]
fn templates_lists_both_halves() {
    let home = TempDir::new().expect("home");
    medsql_cmd(home.path())
        .env("NO_COLOR", "1")
        .arg("templates")
        .assert()
        .success()
        .stdout(contains("STATEID"))
        .stdout(contains("<STATENAME-TEMPLATE>"))
        .stdout(contains("with_no_arg"));
}

#[test]
fn templates_json_is_machine_readable() {
    let home = TempDir::new().expect("home");
    let output = medsql_cmd(home.path())
        .args(["templates", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let entries: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).expect("json");
    assert!(entries
        .iter()
        .any(|e| e["tag"] == "DRUG" && e["kind"] == "with_arg" && e["source"] == "drug.sql.tera"));
    assert!(entries
        .iter()
        .any(|e| e["tag"] == "STATENAME" && e["kind"] == "with_no_arg"));
}

#[test]
fn init_writes_config_then_leaves_it_alone() {
    let home = TempDir::new().expect("home");
    medsql_cmd(home.path())
        .args(["init", "--schema", "synpuf"])
        .assert()
        .success()
        .stdout(contains("Wrote config"));
    let config_path = home.path().join(".medsql").join("config.yaml");
    assert!(predicate::path::exists().eval(&config_path));

    medsql_cmd(home.path())
        .args(["init", "--schema", "other"])
        .assert()
        .success()
        .stdout(contains("already exists"));

    medsql_cmd(home.path())
        .args(["render", "<SCHEMA>"])
        .assert()
        .success()
        .stdout("synpuf\n");
}
