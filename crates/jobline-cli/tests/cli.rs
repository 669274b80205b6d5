use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const POSTINGS: &str = "Senior Data Analyst
Acme Corp · Remote
Fecha: 2024-03-05

Requirements:
- SQL
- Python
---
Cargo: Ingeniero de Datos
Empresa: Globex
Modalidad: Híbrido
Fecha: 2024-04-01
Descripción: Buscamos una persona para construir pipelines de datos en la nube.
";

const SAMPLE_TEXT: &str = "Senior Data Analyst\nAcme Corp · Remote\nRequirements:\n- SQL\n- Python";

/// Command with the user config directory pointed inside `home`.
fn jobline(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("jobline").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join("config"));
    cmd
}

fn read_lines(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn write_pairs(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("pairs.jsonl");
    let pair = serde_json::json!({
        "text": SAMPLE_TEXT,
        "cargo": "Senior Data Analyst",
        "empresa": "Acme Corp",
    });
    fs::write(&path, format!("{}\n", pair)).unwrap();
    path
}

#[test]
fn test_extract_writes_records_pairs_dataset_and_report() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("postings.txt"), POSTINGS).unwrap();
    let out = dir.path().join("out");
    let dataset = dir.path().join("dataset");

    jobline(dir.path())
        .arg("extract")
        .arg(dir.path().join("*.txt").to_str().unwrap())
        .arg("-o")
        .arg(&out)
        .arg("--dataset")
        .arg(&dataset)
        .arg("--report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 postings"));

    let record: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.join("senior_data_analyst_acme_corp_2024-03-05.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(record["cargo"], "Senior Data Analyst");
    assert_eq!(record["empresa"], "Acme Corp");
    assert_eq!(record["modalidad"], "remoto");
    assert_eq!(record["requerimientos"], serde_json::json!(["SQL", "Python"]));

    assert_eq!(read_lines(&out.join("training_data.jsonl")).len(), 2);
    assert!(out.join("extraction_report.json").exists());
    let text_report = fs::read_to_string(out.join("extraction_report.txt")).unwrap();
    assert!(text_report.contains("Processed:        2"));
    assert!(dataset.join("line_dataset.jsonl").exists());
    assert!(dataset.join("line_dataset.csv").exists());
    assert!(dataset.join("line_dataset_review.jsonl").exists());
}

#[test]
fn test_extract_without_matches_fails() {
    let dir = TempDir::new().unwrap();

    jobline(dir.path())
        .arg("extract")
        .arg(dir.path().join("*.txt").to_str().unwrap())
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_label_writes_three_files() {
    let dir = TempDir::new().unwrap();
    let pairs = write_pairs(&dir);
    let out = dir.path().join("labeled");

    jobline(dir.path())
        .arg("label")
        .arg(&pairs)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Labeled 5 lines from 1 postings"));

    let records = read_lines(&out.join("line_dataset.jsonl"));
    let labels: Vec<&str> = records.iter().map(|r| r["label"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["role", "company", "other", "other", "other"]);
    assert_eq!(read_lines(&out.join("line_dataset_review.jsonl")).len(), 3);

    let csv = fs::read_to_string(out.join("line_dataset.csv")).unwrap();
    assert!(csv.starts_with("line,label,source_hash\n"));
}

#[test]
fn test_merge_applies_csv_corrections() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("line_dataset.jsonl");
    fs::write(
        &base,
        "{\"line\": \"Acme Corp\", \"label\": \"other\", \"source_hash\": \"h1\"}\n\
         {\"line\": \"SQL\", \"label\": \"other\", \"source_hash\": \"h1\"}\n",
    )
    .unwrap();
    let overlay = dir.path().join("corrections.csv");
    fs::write(&overlay, "line,label,source_hash\nacme corp,company,h1\nPython,,h1\n").unwrap();

    jobline(dir.path())
        .arg("merge")
        .arg(&base)
        .arg(&overlay)
        .assert()
        .success()
        .stdout(predicate::str::contains("updated=1 added=1 total=3"));

    let merged = read_lines(&dir.path().join("line_dataset.merged.jsonl"));
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0]["label"], "company");
    assert_eq!(merged[2]["line"], "Python");
    assert_eq!(merged[2]["label"], "other");
}

#[test]
fn test_oversample_refuses_to_overwrite_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("line_dataset.jsonl");
    fs::write(&input, "{\"line\": \"Acme\", \"label\": \"company\", \"source_hash\": \"h\"}\n").unwrap();

    jobline(dir.path())
        .arg("oversample")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refusing to overwrite"));
}

#[test]
fn test_oversample_writes_sibling_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("line_dataset.jsonl");
    let mut content = String::from("{\"line\": \"Acme\", \"label\": \"company\", \"source_hash\": \"h\"}\n");
    for i in 0..9 {
        content.push_str(&format!("{{\"line\": \"line {i}\", \"label\": \"other\", \"source_hash\": \"h\"}}\n"));
    }
    fs::write(&input, content).unwrap();

    jobline(dir.path())
        .arg("oversample")
        .arg(&input)
        .arg("--target-ratio")
        .arg("0.5")
        .arg("--seed")
        .arg("42")
        .assert()
        .success();

    let records = read_lines(&dir.path().join("line_dataset.oversampled.jsonl"));
    let companies = records.iter().filter(|r| r["label"] == "company").count();
    assert_eq!(records.len(), 19);
    assert_eq!(companies, 10);
}

#[test]
fn test_candidates_with_auto_label() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("line_dataset.jsonl");
    fs::write(
        &input,
        "{\"line\": \"Senior Data Analyst\", \"label\": \"role\", \"source_hash\": \"h\", \"source_index\": 0, \"line_index\": 0}\n\
         {\"line\": \"Initech Group\", \"label\": \"other\", \"source_hash\": \"h\", \"source_index\": 0, \"line_index\": 1}\n\
         {\"line\": \"3 days ago\", \"label\": \"other\", \"source_hash\": \"h\", \"source_index\": 0, \"line_index\": 2}\n",
    )
    .unwrap();
    let output = dir.path().join("candidates.csv");

    jobline(dir.path())
        .arg("candidates")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--auto-label")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 lines relabeled as company"));

    let csv = fs::read_to_string(&output).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(
        rows[0],
        "line,label,source_hash,source_index,line_index,reason,score,orig_label,auto_labeled"
    );
    assert_eq!(rows[1], "Initech Group,company,h,0,1,indicator|titlecase,7,other,yes");
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_dedupe_refuses_input_spelled_differently() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("line_dataset.jsonl"),
        "{\"line\": \"Acme\", \"label\": \"company\", \"source_hash\": \"h\"}\n",
    )
    .unwrap();

    jobline(dir.path())
        .current_dir(dir.path())
        .args(["dedupe", "line_dataset.jsonl", "-o", "./line_dataset.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refusing to overwrite"));
}

#[test]
fn test_dedupe_pairs_reports_conflicts() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("training_data.jsonl");
    let pairs = [
        serde_json::json!({"text": "Analyst\nAcme", "cargo": "Analyst", "empresa": "Acme"}),
        serde_json::json!({"text": "Analyst\nAcme  ", "cargo": "Analyst", "empresa": "Globex"}),
        serde_json::json!({"text": "Engineer\nInitech", "cargo": "Engineer", "empresa": "Initech"}),
    ];
    let content: String = pairs.iter().map(|p| format!("{}\n", p)).collect();
    fs::write(&input, content).unwrap();
    let conflicts = dir.path().join("conflicts.jsonl");

    jobline(dir.path())
        .arg("dedupe")
        .arg(&input)
        .arg("--pairs")
        .arg("--conflicts")
        .arg(&conflicts)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 postings have conflicting annotations"));

    assert_eq!(read_lines(&dir.path().join("training_data.dedup.jsonl")).len(), 2);
    let written = read_lines(&conflicts);
    assert_eq!(written.len(), 1);
    assert_eq!(written[0]["kept"]["empresa"], "Acme");
}

#[test]
fn test_audit_flags_empty_company() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("training_data.jsonl");
    fs::write(
        &input,
        "{\"text\": \"Analyst\", \"cargo\": \"Analyst\", \"empresa\": \"\"}\n\
         {\"text\": \"Engineer\\nInitech\", \"cargo\": \"Engineer\", \"empresa\": \"Initech\"}\n",
    )
    .unwrap();

    jobline(dir.path())
        .arg("audit")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 pairs flagged: empty_company 1"));
}

#[test]
fn test_stats_counts_labels() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("line_dataset.jsonl");
    fs::write(
        &input,
        "{\"line\": \"Analyst\", \"label\": \"role\", \"source_hash\": \"h\"}\n\
         {\"line\": \"Acme\", \"label\": \"company\", \"source_hash\": \"h\"}\n\
         {\"line\": \"SQL\", \"label\": \"other\", \"source_hash\": \"h\"}\n\
         {\"line\": \"Python\", \"label\": \"other\", \"source_hash\": \"h\"}\n\
         {\"line\": \"broken\", \"label\": \"requirement\"}\n",
    )
    .unwrap();

    jobline(dir.path())
        .arg("stats")
        .arg(&input)
        .arg("--samples")
        .arg("1")
        .arg("--seed")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 lines in"))
        .stdout(predicate::str::contains("Skipped 1 malformed records"));
}

#[test]
fn test_config_init_and_get() {
    let dir = TempDir::new().unwrap();

    jobline(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(dir.path().join("config/jobline/config.json").exists());

    jobline(dir.path())
        .args(["config", "set", "splitter.min_block_chars", "20"])
        .assert()
        .success();

    jobline(dir.path())
        .args(["config", "get", "splitter.min_block_chars"])
        .assert()
        .success()
        .stdout(predicate::str::diff("20\n"));

    jobline(dir.path())
        .args(["config", "get", "splitter.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key splitter.nope"));

    jobline(dir.path())
        .args(["config", "reset", "splitter.min_block_chars"])
        .assert()
        .success();

    jobline(dir.path())
        .args(["config", "get", "splitter.min_block_chars"])
        .assert()
        .success()
        .stdout(predicate::str::diff("50\n"));
}

#[test]
fn test_config_commands_follow_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("custom.json");

    jobline(dir.path())
        .arg("--config")
        .arg(&custom)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(custom.exists());
    assert!(!dir.path().join("config/jobline/config.json").exists());

    jobline(dir.path())
        .arg("--config")
        .arg(&custom)
        .args(["config", "set", "oversample.target_ratio", "0.4"])
        .assert()
        .success();

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&custom).unwrap()).unwrap();
    assert_eq!(saved["oversample"]["target_ratio"], 0.4);

    jobline(dir.path())
        .arg("--config")
        .arg(&custom)
        .args(["config", "set", "oversample.target_ratio", "3"])
        .assert()
        .failure();
}

const RECORDS: &str = "cargo: Data Analyst
empresa: Acme Corp
fecha: 2024-03-05
descripcion: Build dashboards for the sales team.
requerimientos:
  - SQL
---
cargo: Data Engineer
empresa:
fecha: 05/03/2024
descripcion: Pipelines.
requerimientos:
  - Spark
";

#[test]
fn test_validate_reports_invalid_blocks() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.txt");
    fs::write(&input, RECORDS).unwrap();
    let valid = dir.path().join("valid.jsonl");

    jobline(dir.path())
        .arg("validate")
        .arg(&input)
        .arg("--jsonl")
        .arg(&valid)
        .assert()
        .failure()
        .stdout(predicate::str::contains("block 2: empty field 'empresa'; invalid date '05/03/2024'"))
        .stdout(predicate::str::contains("2 records in 1 files: 1 valid, 1 invalid"))
        .stderr(predicate::str::contains("1 of 2 records failed validation"));

    let written = read_lines(&valid);
    assert_eq!(written.len(), 1);
    assert_eq!(written[0]["empresa"], "Acme Corp");
}

#[test]
fn test_validate_accepts_extracted_records() {
    let dir = TempDir::new().unwrap();
    let record = serde_json::json!({
        "cargo": "Data Analyst",
        "empresa": "Acme Corp",
        "fecha": "2024-03-05",
        "modalidad": "",
        "descripcion": "Build dashboards.",
        "requerimientos": ["SQL"],
    });
    fs::write(dir.path().join("data_analyst_acme_corp_2024-03-05.json"), record.to_string()).unwrap();

    jobline(dir.path())
        .arg("validate")
        .arg(dir.path().join("*.json").to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("All records are valid"));
}

#[test]
fn test_compare_lists_field_differences() {
    let dir = TempDir::new().unwrap();
    let auto = dir.path().join("auto");
    let manual = dir.path().join("manual");
    fs::create_dir_all(&auto).unwrap();
    fs::create_dir_all(&manual).unwrap();

    let name = "data_analyst_remote_2024-03-05.json";
    fs::write(
        auto.join(name),
        serde_json::json!({"cargo": "Data Analyst", "empresa": "Remote", "modalidad": "remoto"}).to_string(),
    )
    .unwrap();
    fs::write(
        manual.join(name),
        serde_json::json!({"cargo": "Data Analyst", "empresa": "Acme Corp", "modalidad": "remoto"}).to_string(),
    )
    .unwrap();
    fs::write(auto.join("extraction_report.json"), r#"{"stats": {}, "postings": []}"#).unwrap();
    fs::write(auto.join("only_auto.json"), r#"{"cargo": "Engineer"}"#).unwrap();
    let csv_path = dir.path().join("diffs.csv");

    jobline(dir.path())
        .arg("compare")
        .arg(&auto)
        .arg(&manual)
        .arg("-o")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("auto:   Remote"))
        .stdout(predicate::str::contains("manual: Acme Corp"))
        .stdout(predicate::str::contains("1 of 1 shared records differ (1 fields)"))
        .stdout(predicate::str::contains("1 records only in"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(
        csv,
        format!("file,field,auto,manual\n{name},empresa,Remote,Acme Corp\n")
    );
}

#[test]
fn test_compare_without_shared_records_fails() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();

    jobline(dir.path())
        .arg("compare")
        .arg(dir.path().join("a"))
        .arg(dir.path().join("b"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No records in common"));
}
