use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const UNREACHABLE_CATALOG: &str = r#"[
  {
    "com_name_fi": "korppi",
    "com_name_en": "Common Raven",
    "sci_name": "Corvus corax",
    "atlas_square_count": 3412,
    "recordings": [
      {"id": "1", "url": "//xeno-canto.org/1", "file": "not a url", "rec": "Jane Doe",
       "cnt": "Finland", "loc": "Espoo", "type": "call"}
    ]
  },
  {
    "com_name_fi": "varis",
    "com_name_en": "Hooded Crow",
    "sci_name": "Corvus cornix",
    "atlas_square_count": 3800,
    "recordings": [
      {"id": 2, "url": "//xeno-canto.org/2", "file": "also not a url", "rec": "John Roe"}
    ]
  }
]"#;

fn write_catalog(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("catalog.json");
    fs::write(&path, contents).expect("write catalog");
    path
}

fn birdquiz() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("birdquiz"));
    cmd.env_remove("BIRDQUIZ_LOG_STDERR");
    cmd
}

#[test]
fn invalid_difficulty_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(&dir, UNREACHABLE_CATALOG);

    birdquiz()
        .args(["--quiet", "-d", "7"])
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("difficulty"));
}

#[test]
fn zero_length_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(&dir, UNREACHABLE_CATALOG);

    birdquiz()
        .args(["--quiet", "--length", "0"])
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("length"));
}

#[test]
fn missing_catalog_fails() {
    let dir = TempDir::new().expect("tempdir");

    birdquiz()
        .arg("--quiet")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure();
}

#[test]
fn malformed_catalog_fails() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(&dir, "{ not json");

    birdquiz()
        .arg("--quiet")
        .arg(&catalog)
        .assert()
        .failure();
}

#[test]
fn quiet_mode_scores_skipped_species_as_wrong() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(&dir, UNREACHABLE_CATALOG);

    birdquiz()
        .args(["--quiet", "--difficulty", "3", "--seed", "1"])
        .arg(&catalog)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped").count(2))
        .stdout(predicate::str::contains("Score: 0%"))
        .stdout(predicate::str::contains("Wrong: 2"));
}
