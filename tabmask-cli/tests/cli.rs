use predicates::prelude::*;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const STUDENTS_CSV: &str = "student_id,name,course,cohort,graduation_date,email_address\n\
1234,'John Smith','Software','August','2024-03-31','j.smith@email.com'\n\
1235,'Joe Smith','Data','November','2024-03-31','j.smith@email.com'\n";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Result<Self, Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("students.csv"), STUDENTS_CSV)?;
        fs::write(
            dir.path().join("students.json"),
            r#"[{"id":1,"name":"John"},{"id":2,"name":"Joe"}]"#,
        )?;
        fs::write(dir.path().join("blank.csv"), "")?;
        Ok(Self { dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn arg(&self, name: &str) -> String {
        self.path(name).to_string_lossy().into_owned()
    }

    fn cmd(&self) -> Result<assert_cmd::Command, Box<dyn Error>> {
        let mut cmd = assert_cmd::Command::cargo_bin("tabmask")?;
        cmd.current_dir(self.dir.path()).env("RUST_LOG", "info");
        Ok(cmd)
    }
}

#[test]
fn redact_csv_to_stdout() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    ws.cmd()?
        .args(["redact", &ws.arg("students.csv"), "-f", "name", "-f", "email_address"])
        .assert()
        .success()
        .stdout(
            "student_id,name,course,cohort,graduation_date,email_address\n\
             1234,***,'Software','August','2024-03-31',***\n\
             1235,***,'Data','November','2024-03-31',***\n",
        );
    Ok(())
}

#[test]
fn redact_json_to_file() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    let out = ws.path("out.json");
    ws.cmd()?
        .args([
            "redact",
            &ws.arg("students.json"),
            "--field",
            "id",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(
        fs::read_to_string(out)?,
        r#"[{"id":"***","name":"John"},{"id":"***","name":"Joe"}]"#
    );
    Ok(())
}

#[test]
fn missing_field_is_logged_but_succeeds() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    ws.cmd()?
        .args(["redact", &ws.arg("students.csv"), "-f", "location", "-f", "name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1234,***,'Software'"))
        .stderr(predicate::str::contains(
            "pii field \"location\" not found in file",
        ));
    Ok(())
}

#[test]
fn reject_missing_fails() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    ws.cmd()?
        .args([
            "redact",
            &ws.arg("students.csv"),
            "-f",
            "location",
            "--reject-missing",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[test]
fn blank_csv_fails_without_output() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    ws.cmd()?
        .args(["redact", &ws.arg("blank.csv"), "-f", "name"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("text payload is blank"));
    Ok(())
}

#[test]
fn unsupported_extension_fails() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    fs::write(ws.path("notes.txt"), "a,b\n1,2\n")?;
    ws.cmd()?
        .args(["redact", &ws.arg("notes.txt"), "-f", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file extension"));

    // An explicit kind bypasses suffix detection
    ws.cmd()?
        .args(["redact", &ws.arg("notes.txt"), "-f", "a", "--kind", "text"])
        .assert()
        .success()
        .stdout("a,b\n***,2\n");
    Ok(())
}

#[test]
fn request_document_with_bucket_root() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    let bucket = ws.path("buckets/my_ingestion_bucket/new_data");
    fs::create_dir_all(&bucket)?;
    fs::write(bucket.join("file1.csv"), STUDENTS_CSV)?;
    fs::write(
        ws.path("tabmask.toml"),
        format!("[storage]\nroot = {:?}\n", ws.arg("buckets")),
    )?;

    ws.cmd()?
        .args([
            "redact",
            "--request",
            r#"{"file_to_obfuscate": "s3://my_ingestion_bucket/new_data/file1.csv",
                "pii_fields": ["name", "email_address"]}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1235,***,'Data','November','2024-03-31',***",
        ));
    Ok(())
}

#[test]
fn bucket_locator_without_root_fails() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    ws.cmd()?
        .args(["redact", "s3://bucket/file.csv", "-f", "name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("storage backend unavailable"));
    Ok(())
}

#[test]
fn config_delimiter_applies() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    fs::write(ws.path("semi.csv"), "id;name\n1;John\n")?;
    let config = ws.path("custom.toml");
    fs::write(&config, "[text]\ndelimiter = \";\"\n")?;

    ws.cmd()?
        .args([
            "--config",
            config.to_str().unwrap(),
            "redact",
            &ws.arg("semi.csv"),
            "-f",
            "name",
        ])
        .assert()
        .success()
        .stdout("id;name\n1;***\n");
    Ok(())
}

#[test]
fn convert_then_redact_columnar() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    let pqt = ws.path("students.pqt");
    ws.cmd()?
        .args(["convert", &ws.arg("students.csv"), "-o", pqt.to_str().unwrap()])
        .assert()
        .success();
    assert_eq!(&fs::read(&pqt)?[..4], b"TBC\x01");

    let masked = ws.path("masked.pqt");
    ws.cmd()?
        .args([
            "redact",
            pqt.to_str().unwrap(),
            "-f",
            "name",
            "-o",
            masked.to_str().unwrap(),
        ])
        .assert()
        .success();

    let back = ws.path("back.csv");
    ws.cmd()?
        .args(["convert", masked.to_str().unwrap(), "-o", back.to_str().unwrap()])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(back)?,
        STUDENTS_CSV
            .replace("'John Smith'", "***")
            .replace("'Joe Smith'", "***")
    );
    Ok(())
}

#[test]
fn inspect_json_reports_columns() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    let output = ws
        .cmd()?
        .args(["inspect", &ws.arg("students.json"), "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&output)?;
    assert_eq!(report["kind"], "record-list");
    assert_eq!(report["rows"], 2);
    assert_eq!(report["columns"][0]["name"], "id");
    assert_eq!(report["columns"][0]["type"], "int");
    assert_eq!(report["columns"][1]["type"], "text");
    Ok(())
}

#[test]
fn inspect_table_shows_container_sizes() -> Result<(), Box<dyn Error>> {
    let ws = Workspace::new()?;
    let pqt = ws.path("students.parquet");
    ws.cmd()?
        .args(["convert", &ws.arg("students.json"), "-o", pqt.to_str().unwrap()])
        .assert()
        .success();

    ws.cmd()?
        .args(["inspect", pqt.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kind: columnar-binary"))
        .stdout(predicate::str::contains("Origin: RecordList"))
        .stdout(predicate::str::contains("name\ttext\t0\t"));
    Ok(())
}
