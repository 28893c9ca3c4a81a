#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub struct TestLog {
    dir: TempDir,
}

impl TestLog {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Start from an existing work log document.
    pub fn seeded(contents: &str) -> std::io::Result<Self> {
        let log = Self::new()?;
        fs::write(log.path(), contents)?;
        Ok(log)
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("work_log.toml")
    }

    pub fn read(&self) -> std::io::Result<String> {
        fs::read_to_string(self.path())
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.config_path();
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// `worklog` bound to this log, isolated from the user's config and env.
    pub fn cmd(&self) -> Command {
        let mut cmd = worklog_cmd();
        cmd.env("WORKLOG_CONFIG", self.config_path())
            .arg("--file")
            .arg(self.path());
        cmd
    }

    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json output")
    }

    /// Add a task on `date` and return its id.
    pub fn add(&self, date: &str, description: &str) -> String {
        let value = self.json(&["--date", date, "add", description]);
        value["data"]["id"].as_str().expect("task id").to_string()
    }

    /// Add a task on the current day and return its id.
    pub fn add_today(&self, description: &str) -> String {
        let value = self.json(&["add", description]);
        value["data"]["id"].as_str().expect("task id").to_string()
    }
}

pub fn worklog_cmd() -> Command {
    let mut cmd = Command::cargo_bin("worklog").expect("binary");
    cmd.env_remove("WORK_LOG")
        .env_remove("WORKLOG_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}
