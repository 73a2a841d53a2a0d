//! CLI command execution helpers
//!
//! Runs the `drift` binary with an isolated home directory so token and
//! config lookups never touch the real user profile.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Scratch home plus a project directory inside it
pub struct Sandbox {
    _home: TempDir,
    home: PathBuf,
    project: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let home = TempDir::new().unwrap();
        let home_path = home.path().to_path_buf();
        let project = home_path.join("project");
        std::fs::create_dir(&project).unwrap();
        Self {
            _home: home,
            home: home_path,
            project,
        }
    }

    pub fn write(&self, name: &str, content: &str) {
        let path = self.project.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `drift` with the given arguments, run from the project directory
    pub fn drift(&self, args: &[&str]) -> CommandResult {
        let output = Command::new(env!("CARGO_BIN_EXE_drift"))
            .args(args)
            .current_dir(&self.project)
            .env("HOME", &self.home)
            .env("XDG_CONFIG_HOME", self.home.join(".config"))
            .env("DRIFT_LOG", "warn")
            .env_remove("DRIFT_TOKEN")
            .output()
            .unwrap();

        CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn assert_success(self) -> Self {
        assert!(
            self.success(),
            "command failed (exit code: {}):\nstdout: {}\nstderr: {}",
            self.exit_code,
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_failure(self) -> Self {
        assert!(
            !self.success(),
            "command should have failed:\nstdout: {}",
            self.stdout
        );
        self
    }
}
