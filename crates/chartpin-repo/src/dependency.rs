//! Chart dependency refresh
//!
//! Shells out to `helm dependency update` with `HOME` pointed at a
//! caller-chosen directory, so repository configuration and caches are read
//! from (and written to) that home instead of the user's. The tool sees no
//! other variable except `PATH`, so `XDG_*` and `HELM_*` settings of the
//! caller cannot redirect it.

use std::path::Path;
use std::process::Stdio;

use crate::error::{RepoError, Result};

const DEFAULT_PROGRAM: &str = "helm";

/// Runs `<program> [base args] dependency update <chart>`
#[derive(Debug, Clone)]
pub struct DependencyUpdater {
    program: String,
    base_args: Vec<String>,
}

impl Default for DependencyUpdater {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl DependencyUpdater {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }

    /// Arguments placed before `dependency update`
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args.extend(args.into_iter().map(Into::into));
        self
    }

    fn command_line(&self) -> String {
        format!("{} dependency update", self.program)
    }

    /// Refresh the dependencies of the chart at `chart_path`
    ///
    /// The environment is cleared down to `HOME` and the caller's `PATH`. On
    /// a non-zero exit the tool's stdout and stderr are returned verbatim in
    /// the error.
    pub async fn update(&self, home: &Path, chart_path: &Path) -> Result<()> {
        let chart = chart_path.display().to_string();
        tracing::debug!(
            "Running `{}` for {} with HOME={}",
            self.command_line(),
            chart,
            home.display()
        );

        let mut command = tokio::process::Command::new(&self.program);
        command.env_clear();
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }

        let output = command
            .args(&self.base_args)
            .args(["dependency", "update"])
            .arg(chart_path)
            .env("HOME", home)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| RepoError::DependencyUpdateFailed {
                command: self.command_line(),
                chart_path: chart.clone(),
                output: format!("failed to start {}: {}", self.program, e),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        tracing::warn!("`{}` failed for {}: {}", self.command_line(), chart, output.status);

        Err(RepoError::DependencyUpdateFailed {
            command: self.command_line(),
            chart_path: chart,
            output: combined,
        })
    }
}

/// `helm dependency update <chart_path>` with `HOME` set to `home`
pub async fn update_chart_dependencies(home: &Path, chart_path: &Path) -> Result<()> {
    DependencyUpdater::default().update(home, chart_path).await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use chartpin_core::ErrorKind;
    use std::path::PathBuf;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-helm.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_runs_with_overridden_home() {
        let home = tempfile::tempdir().unwrap();
        let script = script(home.path(), r#"echo "$@" > "$HOME/invocation""#);
        let chart = home.path().join("mychart");

        DependencyUpdater::new("sh")
            .with_args([script.display().to_string()])
            .update(home.path(), &chart)
            .await
            .unwrap();

        let invocation = std::fs::read_to_string(home.path().join("invocation")).unwrap();
        assert_eq!(
            invocation.trim(),
            format!("dependency update {}", chart.display())
        );
    }

    #[tokio::test]
    async fn test_environment_holds_only_home_and_path() {
        let home = tempfile::tempdir().unwrap();
        let script = script(home.path(), r#"env > "$HOME/environment""#);

        DependencyUpdater::new("sh")
            .with_args([script.display().to_string()])
            .update(home.path(), Path::new("chart"))
            .await
            .unwrap();

        let environment = std::fs::read_to_string(home.path().join("environment")).unwrap();
        assert!(environment
            .lines()
            .any(|line| line == format!("HOME={}", home.path().display())));

        // The shell itself may add PWD, SHLVL and `_`
        for line in environment.lines() {
            let name = line.split('=').next().unwrap_or_default();
            assert!(
                matches!(name, "HOME" | "PATH" | "PWD" | "OLDPWD" | "SHLVL" | "_"),
                "unexpected variable leaked into helm's environment: {}",
                line
            );
        }
    }

    #[tokio::test]
    async fn test_failure_carries_tool_output() {
        let home = tempfile::tempdir().unwrap();
        let script = script(
            home.path(),
            "echo 'Saving 1 charts'\necho 'Error: no Chart.yaml exists' >&2\nexit 1",
        );

        let err = DependencyUpdater::new("sh")
            .with_args([script.display().to_string()])
            .update(home.path(), Path::new("/charts/missing"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        match err {
            RepoError::DependencyUpdateFailed {
                chart_path, output, ..
            } => {
                assert_eq!(chart_path, "/charts/missing");
                assert!(output.contains("Saving 1 charts"));
                assert!(output.contains("Error: no Chart.yaml exists"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let home = tempfile::tempdir().unwrap();
        let err = DependencyUpdater::new("/nonexistent/chartpin-helm")
            .update(home.path(), Path::new("chart"))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("/nonexistent/chartpin-helm dependency update"));
        assert!(message.contains("\"chart\""));
    }
}
