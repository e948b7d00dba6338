use super::defaults::{
    FORBIDDEN_NAME_CHARS, MAX_CODE_CHARS, MAX_LIVENESS_TIMEOUT_MS, MAX_NAME_CHARS, MAX_RATE_HZ,
    MIN_LIVENESS_TIMEOUT_MS, MIN_POLL_HZ, MIN_WATCHDOG_PERIOD_MS,
};
use super::{AppConfig, WatchdogConfig};
use crate::producer::StartConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize optional strings.
    pub fn validate(&mut self) -> Result<()> {
        validate_rate("--upsample-hz", self.upsample_hz)?;
        validate_rate("--rate-limit-hz", self.rate_limit_hz)?;

        if let Some(hz) = self.poll_hz {
            if !hz.is_finite() || !(MIN_POLL_HZ..=MAX_RATE_HZ).contains(&hz) {
                bail!("--poll-hz must be between {MIN_POLL_HZ} and {MAX_RATE_HZ}, got {hz}");
            }
        }

        if !(MIN_LIVENESS_TIMEOUT_MS..=MAX_LIVENESS_TIMEOUT_MS).contains(&self.liveness_timeout_ms)
        {
            bail!(
                "--liveness-timeout-ms must be between {MIN_LIVENESS_TIMEOUT_MS} and {MAX_LIVENESS_TIMEOUT_MS}, got {}",
                self.liveness_timeout_ms
            );
        }
        if self.watchdog_period_ms < MIN_WATCHDOG_PERIOD_MS
            || self.watchdog_period_ms > self.liveness_timeout_ms
        {
            bail!(
                "--watchdog-period-ms must be >={MIN_WATCHDOG_PERIOD_MS} and <= --liveness-timeout-ms ({})",
                self.liveness_timeout_ms
            );
        }

        self.name = normalize_optional(self.name.take());
        self.code = normalize_optional(self.code.take());

        if let Some(name) = &self.name {
            if name.chars().count() > MAX_NAME_CHARS
                || name.chars().any(|ch| FORBIDDEN_NAME_CHARS.contains(&ch))
            {
                bail!(
                    "--name must be <={MAX_NAME_CHARS} characters with no control or shell metacharacters"
                );
            }
        }
        if let Some(code) = &self.code {
            if code.len() > MAX_CODE_CHARS || !code.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                bail!("--code must be 1-{MAX_CODE_CHARS} ASCII letters or digits");
            }
        }

        let (program, _) = split_producer_command(&self.producer_cmd)?;
        if program.is_empty() {
            bail!("--producer-cmd cannot be empty");
        }

        if let Some(dir) = &mut self.producer_dir {
            let canonical = dir
                .canonicalize()
                .with_context(|| format!("failed to canonicalize --producer-dir '{}'", dir.display()))?;
            if !canonical.is_dir() {
                bail!("--producer-dir '{}' is not a directory", canonical.display());
            }
            *dir = canonical;
        }

        if let Some(path) = &self.output_config {
            if !path.exists() {
                bail!("output config '{}' does not exist", path.display());
            }
        }

        Ok(())
    }

    /// Start request forwarded to the producer process.
    pub fn start_config(&self) -> StartConfig {
        StartConfig {
            connection: self.connection,
            name: self.name.clone(),
            code: self.code.clone(),
            upsample_hz: self.upsample_hz,
            rate_limit_hz: self.rate_limit_hz,
        }
    }

    pub fn watchdog_config(&self) -> WatchdogConfig {
        WatchdogConfig {
            timeout: Duration::from_millis(self.liveness_timeout_ms),
            period: Duration::from_millis(self.watchdog_period_ms),
        }
    }

    /// Resolve the producer program and its base arguments.
    ///
    /// When the command starts with a bare python interpreter and the producer
    /// directory carries a virtualenv, the venv interpreter is used instead.
    pub fn producer_command(&self) -> Result<(String, Vec<String>)> {
        let (program, args) = split_producer_command(&self.producer_cmd)?;
        let program = match &self.producer_dir {
            Some(dir) if is_bare_python(&program) => venv_python(dir)
                .map(|path| path.to_string_lossy().to_string())
                .unwrap_or(program),
            _ => program,
        };
        Ok((program, args))
    }
}

fn validate_rate(flag: &str, value: Option<f64>) -> Result<()> {
    if let Some(hz) = value {
        if !hz.is_finite() || hz <= 0.0 || hz > MAX_RATE_HZ {
            bail!("{flag} must be greater than 0 and at most {MAX_RATE_HZ}, got {hz}");
        }
    }
    Ok(())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a command line with shell quoting rules into program and arguments.
pub(super) fn split_producer_command(raw: &str) -> Result<(String, Vec<String>)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok((String::new(), Vec::new()));
    }
    let mut parts = shell_words::split(trimmed)
        .with_context(|| format!("failed to parse --producer-cmd '{trimmed}'"))?;
    if parts.is_empty() {
        return Ok((String::new(), Vec::new()));
    }
    let program = parts.remove(0);
    Ok((program, parts))
}

fn is_bare_python(program: &str) -> bool {
    matches!(program, "python" | "python3")
}

pub(super) fn venv_python(dir: &Path) -> Option<PathBuf> {
    let candidate = if cfg!(windows) {
        dir.join(".venv").join("Scripts").join("python.exe")
    } else {
        dir.join(".venv").join("bin").join("python")
    };
    candidate.exists().then_some(candidate)
}
