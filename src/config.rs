use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::RecordsError;

pub const DEFAULT_GPA_THRESHOLD: f64 = 2.0;

const WORKSPACE_ENV: &str = "ROSTERD_WORKSPACE";
const THRESHOLD_ENV: &str = "ROSTERD_GPA_THRESHOLD";

/// GPA cutoff separating Active from Inactive students.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, RecordsError> {
        if !value.is_finite() {
            return Err(RecordsError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_GPA_THRESHOLD)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = RecordsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> f64 {
        t.0
    }
}

/// Startup configuration. Nothing here is written back to disk; a restart
/// returns to whatever the environment says.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub workspace: Option<PathBuf>,
    pub threshold: Threshold,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let workspace = lookup(WORKSPACE_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let threshold = match lookup(THRESHOLD_ENV).map(|s| s.trim().to_string()) {
            Some(raw) if !raw.is_empty() => {
                let v: f64 = raw
                    .parse()
                    .with_context(|| format!("{THRESHOLD_ENV} is not a number: {raw:?}"))?;
                Threshold::new(v).with_context(|| format!("invalid {THRESHOLD_ENV}"))?
            }
            _ => Threshold::default(),
        };

        Ok(Self {
            workspace,
            threshold,
        })
    }
}
