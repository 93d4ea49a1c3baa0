//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `RERAG_*` env
//! vars. Provides helpers to expand `~` and `${VAR}` and to resolve relative
//! paths against a known base directory, plus the typed retrieval options
//! the router consumes.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("RERAG_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract the `[retrieval]` section, falling back to defaults when the
    /// section or file is absent. The result is validated.
    pub fn retrieval(&self) -> anyhow::Result<RetrievalConfig> {
        let cfg: RetrievalConfig = self
            .figment
            .extract_inner("retrieval")
            .unwrap_or_default();
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Router options recognized by the hybrid engine.
///
/// `dense_weight` and `sparse_weight` need not sum to 1: fusion is a
/// weighted sum, not a weighted average, so weights totalling more than 1
/// proportionally inflate combined scores. That is the documented contract,
/// not a bug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub routing_threshold: f32,
    pub dense_weight: f32,
    pub sparse_weight: f32,
    pub max_dense_results: usize,
    pub max_sparse_results: usize,
    pub final_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            routing_threshold: 0.5,
            dense_weight: 0.6,
            sparse_weight: 0.4,
            max_dense_results: 15,
            max_sparse_results: 15,
            final_top_k: 10,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.routing_threshold) {
            return Err(Error::InvalidArgument(format!(
                "routing_threshold must be in [0, 1], got {}",
                self.routing_threshold
            )));
        }
        if self.dense_weight < 0.0 || self.sparse_weight < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "weights must be non-negative, got dense={} sparse={}",
                self.dense_weight, self.sparse_weight
            )));
        }
        if self.max_dense_results == 0 || self.max_sparse_results == 0 {
            return Err(Error::InvalidArgument(
                "max_dense_results and max_sparse_results must be at least 1".to_string(),
            ));
        }
        if self.final_top_k == 0 {
            return Err(Error::InvalidArgument("final_top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
