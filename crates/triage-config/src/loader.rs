// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./triage.toml` > `~/.config/triage/triage.toml` > `/etc/triage/triage.toml`
//! with environment variable overrides via `TRIAGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TriageConfig;

/// System-wide config location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/triage/triage.toml";

/// Local config file name, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "triage.toml";

/// `~/.config/triage/triage.toml`, if a config directory exists for this platform.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("triage").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/triage/triage.toml` (system-wide)
/// 3. `~/.config/triage/triage.toml` (user XDG config)
/// 4. `./triage.toml` (local directory)
/// 5. `TRIAGE_*` environment variables
pub fn load_config() -> Result<TriageConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TriageConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TriageConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TriageConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TriageConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TriageConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")`: `TRIAGE_ANTHROPIC_API_KEY` must
/// map to `anthropic.api_key`, not `anthropic.api.key`.
fn env_provider() -> Env {
    Env::prefixed("TRIAGE_").map(|key| {
        // Figment passes the key with the prefix stripped but its case intact.
        let key_str = key.as_str().to_ascii_lowercase();
        let key_str = key_str.as_str();
        let mapped = if let Some(rest) = key_str.strip_prefix("agent_") {
            format!("agent.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("anthropic_") {
            format!("anthropic.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("classifier_") {
            format!("classifier.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("orchestrator_") {
            format!("orchestrator.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("personas_") {
            match rest.split_once('_') {
                Some((intent, field)) => format!("personas.{intent}.{field}"),
                None => format!("personas.{rest}"),
            }
        } else {
            key_str.to_string()
        };
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_keys_with_underscores() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TRIAGE_ANTHROPIC_API_KEY", "sk-env");
            jail.set_env("TRIAGE_ORCHESTRATOR_GENERATION_TIMEOUT_SECS", "7");
            jail.set_env("TRIAGE_AGENT_LOG_LEVEL", "debug");
            let config = load_config()?;
            assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-env"));
            assert_eq!(config.orchestrator.generation_timeout_secs, 7);
            assert_eq!(config.agent.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn local_file_is_merged_over_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
[classifier]
model = "claude-3-5-haiku-latest"
"#,
            )?;
            let config = load_config()?;
            assert_eq!(
                config.classifier.model.as_deref(),
                Some("claude-3-5-haiku-latest")
            );
            assert_eq!(config.classifier.max_tokens, 64);
            Ok(())
        });
    }

    #[test]
    fn env_beats_local_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(LOCAL_CONFIG_FILE, "[agent]\nname = \"from-file\"\n")?;
            jail.set_env("TRIAGE_AGENT_NAME", "from-env");
            let config = load_config()?;
            assert_eq!(config.agent.name, "from-env");
            Ok(())
        });
    }

    #[test]
    fn env_api_key_alone_loads() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TRIAGE_ANTHROPIC_API_KEY", "sk-env");
            let config = load_config()?;
            assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-env"));
            assert_eq!(config.anthropic.max_tokens, 1024);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_persona_prompt() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TRIAGE_PERSONAS_STUDY_SYSTEM_PROMPT", "Quiz me.");
            let config = load_config()?;
            let study = config.personas.study.as_ref().map(|p| p.system_prompt.as_deref());
            assert_eq!(study, Some(Some("Quiz me.")));
            assert!(config.personas.logical.is_none());
            Ok(())
        });
    }
}
