//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::identity::GroupMapping;
use crate::role::Role;

/// Access control configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthzConfig {
    #[serde(default)]
    pub identity: IdentitySection,

    #[serde(default)]
    pub audit: AuditSection,

    #[serde(default)]
    pub telemetry: TelemetrySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IdentitySection {
    /// Extra group name → role mappings on top of the canonical groups
    #[serde(default)]
    pub group_aliases: BTreeMap<String, Role>,
    /// Map the legacy `Admin` group to `SUPER_ADMIN`
    #[serde(default = "default_true")]
    pub legacy_admin_group: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuditSection {
    /// Emit a `warn` security event for every denied privileged attempt
    #[serde(default = "default_true")]
    pub log_denials: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TelemetrySection {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub ansi: bool,
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            group_aliases: BTreeMap::new(),
            legacy_admin_group: true,
        }
    }
}

impl Default for AuditSection {
    fn default() -> Self {
        Self { log_denials: true }
    }
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            ansi: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AuthzConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .context("Failed to read configuration file")?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AuthzConfig =
            toml::from_str(contents).context("Failed to parse configuration file")?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STORYNEST_LOG_LEVEL` and `STORYNEST_LOG_DENIALS`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("STORYNEST_LOG_LEVEL") {
            self.telemetry.log_level = level.to_lowercase();
        }

        if let Some(flag) = lookup("STORYNEST_LOG_DENIALS") {
            self.audit.log_denials = flag.parse().with_context(|| {
                format!("STORYNEST_LOG_DENIALS must be true or false, got '{}'", flag)
            })?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(group) = self.identity.group_aliases.keys().find(|g| g.trim().is_empty()) {
            anyhow::bail!("Group alias names cannot be empty (got {:?})", group);
        }

        if !LOG_LEVELS.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "Log level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.telemetry.log_level
            );
        }

        Ok(())
    }

    /// Group mapping described by the identity section
    pub fn group_mapping(&self) -> GroupMapping {
        let base = if self.identity.legacy_admin_group {
            GroupMapping::standard_with_legacy()
        } else {
            GroupMapping::standard()
        };

        self.identity
            .group_aliases
            .iter()
            .fold(base, |mapping, (group, role)| mapping.with_alias(group.clone(), *role))
    }
}
