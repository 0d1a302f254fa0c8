use anyhow::{Context, Result};
use portal_access::{NavSection, PortalAccess, default_navigation, validate_navigation};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_METRICS_BIND: &str = "0.0.0.0:9090";

// Portal configuration sourced from environment variables, optionally
// overridden by the YAML file named in PORTAL_CONFIG.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub navigation: Vec<NavSection>,
    /// Session id -> access facts served by the in-memory loader.
    pub fixtures: HashMap<String, PortalAccess>,
}

#[derive(Debug, Deserialize)]
struct PortalConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    navigation: Option<Vec<NavSection>>,
    fixtures: Option<HashMap<String, PortalAccess>>,
}

impl PortalConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("PORTAL_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .with_context(|| "parse PORTAL_BIND")?;
        let metrics_bind = std::env::var("PORTAL_METRICS_BIND")
            .unwrap_or_else(|_| DEFAULT_METRICS_BIND.to_string())
            .parse()
            .with_context(|| "parse PORTAL_METRICS_BIND")?;
        Ok(Self {
            bind_addr,
            metrics_bind,
            navigation: default_navigation(),
            fixtures: HashMap::new(),
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("PORTAL_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read PORTAL_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    /// Apply a YAML override document.
    ///
    /// Rule names inside `navigation` are parsed here, so an unknown rule is a
    /// startup error rather than a silently hidden item.
    pub fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: PortalConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse portal config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(navigation) = override_cfg.navigation {
            validate_navigation(&navigation).with_context(|| "validate navigation")?;
            self.navigation = navigation;
        }
        if let Some(fixtures) = override_cfg.fixtures {
            self.fixtures = fixtures;
        }
        Ok(())
    }
}
