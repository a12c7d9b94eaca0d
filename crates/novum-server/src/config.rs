//! Server configuration sourced from environment variables, with an
//! optional YAML file for the compliance and report rule sets.

use std::fs;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use novum_compliance::ComplianceConfig;
use novum_db::DbConfig;
use novum_report::{MailerConfig, ReportConfig};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db: DbConfig,
    pub mailer: MailerConfig,
    pub compliance: ComplianceConfig,
    pub report: ReportConfig,
    /// Hide literal error messages from API clients.
    pub production: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db: DbConfig::default(),
            mailer: MailerConfig::default(),
            compliance: ComplianceConfig::default(),
            report: ReportConfig::default(),
            production: false,
        }
    }
}

/// Shape of the `NOVUM_CONFIG` file. Omitted sections keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    compliance: Option<ComplianceConfig>,
    report: Option<ReportConfig>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("NOVUM_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read NOVUM_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
            // The sender address from the environment wins over the file.
            if let Ok(from) = std::env::var("NOVUM_EMAIL_FROM") {
                config.report.from = from;
            }
        }
        Ok(config)
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(bind) = var("NOVUM_BIND") {
            config.bind_addr = bind.parse().with_context(|| "parse NOVUM_BIND")?;
        }
        if let Some(url) = var("NOVUM_DB_URL") {
            config.db.url = url;
        }
        if let Some(ns) = var("NOVUM_DB_NAMESPACE") {
            config.db.namespace = ns;
        }
        if let Some(db) = var("NOVUM_DB_DATABASE") {
            config.db.database = db;
        }
        if let Some(user) = var("NOVUM_DB_USERNAME") {
            config.db.username = user;
        }
        if let Some(pass) = var("NOVUM_DB_PASSWORD") {
            config.db.password = pass;
        }
        config.mailer.api_key = var("RESEND_API_KEY");
        if let Some(from) = var("NOVUM_EMAIL_FROM") {
            config.report.from = from;
        }
        config.production = var("NOVUM_ENV").is_some_and(|env| env.eq_ignore_ascii_case("production"));

        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let file: FileConfig =
            serde_yaml::from_str(contents).with_context(|| "parse server config yaml")?;
        if let Some(compliance) = file.compliance {
            self.compliance = compliance;
        }
        if let Some(report) = file.report {
            self.report = report;
        }
        Ok(())
    }
}
