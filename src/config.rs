//! Service configuration.
//!
//! Loaded from (in order of precedence):
//! 1. Environment variables (`PERSONS_API_*`, e.g. `PERSONS_API_PORT=9000`)
//! 2. Default values

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::router::DEFAULT_BODY_LIMIT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Interface to listen on.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest request body buffered before answering 413.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Fallback filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub json_logs: bool,

    /// Ids the person lookup treats as existing.
    #[serde(default = "default_person_ids")]
    pub person_ids: Vec<i64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    DEFAULT_BODY_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_person_ids() -> Vec<i64> {
    vec![1, 2, 3, 4, 5]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            log_level: default_log_level(),
            json_logs: false,
            person_ids: default_person_ids(),
        }
    }
}

impl Config {
    /// Loads configuration from the environment on top of the defaults.
    pub fn load() -> Result<Self, Error> {
        Ok(Self::figment().merge(Env::prefixed("PERSONS_API_")).extract::<Self>()?)
    }

    /// The defaults as a figment, for layering further providers.
    pub fn figment() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    /// `host:port`, ready for [`Server::bind`](crate::Server::bind).
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
