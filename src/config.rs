use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::codec::WireFormat;
use crate::pipeline::DEFAULT_RECEIVE_TIMEOUT;
use crate::service::ServiceOptions;
use crate::track::{CalculationConfig, CalculationConfigError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid calculation section: {0}")]
    Calculation(#[from] CalculationConfigError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub receiver: ReceiverConfig,
    pub sender: SenderConfig,
    #[serde(default)]
    pub calculation: CalculationConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiverConfig {
    pub bind: String,
    #[serde(default)]
    pub multicast_group: Option<Ipv4Addr>,
    #[serde(default = "default_interface")]
    pub interface: Ipv4Addr,
    #[serde(default)]
    pub format: WireFormat,
    #[serde(default = "default_receive_timeout", deserialize_with = "humantime_duration")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenderConfig {
    pub target: String,
    #[serde(default = "default_sender_bind")]
    pub bind: String,
    #[serde(default = "default_ttl")]
    pub multicast_ttl: u32,
    #[serde(default)]
    pub format: WireFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_stats_interval", deserialize_with = "humantime_duration")]
    pub stats_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            stats_interval: default_stats_interval(),
        }
    }
}

impl ServiceConfig {
    pub fn options(&self) -> ServiceOptions {
        ServiceOptions {
            stats_interval: self.stats_interval,
        }
    }
}

fn default_interface() -> Ipv4Addr {
    Ipv4Addr::UNSPECIFIED
}

fn default_receive_timeout() -> Duration {
    DEFAULT_RECEIVE_TIMEOUT
}

fn default_sender_bind() -> String {
    "0.0.0.0:0".to_string()
}

fn default_ttl() -> u32 {
    1
}

fn default_stats_interval() -> Duration {
    ServiceOptions::default().stats_interval
}

fn humantime_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calculation.validate()?;
        if let Some(group) = self.receiver.multicast_group {
            if !group.is_multicast() {
                return Err(ConfigError::Invalid(format!(
                    "receiver.multicast_group {} is not a multicast address",
                    group
                )));
            }
        }
        self.receiver_addr()?;
        self.sender_bind_addr()?;
        self.sender_target_addr()?;
        Ok(())
    }

    pub fn receiver_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_addr("receiver.bind", &self.receiver.bind)
    }

    pub fn sender_bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_addr("sender.bind", &self.sender.bind)
    }

    pub fn sender_target_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_addr("sender.target", &self.sender.target)
    }

    pub fn multicast(&self) -> Option<(Ipv4Addr, Ipv4Addr)> {
        self.receiver
            .multicast_group
            .map(|group| (group, self.receiver.interface))
    }
}

fn parse_addr(field: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("{}: {} ({})", field, value, e)))
}
