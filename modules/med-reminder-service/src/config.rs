use crate::error::ConfigError;
use crate::sms_api::{IprogSettings, DEFAULT_IPROG_URL};
use med_reminder_types::{DeliveryPolicy, TriggerMode};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;
const DEFAULT_SENDER_ID: &str = "MedicalAlert";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub trigger_mode: TriggerMode,
    pub scan_interval_secs: u64,
    pub mark_delivered_on: DeliveryPolicy,
    pub sms: IprogSettings,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_token = get("IPROG_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("IPROG_API_TOKEN"))?;

        let port = match get("MED_REMINDER_PORT") {
            Some(v) => parse_var("MED_REMINDER_PORT", &v)?,
            None => match get("PORT") {
                Some(v) => parse_var("PORT", &v)?,
                None => DEFAULT_PORT,
            },
        };

        let scan_interval_secs =
            positive("MED_REMINDER_SCAN_INTERVAL", &get, DEFAULT_SCAN_INTERVAL_SECS)?;
        let timeout_secs = positive("IPROG_TIMEOUT_SECS", &get, DEFAULT_TIMEOUT_SECS)?;

        let sender_id = match get("IPROG_SENDER_ID") {
            Some(s) if s.trim().is_empty() => None,
            Some(s) => Some(s),
            None => Some(DEFAULT_SENDER_ID.to_string()),
        };

        Ok(Self {
            host: get("MED_REMINDER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            trigger_mode: optional::<TriggerMode>("MED_REMINDER_TRIGGER", &get)?.unwrap_or_default(),
            scan_interval_secs,
            mark_delivered_on: optional::<DeliveryPolicy>("MED_REMINDER_MARK_DELIVERED_ON", &get)?
                .unwrap_or_default(),
            sms: IprogSettings {
                api_url: get("IPROG_API_URL").unwrap_or_else(|| DEFAULT_IPROG_URL.to_string()),
                api_token,
                sender_id,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn optional<T>(
    name: &'static str,
    get: &impl Fn(&str) -> Option<String>,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(name).map(|v| parse_var(name, &v)).transpose()
}

fn positive(
    name: &'static str,
    get: &impl Fn(&str) -> Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    match optional::<u64>(name, get)? {
        Some(0) => Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        }),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}
