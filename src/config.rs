use std::env;

use time::Duration;

use crate::error::{AppError, AppResult};

const DEFAULT_TOKEN_LIFETIME: Duration = Duration::days(7);

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub mongodb_url: String,
    pub mongodb_database: String,

    // JWT
    pub jwt_secret: Option<String>,
    pub jwt_expires_in: Duration,

    // Password hashing (Argon2 time cost)
    pub password_hash_cost: u32,

    // Server
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        Ok(Self {
            // Database
            mongodb_url: env::var("MONGODB_URL")
                .map_err(|_| ConfigError::Missing("MONGODB_URL"))?,
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "folio".to_string()),

            // JWT
            jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            jwt_expires_in: match env::var("JWT_EXPIRES_IN") {
                Ok(raw) if !raw.trim().is_empty() => parse_token_lifetime(&raw)
                    .ok_or(ConfigError::Invalid("JWT_EXPIRES_IN"))?,
                _ => DEFAULT_TOKEN_LIFETIME,
            },

            password_hash_cost: env::var("PASSWORD_HASH_COST")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .ok()
                .filter(|cost| *cost >= 1)
                .ok_or(ConfigError::Invalid("PASSWORD_HASH_COST"))?,

            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT"))?,
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Token signing secret. Its absence only surfaces when a token is issued or checked.
    pub fn signing_secret(&self) -> AppResult<&str> {
        self.jwt_secret
            .as_deref()
            .ok_or_else(|| AppError::Config("JWT_SECRET is not set".to_string()))
    }
}

/// Parse a token lifetime: an all-digit string is a number of seconds,
/// anything else is a duration literal such as `7d`, `12h` or `2 weeks`.
pub fn parse_token_lifetime(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse::<i64>().ok().map(Duration::seconds);
    }
    parse_duration_literal(raw)
}

fn parse_duration_literal(raw: &str) -> Option<Duration> {
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    let millis_per_unit: f64 = match unit.trim().to_ascii_lowercase().as_str() {
        // A bare number with a fraction or sign falls through here: milliseconds
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        "d" | "day" | "days" => 86_400_000.0,
        "w" | "week" | "weeks" => 604_800_000.0,
        "y" | "yr" | "yrs" | "year" | "years" => 31_557_600_000.0,
        _ => return None,
    };

    let millis = (value * millis_per_unit).round();
    if millis < 1_000.0 || millis > i64::MAX as f64 {
        return None;
    }
    Some(Duration::milliseconds(millis as i64))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_lifetime_is_seconds() {
        assert_eq!(parse_token_lifetime("3600"), Some(Duration::hours(1)));
        assert_eq!(parse_token_lifetime(" 90 "), Some(Duration::seconds(90)));
    }

    #[test]
    fn test_duration_literals() {
        assert_eq!(parse_token_lifetime("7d"), Some(Duration::days(7)));
        assert_eq!(parse_token_lifetime("12h"), Some(Duration::hours(12)));
        assert_eq!(parse_token_lifetime("30m"), Some(Duration::minutes(30)));
        assert_eq!(parse_token_lifetime("2 weeks"), Some(Duration::weeks(2)));
        assert_eq!(parse_token_lifetime("1.5h"), Some(Duration::minutes(90)));
        assert_eq!(parse_token_lifetime("10 Days"), Some(Duration::days(10)));
    }

    #[test]
    fn test_invalid_lifetimes() {
        assert_eq!(parse_token_lifetime(""), None);
        assert_eq!(parse_token_lifetime("soon"), None);
        assert_eq!(parse_token_lifetime("5 fortnights"), None);
        assert_eq!(parse_token_lifetime("-3d"), None);
        // Below one second a token would be useless
        assert_eq!(parse_token_lifetime("500ms"), None);
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let config = Config {
            mongodb_url: String::new(),
            mongodb_database: String::new(),
            jwt_secret: None,
            jwt_expires_in: DEFAULT_TOKEN_LIFETIME,
            password_hash_cost: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origin: String::new(),
            log_format: LogFormat::Pretty,
        };

        assert!(matches!(config.signing_secret(), Err(AppError::Config(_))));
    }
}
