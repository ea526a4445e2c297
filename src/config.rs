use std::{fmt, net::SocketAddr, path::PathBuf, str::FromStr};

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILTER: &str = "debug,hyper=error,tower_http=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    InvalidAddress(String),
    InvalidEnvironment(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAddress(value) => {
                write!(f, "APP_ADDRESS must be a socket address, got '{}'", value)
            }
            ConfigError::InvalidEnvironment(value) => write!(
                f,
                "APP_ENVIRONMENT must be Development or Production, got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub address: SocketAddr,
    pub environment: Environment,
    /// Directory of the daily JSON log files, `None` when file logging is off.
    pub log_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment. Call `dotenv()` first
    /// to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_address = lookup("APP_ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let address = raw_address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(raw_address.clone()))?;
        let environment = match lookup("APP_ENVIRONMENT") {
            Some(value) => value.parse()?,
            None => Environment::Production,
        };
        // An empty LOG_DIR turns file logging off.
        let log_dir = match lookup("LOG_DIR") {
            Some(dir) if dir.is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(PathBuf::from(DEFAULT_LOG_DIR)),
        };
        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Ok(Self {
            address,
            environment,
            log_dir,
            log_filter,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
