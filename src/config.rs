use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    pub fn new(database_url: impl Into<String>) -> Self {
        Config {
            database_url: database_url.into(),
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Reads `DATABASE_URL`, `APP_HOST`, `APP_PORT` and
    /// `DATABASE_MAX_CONNECTIONS`. Only the database url is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let mut config = Config::new(database_url);

        if let Some(host) = parse_var::<IpAddr>(&lookup, "APP_HOST")? {
            config.addr.set_ip(host);
        }
        if let Some(port) = parse_var::<u16>(&lookup, "APP_PORT")? {
            config.addr.set_port(port);
        }
        if let Some(max_connections) = parse_var::<u32>(&lookup, "DATABASE_MAX_CONNECTIONS")? {
            config.max_connections = max_connections;
        }
        Ok(config)
    }

    /// In-memory SQLite lives and dies with its connection.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {:?}", key, value)),
        None => Ok(None),
    }
}
