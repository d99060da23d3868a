//! Runtime configuration of the diagnosis service.
//!
//! Settings come from the process environment, after loading a `.env` file when one exists.

use crate::util::{DiagnetError, Result};

use std::net::{IpAddr, SocketAddr};


pub const HOST_VAR: &str = "DIAGNET_HOST";
pub const PORT_VAR: &str = "DIAGNET_PORT";
pub const CORS_ORIGIN_VAR: &str = "DIAGNET_CORS_ORIGIN";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;


#[derive(Clone, Debug, PartialEq)]
pub struct Config {

    /// address to bind
    pub host: IpAddr,

    pub port: u16,

    /// when set, browsers from this origin may call the API
    pub cors_origin: Option<String>

}


impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            cors_origin: None
        }
    }
}


impl Config {

    /// Read the configuration from the environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value
    ///
    /// # Errors
    /// `DiagnetError::InvalidConfig` if a value is set but cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
        where F: Fn(&str) -> Option<String>
    {
        let host = lookup(HOST_VAR).unwrap_or_else(|| String::from(DEFAULT_HOST));
        let host = host.trim()
                       .parse::<IpAddr>()
                       .map_err(|e| DiagnetError::InvalidConfig(format!("{}={}: {}", HOST_VAR, host, e)))?;

        let port = match lookup(PORT_VAR) {
            Some(p) => p.trim()
                        .parse::<u16>()
                        .map_err(|e| DiagnetError::InvalidConfig(format!("{}={}: {}", PORT_VAR, p, e)))?,
            None => DEFAULT_PORT
        };

        let cors_origin = lookup(CORS_ORIGIN_VAR)
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());

        Ok(Config { host, port, cors_origin })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter()
                                                .map(|(k, v)| (k.to_string(), v.to_string()))
                                                .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(Config::default(), config);
        assert_eq!("0.0.0.0:5000", config.addr().to_string());
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            (HOST_VAR, "127.0.0.1"),
            (PORT_VAR, " 8080 "),
            (CORS_ORIGIN_VAR, "http://localhost:3000"),
        ])).unwrap();

        assert_eq!("127.0.0.1:8080", config.addr().to_string());
        assert_eq!(Some(String::from("http://localhost:3000")), config.cors_origin);
    }

    #[test]
    fn blank_origin_is_unset() {
        let config = Config::from_lookup(lookup(&[(CORS_ORIGIN_VAR, "  ")])).unwrap();
        assert_eq!(None, config.cors_origin);
    }

    #[test]
    fn invalid_values() {
        match Config::from_lookup(lookup(&[(PORT_VAR, "http")])) {
            Err(DiagnetError::InvalidConfig(msg)) => assert!(msg.contains(PORT_VAR)),
            other => panic!("unexpected result {:?}", other)
        };

        assert!(Config::from_lookup(lookup(&[(PORT_VAR, "70000")])).is_err());
        assert!(Config::from_lookup(lookup(&[(HOST_VAR, "localhost")])).is_err());
    }
}
