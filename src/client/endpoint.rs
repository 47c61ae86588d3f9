//! `host:port` pairs naming a running node.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Incorrect host:port pair provided (example of valid value 'localhost:8080')")]
    Format,

    #[error("Can't parse port from {0} value")]
    Port(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    host: String,
    port: u16,
}

impl NodeEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL of the node's REST endpoint.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}:{}/", self.host, self.port))
    }
}

impl FromStr for NodeEndpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [host, port] if !host.is_empty() && !port.is_empty() => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| EndpointError::Port(port.to_string()))?;
                Ok(NodeEndpoint::new(*host, port))
            }
            _ => Err(EndpointError::Format),
        }
    }
}

impl fmt::Display for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let endpoint: NodeEndpoint = "localhost:8080".parse().unwrap();
        assert_eq!(endpoint, NodeEndpoint::new("localhost", 8080));
        assert_eq!(endpoint.to_string(), "localhost:8080");
        assert_eq!(endpoint.base_url().unwrap().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["badformat", "a:b:c", ":8080", "localhost:", ""] {
            assert_eq!(bad.parse::<NodeEndpoint>(), Err(EndpointError::Format), "{bad}");
        }

        let err = "localhost:http".parse::<NodeEndpoint>().unwrap_err();
        assert_eq!(err.to_string(), "Can't parse port from http value");
        assert_eq!(
            EndpointError::Format.to_string(),
            "Incorrect host:port pair provided (example of valid value 'localhost:8080')"
        );
    }
}
