use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[cfg(feature = "remote-http")]
use url::ParseError as UrlParseError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum SiloError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("Remote persistence error: {0}")]
    Remote(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SiloError {
    fn from(src: toml::de::Error) -> SiloError {
        SiloError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for SiloError {
    fn from(src: toml::ser::Error) -> SiloError {
        SiloError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for SiloError {
    fn from(src: JsonError) -> SiloError {
        SiloError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<uuid::Error> for SiloError {
    fn from(src: uuid::Error) -> SiloError {
        SiloError::Serialization(format!("UUID conversion failed: {src}"))
    }
}

#[cfg(feature = "remote-http")]
impl From<UrlParseError> for SiloError {
    fn from(src: UrlParseError) -> SiloError {
        SiloError::Config(format!("Invalid URL: {src}"))
    }
}

#[cfg(feature = "remote-http")]
impl From<reqwest::Error> for SiloError {
    fn from(src: reqwest::Error) -> SiloError {
        if src.is_timeout() {
            SiloError::Remote(format!("Request timed out: {src}"))
        } else if src.is_connect() {
            SiloError::Remote(format!("Connection failed: {src}"))
        } else {
            SiloError::Remote(format!("{src}"))
        }
    }
}

impl From<io::Error> for SiloError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => SiloError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => SiloError::PermissionDenied,
            _ => SiloError::Io(format!("IOError: {}", x.kind())),
        }
    }
}
