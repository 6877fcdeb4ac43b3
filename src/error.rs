use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid target URL {url}: {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("target URL {0} has no hostname")]
    MissingHost(String),
    #[error("invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid rewrite origin {0}")]
    InvalidOrigin(String),
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("navigation timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to load {url}: {message}")]
    Load { url: String, message: String },
    #[error("failed to read HAR file {path}: {message}")]
    Har { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("creating directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Persist(#[from] PersistenceError),
}
