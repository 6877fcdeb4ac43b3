use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::sync::mpsc;
use url::Url;

use crate::{
    error::NavigationError,
    observer::{request_through, RequestEvent},
};

use super::BrowserSession;

#[derive(Debug, Deserialize)]
struct HarLog {
    log: HarRoot,
}

#[derive(Debug, Deserialize)]
struct HarRoot {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    request: HarRequest,
}

#[derive(Debug, Deserialize)]
struct HarRequest {
    url: String,
}

#[derive(Debug, Clone)]
pub struct HarReplay {
    path: PathBuf,
}

impl HarReplay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(super) fn recorded_urls(contents: &str) -> Result<Vec<String>, serde_json::Error> {
    let har: HarLog = serde_json::from_str(contents)?;
    Ok(har
        .log
        .entries
        .into_iter()
        .map(|entry| entry.request.url)
        .collect())
}

impl BrowserSession for HarReplay {
    async fn navigate(
        &mut self,
        target: &Url,
        events: mpsc::Sender<RequestEvent>,
    ) -> Result<(), NavigationError> {
        let har_error = |message: String| NavigationError::Har {
            path: self.path.clone(),
            message,
        };
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| har_error(err.to_string()))?;
        let urls = recorded_urls(&contents).map_err(|err| har_error(err.to_string()))?;

        tracing::debug!(%target, entries = urls.len(), "replaying HAR recording");
        for url in urls {
            if request_through(&events, url).await.is_none() {
                break;
            }
        }
        Ok(())
    }
}
