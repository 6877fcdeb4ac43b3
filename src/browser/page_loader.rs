use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tokio::sync::mpsc;
use url::Url;

use crate::{
    error::NavigationError,
    fetcher::declared_content_type,
    observer::{request_through, Disposition, RequestEvent},
    resolver::essence,
};

use super::BrowserSession;

static SRC_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<(?:script|img|iframe|source|audio|video|embed|input|track)\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#,
    )
    .expect("valid regex")
});

static LINK_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<link\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

#[derive(Debug, Clone)]
pub struct PageLoader {
    client: Client,
}

impl PageLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl BrowserSession for PageLoader {
    async fn navigate(
        &mut self,
        target: &Url,
        events: mpsc::Sender<RequestEvent>,
    ) -> Result<(), NavigationError> {
        match request_through(&events, target.as_str()).await {
            Some(Disposition::Continue) => {}
            Some(Disposition::Respond(_)) | None => return Ok(()),
        }

        let load_error = |message: String| NavigationError::Load {
            url: target.to_string(),
            message,
        };

        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(|err| load_error(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(load_error(format!("HTTP {}", status.as_u16())));
        }

        let document_url = response.url().clone();
        let content_type = essence(&declared_content_type(response.headers()));
        if content_type != "text/html" && content_type != "application/xhtml+xml" {
            tracing::debug!(%document_url, content_type = %content_type, "target is not a document");
            return Ok(());
        }

        let html = response
            .text()
            .await
            .map_err(|err| load_error(err.to_string()))?;

        for resource in subresources(&html, &document_url) {
            if request_through(&events, resource.as_str()).await.is_none() {
                break;
            }
        }
        Ok(())
    }
}

pub fn subresources(html: &str, document_url: &Url) -> Vec<Url> {
    let mut found: Vec<(usize, &str)> = SRC_ATTRIBUTE
        .captures_iter(html)
        .chain(LINK_HREF.captures_iter(html))
        .filter_map(|caps| caps.get(1))
        .map(|value| (value.start(), value.as_str()))
        .collect();
    found.sort_by_key(|(start, _)| *start);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter_map(|(_, raw)| document_url.join(raw.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
