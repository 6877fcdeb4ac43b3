use url::Url;

use crate::config::ScopeConfig;

pub const DEFAULT_STUB_MARKERS: &[&str] = &["sitelock.js"];

pub const STUB_CONTENT_TYPE: &str = "application/javascript";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Stub(StubResponse),
    Skip,
    Capture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub marker: String,
}

impl StubResponse {
    pub fn for_marker(marker: &str) -> Self {
        Self {
            status: 200,
            content_type: STUB_CONTENT_TYPE,
            body: format!(
                "console.log(\"{} blocked\");",
                marker.replace('\\', "\\\\").replace('"', "\\\"")
            ),
            marker: marker.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InterceptPolicy {
    scope: ScopeConfig,
}

impl InterceptPolicy {
    pub fn new(scope: ScopeConfig) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &ScopeConfig {
        &self.scope
    }

    pub fn stub_for(&self, raw_url: &str) -> Option<StubResponse> {
        self.scope
            .stub_markers
            .iter()
            .find(|marker| raw_url.contains(marker.as_str()))
            .map(|marker| StubResponse::for_marker(marker))
    }

    pub fn decide(&self, url: &Url) -> Decision {
        if let Some(stub) = self.stub_for(url.as_str()) {
            return Decision::Stub(stub);
        }

        if self.scope.local_only {
            let in_scope = url
                .host_str()
                .map(|host| self.scope.is_allowed_host(host))
                .unwrap_or(false);
            if !in_scope {
                return Decision::Skip;
            }
        }

        Decision::Capture
    }
}
