use std::path::PathBuf;

use url::Url;

use crate::policy::StubResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    pub sequence: u64,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResource {
    pub sequence: u64,
    pub url: Url,
    pub path: PathBuf,
    pub content_type: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Stubbed(StubResponse),
    Skipped,
    Saved(SavedResource),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub target: Url,
    pub output_root: PathBuf,
    pub files_saved: usize,
    pub observed: u64,
    pub stubbed: usize,
    pub skipped: usize,
    pub failed: usize,
}
