mod models;
mod persist;
mod printer;

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Mutex, PoisonError,
    },
};

use url::Url;

use crate::{
    config::ScopeConfig,
    error::CaptureError,
    fetcher::ResourceFetcher,
    policy::{Decision, InterceptPolicy, StubResponse},
    resolver::resolve_path,
    rewriter::ContentRewriter,
};

pub use models::{Handled, InterceptedRequest, SavedResource, SessionSummary};
pub use printer::{print_intro, print_navigation_error, print_summary};

#[derive(Debug)]
pub struct MirrorSession {
    output_root: PathBuf,
    policy: InterceptPolicy,
    fetcher: ResourceFetcher,
    rewriter: ContentRewriter,
    counter: AtomicU64,
    written: Mutex<BTreeSet<PathBuf>>,
    stubbed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl MirrorSession {
    pub fn new(output_root: impl Into<PathBuf>, scope: ScopeConfig, fetcher: ResourceFetcher) -> Self {
        let rewriter = ContentRewriter::new(scope.rewrite_origins.clone());
        Self {
            output_root: output_root.into(),
            policy: InterceptPolicy::new(scope),
            fetcher,
            rewriter,
            counter: AtomicU64::new(0),
            written: Mutex::new(BTreeSet::new()),
            stubbed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn scope(&self) -> &ScopeConfig {
        self.policy.scope()
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn observe(&self, raw_url: &str) -> Result<InterceptedRequest, CaptureError> {
        let sequence = self.next_sequence();
        match self.locate(raw_url) {
            Ok(url) => Ok(InterceptedRequest { sequence, url }),
            Err(err) => {
                self.record_failure(sequence, raw_url, &err);
                Err(err)
            }
        }
    }

    pub fn stub_unparsed(&self, raw_url: &str) -> Option<StubResponse> {
        let stub = self.policy.stub_for(raw_url)?;
        let sequence = self.next_sequence();
        self.stubbed.fetch_add(1, Ordering::Relaxed);
        printer::print_stubbed(sequence, raw_url, &stub.marker);
        Some(stub)
    }

    fn next_sequence(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn locate(&self, raw_url: &str) -> Result<Url, CaptureError> {
        let invalid = |source: url::ParseError| CaptureError::InvalidUrl {
            url: raw_url.to_string(),
            source,
        };
        match &self.scope().base_url {
            Some(base) if raw_url.starts_with('/') => {
                let joined = format!("{}{}", base.as_str().trim_end_matches('/'), raw_url);
                Url::parse(&joined).map_err(invalid)
            }
            _ => Url::parse(raw_url).map_err(invalid),
        }
    }

    pub fn decide(&self, request: &InterceptedRequest) -> Decision {
        let decision = self.policy.decide(&request.url);
        tracing::trace!(sequence = request.sequence, url = %request.url, ?decision, "intercept decision");
        decision
    }

    pub fn note_decision(&self, request: &InterceptedRequest, decision: &Decision) {
        match decision {
            Decision::Stub(stub) => {
                self.stubbed.fetch_add(1, Ordering::Relaxed);
                printer::print_stubbed(request.sequence, request.url.as_str(), &stub.marker);
            }
            Decision::Skip => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                printer::print_skipped(request.sequence, &request.url);
            }
            Decision::Capture => {}
        }
    }

    pub async fn handle(&self, request: &InterceptedRequest) -> Handled {
        let decision = self.decide(request);
        self.note_decision(request, &decision);
        match decision {
            Decision::Stub(stub) => Handled::Stubbed(stub),
            Decision::Skip => Handled::Skipped,
            Decision::Capture => self.capture_reported(request).await,
        }
    }

    pub async fn capture_reported(&self, request: &InterceptedRequest) -> Handled {
        match self.capture(request).await {
            Ok(saved) => {
                printer::print_saved(&saved);
                Handled::Saved(saved)
            }
            Err(err) => {
                self.record_failure(request.sequence, request.url.as_str(), &err);
                Handled::Failed
            }
        }
    }

    pub async fn capture(&self, request: &InterceptedRequest) -> Result<SavedResource, CaptureError> {
        let fetched = self.fetcher.fetch(&request.url).await?;
        let resolved = resolve_path(&request.url, &fetched.content_type);
        let path = resolved.absolute(&self.output_root);
        let body = self.rewriter.rewrite(fetched.bytes, &fetched.content_type);

        // same-path captures race here; the last write wins
        persist::write_resource(&path, &body).await?;
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.clone());

        Ok(SavedResource {
            sequence: request.sequence,
            url: request.url.clone(),
            path,
            content_type: fetched.content_type,
            bytes: body.len(),
        })
    }

    fn record_failure(&self, sequence: u64, url: &str, err: &CaptureError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(sequence, url, error = ?err, "request not captured");
        printer::print_failed(sequence, url, err);
    }

    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            target: self.scope().target.clone(),
            output_root: self.output_root.clone(),
            files_saved: self.written.lock().unwrap_or_else(PoisonError::into_inner).len(),
            observed: self.counter.load(Ordering::SeqCst),
            stubbed: self.stubbed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
