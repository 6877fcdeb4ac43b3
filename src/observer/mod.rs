use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinSet,
};

use crate::{
    browser::BrowserSession,
    error::NavigationError,
    policy::{Decision, StubResponse},
    session::{print_navigation_error, MirrorSession, SessionSummary},
};

pub const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Respond(StubResponse),
}

#[derive(Debug)]
pub struct RequestEvent {
    pub url: String,
    reply: oneshot::Sender<Disposition>,
}

impl RequestEvent {
    pub fn new(url: impl Into<String>) -> (Self, oneshot::Receiver<Disposition>) {
        let (reply, receiver) = oneshot::channel();
        (
            Self {
                url: url.into(),
                reply,
            },
            receiver,
        )
    }

    pub fn resolve(self, disposition: Disposition) {
        // the browser may have given up on the request already
        let _ = self.reply.send(disposition);
    }
}

pub struct RequestObserver {
    session: Arc<MirrorSession>,
}

impl RequestObserver {
    pub fn new(session: Arc<MirrorSession>) -> Self {
        Self { session }
    }

    pub async fn run(self, mut events: mpsc::Receiver<RequestEvent>) -> SessionSummary {
        let mut tasks = JoinSet::new();
        while let Some(event) = events.recv().await {
            self.dispatch(event, &mut tasks);
        }

        tracing::debug!(in_flight = tasks.len(), "event stream closed, draining captures");
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                tracing::error!(error = %err, "capture task did not complete");
            }
        }

        self.session.summary()
    }

    fn dispatch(&self, event: RequestEvent, tasks: &mut JoinSet<()>) {
        if let Some(stub) = self.session.stub_unparsed(&event.url) {
            event.resolve(Disposition::Respond(stub));
            return;
        }

        let Ok(request) = self.session.observe(&event.url) else {
            event.resolve(Disposition::Continue);
            return;
        };

        let decision = self.session.decide(&request);
        self.session.note_decision(&request, &decision);
        match decision {
            Decision::Stub(stub) => event.resolve(Disposition::Respond(stub)),
            Decision::Skip => event.resolve(Disposition::Continue),
            Decision::Capture => {
                event.resolve(Disposition::Continue);
                let session = Arc::clone(&self.session);
                tasks.spawn(async move {
                    session.capture_reported(&request).await;
                });
            }
        }
    }
}

pub async fn run_capture<B: BrowserSession>(
    browser: &mut B,
    session: Arc<MirrorSession>,
    navigation_timeout: Option<Duration>,
) -> SessionSummary {
    let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
    let target = session.scope().target.clone();
    let observer = RequestObserver::new(session);

    let navigation = async {
        let navigate = browser.navigate(&target, sender);
        let outcome = match navigation_timeout {
            Some(limit) => tokio::time::timeout(limit, navigate)
                .await
                .unwrap_or(Err(NavigationError::Timeout(limit))),
            None => navigate.await,
        };
        if let Err(err) = outcome {
            tracing::warn!(%target, error = %err, "navigation ended early");
            print_navigation_error(&target, &err);
        }
    };

    let ((), summary) = tokio::join!(navigation, observer.run(receiver));
    summary
}

pub async fn request_through(
    events: &mpsc::Sender<RequestEvent>,
    url: impl Into<String>,
) -> Option<Disposition> {
    let (event, decision) = RequestEvent::new(url);
    events.send(event).await.ok()?;
    decision.await.ok()
}
