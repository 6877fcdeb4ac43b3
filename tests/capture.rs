use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use httpmock::prelude::*;
use pagecapture::browser::{HarReplay, PageLoader};
use pagecapture::config::{load_config, ScopeBuilder, ScopeOverrides};
use pagecapture::fetcher::ResourceFetcher;
use pagecapture::observer::run_capture;
use pagecapture::session::MirrorSession;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn build_session(
    root: &Path,
    target: &str,
    config_dir: Option<&Path>,
    profile: Option<&str>,
    overrides: ScopeOverrides,
) -> Result<(Arc<MirrorSession>, reqwest::Client)> {
    let config = match config_dir {
        Some(dir) => load_config(dir)?,
        None => None,
    };
    let settings =
        ScopeBuilder::new(target, config, profile.map(str::to_string), overrides).build()?;
    let fetcher = ResourceFetcher::new(&settings.fetch)?;
    let client = fetcher.client().clone();
    Ok((
        Arc::new(MirrorSession::new(root, settings.scope, fetcher)),
        client,
    ))
}

#[tokio::test]
async fn page_and_stylesheet_are_mirrored() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/page");
            then.status(200)
                .header("content-type", "text/html")
                .body(r#"<link rel="stylesheet" href="/assets/style.css">"#);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/assets/style.css");
            then.status(200)
                .header("content-type", "text/css")
                .body("h1 { color: red }");
        })
        .await;

    let temp = tempdir()?;
    let (session, client) = build_session(
        temp.path(),
        &server.url("/page"),
        None,
        None,
        ScopeOverrides::default(),
    )?;

    let summary = run_capture(&mut PageLoader::new(client), Arc::clone(&session), None).await;

    assert_eq!(summary.files_saved, 2);
    assert_eq!(summary.observed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        session.written_paths(),
        vec![
            temp.path().join("assets/style.css"),
            temp.path().join("page.html"),
        ]
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("assets/style.css"))?,
        "h1 { color: red }"
    );
    Ok(())
}

#[tokio::test]
async fn profile_enables_local_only_and_stub_markers() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).header("content-type", "text/html").body(
                r#"<script src="/lock/guard.js"></script><script src="https://ads.invalid/a.js"></script><img src="/logo.png">"#,
            );
        })
        .await;
    let guard = server
        .mock_async(|when, then| {
            when.path("/lock/guard.js");
            then.status(200).body("guard()");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.path("/logo.png");
            then.status(200)
                .header("content-type", "image/png")
                .body([0x89u8, b'P', b'N', b'G']);
        })
        .await;

    let temp = tempdir()?;
    let config_dir = tempdir()?;
    fs::write(
        config_dir.path().join("pagecapture.json"),
        r#"{
  "defaultProfile": "strict",
  "profiles": {
    "strict": { "localOnly": true, "stubMarkers": ["guard.js"] }
  }
}"#,
    )?;

    let (session, client) = build_session(
        temp.path(),
        &server.url("/"),
        Some(config_dir.path()),
        None,
        ScopeOverrides::default(),
    )?;
    let summary = run_capture(&mut PageLoader::new(client), session, None).await;

    assert_eq!(summary.observed, 4);
    assert_eq!(summary.files_saved, 2);
    assert_eq!(summary.stubbed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(guard.hits_async().await, 0);
    assert_eq!(
        fs::read(temp.path().join("logo.png"))?,
        vec![0x89u8, b'P', b'N', b'G']
    );
    assert!(!temp.path().join("lock/guard.js").exists());
    Ok(())
}

#[tokio::test]
async fn har_replay_resolves_root_relative_entries() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/play/data/level.json");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"level":1}"#);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.js");
            then.status(404);
        })
        .await;

    let temp = tempdir()?;
    let har_dir = tempdir()?;
    let har_path = har_dir.path().join("session.har");
    fs::write(
        &har_path,
        format!(
            r#"{{"log":{{"version":"1.2","entries":[
  {{"request":{{"method":"GET","url":"/data/level.json"}}}},
  {{"request":{{"method":"GET","url":"{}"}}}}
]}}}}"#,
            server.url("/missing.js")
        ),
    )?;

    let overrides = ScopeOverrides {
        base_url: Some(server.url("/play/")),
        ..ScopeOverrides::default()
    };
    let (session, _client) = build_session(
        temp.path(),
        &server.url("/play/"),
        None,
        None,
        overrides,
    )?;

    let summary = run_capture(&mut HarReplay::new(&har_path), session, None).await;

    assert_eq!(summary.observed, 2);
    assert_eq!(summary.files_saved, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        fs::read_to_string(temp.path().join("play/data/level.json"))?,
        r#"{"level":1}"#
    );
    Ok(())
}
