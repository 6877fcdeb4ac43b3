pub mod browser;
pub mod config;
pub mod error;
pub mod fetcher;
#[cfg(feature = "cli")]
pub mod logging;
pub mod observer;
pub mod policy;
pub mod resolver;
pub mod rewriter;
pub mod session;
