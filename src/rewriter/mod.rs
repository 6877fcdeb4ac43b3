mod encode;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::resolver::is_text;

pub use encode::encode_uri;

static URL_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(src|href|url)=["']([^"']+)["']"#).expect("valid regex"));

#[derive(Debug, Clone, Default)]
pub struct ContentRewriter {
    origins: Vec<String>,
}

impl ContentRewriter {
    pub fn new(origins: Vec<String>) -> Self {
        Self { origins }
    }

    pub fn rewrite(&self, bytes: Vec<u8>, content_type: &str) -> Vec<u8> {
        if !is_text(content_type) {
            return bytes;
        }
        match String::from_utf8(bytes) {
            Ok(text) => self.rewrite_text(&text).into_bytes(),
            Err(err) => {
                tracing::debug!(content_type, "skipping rewrite of non UTF-8 text");
                err.into_bytes()
            }
        }
    }

    pub fn rewrite_text(&self, text: &str) -> String {
        let stripped = strip_origins(text, &self.origins);
        normalize_url_attributes(&stripped)
    }
}

pub fn strip_origins(text: &str, origins: &[String]) -> String {
    origins.iter().fold(text.to_string(), |acc, origin| {
        acc.replace(&format!("{}/", origin.trim_end_matches('/')), "")
    })
}

pub fn normalize_url_attributes(text: &str) -> String {
    URL_ATTRIBUTE
        .replace_all(text, |caps: &Captures| {
            format!("{}=\"{}\"", &caps[1], encode_uri(&caps[2]))
        })
        .into_owned()
}
