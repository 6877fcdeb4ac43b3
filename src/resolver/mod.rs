mod extensions;

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

pub use extensions::{essence, extension_for_content_type, is_text};

const INDEX_STEM: &str = "index";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedPath {
    pub relative: PathBuf,
    pub extension: String,
}

impl ResolvedPath {
    pub fn absolute(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.relative)
    }
}

pub fn resolve_path(url: &Url, content_type: &str) -> ResolvedPath {
    let decoded = percent_decode_str(url.path()).decode_utf8_lossy();
    // decoding may surface a literal `?` or `#`
    let stripped = decoded
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();

    let mut segments: Vec<String> = stripped
        .split(|c: char| c == '/' || c == '\\')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .map(str::to_string)
        .collect();

    let mapped = extension_for_content_type(content_type);
    let directory_like = stripped.ends_with('/') || stripped.ends_with('\\') || segments.is_empty();

    let leaf = if directory_like { None } else { segments.pop() };
    let (file_name, extension) = match leaf {
        None => {
            let extension = mapped.unwrap_or("html");
            (format!("{INDEX_STEM}.{extension}"), extension.to_string())
        }
        Some(name) => match existing_extension(&name) {
            Some(existing) => (name, existing),
            None => {
                let extension = mapped.unwrap_or(if is_text(content_type) { "html" } else { "bin" });
                (format!("{name}.{extension}"), extension.to_string())
            }
        },
    };
    segments.push(file_name);

    ResolvedPath {
        relative: segments.iter().collect(),
        extension,
    }
}

fn existing_extension(segment: &str) -> Option<String> {
    Path::new(segment)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .filter(|ext| !ext.is_empty())
}
