pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

pub fn is_text(content_type: &str) -> bool {
    essence(content_type).starts_with("text/")
}

pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let essence = essence(content_type);
    preferred_extension(&essence).or_else(|| {
        mime_guess::get_mime_extensions_str(&essence)
            .and_then(|extensions| extensions.first().copied())
    })
}

// Canonical picks for types the registry maps to several extensions.
fn preferred_extension(essence: &str) -> Option<&'static str> {
    let ext = match essence {
        "text/html" => "html",
        "application/xhtml+xml" => "xhtml",
        "text/css" => "css",
        "application/javascript" | "text/javascript" | "application/x-javascript" => "js",
        "application/json" => "json",
        "application/manifest+json" => "webmanifest",
        "text/plain" => "txt",
        "text/csv" => "csv",
        "application/xml" | "text/xml" => "xml",
        "image/png" => "png",
        "image/jpeg" => "jpeg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "font/woff" | "application/font-woff" => "woff",
        "font/woff2" => "woff2",
        "font/ttf" => "ttf",
        "font/otf" => "otf",
        "application/wasm" => "wasm",
        "application/pdf" => "pdf",
        "audio/mpeg" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "video/mp4" => "mp4",
        "application/octet-stream" => "bin",
        _ => return None,
    };
    Some(ext)
}
