use std::path::Path;

/// Content type for a file extension.
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    Some(match ext.to_lowercase().as_str() {
        "ttl" => "text/turtle",
        "n3" => "text/n3",
        // N-Triples is a subset of N-Quads
        "nt" | "nq" => "application/n-quads",
        "jsonld" | "json" => "application/ld+json",
        "rdf" | "xml" | "owl" => "application/rdf+xml",
        "html" | "htm" => "text/html",
        "xhtml" => "application/xhtml+xml",
        "ru" | "rq" => "application/sparql-update",
        _ => return None,
    })
}

/// Detect the content type of the input.
///
/// Priority: file extension > content sniffing. `None` leaves the choice to
/// the parser's configured default.
pub fn detect_content_type(path: Option<&Path>, content: &str) -> Option<&'static str> {
    if let Some(ext) = path.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
        if let Some(content_type) = content_type_for_extension(ext) {
            return Some(content_type);
        }
    }
    sniff_content_type(content)
}

fn sniff_content_type(content: &str) -> Option<&'static str> {
    let head = content.trim_start();
    if head.starts_with('{') || head.starts_with('[') {
        // Attempt JSON parse for robust detection (not just first-char)
        if serde_json::from_str::<serde_json::Value>(content).is_ok() {
            return Some("application/ld+json");
        }
    }
    if head.starts_with("<?xml") || head.starts_with("<rdf:RDF") {
        return Some("application/rdf+xml");
    }
    let lower = head.get(..15).unwrap_or(head).to_ascii_lowercase();
    if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        return Some("text/html");
    }
    None
}
