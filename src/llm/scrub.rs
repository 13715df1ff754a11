use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Google key/token prefixes plus the header, query and JSON markers that
/// precede credentials in provider error bodies.
const SECRET_MARKERS: [&str; 14] = [
    "AIza",
    "ya29.",
    "GOCSPX-",
    "eyJ",
    "Authorization: Bearer ",
    "authorization: bearer ",
    "x-goog-api-key: ",
    "api_key=",
    "access_token=",
    "key=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"token\":\"",
    "\"secret\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    input[from..]
        .char_indices()
        .find(|(_, c)| !is_secret_char(*c))
        .map_or(input.len(), |(i, _)| from + i)
}

fn scrub_after_marker(scrubbed: &mut String, marker: &str) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        // Bare markers without a value stay.
        if end == content_start {
            search_from = content_start;
            continue;
        }

        scrubbed.replace_range(start..end, REDACTED);
        search_from = start + REDACTED.len();
    }
}

/// Scrub credential-like tokens from text that may leave the process.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    if !SECRET_MARKERS.iter().any(|marker| input.contains(marker)) {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in SECRET_MARKERS {
        scrub_after_marker(&mut scrubbed, marker);
    }
    Cow::Owned(scrubbed)
}

/// Sanitize API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let scrubbed = scrubbed.as_ref();
    let end = scrubbed
        .char_indices()
        .nth(MAX_API_ERROR_CHARS)
        .map_or(scrubbed.len(), |(i, _)| i);
    format!("{}...", &scrubbed[..end])
}
