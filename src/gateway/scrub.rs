use std::borrow::Cow;

const MAX_ERROR_BODY_CHARS: usize = 200;

const MARKERS: [&str; 8] = [
    "Bearer ",
    "bearer ",
    "token=",
    "api_key=",
    "\"token\":\"",
    "\"auth_token\":\"",
    "\"access_token\":\"",
    "\"api_key\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    let mut end = from;
    for (i, c) in input[from..].char_indices() {
        if is_secret_char(c) {
            end = from + i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

fn redact_after(scrubbed: &mut String, marker: &str) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let value_start = search_from + rel + marker.len();
        let end = token_end(scrubbed, value_start);

        // Bare marker, nothing to hide.
        if end == value_start {
            search_from = value_start;
            continue;
        }

        scrubbed.replace_range(value_start..end, "[REDACTED]");
        search_from = value_start + "[REDACTED]".len();
    }
}

/// Redact credential-looking values from text echoed back by the service.
pub fn scrub_credentials(input: &str) -> Cow<'_, str> {
    if !MARKERS.iter().any(|marker| input.contains(marker)) {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in MARKERS {
        redact_after(&mut scrubbed, marker);
    }
    Cow::Owned(scrubbed)
}

/// Scrub and truncate an error body before it is surfaced to the user.
pub fn sanitize_error_body(input: &str) -> String {
    let scrubbed = scrub_credentials(input.trim());

    if scrubbed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return scrubbed.into_owned();
    }

    let scrubbed = scrubbed.as_ref();
    let mut end = MAX_ERROR_BODY_CHARS;
    while end > 0 && !scrubbed.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &scrubbed[..end])
}
