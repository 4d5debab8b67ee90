//! Quoted argument tokenizer.
//!
//! Arguments look like `"first" "second"`: double-quoted segments separated
//! by whitespace. A segment boundary is a closing quote, whitespace, then an
//! opening quote, so quotes inside a segment survive as long as they are not
//! laid out exactly like a boundary.

/// Byte ranges `(close_quote, after_open_quote)` of every segment boundary
/// inside `inner`.
fn boundaries(inner: &str) -> Vec<(usize, usize)> {
    let bytes = inner.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'"' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() && bytes[j] == b'"' {
                found.push((i, j + 1));
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
    found
}

/// Text between the outermost quotes, if `input` is wrapped in them.
fn unwrap_quotes(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        Some(&trimmed[1..trimmed.len() - 1])
    } else {
        None
    }
}

/// Split `input` into its quoted segments.
///
/// Returns `None` if the input is not quoted or any segment is empty.
pub fn quoted_fields(input: &str) -> Option<Vec<&str>> {
    let inner = unwrap_quotes(input)?;

    let mut fields = Vec::new();
    let mut start = 0;
    for (close, next) in boundaries(inner) {
        fields.push(&inner[start..close]);
        start = next;
    }
    fields.push(&inner[start..]);

    if fields.iter().any(|f| f.is_empty()) {
        return None;
    }
    Some(fields)
}

/// Exactly `N` quoted segments.
pub fn exact_fields<const N: usize>(input: &str) -> Option<[&str; N]> {
    quoted_fields(input)?.try_into().ok()
}

/// Split `"description..." "filename"` at its last segment boundary.
///
/// Everything before the boundary is the description, verbatim, so it may
/// itself contain quotes and commas.
pub fn description_and_filename(input: &str) -> Option<(&str, &str)> {
    let inner = unwrap_quotes(input)?;
    let (close, next) = *boundaries(inner).last()?;

    let description = &inner[..close];
    let filename = &inner[next..];
    if description.is_empty() || filename.is_empty() {
        return None;
    }
    Some((description, filename))
}
