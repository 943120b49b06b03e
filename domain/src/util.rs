//! Shared utility functions.

/// Longest prefix of `s` no longer than `max_bytes` that ends on a char boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Shortened copy of `s` for logs and error messages, marked with `…` when cut.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let cut = truncate_str(s, max_bytes);
    if cut.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…", cut)
    }
}
