//! Candidate domain suffixes for a host.

/// Leading-dot suffixes of `host`, most general (fewest labels) first.
///
/// `a.b.example.com` yields `.com`, `.example.com`, `.b.example.com`,
/// `.a.b.example.com`. Empty labels (leading, trailing or doubled dots) are
/// ignored.
pub fn candidate_suffixes(host: &str) -> Vec<String> {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    (1..=labels.len())
        .map(|take| format!(".{}", labels[labels.len() - take..].join(".")))
        .collect()
}

/// Suffix used when no candidate round-trips: the whole host.
pub fn host_fallback(host: &str) -> String {
    format!(".{}", host.trim_matches('.'))
}
