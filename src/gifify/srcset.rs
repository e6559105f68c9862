//! `srcset` attribute parsing.

use smallvec::SmallVec;

/// Candidate URLs from a `srcset` value, in listed order.
///
/// Each comma-separated entry is trimmed and split on internal
/// whitespace; the first token is the URL, anything after it
/// (density/width descriptors) is dropped. An entry with no token
/// yields an empty URL, which no suffix check will match.
pub(super) fn candidates(srcset: &str) -> SmallVec<[&str; 4]> {
    srcset
        .split(',')
        .map(|entry| entry.trim().split_whitespace().next().unwrap_or(""))
        .collect()
}

/// First candidate whose URL carries the animated-GIF suffix, in
/// listed order.
pub(super) fn first_gif(srcset: &str) -> Option<String> {
    candidates(srcset)
        .into_iter()
        .find(|url| url.ends_with(super::GIF_SUFFIX))
        .map(str::to_owned)
}
