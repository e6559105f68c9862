//! Image-to-GIF rewriting.
//!
//! Scans a document for images that declare alternate sources via
//! `srcset` and, when one of the candidates is a GIF, repoints the
//! image's `src` at it. The original `srcset` is stashed in
//! [`BACKUP_ATTR`] and removed, since a live `srcset` takes precedence
//! over the rewritten `src`.

mod srcset;

#[cfg(test)]
mod tests;

use std::sync::LazyLock;

use crate::dom::{Dom, Selector};

/// Attribute preserving the original `srcset` of a converted image.
///
/// Written for the benefit of external scripts; nothing in this crate
/// reads it back.
pub const BACKUP_ATTR: &str = "data-pintergif-srcset";

/// Suffix marking a source as an animated GIF. Case-sensitive exact
/// suffix; `.GIF` and query-string variants are deliberately not
/// recognized.
const GIF_SUFFIX: &str = ".gif";

/// Images that declare alternate sources and don't already display a
/// GIF. Converted images fall out of this selection via their own
/// rewritten `src`, which makes repeated scans idempotent.
static ELIGIBLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#":not([src$=".gif"])[srcset]"#).unwrap());

/// Convert every eligible image in `dom` to display its GIF variant.
///
/// For each image with a non-empty `srcset` whose `src` does not
/// already end in `.gif`: parse the candidate list, pick the first
/// candidate ending in `.gif` (listed order wins, no resolution
/// comparison), stash the original `srcset` in [`BACKUP_ATTR`], drop
/// `srcset`, and point `src` at the chosen file. Images without a GIF
/// candidate are left byte-for-byte unchanged.
pub fn gifify(dom: &mut impl Dom) {
    for img in dom.query_all(&ELIGIBLE) {
        let Some(raw) = dom.attr(img, "srcset") else {
            continue;
        };
        if raw.trim().is_empty() {
            continue;
        }

        let Some(gif) = srcset::first_gif(&raw) else {
            continue;
        };

        crate::debug!("gifify"; "srcset carries {gif}, swapping src");

        // srcset wins over src in the renderer, so it has to go before
        // src is rewritten. Keep the original around for anything that
        // wants to undo this.
        dom.set_attr(img, BACKUP_ATTR, &raw);
        dom.remove_attr(img, "srcset");
        dom.set_attr(img, "src", &gif);
    }
}
