//! Pintergif - swaps responsive images for their animated GIF variants.
//!
//! Image grids often serve a static still through `srcset` even when an
//! animated GIF is listed among the candidates. This crate scans a
//! document tree for such images, repoints their `src` at the GIF, and
//! keeps watching the tree so late-loaded or rewritten images get the
//! same treatment once the mutation burst settles.
//!
//! Two cooperating pieces:
//!
//! - [`gifify`] - a stateless scan-and-rewrite pass over the current tree
//! - [`Watcher`] - a debounced mutation observer that re-invokes it
//!
//! The document is only ever reached through the [`Dom`] capability
//! trait, so both pieces run unchanged against the in-memory
//! [`MemoryDom`] - no rendering environment required.
//!
//! ```no_run
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use pintergif::MemoryDom;
//!
//! # async fn demo() -> Result<(), pintergif::DomError> {
//! let dom = Arc::new(Mutex::new(MemoryDom::parse("<body>...</body>")?));
//! let _watcher = pintergif::start(Arc::clone(&dom));
//! # Ok(())
//! # }
//! ```

pub mod dom;
pub mod gifify;
pub mod logger;
pub mod watch;

mod utils;

pub use dom::{
    Dom, DomError, MemoryDom, MutationKind, MutationRecord, NodeId, ObserveOptions, Selector,
    SelectorError,
};
pub use gifify::{BACKUP_ATTR, gifify};
pub use watch::{Watcher, start};
