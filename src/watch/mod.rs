//! Mutation watcher.
//!
//! Keeps the transformer's effect current as the document changes,
//! without rescanning on every individual mutation:
//!
//! ```text
//! page mutations -> Dom observer -> Debouncer (pure timing) -> gifify
//! ```
//!
//! One watcher per page, attached once; there is no stop operation.
//! The watcher owns its mutation channel and debounce state, and
//! re-runs the transformer after each burst of qualifying mutations
//! settles.

mod debouncer;


use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::dom::{Dom, MutationRecord, NodeId, ObserveOptions, Selector};
use crate::gifify::gifify;
use debouncer::Debouncer;

/// Landmark marking the page's primary content region.
static MAIN_LANDMARK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[role=main]").unwrap());

/// Watches a document for changes and keeps GIF conversion current.
///
/// Owns the observer registration, the receiving end of its mutation
/// channel, and the debounce state. Constructed once at startup via
/// [`Watcher::attach`] and driven by [`Watcher::run`].
pub struct Watcher<D: Dom> {
    dom: Arc<Mutex<D>>,
    rx: mpsc::UnboundedReceiver<MutationRecord>,
    debouncer: Debouncer,
}

impl<D: Dom> Watcher<D> {
    /// Register observation and build the watcher.
    ///
    /// Observation is scoped to the page's `[role=main]` landmark when
    /// one exists, otherwise to the whole body. Watches child-list
    /// changes plus `src`/`srcset` attribute updates anywhere in that
    /// subtree. Registration happens synchronously, so no mutation
    /// between attach and the first poll is lost.
    pub fn attach(dom: Arc<Mutex<D>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut dom = dom.lock();
            let container = container(&*dom);
            dom.observe(
                container,
                ObserveOptions {
                    subtree: true,
                    child_list: true,
                    attributes: true,
                    attribute_filter: vec!["src".into(), "srcset".into()],
                },
                tx,
            );
        }

        Self {
            dom,
            rx,
            debouncer: Debouncer::new(),
        }
    }

    /// Run the watch loop.
    ///
    /// Each received record re-arms the debouncer; once the quiet
    /// period elapses undisturbed, the transformer runs exactly once on
    /// the locked document. Ends when the document (and with it every
    /// mutation source) is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                record = self.rx.recv() => match record {
                    Some(_) => self.debouncer.record(),
                    None => break,
                },
                _ = tokio::time::sleep(self.debouncer.sleep_duration()) => {
                    if self.debouncer.take_if_ready() {
                        crate::debug!("watch"; "mutations settled, rescanning");
                        gifify(&mut *self.dom.lock());
                    }
                }
            }
        }
    }
}

/// The page's main-content landmark, or the body as fallback.
fn container<D: Dom>(dom: &D) -> NodeId {
    dom.query_all(&MAIN_LANDMARK)
        .first()
        .copied()
        .unwrap_or_else(|| dom.body())
}

/// Start watching `dom` on the current runtime.
///
/// The single startup transition: attaches the observer and spawns the
/// watch loop. Conversion begins with the first mutation burst.
pub fn start<D: Dom + Send + 'static>(dom: Arc<Mutex<D>>) -> JoinHandle<()> {
    let watcher = Watcher::attach(dom);
    tokio::spawn(watcher.run())
}
