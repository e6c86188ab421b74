//! Scan scheduling.
//!
//! [`EndTagTagger`] is what a host talks to. Every buffer change (or explicit request) cancels
//! the scan in flight and starts a new one on a worker thread; a burst of edits therefore ends
//! with exactly one scan running to completion. A finished scan publishes its generation into the
//! [`RegionCache`] only if its cancellation token is still live, checked under the cache lock.
//!
//! ```text
//! buffer_changed(v5) ──▶ cancel(token v4) ──▶ spawn worker(v5)
//!                                               │ scan()
//!                                               ▼
//!                                  publish_if(!token.is_cancelled())
//!                                               │ changed span?
//!                                               ▼
//!                                        RegionsChanged callbacks
//! ```
//!
//! Readers ([`EndTagTagger::tags`]) never wait for a scan: they read the last published
//! generation translated to the version they ask for.

use crate::cache::{PublishOutcome, RegionCache};
use crate::delta::TextDelta;
use crate::error::ScanError;
use crate::options::EndTagOptions;
use crate::region::{ParseGeneration, Region};
use crate::scan::{DocumentServices, scan};
use crate::span::TextSpan;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Notification that published end tags changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionsChanged {
    /// Snapshot version of the replaced generation.
    pub old_version: u64,
    /// Snapshot version of the new generation.
    pub new_version: u64,
    /// Range whose tags must be re-rendered, in `new_version` offsets.
    pub changed: TextSpan,
}

/// Callback invoked when published regions change.
///
/// Callbacks run on the worker thread that published. They must not call
/// [`EndTagTagger::subscribe`].
pub type RegionsChangedCallback = Box<dyn FnMut(&RegionsChanged) + Send>;

struct Shared {
    cache: RegionCache,
    callbacks: Mutex<Vec<RegionsChangedCallback>>,
    next_scan_id: AtomicU64,
}

#[derive(Default)]
struct Inflight {
    token: Option<CancellationToken>,
    workers: Vec<JoinHandle<()>>,
}

impl Inflight {
    /// Cancel the current token and install a fresh one.
    fn renew_token(&mut self) -> CancellationToken {
        if let Some(previous) = self.token.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        token
    }
}

/// Schedules scans for one document and holds its published end tags.
pub struct EndTagTagger {
    shared: Arc<Shared>,
    options: RwLock<EndTagOptions>,
    content_type: Option<String>,
    inflight: Mutex<Inflight>,
}

impl EndTagTagger {
    /// A tagger with no published regions yet.
    pub fn new(options: EndTagOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                cache: RegionCache::new(),
                callbacks: Mutex::new(Vec::new()),
                next_scan_id: AtomicU64::new(1),
            }),
            options: RwLock::new(options),
            content_type: None,
            inflight: Mutex::new(Inflight::default()),
        }
    }

    /// Restrict scanning to documents of `content_type` when it is in the enabled languages.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Subscribe to changed-span notifications.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: FnMut(&RegionsChanged) + Send + 'static,
    {
        self.shared.callbacks.lock().push(Box::new(callback));
    }

    /// Current options.
    pub fn options(&self) -> EndTagOptions {
        self.options.read().clone()
    }

    /// Change options; the version bump makes [`needs_rescan`](Self::needs_rescan) true.
    pub fn update_options(&self, change: impl FnOnce(&mut EndTagOptions)) {
        self.options.write().update(change);
    }

    /// The region cache.
    pub fn cache(&self) -> &RegionCache {
        &self.shared.cache
    }

    /// The last published generation, untranslated.
    pub fn generation(&self) -> Arc<ParseGeneration> {
        self.shared.cache.current()
    }

    /// Whether the published generation is stale for `version` under the current options.
    pub fn needs_rescan(&self, version: u64) -> bool {
        let generation = self.shared.cache.current();
        generation.snapshot_version() != version
            || generation.config_version() != self.options.read().version()
    }

    /// Regions at snapshot `version` whose closing brace lies in `range`, in document order.
    pub fn tags(&self, range: TextSpan, version: u64) -> Vec<Region> {
        self.shared
            .cache
            .regions_at(version)
            .iter()
            .filter(|region| range.contains(region.close_brace()))
            .cloned()
            .collect()
    }

    /// The buffer moved to `services.version()` through `delta`: record it and rescan.
    pub fn buffer_changed(&self, delta: Arc<TextDelta>, services: DocumentServices) {
        self.shared.cache.record_delta(services.version(), delta);
        self.request_scan(services);
    }

    /// Cancel any scan in flight and start a new one on a worker thread.
    pub fn request_scan(&self, services: DocumentServices) {
        let options = self.scan_options();
        let shared = Arc::clone(&self.shared);
        let id = shared.next_scan_id.fetch_add(1, Ordering::Relaxed);
        let version = services.version();

        let mut inflight = self.inflight.lock();
        let token = inflight.renew_token();
        inflight.workers.retain(|worker| !worker.is_finished());

        let worker = thread::Builder::new()
            .name(format!("endtag-scan-{id}"))
            .spawn(move || run_worker(&shared, id, &services, &options, &token));
        match worker {
            Ok(handle) => {
                debug!(target: "endtag.tagger", id, version, "scan_started");
                inflight.workers.push(handle);
            }
            Err(err) => {
                error!(target: "endtag.tagger", id, version, error = %err, "scan_worker_spawn_failed");
            }
        }
    }

    /// Cancel and scan on the calling thread. Returns the changed span on publish.
    pub fn scan_now(&self, services: &DocumentServices) -> Result<Option<TextSpan>, ScanError> {
        let options = self.scan_options();
        let id = self.shared.next_scan_id.fetch_add(1, Ordering::Relaxed);
        let token = self.inflight.lock().renew_token();
        scan_and_publish(&self.shared, id, services, &options, &token)
    }

    /// Cancel the scan in flight, if any. The published generation stays current.
    pub fn cancel(&self) {
        if let Some(token) = self.inflight.lock().token.take() {
            token.cancel();
        }
    }

    /// Block until every started worker has finished.
    pub fn wait_idle(&self) {
        let workers = std::mem::take(&mut self.inflight.lock().workers);
        for worker in workers {
            if worker.join().is_err() {
                warn!(target: "endtag.tagger", "scan_worker_join_failed");
            }
        }
    }

    fn scan_options(&self) -> EndTagOptions {
        let mut options = self.options.read().clone();
        if let Some(content_type) = &self.content_type
            && !options.is_language_enabled(content_type)
        {
            options.enabled = false;
        }
        options
    }
}

impl Drop for EndTagTagger {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run_worker(
    shared: &Shared,
    id: u64,
    services: &DocumentServices,
    options: &EndTagOptions,
    token: &CancellationToken,
) {
    let result = catch_unwind(AssertUnwindSafe(|| {
        scan_and_publish(shared, id, services, options, token)
    }))
    .unwrap_or_else(|payload| Err(ScanError::WorkerPanicked(panic_message(payload.as_ref()))));

    match result {
        Ok(_) => {}
        Err(ScanError::Cancelled) => {
            debug!(target: "endtag.tagger", id, "scan_discarded_cancelled");
        }
        Err(err @ ScanError::WorkerPanicked(_)) => {
            error!(target: "endtag.tagger", id, error = %err, "scan_failed_previous_generation_kept");
        }
    }
}

fn scan_and_publish(
    shared: &Shared,
    id: u64,
    services: &DocumentServices,
    options: &EndTagOptions,
    token: &CancellationToken,
) -> Result<Option<TextSpan>, ScanError> {
    let generation = scan(services, options, token)?;
    let new_version = generation.snapshot_version();

    match shared
        .cache
        .publish_if(generation, || !token.is_cancelled())
    {
        PublishOutcome::Published {
            previous_version: old_version,
            changed,
        } => {
            debug!(target: "endtag.tagger", id, new_version, changed = ?changed, "scan_published");
            if let Some(changed) = changed {
                let event = RegionsChanged {
                    old_version,
                    new_version,
                    changed,
                };
                for callback in shared.callbacks.lock().iter_mut() {
                    callback(&event);
                }
            }
            Ok(changed)
        }
        PublishOutcome::Refused if token.is_cancelled() => Err(ScanError::Cancelled),
        PublishOutcome::Refused => {
            debug!(target: "endtag.tagger", id, new_version, "scan_result_outdated");
            Ok(None)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
