//! Periodic world introspection
//!
//! The inspector owns a named background thread that re-enumerates an
//! [`EntitySource`] at a fixed interval and publishes the result into the
//! [`Store`]. Stopping is signalled over a channel, so `stop` returns as
//! soon as the thread wakes rather than after a full interval.

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::RwLock;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::store::{Entry, Snapshot, SnapshotId, Store};
use crate::world::World;

/// Default refresh interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Anything that can enumerate its live entities
pub trait EntitySource: Send + Sync + 'static {
    fn collect_entries(&self) -> Vec<Entry>;
}

impl EntitySource for RwLock<World> {
    fn collect_entries(&self) -> Vec<Entry> {
        let world = self.read();
        world
            .entities()
            .map(|(entity, name, components)| Entry {
                entity,
                name: name.map_or_else(|| entity.to_string(), str::to_string),
                components: components.to_vec(),
            })
            .collect()
    }
}

/// Enumerate `source` once and publish the result
fn refresh(source: &dyn EntitySource, store: &Store) -> SnapshotId {
    let snapshot = Snapshot::new(source.collect_entries());
    let count = snapshot.len();
    let id = store.publish(snapshot);
    log::debug!("Published snapshot {} ({} entities)", id.as_u64(), count);
    id
}

/// Background refresher for a [`Store`]
pub struct Inspector {
    source: Arc<dyn EntitySource>,
    store: Arc<Store>,
    interval: Duration,
    refreshes: Arc<AtomicU64>,
    stop_tx: Option<Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Inspector {
    /// Create a stopped inspector
    pub fn new(source: Arc<dyn EntitySource>, store: Arc<Store>, interval: Duration) -> Self {
        Self {
            source,
            store,
            interval,
            refreshes: Arc::new(AtomicU64::new(0)),
            stop_tx: None,
            thread_handle: None,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Refresh now, on the calling thread
    pub fn introspect(&self) -> SnapshotId {
        let id = refresh(self.source.as_ref(), &self.store);
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        id
    }

    /// Number of refreshes so far, periodic and manual
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Whether the background thread is alive
    pub fn is_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Start the refresh thread; does nothing if already running
    pub fn start(&mut self) -> io::Result<()> {
        if self.thread_handle.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        let refreshes = Arc::clone(&self.refreshes);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("inspector".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        refresh(source.as_ref(), &store);
                        refreshes.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        self.stop_tx = Some(stop_tx);
        self.thread_handle = Some(handle);
        log::info!("Inspector started (interval {:?})", interval);
        Ok(())
    }

    /// Stop the refresh thread and wait for it
    pub fn stop(&mut self) {
        let Some(handle) = self.thread_handle.take() else {
            return;
        };

        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if handle.join().is_err() {
            log::warn!("Inspector thread panicked");
        }

        log::info!("Inspector stopped");
    }
}

impl Drop for Inspector {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Arc<RwLock<World>>, Arc<Store>) {
        (Arc::new(RwLock::new(World::new())), Arc::new(Store::new()))
    }

    #[test]
    fn test_introspect_publishes_world() {
        let (world, store) = setup();
        let e = world.write().spawn_named("hero");
        world.write().spawn();

        let inspector = Inspector::new(world.clone(), store.clone(), DEFAULT_INTERVAL);
        inspector.introspect();

        assert_eq!(store.ids().len(), 2);
        assert_eq!(store.get_entry(e.id()).unwrap().name, "hero");
        assert_eq!(inspector.refresh_count(), 1);
    }

    #[test]
    fn test_unnamed_entities_use_display() {
        let (world, store) = setup();
        let e = world.write().spawn();

        let inspector = Inspector::new(world, store.clone(), DEFAULT_INTERVAL);
        inspector.introspect();

        assert_eq!(store.get_entry(e.id()).unwrap().name, e.to_string());
    }

    #[test]
    fn test_start_stop() {
        let (world, store) = setup();
        let mut inspector = Inspector::new(world, store, Duration::from_millis(5));

        inspector.start().unwrap();
        assert!(inspector.is_running());
        inspector.start().unwrap();

        inspector.stop();
        assert!(!inspector.is_running());
        inspector.stop();
    }
}
