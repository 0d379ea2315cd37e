use std::cell::Cell;
use std::time::Duration;

/// A 'snapshot' of the arena's bookkeeping.
///
/// Obtained by calling [`crate::Arena::metrics`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GcMetrics {
    /// Number of collections that have completed.
    pub collections: u64,

    /// Objects currently allocated in the arena.
    pub live_objects: u64,

    /// Bytes held by the live objects, headers included.
    pub live_bytes: u64,

    /// Objects allocated over the lifetime of the arena.
    pub allocated_objects: u64,

    /// Objects destroyed over the lifetime of the arena.
    pub freed_objects: u64,

    /// Objects proven reachable by the last collection.
    pub last_marked: u64,

    /// Objects destroyed by the last collection.
    pub last_swept: u64,

    /// Root handles currently registered.
    pub roots: u64,

    /// Running average of collection times in microseconds.
    pub collect_avg_time: u64,
}

pub(crate) struct Metrics {
    collections: Cell<u64>,
    live_objects: Cell<u64>,
    live_bytes: Cell<u64>,
    allocated_objects: Cell<u64>,
    freed_objects: Cell<u64>,
    last_marked: Cell<u64>,
    last_swept: Cell<u64>,
    collect_avg_time: Cell<u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            collections: Cell::new(0),
            live_objects: Cell::new(0),
            live_bytes: Cell::new(0),
            allocated_objects: Cell::new(0),
            freed_objects: Cell::new(0),
            last_marked: Cell::new(0),
            last_swept: Cell::new(0),
            collect_avg_time: Cell::new(0),
        }
    }

    pub fn record_alloc(&self, bytes: usize) {
        self.live_objects.set(self.live_objects.get() + 1);
        self.live_bytes.set(self.live_bytes.get() + bytes as u64);
        self.allocated_objects.set(self.allocated_objects.get() + 1);
    }

    pub fn record_free(&self, bytes: usize) {
        self.live_objects.set(self.live_objects.get() - 1);
        self.live_bytes.set(self.live_bytes.get() - bytes as u64);
        self.freed_objects.set(self.freed_objects.get() + 1);
    }

    pub fn record_collection(&self, marked: usize, swept: usize, elapsed: Duration) {
        let collections = self.collections.get() + 1;

        self.collections.set(collections);
        self.last_marked.set(marked as u64);
        self.last_swept.set(swept as u64);

        update_avg_u64(
            &self.collect_avg_time,
            elapsed.as_micros() as u64,
            collections,
        );
    }

    pub fn get_collections(&self) -> u64 {
        self.collections.get()
    }

    pub fn get_live_objects(&self) -> u64 {
        self.live_objects.get()
    }

    pub fn snapshot(&self, roots: usize) -> GcMetrics {
        GcMetrics {
            collections: self.collections.get(),
            live_objects: self.live_objects.get(),
            live_bytes: self.live_bytes.get(),
            allocated_objects: self.allocated_objects.get(),
            freed_objects: self.freed_objects.get(),
            last_marked: self.last_marked.get(),
            last_swept: self.last_swept.get(),
            roots: roots as u64,
            collect_avg_time: self.collect_avg_time.get(),
        }
    }
}

pub fn update_avg_u64(running_avg: &Cell<u64>, new_value: u64, sample_size: u64) {
    let avg = running_avg.get();
    let update = new_value.abs_diff(avg) / sample_size;
    let new_avg = if new_value < avg {
        avg - update
    } else {
        avg + update
    };

    running_avg.set(new_avg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_average_moves_both_ways() {
        let avg = Cell::new(0);

        update_avg_u64(&avg, 100, 1);
        assert_eq!(avg.get(), 100);

        update_avg_u64(&avg, 50, 2);
        assert_eq!(avg.get(), 75);

        update_avg_u64(&avg, 150, 3);
        assert_eq!(avg.get(), 100);
    }

    #[test]
    fn alloc_and_free_balance() {
        let metrics = Metrics::new();

        metrics.record_alloc(32);
        metrics.record_alloc(16);
        metrics.record_free(32);

        let snapshot = metrics.snapshot(2);

        assert_eq!(snapshot.live_objects, 1);
        assert_eq!(snapshot.live_bytes, 16);
        assert_eq!(snapshot.allocated_objects, 2);
        assert_eq!(snapshot.freed_objects, 1);
        assert_eq!(snapshot.roots, 2);
    }
}
