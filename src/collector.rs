use crate::config::GcConfig;
use crate::debug::{Color, ObjectInfo};
use crate::error::GcError;
use crate::gc_box::GcBox;
use crate::header::{GcMark, Header};
use crate::heap::GcList;
use crate::metrics::Metrics;
use crate::root::RootSet;
use crate::trace::{Trace, Tracer};

use log::debug;
use std::cell::Cell;
use std::mem::size_of;
use std::ptr::NonNull;
use std::time::Instant;

/// Owns every cell of an arena and runs the mark-sweep collection.
///
/// Cells are partitioned into two generation lists. Outside of `collect` the
/// black list is empty and every cell is white. During `collect`, cells
/// proven reachable are moved to the black list, whatever is left on the
/// white list is destroyed, and the two lists trade places.
pub(crate) struct Collector {
    white: GcList,
    black: GcList,
    white_mark: Cell<GcMark>,
    config: GcConfig,
    metrics: Metrics,
}

impl Collector {
    pub fn new(config: GcConfig) -> Self {
        Self {
            white: GcList::new(),
            black: GcList::new(),
            white_mark: Cell::new(GcMark::Red),
            config,
            metrics: Metrics::new(),
        }
    }

    pub fn alloc<T: Trace>(&self, value: T) -> NonNull<GcBox<T>> {
        let cell = GcBox::new(value, self.white_mark.get());

        // SAFETY: the cell was just allocated and is not in any list.
        unsafe { self.white.push_front(GcBox::header_ptr(cell)) };
        self.metrics.record_alloc(size_of::<GcBox<T>>());

        cell
    }

    pub fn collect(&mut self, roots: &RootSet) {
        let start_time = Instant::now();
        let black_mark = self.white_mark.get().rotate();
        let mut tracer = Tracer::new(black_mark, self.config.trace_work_capacity);

        debug!(
            "Starting collection {}: objects = {}, roots = {}",
            self.metrics.get_collections() + 1,
            self.white.len(),
            roots.len()
        );

        roots.for_each(|header| tracer.push(header));

        let marked = self.mark(&mut tracer);

        if self.config.dump_on_collect {
            self.dump();
        }

        // SAFETY: the mark phase is complete, so the white list holds exactly
        // the cells no root can reach.
        let swept = unsafe { self.sweep() };

        self.flip();

        let elapsed = start_time.elapsed();
        self.metrics.record_collection(marked, swept, elapsed);

        debug!(
            "Collection complete: marked = {}, swept = {}, time = {:?}",
            marked, swept, elapsed
        );

        if self.config.verify_heap {
            if let Err(err) = self.verify() {
                panic!("heap verification failed after collection: {}", err);
            }
        }
    }

    fn mark(&self, tracer: &mut Tracer) -> usize {
        let black_mark = tracer.mark();
        let mut marked = 0;

        while let Some(ptr) = tracer.pop() {
            // SAFETY: only live cells are ever pushed, and nothing is freed
            // until the sweep.
            unsafe {
                let header = ptr.as_ref();

                if header.get_mark() == black_mark {
                    continue;
                }

                self.white.unlink(ptr);
                self.black.push_front(ptr);
                header.set_mark(black_mark);

                Header::trace(ptr, tracer);
            }

            marked += 1;
        }

        marked
    }

    // SAFETY: must only be called once marking has finished.
    unsafe fn sweep(&self) -> usize {
        let mut swept = 0;
        let mut next = self.white.detach();

        while let Some(ptr) = next {
            next = ptr.as_ref().next();

            self.metrics.record_free(ptr.as_ref().size());
            Header::destroy(ptr);

            swept += 1;
        }

        swept
    }

    // Survivors become the white list of the next cycle. They are already
    // painted with the black mark, which is about to become the white mark.
    fn flip(&self) {
        self.white.take_from(&self.black);
        self.white_mark.set(self.white_mark.get().rotate());
    }

    #[cfg(test)]
    pub fn white_mark(&self) -> GcMark {
        self.white_mark.get()
    }

    pub fn config(&self) -> GcConfig {
        self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn dump(&self) -> Vec<ObjectInfo> {
        let mut objects = vec![];

        debug!("dump");

        // SAFETY: the lists are not modified while they are being walked.
        unsafe {
            for (list, color) in [(&self.black, Color::Black), (&self.white, Color::White)] {
                for ptr in list.iter() {
                    let header = ptr.as_ref();
                    let info = ObjectInfo {
                        addr: ptr.as_ptr() as usize,
                        type_name: header.type_name(),
                        size: header.size(),
                        color,
                    };

                    debug!("\t{}", info);
                    objects.push(info);
                }
            }
        }

        objects
    }

    pub fn verify(&self) -> Result<(), GcError> {
        if !self.black.is_empty() {
            return Err(GcError::BlackListNotEmpty {
                len: self.black.len(),
            });
        }

        let expected = self.metrics.get_live_objects() as usize;
        let white_mark = self.white_mark.get();
        let mut counted = 0;
        let mut prev: Option<NonNull<Header>> = None;

        // SAFETY: the lists are not modified while they are being walked.
        unsafe {
            for ptr in self.white.iter() {
                let header = ptr.as_ref();

                counted += 1;
                if counted > expected {
                    break;
                }

                if header.prev() != prev {
                    return Err(GcError::BrokenLink {
                        addr: ptr.as_ptr() as usize,
                    });
                }

                if header.get_mark() != white_mark {
                    return Err(GcError::ColorMismatch {
                        addr: ptr.as_ptr() as usize,
                        expected: Color::White,
                    });
                }

                prev = Some(ptr);
            }
        }

        if counted != expected || self.white.len() != expected {
            return Err(GcError::CountMismatch { counted, expected });
        }

        Ok(())
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        let mut freed = 0;

        for list in [&self.black, &self.white] {
            let mut next = list.detach();

            // SAFETY: the collector is going away, so nothing can reach these
            // cells anymore.
            while let Some(ptr) = next {
                unsafe {
                    next = ptr.as_ref().next();
                    self.metrics.record_free(ptr.as_ref().size());
                    Header::destroy(ptr);
                }

                freed += 1;
            }
        }

        debug!("Dropping arena: freed = {}", freed);
    }
}
