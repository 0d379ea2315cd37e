use super::trace::Trace;
use crate::gc::Gc;
use crate::header::{GcMark, Header};
use log::trace;
use std::ptr::NonNull;

/// Handed to [`Trace::trace`] during the mark phase. Every managed reference
/// reported to the tracer is queued to be marked, unless it has already been
/// marked in the current collection.
pub struct Tracer {
    mark: GcMark,
    work: Vec<NonNull<Header>>,
}

impl Tracer {
    pub(crate) fn new(mark: GcMark, capacity: usize) -> Self {
        Self {
            mark,
            work: Vec::with_capacity(capacity),
        }
    }

    /// Report a managed reference.
    pub fn trace<T: Trace>(&mut self, gc: Gc<'_, T>) {
        trace!(
            "(TRACER) OBJ = {}, ADDR = {:?}",
            std::any::type_name::<T>(),
            gc.header_ptr()
        );

        if gc.header().get_mark() == self.mark {
            return;
        }

        self.push(gc.header_ptr());
    }

    pub(crate) fn push(&mut self, header: NonNull<Header>) {
        self.work.push(header)
    }

    // The same object may be queued more than once before it is marked, so
    // callers must check the mark of whatever is popped.
    pub(crate) fn pop(&mut self) -> Option<NonNull<Header>> {
        self.work.pop()
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.work.len()
    }

    pub(crate) fn mark(&self) -> GcMark {
        self.mark
    }
}
