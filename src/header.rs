use crate::trace::Tracer;
use std::cell::Cell;
use std::ptr::NonNull;

/// The two marks a header can carry. Which one means "white" (not yet proven
/// reachable) is decided by the arena and flips after every collection, so
/// survivors never need to be repainted.
#[repr(u8)]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum GcMark {
    Red,
    Green,
}

impl GcMark {
    pub fn rotate(&self) -> Self {
        match self {
            GcMark::Red => GcMark::Green,
            GcMark::Green => GcMark::Red,
        }
    }
}

pub type TraceFn = unsafe fn(NonNull<Header>, &mut Tracer);
pub type DestroyFn = unsafe fn(NonNull<Header>);

/// Per-type operations of a cell, built once per payload type at the point
/// the type is first allocated.
pub struct GcVTable {
    pub trace: TraceFn,
    pub destroy: DestroyFn,
    pub type_name: fn() -> &'static str,
    pub size: usize,
}

/// Collector metadata stored at the front of every cell.
///
/// `prev` and `next` thread the header into exactly one of the arena's two
/// generation lists.
pub struct Header {
    mark: Cell<GcMark>,
    vtable: &'static GcVTable,
    prev: Cell<Option<NonNull<Header>>>,
    next: Cell<Option<NonNull<Header>>>,
}

impl Header {
    pub fn new(mark: GcMark, vtable: &'static GcVTable) -> Self {
        Header {
            mark: Cell::new(mark),
            vtable,
            prev: Cell::new(None),
            next: Cell::new(None),
        }
    }

    pub fn get_mark(&self) -> GcMark {
        self.mark.get()
    }

    pub fn set_mark(&self, mark: GcMark) {
        self.mark.set(mark)
    }

    pub fn prev(&self) -> Option<NonNull<Header>> {
        self.prev.get()
    }

    pub fn next(&self) -> Option<NonNull<Header>> {
        self.next.get()
    }

    pub fn set_prev(&self, prev: Option<NonNull<Header>>) {
        self.prev.set(prev)
    }

    pub fn set_next(&self, next: Option<NonNull<Header>>) {
        self.next.set(next)
    }

    pub fn type_name(&self) -> &'static str {
        (self.vtable.type_name)()
    }

    pub fn size(&self) -> usize {
        self.vtable.size
    }

    // SAFETY: `this` must point at this live header.
    pub unsafe fn trace(this: NonNull<Header>, tracer: &mut Tracer) {
        let trace = this.as_ref().vtable.trace;

        trace(this, tracer)
    }

    // SAFETY: `this` must be live and unlinked from every list; the cell is
    // freed and `this` dangles afterwards.
    pub unsafe fn destroy(this: NonNull<Header>) {
        let destroy = this.as_ref().vtable.destroy;

        destroy(this)
    }
}
