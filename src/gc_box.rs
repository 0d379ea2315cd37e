use crate::header::{DestroyFn, GcMark, GcVTable, Header, TraceFn};
use crate::trace::{Trace, Tracer};
use std::mem::size_of;
use std::ptr::NonNull;

// A cell is a single boxed allocation, and is never moved or resized:
//
//   Gc<T> / NonNull<Header>
//    |
//    V
//   [ Header ][ padding ][ T value ]
//
// `repr(C)` keeps the header at offset zero, so a cell pointer and its header
// pointer are the same address and the type-erased vtable entries can cast
// one into the other.
#[repr(C)]
pub(crate) struct GcBox<T: Trace> {
    header: Header,
    value: T,
}

impl<T: Trace> GcBox<T> {
    const VTABLE: GcVTable = GcVTable {
        trace: if T::IS_LEAF {
            Self::trace_leaf as TraceFn
        } else {
            Self::trace_value as TraceFn
        },
        destroy: Self::destroy as DestroyFn,
        type_name: std::any::type_name::<T>,
        size: size_of::<GcBox<T>>(),
    };

    /// Allocates a new cell colored with `mark`. The cell is not yet linked
    /// into any list.
    pub fn new(value: T, mark: GcMark) -> NonNull<GcBox<T>> {
        let cell = Box::new(GcBox {
            header: Header::new(mark, &Self::VTABLE),
            value,
        });

        NonNull::from(Box::leak(cell))
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn header_ptr(this: NonNull<GcBox<T>>) -> NonNull<Header> {
        this.cast()
    }

    // SAFETY: `header` must be the header of a live `GcBox<T>`.
    pub unsafe fn from_header(header: NonNull<Header>) -> NonNull<GcBox<T>> {
        header.cast()
    }

    unsafe fn trace_value(this: NonNull<Header>, tracer: &mut Tracer) {
        Self::from_header(this).as_ref().value.trace(tracer)
    }

    unsafe fn trace_leaf(_: NonNull<Header>, _: &mut Tracer) {}

    unsafe fn destroy(this: NonNull<Header>) {
        drop(Box::from_raw(Self::from_header(this).as_ptr()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropCount(Rc<Cell<usize>>);

    impl Drop for DropCount {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    unsafe impl Trace for DropCount {
        const IS_LEAF: bool = true;

        fn trace(&self, _: &mut Tracer) {}
    }

    #[test]
    fn header_is_at_cell_address() {
        let cell = GcBox::new(69usize, GcMark::Red);
        let header = GcBox::header_ptr(cell);

        unsafe {
            assert_eq!(header.as_ptr() as usize, cell.as_ptr() as usize);
            assert!(std::ptr::eq(header.as_ref(), cell.as_ref().header()));
            assert_eq!(*cell.as_ref().value(), 69);
            assert_eq!(header.as_ref().get_mark(), GcMark::Red);
            assert_eq!(header.as_ref().type_name(), "usize");
            assert_eq!(header.as_ref().size(), size_of::<GcBox<usize>>());

            Header::destroy(header);
        }
    }

    #[test]
    fn destroy_runs_teardown_once() {
        let drops = Rc::new(Cell::new(0));
        let cell = GcBox::new(DropCount(drops.clone()), GcMark::Green);

        assert_eq!(drops.get(), 0);
        unsafe { Header::destroy(GcBox::header_ptr(cell)) };
        assert_eq!(drops.get(), 1);
    }
}
