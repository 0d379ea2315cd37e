use super::tracer::Tracer;
use crate::gc::{Gc, GcOpt};
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;

/// Types allocated in an arena are required to implement this trait.
///
/// `trace` must hand every managed reference reachable from `self` to the
/// tracer, and must not mutate the object graph. Missing a reference lets the
/// collector free an object that is still in use, which is why implementing
/// this trait is unsafe. Prefer `#[derive(Trace)]`.
pub unsafe trait Trace {
    /// True if the type holds no managed references, in which case the
    /// collector never calls `trace` on it.
    const IS_LEAF: bool;

    fn trace(&self, tracer: &mut Tracer);
}

/// TraceLeaf is a sub-trait of Trace which ensures its implementor does not
/// contain any managed references.
pub unsafe trait TraceLeaf: Trace {
    #[doc(hidden)]
    fn __assert_trace_leaf() {}
}

#[doc(hidden)]
pub trait __MustNotDrop {}

// A traced type may be torn down after the objects it references have already
// been freed, so it must not observe them in a Drop impl. The derive emits an
// impl of this trait, which conflicts with this one if the type is Drop.
#[allow(drop_bounds)]
impl<T: Drop> __MustNotDrop for T {}

// ****************************************************************************
// TRACE LEAF IMPLS
// ****************************************************************************

macro_rules! impl_trace_leaf {
    ($($t:ty),*) => {
        $(
            unsafe impl TraceLeaf for $t {}

            unsafe impl Trace for $t {
                const IS_LEAF: bool = true;

                fn trace(&self, _: &mut Tracer) {}
            }
        )*
    };
}

impl_trace_leaf!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str
);

unsafe impl<T: TraceLeaf> TraceLeaf for Rc<T> {}

unsafe impl<T: TraceLeaf> Trace for Rc<T> {
    const IS_LEAF: bool = true;

    fn trace(&self, _: &mut Tracer) {}
}

unsafe impl<T: ?Sized> TraceLeaf for PhantomData<T> {}

unsafe impl<T: ?Sized> Trace for PhantomData<T> {
    const IS_LEAF: bool = true;

    fn trace(&self, _: &mut Tracer) {}
}

unsafe impl<T: TraceLeaf + Copy> TraceLeaf for Cell<T> {}
unsafe impl<T: TraceLeaf> TraceLeaf for RefCell<T> {}
unsafe impl<T: TraceLeaf> TraceLeaf for Option<T> {}
unsafe impl<T: TraceLeaf> TraceLeaf for Box<T> {}
unsafe impl<T: TraceLeaf> TraceLeaf for Vec<T> {}
unsafe impl<const N: usize, T: TraceLeaf> TraceLeaf for [T; N] {}
unsafe impl<A: TraceLeaf, B: TraceLeaf> TraceLeaf for (A, B) {}
unsafe impl<A: TraceLeaf, B: TraceLeaf, C: TraceLeaf> TraceLeaf for (A, B, C) {}

// ****************************************************************************
// TRACE IMPLS
// ****************************************************************************

unsafe impl<'gc, T: Trace> Trace for Gc<'gc, T> {
    const IS_LEAF: bool = false;

    fn trace(&self, tracer: &mut Tracer) {
        tracer.trace(*self)
    }
}

unsafe impl<'gc, T: Trace> Trace for GcOpt<'gc, T> {
    const IS_LEAF: bool = false;

    fn trace(&self, tracer: &mut Tracer) {
        if let Some(gc) = self.as_option() {
            tracer.trace(gc)
        }
    }
}

unsafe impl<T: Trace + Copy> Trace for Cell<T> {
    const IS_LEAF: bool = T::IS_LEAF;

    fn trace(&self, tracer: &mut Tracer) {
        self.get().trace(tracer)
    }
}

unsafe impl<T: Trace> Trace for RefCell<T> {
    const IS_LEAF: bool = T::IS_LEAF;

    fn trace(&self, tracer: &mut Tracer) {
        self.borrow().trace(tracer)
    }
}

unsafe impl<T: Trace> Trace for Option<T> {
    const IS_LEAF: bool = T::IS_LEAF;

    fn trace(&self, tracer: &mut Tracer) {
        if let Some(value) = self.as_ref() {
            value.trace(tracer)
        }
    }
}

unsafe impl<T: Trace> Trace for Box<T> {
    const IS_LEAF: bool = T::IS_LEAF;

    fn trace(&self, tracer: &mut Tracer) {
        (**self).trace(tracer)
    }
}

unsafe impl<T: Trace> Trace for Vec<T> {
    const IS_LEAF: bool = T::IS_LEAF;

    fn trace(&self, tracer: &mut Tracer) {
        if T::IS_LEAF {
            return;
        }

        for item in self.iter() {
            item.trace(tracer)
        }
    }
}

unsafe impl<const N: usize, T: Trace> Trace for [T; N] {
    const IS_LEAF: bool = T::IS_LEAF;

    fn trace(&self, tracer: &mut Tracer) {
        if T::IS_LEAF {
            return;
        }

        for item in self.iter() {
            item.trace(tracer)
        }
    }
}

unsafe impl<A: Trace, B: Trace> Trace for (A, B) {
    const IS_LEAF: bool = A::IS_LEAF && B::IS_LEAF;

    fn trace(&self, tracer: &mut Tracer) {
        self.0.trace(tracer);
        self.1.trace(tracer);
    }
}

unsafe impl<A: Trace, B: Trace, C: Trace> Trace for (A, B, C) {
    const IS_LEAF: bool = A::IS_LEAF && B::IS_LEAF && C::IS_LEAF;

    fn trace(&self, tracer: &mut Tracer) {
        self.0.trace(tracer);
        self.1.trace(tracer);
        self.2.trace(tracer);
    }
}
