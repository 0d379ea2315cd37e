use crate::gc_box::GcBox;
use crate::header::Header;
use crate::mutator::Mutator;
use crate::trace::Trace;

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;

// Invariant in 'gc, so handles branded by two different mutations can never
// be unified.
type Brand<'gc, T> = PhantomData<(&'gc T, Cell<&'gc ()>)>;

/// A shared reference to a value stored in an [`crate::Arena`], branded with
/// the lifetime of the [`Mutator`] it was obtained through.
///
/// A `Gc` cannot escape the mutation it was created in, so none can be held
/// across a collection. Values that must survive a collection have to be
/// reachable from a [`crate::Root`].
///
/// A `Gc` never changes what it points at. Fields that need to be rewired
/// after allocation should use [`GcOpt`], or some other form of interior
/// mutability such as `Cell<Gc<'gc, T>>`.
pub struct Gc<'gc, T: Trace> {
    ptr: NonNull<GcBox<T>>,
    _scope: Brand<'gc, T>,
}

impl<'gc, T: Trace> Copy for Gc<'gc, T> {}

impl<'gc, T: Trace> Clone for Gc<'gc, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'gc, T: Trace> Deref for Gc<'gc, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.scoped_deref()
    }
}

impl<'gc, T: Trace + fmt::Debug> fmt::Debug for Gc<'gc, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.scoped_deref(), f)
    }
}

impl<'gc, T: Trace> Gc<'gc, T> {
    /// Allocates `value` into the mutator's arena. Equivalent to
    /// [`Mutator::alloc`].
    pub fn new(mu: &'gc Mutator<'gc>, value: T) -> Self
    where
        T: 'gc,
    {
        mu.alloc(value)
    }

    /// Get a reference to the value that lives as long as the mutation,
    /// rather than as long as the `&Gc` it was dereferenced through.
    pub fn scoped_deref(&self) -> &'gc T {
        // SAFETY: the cell cannot be swept while 'gc is alive, since a
        // collection needs a unique borrow of the arena the mutator borrows.
        unsafe { (*self.ptr.as_ptr()).value() }
    }

    /// Returns true if both handles point at the same cell.
    pub fn ptr_eq(this: Gc<'gc, T>, other: Gc<'gc, T>) -> bool {
        this.ptr == other.ptr
    }

    pub fn as_ptr(this: Gc<'gc, T>) -> *const T {
        this.scoped_deref() as *const T
    }

    pub(crate) fn from_box(ptr: NonNull<GcBox<T>>) -> Self {
        Self {
            ptr,
            _scope: PhantomData,
        }
    }

    // SAFETY: `header` must belong to a live `GcBox<T>` that outlives 'gc.
    pub(crate) unsafe fn from_header(header: NonNull<Header>) -> Self {
        Self::from_box(GcBox::from_header(header))
    }

    pub(crate) fn header(&self) -> &'gc Header {
        unsafe { (*self.ptr.as_ptr()).header() }
    }

    pub(crate) fn header_ptr(&self) -> NonNull<Header> {
        GcBox::header_ptr(self.ptr)
    }
}

/// A nullable, reassignable reference to a value stored in an
/// [`crate::Arena`].
///
/// Assignment is a plain overwrite: the collector never runs while a
/// `GcOpt` can be observed, so no write barrier is needed.
pub struct GcOpt<'gc, T: Trace> {
    ptr: Cell<Option<NonNull<GcBox<T>>>>,
    _scope: Brand<'gc, T>,
}

impl<'gc, T: Trace> GcOpt<'gc, T> {
    pub fn new_none() -> Self {
        Self {
            ptr: Cell::new(None),
            _scope: PhantomData,
        }
    }

    pub fn new(mu: &'gc Mutator<'gc>, value: T) -> Self
    where
        T: 'gc,
    {
        mu.alloc(value).into()
    }

    pub fn is_none(&self) -> bool {
        self.ptr.get().is_none()
    }

    pub fn is_some(&self) -> bool {
        self.ptr.get().is_some()
    }

    pub fn set(&self, gc: Gc<'gc, T>) {
        self.ptr.set(Some(gc.ptr))
    }

    pub fn set_none(&self) {
        self.ptr.set(None)
    }

    /// Replaces the current target, returning the old one.
    pub fn replace(&self, gc: Option<Gc<'gc, T>>) -> Option<Gc<'gc, T>> {
        self.ptr
            .replace(gc.map(|gc| gc.ptr))
            .map(Gc::from_box)
    }

    pub fn as_option(&self) -> Option<Gc<'gc, T>> {
        self.ptr.get().map(Gc::from_box)
    }

    /// Dereferences the target.
    ///
    /// # Panics
    ///
    /// Panics if the pointer is null.
    pub fn unwrap(&self) -> Gc<'gc, T> {
        match self.as_option() {
            Some(gc) => gc,
            None => panic!("Attempt to deref a null GcOpt"),
        }
    }
}

impl<'gc, T: Trace> Default for GcOpt<'gc, T> {
    fn default() -> Self {
        Self::new_none()
    }
}

impl<'gc, T: Trace> Clone for GcOpt<'gc, T> {
    fn clone(&self) -> Self {
        Self {
            ptr: Cell::new(self.ptr.get()),
            _scope: PhantomData,
        }
    }
}

impl<'gc, T: Trace> From<Gc<'gc, T>> for GcOpt<'gc, T> {
    fn from(gc: Gc<'gc, T>) -> Self {
        Self {
            ptr: Cell::new(Some(gc.ptr)),
            _scope: PhantomData,
        }
    }
}

impl<'gc, T: Trace> From<Option<Gc<'gc, T>>> for GcOpt<'gc, T> {
    fn from(gc: Option<Gc<'gc, T>>) -> Self {
        match gc {
            Some(gc) => gc.into(),
            None => Self::new_none(),
        }
    }
}

impl<'gc, T: Trace + fmt::Debug> fmt::Debug for GcOpt<'gc, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_option(), f)
    }
}
