use super::arena::Arena;
use super::gc::Gc;
use super::root::Root;
use super::trace::Trace;

use higher_kinded_types::ForLt;
use std::cell::Cell;
use std::marker::PhantomData;

/// A mutation context for one [`Arena`], obtained through [`Arena::mutate`].
///
/// The `'gc` lifetime is generated fresh for every call to `mutate` and is
/// invariant, so handles obtained from two different mutators can never be
/// mixed, and none of them can escape the closure they were created in.
///
/// ```compile_fail
/// use tricolor::{Arena, Gc, GcOpt, Trace};
///
/// #[derive(Trace)]
/// struct Node<'gc> {
///     next: GcOpt<'gc, Node<'gc>>,
/// }
///
/// let a = Arena::new();
/// let b = Arena::new();
///
/// a.mutate(|mu_a| {
///     b.mutate(|mu_b| {
///         let x = Gc::new(mu_a, Node { next: GcOpt::new_none() });
///         let y = Gc::new(mu_b, Node { next: GcOpt::new_none() });
///
///         // `y` lives in a different arena than `x`
///         x.next.set(y);
///     })
/// });
/// ```
pub struct Mutator<'gc> {
    arena: &'gc Arena,
    _brand: PhantomData<Cell<&'gc ()>>,
}

impl<'gc> Mutator<'gc> {
    pub(crate) fn new(arena: &'gc Arena) -> Self {
        Self {
            arena,
            _brand: PhantomData,
        }
    }

    /// Moves `value` into the arena. Equivalent to [`Gc::new`].
    pub fn alloc<T: Trace + 'gc>(&self, value: T) -> Gc<'gc, T> {
        Gc::from_box(self.arena.collector().alloc(value))
    }

    /// Creates a root pointing at `gc`. Equivalent to [`Root::from_gc`].
    pub fn root<R: ForLt + ?Sized>(&self, gc: Gc<'gc, R::Of<'gc>>) -> Root<R>
    where
        for<'a> R::Of<'a>: Trace,
    {
        Root::from_gc(self, gc)
    }

    pub fn arena(&self) -> &'gc Arena {
        self.arena
    }
}
