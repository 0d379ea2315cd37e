use crate::arena::Arena;
use crate::gc::Gc;
use crate::header::Header;
use crate::mutator::Mutator;
use crate::trace::Trace;

use higher_kinded_types::ForLt;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::rc::Rc;

enum RootSlot {
    Free,
    Live(Option<NonNull<Header>>),
}

/// The registry of live root handles of one arena.
///
/// Every [`Root`] owns one slot for as long as it is alive, so the identity
/// of a root is its slot and not the object it points at; two roots aliasing
/// the same object are two entries.
pub(crate) struct RootSet {
    arena_id: usize,
    slots: RefCell<Vec<RootSlot>>,
    free: RefCell<Vec<usize>>,
    live: Cell<usize>,
}

impl RootSet {
    pub fn new(arena_id: usize) -> Self {
        Self {
            arena_id,
            slots: RefCell::new(vec![]),
            free: RefCell::new(vec![]),
            live: Cell::new(0),
        }
    }

    pub fn arena_id(&self) -> usize {
        self.arena_id
    }

    pub fn len(&self) -> usize {
        self.live.get()
    }

    fn register(&self, ptr: Option<NonNull<Header>>) -> usize {
        let mut slots = self.slots.borrow_mut();

        self.live.set(self.live.get() + 1);

        match self.free.borrow_mut().pop() {
            Some(index) => {
                slots[index] = RootSlot::Live(ptr);
                index
            }
            None => {
                slots.push(RootSlot::Live(ptr));
                slots.len() - 1
            }
        }
    }

    fn release(&self, index: usize) {
        self.slots.borrow_mut()[index] = RootSlot::Free;
        self.free.borrow_mut().push(index);
        self.live.set(self.live.get() - 1);
    }

    fn get(&self, index: usize) -> Option<NonNull<Header>> {
        match self.slots.borrow()[index] {
            RootSlot::Live(ptr) => ptr,
            RootSlot::Free => unreachable!("root slot used after release"),
        }
    }

    fn set(&self, index: usize, ptr: Option<NonNull<Header>>) {
        self.slots.borrow_mut()[index] = RootSlot::Live(ptr);
    }

    /// Points every root at nothing. Called when the arena goes away, so
    /// that roots outliving it cannot reach freed cells.
    pub fn clear_all(&self) {
        for slot in self.slots.borrow_mut().iter_mut() {
            if let RootSlot::Live(ptr) = slot {
                *ptr = None;
            }
        }
    }

    /// Calls `f` with the target of every non-null root.
    pub fn for_each(&self, mut f: impl FnMut(NonNull<Header>)) {
        for slot in self.slots.borrow().iter() {
            if let RootSlot::Live(Some(ptr)) = slot {
                f(*ptr)
            }
        }
    }
}

/// A scope-bound external reference into an [`Arena`].
///
/// Everything reachable from a live root survives [`Arena::collect`]. The
/// root registers itself with its arena when created and deregisters when
/// dropped, whichever way its scope is left.
///
/// Reading or writing a root needs a [`Mutator`] of the arena the root was
/// created with. Passing the mutator of any other arena panics, as does
/// using a root whose arena has been dropped.
///
/// The root type must be a "Higher Kinded Type" (HKT) so that the value it
/// points at can be re-branded with the lifetime of each new mutation.
/// The [`crate::ForLt!`] macro turns a type with an elided lifetime into one:
///
/// ```
/// use tricolor::{Arena, ForLt, Gc, GcOpt, Root, Trace};
///
/// #[derive(Trace)]
/// struct Node<'gc> {
///     next: GcOpt<'gc, Node<'gc>>,
/// }
///
/// let mut arena = Arena::new();
/// let root: Root<ForLt![Node<'_>]> = Root::new(&arena);
///
/// arena.mutate(|mu| root.set(mu, Gc::new(mu, Node { next: GcOpt::new_none() })));
/// arena.collect();
///
/// arena.mutate(|mu| assert!(root.get(mu).is_some()));
/// assert_eq!(arena.live_objects(), 1);
/// ```
pub struct Root<R: ForLt + ?Sized>
where
    for<'a> R::Of<'a>: Trace,
{
    set: Rc<RootSet>,
    slot: usize,
    _kind: PhantomData<*const R>,
}

impl<R: ForLt + ?Sized> Root<R>
where
    for<'a> R::Of<'a>: Trace,
{
    /// Creates a null root registered with `arena`.
    pub fn new(arena: &Arena) -> Self {
        Self::register(arena, None)
    }

    /// Creates a root registered with the mutator's arena and pointing at
    /// `gc`.
    pub fn from_gc<'gc>(mu: &Mutator<'gc>, gc: Gc<'gc, R::Of<'gc>>) -> Self {
        Self::register(mu.arena(), Some(gc.header_ptr()))
    }

    fn register(arena: &Arena, ptr: Option<NonNull<Header>>) -> Self {
        let set = arena.root_set().clone();
        let slot = set.register(ptr);

        Self {
            set,
            slot,
            _kind: PhantomData,
        }
    }

    fn check_arena(&self, mu: &Mutator<'_>) {
        assert_eq!(
            mu.arena().id(),
            self.set.arena_id(),
            "root used with an arena it does not belong to"
        );
    }

    /// Points the root at `gc`.
    ///
    /// # Panics
    ///
    /// Panics if `mu` belongs to another arena than the root.
    pub fn set<'gc>(&self, mu: &Mutator<'gc>, gc: Gc<'gc, R::Of<'gc>>) {
        self.check_arena(mu);
        self.set.set(self.slot, Some(gc.header_ptr()))
    }

    /// Points the root at nothing.
    pub fn clear(&self) {
        self.set.set(self.slot, None)
    }

    pub fn is_null(&self) -> bool {
        self.set.get(self.slot).is_none()
    }

    /// Reads the root, branding the result with the mutation.
    ///
    /// # Panics
    ///
    /// Panics if `mu` belongs to another arena than the root.
    pub fn get<'gc>(&self, mu: &Mutator<'gc>) -> Option<Gc<'gc, R::Of<'gc>>> {
        self.check_arena(mu);

        // SAFETY: the arena is alive since `mu` borrows it, a rooted object is
        // never swept, and only roots of this type write to this slot.
        self.set
            .get(self.slot)
            .map(|header| unsafe { Gc::from_header(header) })
    }

    /// Dereferences the root.
    ///
    /// # Panics
    ///
    /// Panics if the root is null, or if `mu` belongs to another arena.
    pub fn gc<'gc>(&self, mu: &Mutator<'gc>) -> Gc<'gc, R::Of<'gc>> {
        match self.get(mu) {
            Some(gc) => gc,
            None => panic!("Attempt to deref a null root"),
        }
    }
}

impl<R: ForLt + ?Sized> Drop for Root<R>
where
    for<'a> R::Of<'a>: Trace,
{
    fn drop(&mut self) {
        self.set.release(self.slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_reused() {
        let set = RootSet::new(0);
        let a = set.register(None);
        let b = set.register(None);

        assert_eq!(set.len(), 2);
        set.release(a);
        assert_eq!(set.len(), 1);

        let c = set.register(None);
        assert_eq!(c, a);
        assert_ne!(c, b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn for_each_skips_null_and_free_slots() {
        let arena = Arena::new();

        arena.mutate(|mu| {
            let gc = Gc::new(mu, 1usize);
            let set = RootSet::new(arena.id());

            let a = set.register(Some(gc.header_ptr()));
            let _b = set.register(None);
            let c = set.register(Some(gc.header_ptr()));
            set.release(a);

            let mut seen = vec![];
            set.for_each(|ptr| seen.push(ptr));

            assert_eq!(seen, vec![gc.header_ptr()]);

            set.clear_all();
            seen.clear();
            set.for_each(|ptr| seen.push(ptr));

            assert!(seen.is_empty());
            assert_eq!(set.len(), 2);
            set.release(c);
        });
    }

    #[test]
    fn roots_register_and_release() {
        let arena = Arena::new();

        {
            let _a: Root<ForLt![usize]> = Root::new(&arena);
            let _b: Root<ForLt![usize]> = Root::new(&arena);

            assert_eq!(arena.root_count(), 2);
        }

        assert_eq!(arena.root_count(), 0);
    }

    #[test]
    fn roots_release_on_unwind() {
        let arena = Arena::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _root: Root<ForLt![usize]> = Root::new(&arena);

            assert_eq!(arena.root_count(), 1);
            panic!("leaving the root's scope early");
        }));

        assert!(result.is_err());
        assert_eq!(arena.root_count(), 0);
    }

    #[test]
    #[should_panic(expected = "Attempt to deref a null root")]
    fn deref_null_root() {
        let arena = Arena::new();
        let root: Root<ForLt![usize]> = Root::new(&arena);

        arena.mutate(|mu| assert!(*root.gc(mu) == 123));
    }

    #[test]
    #[should_panic(expected = "root used with an arena it does not belong to")]
    fn set_through_another_arena() {
        let a = Arena::new();
        let b = Arena::new();
        let root: Root<ForLt![usize]> = Root::new(&a);

        b.mutate(|mu| root.set(mu, Gc::new(mu, 1usize)));
    }

    #[test]
    fn set_get_and_clear() {
        let arena = Arena::new();
        let root: Root<ForLt![usize]> = Root::new(&arena);

        assert!(root.is_null());

        arena.mutate(|mu| {
            let gc = Gc::new(mu, 69usize);
            root.set(mu, gc);
            assert!(!root.is_null());
            assert!(Gc::ptr_eq(root.gc(mu), gc));

            root.clear();
            assert!(root.get(mu).is_none());
        });
    }
}
