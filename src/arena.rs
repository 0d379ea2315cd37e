use super::collector::Collector;
use super::config::GcConfig;
use super::debug::ObjectInfo;
use super::error::GcError;
#[cfg(test)]
use super::header::GcMark;
use super::metrics::GcMetrics;
use super::mutator::Mutator;
use super::root::RootSet;

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ARENA_ID: AtomicUsize = AtomicUsize::new(0);

/// A garbage collected arena with a set of scoped roots.
///
/// See the [module-level documentation](./index.html) for more details.
pub struct Arena {
    collector: Collector,
    roots: Rc<RootSet>,
    id: usize,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // roots may outlive the arena, they must not keep pointing at the
        // cells the collector is about to free
        self.roots.clear_all();
    }
}

impl Arena {
    /// Creates an empty arena with the default [`GcConfig`].
    pub fn new() -> Self {
        Self::with_config(GcConfig::default())
    }

    pub fn with_config(config: GcConfig) -> Self {
        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);

        Self {
            collector: Collector::new(config),
            roots: Rc::new(RootSet::new(id)),
            id,
        }
    }

    /// Provides a [`Mutator`] within which values can be allocated into the
    /// arena, and roots can be read and written.
    ///
    /// # Examples
    ///
    /// ```
    /// use tricolor::{Arena, ForLt, Gc, Root};
    ///
    /// let mut arena = Arena::new();
    /// let root: Root<ForLt![usize]> = arena.mutate(|mu| mu.root(Gc::new(mu, 42)));
    ///
    /// arena.mutate(|mu| {
    ///     assert_eq!(*root.gc(mu), 42);
    ///
    ///     // nothing roots this value, so the next collection reclaims it
    ///     Gc::new(mu, 420usize);
    /// });
    ///
    /// arena.collect();
    /// assert_eq!(arena.live_objects(), 1);
    /// ```
    ///
    /// ## Mutator 'gc Lifetime
    /// Handles into the arena are branded with the `'gc` lifetime of the
    /// mutation, so they cannot escape it and be held across a collection.
    ///
    /// ```compile_fail
    /// use tricolor::Arena;
    ///
    /// let mut arena = Arena::new();
    /// let value = arena.mutate(|mu| mu.alloc(42usize));
    ///
    /// arena.collect();
    /// assert_eq!(*value, 42);
    /// ```
    pub fn mutate<F, O>(&self, f: F) -> O
    where
        F: for<'gc> FnOnce(&'gc Mutator<'gc>) -> O,
    {
        let mutator = Mutator::new(self);

        f(&mutator)
    }

    /// Destroys every object that is not reachable from a root.
    ///
    /// Reachability is decided purely by tracing from the roots, so cycles
    /// without a path from any root are reclaimed as well. Each unreachable
    /// object is dropped exactly once.
    pub fn collect(&mut self) {
        self.collector.collect(&self.roots);
    }

    /// Lists every live object with its color, logging each one at debug
    /// level.
    pub fn dump(&self) -> Vec<ObjectInfo> {
        self.collector.dump()
    }

    /// Checks the internal invariants of the heap.
    pub fn verify(&self) -> Result<(), GcError> {
        self.collector.verify()
    }

    /// Returns a snapshot of the arena's metrics.
    pub fn metrics(&self) -> GcMetrics {
        self.collector.metrics().snapshot(self.roots.len())
    }

    pub fn live_objects(&self) -> usize {
        self.collector.metrics().get_live_objects() as usize
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Returns a copy of the the GcConfig that the arena was created with.
    pub fn config(&self) -> GcConfig {
        self.collector.config()
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn root_set(&self) -> &Rc<RootSet> {
        &self.roots
    }

    pub(crate) fn collector(&self) -> &Collector {
        &self.collector
    }

    #[cfg(test)]
    pub(crate) fn white_mark(&self) -> GcMark {
        self.collector.white_mark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ForLt, Gc, GcOpt, Root};
    use std::cell::Cell;

    #[derive(crate::Trace)]
    struct Node<'gc> {
        left: GcOpt<'gc, Node<'gc>>,
        right: GcOpt<'gc, Node<'gc>>,
        val: Cell<usize>,
    }

    impl<'gc> Node<'gc> {
        fn new(val: usize) -> Self {
            Self {
                left: GcOpt::new_none(),
                right: GcOpt::new_none(),
                val: Cell::new(val),
            }
        }
    }

    type NodeRoot = Root<ForLt![Node<'_>]>;

    #[test]
    fn unrooted_objects_are_swept() {
        let mut arena = Arena::new();

        arena.mutate(|mu| {
            for i in 0..100 {
                mu.alloc(Node::new(i));
            }
        });

        assert_eq!(arena.live_objects(), 100);
        arena.collect();
        assert_eq!(arena.live_objects(), 0);
        assert_eq!(arena.metrics().last_swept, 100);
    }

    #[test]
    fn white_mark_flips_every_collection() {
        let mut arena = Arena::new();
        let first = arena.white_mark();

        arena.collect();
        assert_eq!(arena.white_mark(), first.rotate());

        arena.collect();
        assert_eq!(arena.white_mark(), first);
    }

    #[test]
    fn survivors_are_repainted_white_by_the_flip() {
        let mut arena = Arena::new();
        let root: NodeRoot = arena.mutate(|mu| mu.root(mu.alloc(Node::new(1))));

        arena.collect();

        arena.mutate(|mu| {
            let gc = root.gc(mu);

            assert_eq!(gc.header().get_mark(), arena.white_mark());
            assert_eq!(gc.val.get(), 1);
        });
        assert!(arena.verify().is_ok());
    }

    #[test]
    fn allocations_after_a_collection_are_white() {
        let mut arena = Arena::new();
        let root: NodeRoot = arena.mutate(|mu| mu.root(mu.alloc(Node::new(1))));

        arena.collect();

        arena.mutate(|mu| {
            let node = mu.alloc(Node::new(2));
            root.gc(mu).left.set(node);

            assert_eq!(node.header().get_mark(), arena.white_mark());
        });
        assert!(arena.verify().is_ok());

        arena.collect();
        assert_eq!(arena.live_objects(), 2);
    }

    #[test]
    fn dump_lists_every_object() {
        let arena = Arena::new();

        arena.mutate(|mu| {
            mu.alloc(1usize);
            mu.alloc(Node::new(2));
        });

        let dump = arena.dump();

        assert_eq!(dump.len(), 2);
        assert!(dump.iter().all(|info| info.color == crate::Color::White));
        assert!(dump.iter().any(|info| info.type_name == "usize"));
    }

    #[test]
    fn verify_reports_bad_colors() {
        let arena = Arena::new();

        arena.mutate(|mu| {
            let gc = mu.alloc(1usize);

            gc.header().set_mark(arena.white_mark().rotate());

            assert_eq!(
                arena.verify(),
                Err(GcError::ColorMismatch {
                    addr: gc.header_ptr().as_ptr() as usize,
                    expected: crate::Color::White,
                })
            );

            gc.header().set_mark(arena.white_mark());
            assert_eq!(arena.verify(), Ok(()));
        });
    }

    #[test]
    fn arenas_have_distinct_ids() {
        let a = Arena::new();
        let b = Arena::new();

        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn dropping_the_arena_nulls_its_roots() {
        let arena = Arena::new();
        let root: NodeRoot = arena.mutate(|mu| mu.root(Gc::new(mu, Node::new(1))));

        assert!(!root.is_null());
        drop(arena);
        assert!(root.is_null());
    }

    #[test]
    fn custom_config() {
        let config = GcConfig {
            trace_work_capacity: 1,
            dump_on_collect: true,
            verify_heap: true,
        };
        let mut arena = Arena::with_config(config);
        let root: NodeRoot = Root::new(&arena);

        arena.mutate(|mu| {
            let a = mu.alloc(Node::new(1));
            let b = mu.alloc(Node::new(2));
            let c = mu.alloc(Node::new(3));

            a.left.set(b);
            a.right.set(c);
            root.set(mu, a);
        });

        arena.collect();

        assert_eq!(arena.config(), config);
        assert_eq!(arena.live_objects(), 3);
        assert_eq!(arena.metrics().last_marked, 3);
    }
}
