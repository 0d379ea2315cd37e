use std::cell::Cell;
use tricolor::{Arena, ForLt, Gc, GcOpt, Root, Trace, TraceLeaf};

#[derive(TraceLeaf, Clone, Copy, PartialEq, Debug)]
enum Kind {
    Leaf,
    Branch,
}

#[derive(TraceLeaf)]
struct Label(&'static str, Kind);

#[derive(Trace)]
enum Tree<'gc> {
    Empty,
    Leaf(usize),
    Branch {
        left: Gc<'gc, Tree<'gc>>,
        right: Gc<'gc, Tree<'gc>>,
    },
}

#[derive(Trace)]
struct Pair<'gc, T: Trace>(Gc<'gc, T>, Option<Gc<'gc, T>>);

#[derive(Trace)]
struct Wrapper<'gc, T: Trace> {
    inner: GcOpt<'gc, T>,
    label: Label,
}

#[derive(Trace)]
struct Unit;

fn sum<'gc>(tree: Gc<'gc, Tree<'gc>>) -> usize {
    match tree.scoped_deref() {
        Tree::Empty => 0,
        Tree::Leaf(n) => *n,
        Tree::Branch { left, right } => sum(*left) + sum(*right),
    }
}

#[test]
fn leaf_types_are_flagged() {
    assert!(<Kind as Trace>::IS_LEAF);
    assert!(<Label as Trace>::IS_LEAF);
    assert!(<(usize, String) as Trace>::IS_LEAF);
    assert!(<Vec<Cell<u8>> as Trace>::IS_LEAF);

    assert!(!<Tree<'static> as Trace>::IS_LEAF);
    assert!(!<Unit as Trace>::IS_LEAF);
    assert!(!<Option<Gc<'static, usize>> as Trace>::IS_LEAF);
}

#[test]
fn enum_variants_are_traced() {
    let mut arena = Arena::new();
    let root: Root<ForLt![Tree<'_>]> = Root::new(&arena);

    arena.mutate(|mu| {
        let leaf = |n| Gc::new(mu, Tree::Leaf(n));
        let left = Gc::new(
            mu,
            Tree::Branch {
                left: leaf(1),
                right: leaf(2),
            },
        );
        let right = Gc::new(
            mu,
            Tree::Branch {
                left: leaf(3),
                right: Gc::new(mu, Tree::Empty),
            },
        );

        root.set(mu, Gc::new(mu, Tree::Branch { left, right }));
        leaf(100);
    });

    assert_eq!(arena.live_objects(), 8);
    arena.collect();
    assert_eq!(arena.live_objects(), 7);
    arena.mutate(|mu| assert_eq!(sum(root.gc(mu)), 6));
}

#[test]
fn generic_tuple_structs_are_traced() {
    let mut arena = Arena::new();
    let root: Root<ForLt![Pair<'_, usize>]> = Root::new(&arena);

    arena.mutate(|mu| {
        let a = Gc::new(mu, 1usize);
        let b = Gc::new(mu, 2usize);

        root.set(mu, Gc::new(mu, Pair(a, Some(b))));
        Gc::new(mu, 3usize);
    });

    arena.collect();
    assert_eq!(arena.live_objects(), 3);

    arena.mutate(|mu| {
        let pair = root.gc(mu);

        assert_eq!(*pair.0 + *pair.1.unwrap(), 3);
    });
}

#[test]
fn generic_named_structs_are_traced() {
    let mut arena = Arena::new();
    let root: Root<ForLt![Wrapper<'_, Unit>]> = Root::new(&arena);

    arena.mutate(|mu| {
        root.set(
            mu,
            Gc::new(
                mu,
                Wrapper {
                    inner: GcOpt::new(mu, Unit),
                    label: Label("unit", Kind::Branch),
                },
            ),
        )
    });

    arena.collect();
    assert_eq!(arena.live_objects(), 2);

    arena.mutate(|mu| {
        let wrapper = root.gc(mu);

        assert_eq!(wrapper.label.0, "unit");
        assert_eq!(wrapper.label.1, Kind::Branch);
        assert!(wrapper.inner.is_some());
        assert_ne!(Kind::Leaf, wrapper.label.1);
    });
}
