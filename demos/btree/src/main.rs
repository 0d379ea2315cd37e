use log::info;
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use tricolor::{Arena, ForLt, Gc, GcOpt, Mutator, Root, Trace, TraceLeaf};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

// Logs when the node that owns it is created and destroyed.
#[derive(TraceLeaf)]
struct Tag(usize);

impl Tag {
    fn new() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);

        info!("BTree() #{}", id);
        Tag(id)
    }
}

impl Drop for Tag {
    fn drop(&mut self) {
        info!("~BTree() #{}", self.0);
    }
}

#[derive(Trace)]
struct BTree<'gc> {
    left: GcOpt<'gc, BTree<'gc>>,
    right: GcOpt<'gc, BTree<'gc>>,
    data: Cell<i32>,
    tag: Tag,
}

impl<'gc> BTree<'gc> {
    fn new(mu: &'gc Mutator<'gc>) -> Gc<'gc, BTree<'gc>> {
        Gc::new(
            mu,
            BTree {
                left: GcOpt::new_none(),
                right: GcOpt::new_none(),
                data: Cell::new(0),
                tag: Tag::new(),
            },
        )
    }
}

type TreeRoot = Root<ForLt![BTree<'_>]>;

fn dump(arena: &Arena) {
    info!("dump:");
    for object in arena.dump() {
        info!("\t{}", object);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut arena = Arena::new();
    let tree: TreeRoot = Root::new(&arena);
    let interloper: TreeRoot = Root::new(&arena);

    arena.mutate(|mu| {
        let node = BTree::new(mu);

        node.left.set(BTree::new(mu));
        node.right.set(BTree::new(mu));
        node.data.set(1);

        tree.set(mu, node);
        interloper.set(mu, node.left.unwrap());
    });

    tree.clear();
    dump(&arena);

    arena.collect();
    info!("live after first collection: {}", arena.live_objects());
    dump(&arena);

    interloper.clear();
    arena.collect();
    info!("live after second collection: {}", arena.live_objects());

    let metrics = arena.metrics();
    info!(
        "collections = {}, freed = {}, avg collect time = {}us",
        metrics.collections, metrics.freed_objects, metrics.collect_avg_time
    );
}
