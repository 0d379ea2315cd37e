//! A single-threaded, tri-color mark-sweep garbage collected arena.
//!
//! An [`Arena`] owns every object allocated into it. Objects are allocated
//! and linked together inside a mutation context, see [`Arena::mutate`],
//! whose handles can never outlive it. Objects stay alive while
//! they are reachable from a [`Root`], and [`Arena::collect`] destroys
//! everything else, including unreachable cycles. Each object is destroyed
//! exactly once, either by the collection that finds it unreachable or when
//! the arena itself is dropped.
//!
//! ```rust
//! use tricolor::{Arena, ForLt, Gc, GcOpt, Root, Trace};
//!
//! #[derive(Trace)]
//! struct Node<'gc> {
//!     next: GcOpt<'gc, Node<'gc>>,
//!     val: usize,
//! }
//!
//! let mut arena = Arena::new();
//! let root: Root<ForLt![Node<'_>]> = Root::new(&arena);
//!
//! arena.mutate(|mu| {
//!     let a = Gc::new(mu, Node { next: GcOpt::new_none(), val: 1 });
//!     let b = Gc::new(mu, Node { next: a.into(), val: 2 });
//!
//!     // a cycle, only reachable through the root
//!     a.next.set(b);
//!     root.set(mu, a);
//! });
//!
//! arena.collect();
//! assert_eq!(arena.live_objects(), 2);
//!
//! root.clear();
//! arena.collect();
//! assert_eq!(arena.live_objects(), 0);
//! ```
//!
//! To allocate a type in an arena it must implement [`Trace`], which reports
//! every managed reference the value holds. The derive macro does this for
//! you. Types deriving `Trace` may not implement `Drop`, since a destructor
//! could observe an object that was freed earlier in the same sweep.
//!
//! ```compile_fail
//! use tricolor::{Trace, GcOpt};
//!
//! #[derive(Trace)]
//! struct Foo<'gc> {
//!     next: GcOpt<'gc, Foo<'gc>>,
//! }
//!
//! impl<'gc> Drop for Foo<'gc> {
//!     fn drop(&mut self) {}
//! }
//! ```
//!
//! Types holding no managed references can derive [`TraceLeaf`] instead,
//! and are free to implement `Drop`.
extern crate self as tricolor;

mod arena;
mod collector;
mod config;
mod debug;
mod error;
mod gc;
mod gc_box;
mod header;
mod heap;
mod metrics;
mod mutator;
mod root;
mod trace;

pub use arena::Arena;
pub use config::GcConfig;
pub use debug::{Color, ObjectInfo};
pub use error::GcError;
pub use gc::{Gc, GcOpt};
pub use metrics::GcMetrics;
pub use mutator::Mutator;
pub use root::Root;
pub use trace::{Trace, TraceLeaf, Tracer};
pub use tricolor_derive::{Trace, TraceLeaf};

pub use higher_kinded_types::ForLt;

#[doc(hidden)]
pub use trace::__MustNotDrop;
