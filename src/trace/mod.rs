mod trace;
mod tracer;

pub use trace::{Trace, TraceLeaf, __MustNotDrop};
pub use tracer::Tracer;
