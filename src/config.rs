/// This structure contains the configuration settings for an arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GcConfig {
    /// The initial capacity of the stack of objects waiting to be marked.
    /// The stack grows as needed, this only avoids early reallocations.
    pub trace_work_capacity: usize,

    /// Log a dump of every object and its color at debug level during each
    /// collection, once marking is done and before anything is swept.
    pub dump_on_collect: bool,

    /// Check the generation list invariants after each collection, panicking
    /// if they do not hold. This walks the whole heap, so it is off by default
    /// in release builds.
    pub verify_heap: bool,
}

pub const GC_CONFIG_DEFAULT_TRACE_WORK_CAPACITY: usize = 64;
pub const GC_CONFIG_DEFAULT_DUMP_ON_COLLECT: bool = false;
pub const GC_CONFIG_DEFAULT_VERIFY_HEAP: bool = cfg!(debug_assertions);

impl Default for GcConfig {
    /// Creates a default GcConfig. Good for most use cases.
    fn default() -> Self {
        GcConfig {
            trace_work_capacity: GC_CONFIG_DEFAULT_TRACE_WORK_CAPACITY,
            dump_on_collect: GC_CONFIG_DEFAULT_DUMP_ON_COLLECT,
            verify_heap: GC_CONFIG_DEFAULT_VERIFY_HEAP,
        }
    }
}
