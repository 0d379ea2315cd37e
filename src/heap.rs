use crate::header::Header;
use std::cell::Cell;
use std::ptr::NonNull;

/// An intrusive doubly linked list of cell headers. The arena keeps two of
/// these, one per color; every live cell sits in exactly one of them.
pub struct GcList {
    head: Cell<Option<NonNull<Header>>>,
    len: Cell<usize>,
}

impl GcList {
    pub fn new() -> Self {
        Self {
            head: Cell::new(None),
            len: Cell::new(0),
        }
    }

    #[cfg(test)]
    pub fn head(&self) -> Option<NonNull<Header>> {
        self.head.get()
    }

    pub fn len(&self) -> usize {
        self.len.get()
    }

    pub fn is_empty(&self) -> bool {
        self.head.get().is_none()
    }

    // SAFETY: `header` must be live and not linked into any list.
    pub unsafe fn push_front(&self, header: NonNull<Header>) {
        let node = header.as_ref();
        let old_head = self.head.get();

        if let Some(old_head) = old_head {
            old_head.as_ref().set_prev(Some(header));
        }

        node.set_prev(None);
        node.set_next(old_head);

        self.head.set(Some(header));
        self.len.set(self.len.get() + 1);
    }

    // SAFETY: `header` must be live and linked into this list.
    pub unsafe fn unlink(&self, header: NonNull<Header>) {
        let node = header.as_ref();
        let prev = node.prev();
        let next = node.next();

        match prev {
            Some(prev) => prev.as_ref().set_next(next),
            None => self.head.set(next),
        }

        if let Some(next) = next {
            next.as_ref().set_prev(prev);
        }

        node.set_prev(None);
        node.set_next(None);
        self.len.set(self.len.get() - 1);
    }

    /// Moves every node of `other` into `self`, which must be empty.
    pub fn take_from(&self, other: &GcList) {
        debug_assert!(self.is_empty());

        self.head.set(other.head.replace(None));
        self.len.set(other.len.replace(0));
    }

    /// Detaches the whole list, leaving it empty. The returned nodes keep
    /// their links, so they can still be walked with `next`.
    pub fn detach(&self) -> Option<NonNull<Header>> {
        self.len.set(0);
        self.head.replace(None)
    }

    // SAFETY: the list must not be modified while the iterator is alive.
    pub unsafe fn iter(&self) -> GcListIter<'_> {
        GcListIter {
            next: self.head.get(),
            _list: self,
        }
    }
}

pub struct GcListIter<'a> {
    next: Option<NonNull<Header>>,
    _list: &'a GcList,
}

impl<'a> Iterator for GcListIter<'a> {
    type Item = NonNull<Header>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        self.next = unsafe { current.as_ref().next() };

        Some(current)
    }
}
