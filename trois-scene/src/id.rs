//! Node identities
use std::fmt;

/// Index of a node in a [`SceneGraph`](crate::SceneGraph) arena.
///
/// Ids are handed out in increasing order and never reused, so a stale id
/// of a destroyed node resolves to nothing instead of a different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Placeholder carried by objects that have not been inserted yet.
    pub const DETACHED: NodeId = NodeId(usize::MAX);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::DETACHED {
            write!(f, "#detached")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Monotonic id source owned by a scene graph.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = IdAllocator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a < b);
        assert_eq!(b.index(), 1);
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_separate_allocators_restart() {
        let mut first = IdAllocator::new();
        first.next_id();
        let mut second = IdAllocator::new();
        assert_eq!(second.next_id(), NodeId(0));
        assert_eq!(NodeId(3).to_string(), "#3");
        assert_eq!(NodeId::DETACHED.to_string(), "#detached");
    }
}
