use super::error::TreeError;
use super::forest::{Forest, NodeIndex};

/// Which nodes a `View` covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSpec {
    /// The node to start at, or `None` for an empty view. If `include_siblings` is set, the
    /// view actually starts at the head of this node's sibling chain.
    pub start: Option<NodeIndex>,
    /// Whether to descend into children (in document order).
    pub recursive: bool,
    /// Whether to move on to the siblings of the starting node. Without it, a flat view holds
    /// just the starting node, and a recursive view holds just its subtree.
    pub include_siblings: bool,
    /// A node to leave out of the view. Its descendants are still included in a recursive view.
    pub ignore: Option<NodeIndex>,
}

/// A read-only, list-like window onto some nodes of a tree: the children of a node, its
/// descendants, or its siblings.
///
/// A `View` borrows the forest, so the tree can't change shape while the view (or any iterator
/// made from it) is alive. Every call to `iter()` starts a fresh pass.
#[derive(Debug)]
pub struct View<'f, V> {
    forest: &'f Forest<V>,
    spec: ViewSpec,
}

/// A single forward pass over a `View`. Once it's used up it stays used up; ask the view for a
/// new one to go around again.
#[derive(Debug)]
pub struct ViewIter<'f, V> {
    forest: &'f Forest<V>,
    /// Ancestors of `current` below the starting level.
    stack: Vec<NodeIndex>,
    /// The next node to yield. Never equal to `ignore`.
    current: Option<NodeIndex>,
    recursive: bool,
    include_siblings: bool,
    ignore: Option<NodeIndex>,
}

impl<'f, V> View<'f, V> {
    pub fn new(forest: &'f Forest<V>, spec: ViewSpec) -> View<'f, V> {
        let start = match spec.start {
            Some(start) if spec.include_siblings => Some(forest.first_sibling(start)),
            start => start,
        };
        View {
            forest,
            spec: ViewSpec { start, ..spec },
        }
    }

    pub fn iter(&self) -> ViewIter<'f, V> {
        let mut iter = ViewIter {
            forest: self.forest,
            stack: Vec::new(),
            current: self.spec.start,
            recursive: self.spec.recursive,
            include_siblings: self.spec.include_siblings,
            ignore: self.spec.ignore,
        };
        iter.skip_ignored();
        iter
    }

    /// The number of nodes in the view. Walks the whole view.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        !self.iter().has_next()
    }

    /// The `index`th node of the view. Walks the view up to that node.
    pub fn get(&self, index: usize) -> Result<NodeIndex, TreeError> {
        self.iter()
            .nth(index)
            .ok_or_else(|| TreeError::IndexOutOfBounds {
                index,
                len: self.len(),
            })
    }

    /// The position of `node` in the view, if it's there.
    pub fn position(&self, node: NodeIndex) -> Option<usize> {
        self.iter().position(|n| n == node)
    }

    /// The values of the nodes in the view, in order. Empty nodes give `None`.
    pub fn values(&self) -> impl Iterator<Item = Option<&'f V>> + 'f {
        let forest = self.forest;
        self.iter().map(move |node| forest.value(node))
    }
}

impl<'a, 'f, V> IntoIterator for &'a View<'f, V> {
    type Item = NodeIndex;
    type IntoIter = ViewIter<'f, V>;

    fn into_iter(self) -> ViewIter<'f, V> {
        self.iter()
    }
}

impl<'f, V> ViewIter<'f, V> {
    pub fn has_next(&self) -> bool {
        self.current.is_some()
    }

    /// Like `Iterator::next()`, but running off the end is an error.
    pub fn next_node(&mut self) -> Result<NodeIndex, TreeError> {
        let node = self.current.ok_or(TreeError::Exhausted)?;
        self.step();
        self.skip_ignored();
        Ok(node)
    }

    fn skip_ignored(&mut self) {
        if self.current.is_some() && self.current == self.ignore {
            self.step();
        }
    }

    fn step(&mut self) {
        let node = match self.current {
            Some(node) => node,
            None => return,
        };
        let f = self.forest;
        self.current = if self.recursive {
            if let Some(child) = f.arena[node].child {
                self.stack.push(node);
                Some(child)
            } else {
                self.climb(node)
            }
        } else if self.include_siblings {
            f.arena[node].next
        } else {
            None
        };
    }

    /// Find the next node after `node`'s subtree, without leaving the starting node's subtree
    /// unless siblings are included.
    fn climb(&mut self, mut node: NodeIndex) -> Option<NodeIndex> {
        let f = self.forest;
        loop {
            if self.stack.is_empty() && !self.include_siblings {
                return None;
            }
            if let Some(next) = f.arena[node].next {
                return Some(next);
            }
            node = self.stack.pop()?;
        }
    }
}

impl<'f, V> Iterator for ViewIter<'f, V> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        self.next_node().ok()
    }
}

impl<V> Forest<V> {
    pub fn view(&self, spec: ViewSpec) -> View<'_, V> {
        View::new(self, spec)
    }

    /// The children of `node`, in order.
    pub fn children(&self, node: NodeIndex) -> View<'_, V> {
        self.view(ViewSpec {
            start: self.first_child(node),
            recursive: false,
            include_siblings: true,
            ignore: None,
        })
    }

    /// All descendants of `node` (not including `node`), in document order.
    pub fn descendants(&self, node: NodeIndex) -> View<'_, V> {
        self.view(ViewSpec {
            start: self.first_child(node),
            recursive: true,
            include_siblings: true,
            ignore: None,
        })
    }

    /// The other nodes in `node`'s sibling chain, in order. `node` itself is left out.
    pub fn siblings(&self, node: NodeIndex) -> View<'_, V> {
        self.view(ViewSpec {
            start: Some(node),
            recursive: false,
            include_siblings: true,
            ignore: Some(node),
        })
    }

    /// `node` followed by all of its descendants, in document order.
    pub fn subtree(&self, node: NodeIndex) -> View<'_, V> {
        self.view(ViewSpec {
            start: Some(node),
            recursive: true,
            include_siblings: false,
            ignore: None,
        })
    }

    /// The first child of `node` whose value equals `value`.
    pub fn child_with_value(&self, node: NodeIndex, value: &V) -> Option<NodeIndex>
    where
        V: PartialEq,
    {
        self.children(node)
            .iter()
            .find(|child| self.value(*child) == Some(value))
    }

    /// The first sibling of `node` (other than `node` itself) whose value equals `value`.
    pub fn sibling_with_value(&self, node: NodeIndex, value: &V) -> Option<NodeIndex>
    where
        V: PartialEq,
    {
        self.siblings(node)
            .iter()
            .find(|sibling| self.value(*sibling) == Some(value))
    }
}
