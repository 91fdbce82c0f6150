use crate::bug;
use crate::infra::TreeBug;
use generational_arena::Arena;

/// An index into a Forest, which represents a node in a tree.
pub type NodeIndex = generational_arena::Index;

/// A collection of trees. Every node in a tree holds an optional value `V`.
///
/// **Methods on `Forest` will panic if they're given an Index to a node that was deleted.** The
/// one exception is the `is_valid()` method, which checks whether a node has been deleted.
///
/// Nodes are never freed implicitly. Removing a node from its tree leaves it (and its
/// descendants) in the forest as a detached tree, which stays usable until it's either
/// re-inserted or passed to `delete_tree()`.
///
/// This library solves these problems:
///
/// - Ensuring that parent/child links and prev/next sibling links always agree.
/// - Preventing cycles at runtime.
///
/// It does NOT solve these problems:
///
/// - Preventing "use after free" (see the note on deletion above).
/// - Removing the need to pass the `Forest` in to every method call.
#[derive(Debug)]
pub struct Forest<V> {
    pub(super) arena: Arena<Node<V>>,
}

/// A node in a doubly-linked-list representation of a tree. All nodes store their parent
/// (except root nodes which don't have a parent). Parents store only their first child. The
/// siblings are linked to each other in a chain that ends in `None` on both sides.
#[derive(Debug)]
pub(super) struct Node<V> {
    pub(super) parent: Option<NodeIndex>,
    /// The first child, if any.
    pub(super) child: Option<NodeIndex>,
    pub(super) prev: Option<NodeIndex>,
    pub(super) next: Option<NodeIndex>,
    pub(super) value: Option<V>,
}

impl<V> Node<V> {
    fn new(value: Option<V>) -> Node<V> {
        Node {
            parent: None,
            child: None,
            prev: None,
            next: None,
            value,
        }
    }
}

impl<V> Default for Forest<V> {
    fn default() -> Forest<V> {
        Forest::new()
    }
}

impl<V> Forest<V> {
    /// Create a new empty forest.
    pub fn new() -> Forest<V> {
        Forest {
            arena: Arena::new(),
        }
    }

    /// Create a new root node containing the given value.
    pub fn new_node(&mut self, value: V) -> NodeIndex {
        self.arena.insert(Node::new(Some(value)))
    }

    /// Create a new root node that doesn't hold a value yet.
    pub fn new_empty_node(&mut self) -> NodeIndex {
        self.arena.insert(Node::new(None))
    }

    /// The total number of nodes in the forest, across all trees (attached or not).
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// True if the forest still contains this node (i.e. its tree hasn't been deleted).
    pub fn is_valid(&self, node: NodeIndex) -> bool {
        self.arena.contains(node)
    }

    /*************
     * Relatives *
     *************/

    /// Get the parent of `node`, or `None` if it's a root.
    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.arena[node].parent
    }

    /// Get the first child of `node`, or `None` if it has no children.
    pub fn first_child(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.arena[node].child
    }

    /// Get the last child of `node`. Walks the whole child list.
    pub fn last_child(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.arena[node]
            .child
            .map(|first_child| self.last_sibling(first_child))
    }

    /// Get the `node`'s n'th child, if any.
    pub fn nth_child(&self, node: NodeIndex, n: usize) -> Option<NodeIndex> {
        let mut child = self.arena[node].child?;
        for _ in 0..n {
            child = self.arena[child].next?;
        }
        Some(child)
    }

    /// Get the `node`'s previous sibling, if any.
    pub fn prev(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.arena[node].prev
    }

    /// Get the `node`'s next sibling, if any.
    pub fn next(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.arena[node].next
    }

    /// Get the head of `node`'s sibling chain (which could be itself).
    pub fn first_sibling(&self, node: NodeIndex) -> NodeIndex {
        if let Some(parent) = self.arena[node].parent {
            self.arena[parent]
                .child
                .bug_msg("parent of a node has no first child")
        } else {
            let mut sibling = node;
            while let Some(prev) = self.arena[sibling].prev {
                sibling = prev;
            }
            sibling
        }
    }

    /// Get the tail of `node`'s sibling chain (which could be itself).
    pub fn last_sibling(&self, node: NodeIndex) -> NodeIndex {
        let mut sibling = node;
        while let Some(next) = self.arena[sibling].next {
            sibling = next;
        }
        sibling
    }

    /// Whether this node is first among its siblings. (True if there's one sibling.)
    pub fn is_first(&self, node: NodeIndex) -> bool {
        self.arena[node].prev.is_none()
    }

    /// Whether this node is last among its siblings. (True if there's one sibling.)
    pub fn is_last(&self, node: NodeIndex) -> bool {
        self.arena[node].next.is_none()
    }

    /// Whether this node has no parent and no siblings, i.e. is the root of a tree of its own.
    pub fn is_detached(&self, node: NodeIndex) -> bool {
        let node = &self.arena[node];
        node.parent.is_none() && node.prev.is_none() && node.next.is_none()
    }

    pub fn has_children(&self, node: NodeIndex) -> bool {
        self.arena[node].child.is_some()
    }

    pub fn num_children(&self, node: NodeIndex) -> usize {
        let mut num_children = 0;
        let mut child = self.arena[node].child;
        while let Some(c) = child {
            num_children += 1;
            child = self.arena[c].next;
        }
        num_children
    }

    /// Determine this node's index among its siblings. Returns `0` for the head of a chain.
    pub fn sibling_index(&self, node: NodeIndex) -> usize {
        let mut sibling_index = 0;
        let mut sibling = node;
        while let Some(prev) = self.arena[sibling].prev {
            sibling = prev;
            sibling_index += 1;
        }
        sibling_index
    }

    /// Get the root of the tree that `node` belongs to (exactly the node you
    /// would get by calling `parent` repeatedly).
    pub fn root(&self, node: NodeIndex) -> NodeIndex {
        let mut ancestor = node;
        while let Some(parent) = self.arena[ancestor].parent {
            ancestor = parent;
        }
        ancestor
    }

    /// Whether `potential_ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor_of(&self, potential_ancestor: NodeIndex, node: NodeIndex) -> bool {
        let mut ancestor = node;
        loop {
            if ancestor == potential_ancestor {
                return true;
            }
            match self.arena[ancestor].parent {
                Some(parent) => ancestor = parent,
                None => return false,
            }
        }
    }

    /// The heads of every root-level sibling chain in the forest, in no particular order.
    /// Usually each of these is the root of a single tree.
    pub fn roots(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.arena
            .iter()
            .filter(|(_, node)| node.parent.is_none() && node.prev.is_none())
            .map(|(index, _)| index)
    }

    /**********
     * Values *
     **********/

    /// Borrows the value stored inside `node`, if it has one.
    pub fn value(&self, node: NodeIndex) -> Option<&V> {
        self.arena[node].value.as_ref()
    }

    /// Mutably borrows the value stored inside `node`, if it has one.
    pub fn value_mut(&mut self, node: NodeIndex) -> Option<&mut V> {
        self.arena[node].value.as_mut()
    }

    /// Stores `value` inside `node`, returning the value it held before.
    pub fn set_value(&mut self, node: NodeIndex, value: V) -> Option<V> {
        self.arena[node].value.replace(value)
    }

    /// Removes the value from `node`, leaving it empty.
    pub fn take_value(&mut self, node: NodeIndex) -> Option<V> {
        self.arena[node].value.take()
    }

    /************
     * Deletion *
     ************/

    /// Delete the given detached `root` node, including all of its descendants.
    /// This invalidates all of their `NodeIndex`es. Panics if `root` is still attached.
    pub fn delete_tree(&mut self, root: NodeIndex) {
        if !self.is_detached(root) {
            bug!("Forest - can only delete detached trees");
        }

        let mut to_delete = vec![root];
        while let Some(node) = to_delete.pop() {
            let node = self.arena.remove(node).bug_msg("Forest - deleted twice");
            if let Some(next) = node.next {
                to_delete.push(next);
            }
            if let Some(child) = node.child {
                to_delete.push(child);
            }
        }
    }
}

/// Verify and print a forest. Panic if verification fails. Verification checks:
///
/// - Every node is accounted for in a tree.
/// - `a.next == b` iff `b.prev == a`.
/// - The first child of every node has no `prev`, and every node without a `prev` that has a
///   parent is that parent's first child.
/// - Every node in a sibling chain has the same parent.
///
/// Trees are printed as s-expressions, with root-level siblings printed one after another.
#[cfg(test)]
pub(crate) fn verify_and_print<V: std::fmt::Display>(forest: &Forest<V>) -> String {
    struct Verifier<'a, V> {
        node_count: usize,
        display: String,
        forest: &'a Forest<V>,
    }

    impl<'a, V: std::fmt::Display> Verifier<'a, V> {
        fn verify_chain(&mut self, head: NodeIndex, expected_parent: Option<NodeIndex>) {
            assert!(self.forest.arena[head].prev.is_none());
            let mut node = head;
            loop {
                if node != head && expected_parent.is_some() {
                    self.display.push(' ');
                }
                self.verify_tree(node, expected_parent);
                match self.forest.arena[node].next {
                    None => break,
                    Some(next) => {
                        assert_eq!(self.forest.arena[next].prev, Some(node));
                        node = next;
                    }
                }
            }
        }

        fn verify_tree(&mut self, node: NodeIndex, expected_parent: Option<NodeIndex>) {
            assert!(self.forest.is_valid(node));
            assert_eq!(self.forest.parent(node), expected_parent);
            if let Some(prev) = self.forest.prev(node) {
                assert_eq!(self.forest.next(prev), Some(node));
            }
            if let Some(next) = self.forest.next(node) {
                assert_eq!(self.forest.prev(next), Some(node));
            }
            self.node_count += 1;

            self.display.push('(');
            match self.forest.value(node) {
                Some(value) => self.display.push_str(&value.to_string()),
                None => self.display.push('_'),
            }
            if let Some(first_child) = self.forest.first_child(node) {
                self.display.push(' ');
                self.verify_chain(first_child, Some(node));
            }
            self.display.push(')');
        }
    }

    let mut verifier = Verifier {
        node_count: 0,
        display: String::new(),
        forest,
    };
    let mut heads = forest.roots().collect::<Vec<_>>();
    heads.sort();
    for head in heads {
        verifier.verify_chain(head, None);
    }
    assert_eq!(verifier.node_count, forest.len());
    verifier.display
}
