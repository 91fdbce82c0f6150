use super::error::TreeError;
use super::forest::{Forest, NodeIndex};
use std::collections::HashSet;
use tracing::trace;

/// Where to put a node, relative to a reference node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertMode {
    /// Take the reference node's place, and adopt the reference node as the only child.
    AsParent,
    /// Become the first child of the reference node, in front of any existing children.
    AsChild,
    /// Become the last child of the reference node. Walks the whole child list.
    AsLastChild,
    /// Go immediately after the reference node.
    AsNextSibling,
    /// Go immediately before the reference node.
    AsPreviousSibling,
    /// Go at the end of the reference node's sibling chain. Walks the whole chain.
    AsLastSibling,
}

impl<V> Forest<V> {
    /// Insert the detached tree rooted at `node` relative to `at`, as described by `mode`.
    /// Returns `node`.
    ///
    /// A parentless `at` is fine for every mode: sibling modes extend the root-level chain that
    /// `at` is part of, and `AsParent` makes `node` the new root.
    ///
    /// Fails without changing anything if:
    ///
    /// - `node` is `at` (`SelfInsert`).
    /// - `node` has a parent or siblings (`AlreadyAttached`).
    /// - `mode` is `AsParent` and `node` already has children (`HasChildren`).
    /// - `at` is a descendant of `node` (`Cycle`).
    pub fn insert(
        &mut self,
        at: NodeIndex,
        node: NodeIndex,
        mode: InsertMode,
    ) -> Result<NodeIndex, TreeError> {
        if at == node {
            return Err(TreeError::SelfInsert);
        }
        if !self.is_detached(node) {
            return Err(TreeError::AlreadyAttached);
        }
        if mode == InsertMode::AsParent && self.has_children(node) {
            return Err(TreeError::HasChildren);
        }
        if self.is_ancestor_of(node, at) {
            return Err(TreeError::Cycle);
        }

        trace!(?mode, ?at, ?node, "insert");
        let crack = match mode {
            InsertMode::AsParent => {
                Crack::new_remove(self, at).fill(self, node);
                Crack::new_first_child(self, node).fill(self, at);
                return Ok(node);
            }
            InsertMode::AsChild => Crack::new_first_child(self, at),
            InsertMode::AsLastChild => Crack::new_last_child(self, at),
            InsertMode::AsNextSibling => Crack::new_after(self, at),
            InsertMode::AsPreviousSibling => Crack::new_before(self, at),
            InsertMode::AsLastSibling => Crack::new_after(self, self.last_sibling(at)),
        };
        crack.fill(self, node);
        Ok(node)
    }

    /// Like `insert`, but for building a tree from nothing: without a reference node, `node`
    /// simply stays the only node of its own tree.
    pub fn insert_into(
        &mut self,
        at: Option<NodeIndex>,
        node: NodeIndex,
        mode: InsertMode,
    ) -> Result<NodeIndex, TreeError> {
        match at {
            Some(at) => self.insert(at, node, mode),
            None if self.is_detached(node) => Ok(node),
            None => Err(TreeError::AlreadyAttached),
        }
    }

    /// Insert `node` as the last child of `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        node: NodeIndex,
    ) -> Result<NodeIndex, TreeError> {
        self.insert(parent, node, InsertMode::AsLastChild)
    }

    /// Insert `node` at the end of `sibling`'s sibling chain.
    pub fn add_sibling(
        &mut self,
        sibling: NodeIndex,
        node: NodeIndex,
    ) -> Result<NodeIndex, TreeError> {
        self.insert(sibling, node, InsertMode::AsLastSibling)
    }

    /// Append each of `nodes`, in order, after `parent`'s existing children.
    ///
    /// All of them are checked first, with the same rules as `insert`, and a node listed twice
    /// counts as `AlreadyAttached`. If any check fails, nothing is linked.
    pub fn set_children(
        &mut self,
        parent: NodeIndex,
        nodes: impl IntoIterator<Item = NodeIndex>,
    ) -> Result<(), TreeError> {
        let nodes = nodes.into_iter().collect::<Vec<_>>();
        let mut seen = HashSet::new();
        for &node in &nodes {
            if node == parent {
                return Err(TreeError::SelfInsert);
            }
            if !self.is_detached(node) || !seen.insert(node) {
                return Err(TreeError::AlreadyAttached);
            }
            if self.is_ancestor_of(node, parent) {
                return Err(TreeError::Cycle);
            }
        }

        trace!(?parent, count = nodes.len(), "set_children");
        let mut last = self.last_child(parent);
        for node in nodes {
            let crack = match last {
                Some(last) => Crack::new_after(self, last),
                None => Crack::new_first_child(self, parent),
            };
            crack.fill(self, node);
            last = Some(node);
        }
        Ok(())
    }

    /// Insert `node` so that it becomes child number `index` of `parent`. An `index` equal to
    /// the number of children appends it.
    pub fn insert_child(
        &mut self,
        parent: NodeIndex,
        index: usize,
        node: NodeIndex,
    ) -> Result<NodeIndex, TreeError> {
        if index == 0 {
            return self.insert(parent, node, InsertMode::AsChild);
        }
        match self.nth_child(parent, index) {
            Some(at) => self.insert(at, node, InsertMode::AsPreviousSibling),
            None => {
                let len = self.num_children(parent);
                if index == len {
                    self.insert(parent, node, InsertMode::AsLastChild)
                } else {
                    Err(TreeError::IndexOutOfBounds { index, len })
                }
            }
        }
    }

    /// Remove child number `index` of `parent`, and return it. It keeps its own descendants.
    pub fn remove_child(
        &mut self,
        parent: NodeIndex,
        index: usize,
    ) -> Result<NodeIndex, TreeError> {
        match self.nth_child(parent, index) {
            Some(child) => {
                self.remove(child);
                Ok(child)
            }
            None => Err(TreeError::IndexOutOfBounds {
                index,
                len: self.num_children(parent),
            }),
        }
    }

    /// Remove `node` (and its descendants) from its place in the tree, making it the root of a
    /// detached tree. Does nothing if it's already detached.
    pub fn remove(&mut self, node: NodeIndex) {
        if self.is_detached(node) {
            return;
        }
        trace!(?node, "remove");
        Crack::new_remove(self, node).seal(self);
    }

    /// Put the detached tree rooted at `new` exactly where `old` is, detaching `old`.
    /// `old` keeps its children; use `replace_adopting_children` to hand them over instead.
    ///
    /// With `new == None` this is the same as `remove(old)`.
    pub fn replace(&mut self, old: NodeIndex, new: Option<NodeIndex>) -> Result<(), TreeError> {
        let new = match new {
            None => {
                self.remove(old);
                return Ok(());
            }
            Some(new) => new,
        };
        self.check_replacement(old, new)?;
        trace!(?old, ?new, "replace");
        Crack::new_remove(self, old).fill(self, new);
        Ok(())
    }

    /// Like `replace`, but also moves all of `old`'s children, in order, to the end of `new`'s
    /// child list. `old` ends up detached and childless.
    pub fn replace_adopting_children(
        &mut self,
        old: NodeIndex,
        new: NodeIndex,
    ) -> Result<(), TreeError> {
        self.check_replacement(old, new)?;
        trace!(?old, ?new, "replace_adopting_children");
        Crack::new_remove(self, old).fill(self, new);

        let mut last = self.last_child(new);
        while let Some(child) = self.first_child(old) {
            Crack::new_remove(self, child).seal(self);
            let crack = match last {
                Some(last) => Crack::new_after(self, last),
                None => Crack::new_first_child(self, new),
            };
            crack.fill(self, child);
            last = Some(child);
        }
        Ok(())
    }

    fn check_replacement(&self, old: NodeIndex, new: NodeIndex) -> Result<(), TreeError> {
        if old == new {
            Err(TreeError::SelfInsert)
        } else if !self.is_detached(new) {
            Err(TreeError::AlreadyAttached)
        } else if self.is_ancestor_of(new, old) {
            Err(TreeError::Cycle)
        } else {
            Ok(())
        }
    }

    fn link(&mut self, prev: Option<NodeIndex>, next: Option<NodeIndex>) {
        if let Some(prev) = prev {
            self.arena[prev].next = next;
        }
        if let Some(next) = next {
            self.arena[next].prev = prev;
        }
    }
}

/// A position in a sibling chain that a node was removed from, or that a node is about to be
/// inserted into. `prev` and `next` are the nodes on either side of it; `parent` is the parent
/// of the chain, or `None` for a root-level chain.
// NOTE: Never have two cracks open at once in the same chain. Filling one invalidates the other.
#[derive(Debug)]
struct Crack {
    parent: Option<NodeIndex>,
    prev: Option<NodeIndex>,
    next: Option<NodeIndex>,
}

impl Crack {
    fn new_before<V>(f: &Forest<V>, node: NodeIndex) -> Crack {
        Crack {
            parent: f.arena[node].parent,
            prev: f.arena[node].prev,
            next: Some(node),
        }
    }

    fn new_after<V>(f: &Forest<V>, node: NodeIndex) -> Crack {
        Crack {
            parent: f.arena[node].parent,
            prev: Some(node),
            next: f.arena[node].next,
        }
    }

    fn new_first_child<V>(f: &Forest<V>, parent: NodeIndex) -> Crack {
        Crack {
            parent: Some(parent),
            prev: None,
            next: f.arena[parent].child,
        }
    }

    fn new_last_child<V>(f: &Forest<V>, parent: NodeIndex) -> Crack {
        Crack {
            parent: Some(parent),
            prev: f.last_child(parent),
            next: None,
        }
    }

    /// Unlink `node` from its parent and siblings, leaving the neighbors pointing at it until
    /// the crack is sealed or filled.
    fn new_remove<V>(f: &mut Forest<V>, node: NodeIndex) -> Crack {
        let n = &mut f.arena[node];
        let crack = Crack {
            parent: n.parent,
            prev: n.prev,
            next: n.next,
        };
        n.parent = None;
        n.prev = None;
        n.next = None;
        crack
    }

    /// Close the crack by linking its two sides to each other.
    fn seal<V>(self, f: &mut Forest<V>) {
        f.link(self.prev, self.next);
        if self.prev.is_none() {
            if let Some(parent) = self.parent {
                f.arena[parent].child = self.next;
            }
        }
    }

    /// Put the detached `node` into the crack.
    fn fill<V>(self, f: &mut Forest<V>, node: NodeIndex) {
        f.arena[node].parent = self.parent;
        f.link(self.prev, Some(node));
        f.link(Some(node), self.next);
        if self.prev.is_none() {
            if let Some(parent) = self.parent {
                f.arena[parent].child = Some(node);
            }
        }
    }
}

#[cfg(test)]
mod link_tests {
    use super::super::forest::verify_and_print;
    use super::*;

    fn make_mirror(forest: &mut Forest<u32>, height: u32, id: u32) -> NodeIndex {
        let parent = forest.new_node(id);
        for i in 0..height {
            let child = make_mirror(forest, i, id + 2_u32.pow(i));
            forest.add_child(parent, child).unwrap();
        }
        parent
    }

    /// `root` with children `a`, `b`, `c`.
    fn make_abc(forest: &mut Forest<&'static str>) -> [NodeIndex; 4] {
        let root = forest.new_node("root");
        let a = forest.new_node("a");
        let b = forest.new_node("b");
        let c = forest.new_node("c");
        forest.add_child(root, a).unwrap();
        forest.add_child(root, b).unwrap();
        forest.add_child(root, c).unwrap();
        [root, a, b, c]
    }

    #[test]
    fn test_mirror() {
        let mut f = Forest::new();
        make_mirror(&mut f, 3, 0);
        assert_eq!(verify_and_print(&f), "(0 (1) (2 (3)) (4 (5) (6 (7))))");
    }

    #[test]
    fn test_child_then_child_then_last_child() {
        let mut f = Forest::new();
        let root = f.new_node("R");
        let x = f.new_node("X");
        let y = f.new_node("Y");
        let z = f.new_node("Z");
        f.insert(root, x, InsertMode::AsChild).unwrap();
        f.insert(root, y, InsertMode::AsChild).unwrap();
        f.insert(root, z, InsertMode::AsLastChild).unwrap();
        assert_eq!(verify_and_print(&f), "(R (Y) (X) (Z))");
    }

    #[test]
    fn test_sibling_modes() {
        let mut f = Forest::new();
        let [_, a, b, c] = make_abc(&mut f);

        let after_a = f.new_node("a+");
        f.insert(a, after_a, InsertMode::AsNextSibling).unwrap();
        let before_a = f.new_node("-a");
        f.insert(a, before_a, InsertMode::AsPreviousSibling).unwrap();
        let after_c = f.new_node("c+");
        f.insert(c, after_c, InsertMode::AsNextSibling).unwrap();
        let before_b = f.new_node("-b");
        f.insert(b, before_b, InsertMode::AsPreviousSibling).unwrap();
        let last = f.new_node("last");
        f.insert(a, last, InsertMode::AsLastSibling).unwrap();

        assert_eq!(
            verify_and_print(&f),
            "(root (-a) (a) (a+) (-b) (b) (c) (c+) (last))"
        );
    }

    #[test]
    fn test_as_parent() {
        let mut f = Forest::new();
        let [_, _, b, _] = make_abc(&mut f);
        let b_child = f.new_node("b1");
        f.add_child(b, b_child).unwrap();

        let wrapper = f.new_node("wrap");
        f.insert(b, wrapper, InsertMode::AsParent).unwrap();
        assert_eq!(verify_and_print(&f), "(root (a) (wrap (b (b1))) (c))");
        assert_eq!(f.num_children(wrapper), 1);
        assert!(f.is_first(b) && f.is_last(b));
    }

    #[test]
    fn test_as_parent_of_first_child_and_root() {
        let mut f = Forest::new();
        let [root, a, _, _] = make_abc(&mut f);

        let wrap_a = f.new_node("wrapA");
        f.insert(a, wrap_a, InsertMode::AsParent).unwrap();
        assert_eq!(f.first_child(root), Some(wrap_a));

        let top = f.new_node("top");
        f.insert(root, top, InsertMode::AsParent).unwrap();
        assert_eq!(f.root(a), top);
        assert_eq!(verify_and_print(&f), "(top (root (wrapA (a)) (b) (c)))");
    }

    #[test]
    fn test_root_level_siblings() {
        let mut f = Forest::new();
        let first = f.new_node("first");
        let second = f.new_node("second");
        let zeroth = f.new_node("zeroth");
        let last = f.new_node("last");
        f.insert(first, second, InsertMode::AsNextSibling).unwrap();
        f.insert(first, zeroth, InsertMode::AsPreviousSibling).unwrap();
        f.insert(second, last, InsertMode::AsLastSibling).unwrap();
        assert_eq!(f.parent(second), None);
        assert_eq!(f.first_sibling(last), zeroth);
        assert_eq!(verify_and_print(&f), "(zeroth)(first)(second)(last)");

        f.remove(zeroth);
        assert_eq!(f.first_sibling(last), first);
        assert!(f.is_detached(zeroth));
    }

    #[test]
    fn test_remove() {
        let mut f = Forest::new();
        let [root, a, b, c] = make_abc(&mut f);

        f.remove(b);
        assert_eq!(f.first_child(root), Some(a));
        assert_eq!(f.next(a), Some(c));
        assert!(f.is_detached(b));
        assert_eq!(verify_and_print(&f), "(root (a) (c))(b)");

        f.remove(b);
        f.remove(a);
        assert_eq!(f.first_child(root), Some(c));
        f.remove(c);
        assert_eq!(f.first_child(root), None);
        assert_eq!(verify_and_print(&f), "(root)(a)(b)(c)");
    }

    #[test]
    fn test_remove_keeps_descendants() {
        let mut f = Forest::new();
        let root = make_mirror(&mut f, 3, 0);
        let four = f.last_child(root).unwrap();
        f.remove(four);
        assert_eq!(verify_and_print(&f), "(0 (1) (2 (3)))(4 (5) (6 (7)))");

        f.add_child(root, four).unwrap();
        assert_eq!(verify_and_print(&f), "(0 (1) (2 (3)) (4 (5) (6 (7))))");
    }

    #[test]
    fn test_replace_leaves_children_behind() {
        let mut f = Forest::new();
        let [root, _, b, _] = make_abc(&mut f);
        let b_child = f.new_node("b1");
        f.add_child(b, b_child).unwrap();
        let new = f.new_node("B");

        f.replace(b, Some(new)).unwrap();
        assert_eq!(f.nth_child(root, 1), Some(new));
        assert_eq!(verify_and_print(&f), "(root (a) (B) (c))(b (b1))");
    }

    #[test]
    fn test_replace_with_none_removes() {
        let mut f = Forest::new();
        let [_, a, _, _] = make_abc(&mut f);
        f.replace(a, None).unwrap();
        assert_eq!(verify_and_print(&f), "(root (b) (c))(a)");
    }

    #[test]
    fn test_replace_adopting_children() {
        let mut f = Forest::new();
        let [_, a, _, _] = make_abc(&mut f);
        for name in ["a1", "a2"] {
            let child = f.new_node(name);
            f.add_child(a, child).unwrap();
        }
        let new = f.new_node("A");
        let own = f.new_node("A0");
        f.add_child(new, own).unwrap();

        f.replace_adopting_children(a, new).unwrap();
        assert_eq!(verify_and_print(&f), "(root (A (A0) (a1) (a2)) (b) (c))(a)");
    }

    #[test]
    fn test_insert_into_empty() {
        let mut f = Forest::new();
        let only = f.new_node("only");
        assert_eq!(f.insert_into(None, only, InsertMode::AsChild), Ok(only));
        let child = f.new_node("child");
        f.insert_into(Some(only), child, InsertMode::AsChild).unwrap();
        assert_eq!(
            f.insert_into(None, child, InsertMode::AsChild),
            Err(TreeError::AlreadyAttached)
        );
        assert_eq!(verify_and_print(&f), "(only (child))");
    }

    #[test]
    fn test_set_children() {
        let mut f = Forest::new();
        let [root, _, _, _] = make_abc(&mut f);
        let d = f.new_node("d");
        let e = f.new_node("e");
        f.set_children(root, [d, e]).unwrap();
        assert_eq!(verify_and_print(&f), "(root (a) (b) (c) (d) (e))");

        let leaf = f.new_node("leaf");
        let x = f.new_node("x");
        f.set_children(leaf, [x]).unwrap();
        f.set_children(leaf, []).unwrap();
        assert_eq!(f.first_child(leaf), Some(x));
        assert_eq!(f.last_child(leaf), Some(x));
    }

    #[test]
    fn test_set_children_is_all_or_nothing() {
        let mut f = Forest::new();
        let [root, a, _, _] = make_abc(&mut f);
        let d = f.new_node("d");
        let e = f.new_node("e");
        let before = verify_and_print(&f);

        assert_eq!(
            f.set_children(root, [d, a]),
            Err(TreeError::AlreadyAttached)
        );
        assert_eq!(
            f.set_children(root, [d, e, d]),
            Err(TreeError::AlreadyAttached)
        );
        assert_eq!(f.set_children(d, [e, d]), Err(TreeError::SelfInsert));
        assert_eq!(verify_and_print(&f), before);

        f.add_child(d, e).unwrap();
        let before_cycle = verify_and_print(&f);
        assert_eq!(f.set_children(e, [d]), Err(TreeError::Cycle));
        assert_eq!(verify_and_print(&f), before_cycle);

        f.remove(e);
        assert_eq!(verify_and_print(&f), before);
    }

    #[test]
    fn test_insert_and_remove_child_by_index() {
        let mut f = Forest::new();
        let [root, a, b, c] = make_abc(&mut f);
        let first = f.new_node("first");
        let middle = f.new_node("middle");
        let end = f.new_node("end");
        f.insert_child(root, 0, first).unwrap();
        f.insert_child(root, 2, middle).unwrap();
        f.insert_child(root, 5, end).unwrap();
        assert_eq!(
            verify_and_print(&f),
            "(root (first) (a) (middle) (b) (c) (end))"
        );

        let stray = f.new_node("stray");
        assert_eq!(
            f.insert_child(root, 7, stray),
            Err(TreeError::IndexOutOfBounds { index: 7, len: 6 })
        );
        assert!(f.is_detached(stray));

        assert_eq!(f.remove_child(root, 2), Ok(middle));
        assert_eq!(f.remove_child(root, 0), Ok(first));
        assert_eq!(f.remove_child(root, 3), Ok(end));
        assert_eq!(f.children(root).iter().collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(
            f.remove_child(root, 3),
            Err(TreeError::IndexOutOfBounds { index: 3, len: 3 })
        );
    }

    // Error Testing //

    #[test]
    fn test_insert_errors_leave_forest_unchanged() {
        let mut f = Forest::new();
        let [root, a, b, _] = make_abc(&mut f);
        let before = verify_and_print(&f);

        assert_eq!(
            f.insert(a, a, InsertMode::AsChild),
            Err(TreeError::SelfInsert)
        );
        assert_eq!(
            f.insert(a, b, InsertMode::AsNextSibling),
            Err(TreeError::AlreadyAttached)
        );
        assert_eq!(
            f.insert(root, a, InsertMode::AsLastChild),
            Err(TreeError::AlreadyAttached)
        );
        assert_eq!(f.replace(a, Some(b)), Err(TreeError::AlreadyAttached));
        assert_eq!(f.replace(a, Some(a)), Err(TreeError::SelfInsert));
        assert_eq!(verify_and_print(&f), before);
    }

    #[test]
    fn test_cycle() {
        let mut f = Forest::new();
        let [root, a, _, _] = make_abc(&mut f);
        for mode in [
            InsertMode::AsChild,
            InsertMode::AsLastChild,
            InsertMode::AsNextSibling,
            InsertMode::AsPreviousSibling,
            InsertMode::AsLastSibling,
        ] {
            assert_eq!(f.insert(a, root, mode), Err(TreeError::Cycle));
        }
        f.remove(a);
        let detached = f.new_node("x");
        f.add_child(detached, a).unwrap();
        assert_eq!(f.replace(a, Some(detached)), Err(TreeError::Cycle));
    }

    #[test]
    fn test_as_parent_requires_childless_node() {
        let mut f = Forest::new();
        let [_, a, _, _] = make_abc(&mut f);
        let wrapper = f.new_node("wrap");
        let inner = f.new_node("inner");
        f.add_child(wrapper, inner).unwrap();
        assert_eq!(
            f.insert(a, wrapper, InsertMode::AsParent),
            Err(TreeError::HasChildren)
        );
    }
}
