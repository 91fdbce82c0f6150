use super::forest::{Forest, NodeIndex};

/// What a `traverse` visitor wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraverseAction {
    /// Keep going, descending into this node's children.
    Continue,
    /// Keep going, but don't visit this node's descendants.
    SkipSubtree,
    /// Stop the traversal immediately.
    Abort,
}

impl<V> Forest<V> {
    /// Walk the tree in document order starting at `start`, calling `visit(node, level)` on every
    /// node. The level of `start` is 1, and goes up by one per generation below it.
    ///
    /// After `start`'s subtree, the walk continues through `start`'s following siblings (and
    /// their subtrees), so starting at a root walks its whole tree plus any root-level siblings.
    ///
    /// Returns the node whose visit returned `Abort`, or `None` if the walk finished.
    /// Uses an explicit stack, so deep trees are fine.
    pub fn traverse(
        &self,
        start: NodeIndex,
        mut visit: impl FnMut(NodeIndex, usize) -> TraverseAction,
    ) -> Option<NodeIndex> {
        // Ancestors of `current`, up to (but not including) the level of `start`.
        let mut stack = Vec::new();
        let mut current = Some(start);
        while let Some(node) = current {
            let level = stack.len() + 1;
            let descend = match visit(node, level) {
                TraverseAction::Continue => true,
                TraverseAction::SkipSubtree => false,
                TraverseAction::Abort => return Some(node),
            };
            current = match self.arena[node].child {
                Some(child) if descend => {
                    stack.push(node);
                    Some(child)
                }
                _ => self.next_after_subtree(node, &mut stack),
            };
        }
        None
    }

    /// The node that comes after `node`'s subtree in document order, popping finished
    /// ancestors off of `stack` along the way.
    fn next_after_subtree(&self, node: NodeIndex, stack: &mut Vec<NodeIndex>) -> Option<NodeIndex> {
        let mut node = node;
        loop {
            if let Some(next) = self.arena[node].next {
                return Some(next);
            }
            node = stack.pop()?;
        }
    }
}

#[cfg(test)]
mod traverse_tests {
    use super::*;

    /// (a (b (c) (d)) (e (f)) (g))
    fn make_tree(f: &mut Forest<char>) -> NodeIndex {
        let a = f.new_node('a');
        let b = f.new_node('b');
        f.add_child(a, b).unwrap();
        for name in ['c', 'd'] {
            let n = f.new_node(name);
            f.add_child(b, n).unwrap();
        }
        let e = f.new_node('e');
        f.add_child(a, e).unwrap();
        let ff = f.new_node('f');
        f.add_child(e, ff).unwrap();
        let g = f.new_node('g');
        f.add_child(a, g).unwrap();
        a
    }

    fn walk(
        f: &Forest<char>,
        start: NodeIndex,
        mut control: impl FnMut(char) -> TraverseAction,
    ) -> String {
        let mut visited = String::new();
        f.traverse(start, |node, level| {
            let name = *f.value(node).unwrap();
            visited.push_str(&format!("{}{} ", name, level));
            control(name)
        });
        visited.trim_end().to_owned()
    }

    #[test]
    fn test_document_order() {
        let mut f = Forest::new();
        let a = make_tree(&mut f);
        assert_eq!(
            walk(&f, a, |_| TraverseAction::Continue),
            "a1 b2 c3 d3 e2 f3 g2"
        );
    }

    #[test]
    fn test_skip_subtree() {
        let mut f = Forest::new();
        let a = make_tree(&mut f);
        let skip_b = |name: char| {
            if name == 'b' {
                TraverseAction::SkipSubtree
            } else {
                TraverseAction::Continue
            }
        };
        assert_eq!(walk(&f, a, skip_b), "a1 b2 e2 f3 g2");
    }

    #[test]
    fn test_skip_root() {
        let mut f = Forest::new();
        let a = make_tree(&mut f);
        assert_eq!(walk(&f, a, |_| TraverseAction::SkipSubtree), "a1");
    }

    #[test]
    fn test_abort() {
        let mut f = Forest::new();
        let a = make_tree(&mut f);
        let mut aborted_at = None;
        let visited = walk(&f, a, |name| {
            if name == 'd' {
                aborted_at = Some(name);
                TraverseAction::Abort
            } else {
                TraverseAction::Continue
            }
        });
        assert_eq!(visited, "a1 b2 c3 d3");
        assert_eq!(aborted_at, Some('d'));

        let d = f.nth_child(f.first_child(a).unwrap(), 1).unwrap();
        let result = f.traverse(a, |node, _| {
            if node == d {
                TraverseAction::Abort
            } else {
                TraverseAction::Continue
            }
        });
        assert_eq!(result, Some(d));
        assert_eq!(f.traverse(a, |_, _| TraverseAction::Continue), None);
    }

    #[test]
    fn test_start_mid_tree_continues_to_siblings() {
        let mut f = Forest::new();
        let a = make_tree(&mut f);
        let b = f.first_child(a).unwrap();
        let e = f.next(b).unwrap();
        assert_eq!(walk(&f, e, |_| TraverseAction::Continue), "e1 f2 g1");
    }

    #[test]
    fn test_deep_tree() {
        let mut f = Forest::new();
        let root = f.new_node('x');
        let mut parent = root;
        for _ in 0..10_000 {
            let child = f.new_node('x');
            f.add_child(parent, child).unwrap();
            parent = child;
        }
        let mut count = 0;
        let mut deepest = 0;
        f.traverse(root, |_, level| {
            count += 1;
            deepest = deepest.max(level);
            TraverseAction::Continue
        });
        assert_eq!(count, 10_001);
        assert_eq!(deepest, 10_001);
    }
}
