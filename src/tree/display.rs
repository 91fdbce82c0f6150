use super::forest::{Forest, NodeIndex};
use super::traverse::TraverseAction;
use std::fmt;

/// Displays a node and its descendants as an s-expression, like `(a (b) (c (d)))`. Nodes
/// without a value are shown as `_`.
pub struct NodeDisplay<'f, V> {
    forest: &'f Forest<V>,
    node: NodeIndex,
}

/// Displays a tree as an outline: one `[value]` line per node, indented by one tab per level.
/// The outline continues on to the following siblings of the starting node.
pub struct Outline<'f, V> {
    forest: &'f Forest<V>,
    start: NodeIndex,
}

impl<V: fmt::Display> Forest<V> {
    pub fn display(&self, node: NodeIndex) -> NodeDisplay<'_, V> {
        NodeDisplay { forest: self, node }
    }

    pub fn outline(&self, start: NodeIndex) -> Outline<'_, V> {
        Outline {
            forest: self,
            start,
        }
    }
}

impl<'f, V: fmt::Display> fmt::Display for NodeDisplay<'f, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = Ok(());
        // Number of parens currently open.
        let mut depth = 0;
        self.forest.traverse(self.node, |node, level| {
            if level == 1 && node != self.node {
                return TraverseAction::Abort;
            }
            result = (|| -> fmt::Result {
                while depth >= level {
                    write!(f, ")")?;
                    depth -= 1;
                }
                if depth > 0 {
                    write!(f, " ")?;
                }
                write!(f, "(")?;
                match self.forest.value(node) {
                    Some(value) => write!(f, "{}", value)?,
                    None => write!(f, "_")?,
                }
                depth += 1;
                Ok(())
            })();
            if result.is_err() {
                TraverseAction::Abort
            } else {
                TraverseAction::Continue
            }
        });
        result?;
        for _ in 0..depth {
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl<'f, V: fmt::Display> fmt::Display for Outline<'f, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = Ok(());
        self.forest.traverse(self.start, |node, level| {
            result = (|| -> fmt::Result {
                for _ in 1..level {
                    write!(f, "\t")?;
                }
                match self.forest.value(node) {
                    Some(value) => writeln!(f, "[{}]", value),
                    None => writeln!(f, "[]"),
                }
            })();
            if result.is_err() {
                TraverseAction::Abort
            } else {
                TraverseAction::Continue
            }
        });
        result
    }
}
