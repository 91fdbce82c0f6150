use super::error::TreeError;
use super::forest::{Forest, NodeIndex};
use super::link::InsertMode;
use tracing::debug;

/// Makes new nodes on behalf of operations that need to create them, like `merge_path`.
///
/// The factory must return a fresh node: detached, childless, and not used anywhere else. A
/// factory that can't make a node should return `TreeError::Construction`, which is passed on to
/// the caller as is. The caller stores the value in the node after checking it.
pub trait NodeFactory<V> {
    /// Create a new node without a value.
    fn create_empty(&mut self, forest: &mut Forest<V>) -> Result<NodeIndex, TreeError>;
}

/// The plain factory: every node is a fresh node in the forest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueNodes;

impl<V> NodeFactory<V> for ValueNodes {
    fn create_empty(&mut self, forest: &mut Forest<V>) -> Result<NodeIndex, TreeError> {
        Ok(forest.new_empty_node())
    }
}

impl<V, F> NodeFactory<V> for F
where
    F: FnMut(&mut Forest<V>) -> Result<NodeIndex, TreeError>,
{
    fn create_empty(&mut self, forest: &mut Forest<V>) -> Result<NodeIndex, TreeError> {
        self(forest)
    }
}

impl<V> Forest<V> {
    /// Create a node holding `value` and insert it relative to `at`.
    pub fn add_value(
        &mut self,
        at: NodeIndex,
        value: V,
        mode: InsertMode,
    ) -> Result<NodeIndex, TreeError> {
        self.add_value_with(&mut ValueNodes, at, value, mode)
    }

    /// Like `add_value`, but the new node is made by `factory`.
    pub fn add_value_with(
        &mut self,
        factory: &mut impl NodeFactory<V>,
        at: NodeIndex,
        value: V,
        mode: InsertMode,
    ) -> Result<NodeIndex, TreeError> {
        let node = self.create_with(factory, Some(at), value)?;
        self.insert(at, node, mode)
    }

    /// Create a node holding `value` and make it the last child of `parent`.
    pub fn add_child_value(&mut self, parent: NodeIndex, value: V) -> Result<NodeIndex, TreeError> {
        self.add_value(parent, value, InsertMode::AsLastChild)
    }

    /// Create a node holding `value` and put it at the end of `sibling`'s sibling chain.
    pub fn add_sibling_value(
        &mut self,
        sibling: NodeIndex,
        value: V,
    ) -> Result<NodeIndex, TreeError> {
        self.add_value(sibling, value, InsertMode::AsLastSibling)
    }

    /// Make sure the tree at `root` contains the path `ancestors..., leaf`, reusing existing
    /// nodes with equal values and creating the rest. Creates the root if there isn't one.
    /// Returns the root.
    ///
    /// The first ancestor goes in the root itself if the root is empty or already holds that
    /// value; otherwise it's looked up among (or added to) the root's siblings. Each following
    /// ancestor is looked up among (or added to) the children of the previous one, and the leaf
    /// is added as a child of the last ancestor unless it's already there. With no ancestors,
    /// the leaf value is stored in the root.
    pub fn merge_path(
        &mut self,
        root: Option<NodeIndex>,
        ancestors: impl IntoIterator<Item = V>,
        leaf: V,
    ) -> Result<NodeIndex, TreeError>
    where
        V: PartialEq,
    {
        self.merge_path_with(&mut ValueNodes, root, ancestors, leaf)
    }

    /// Like `merge_path`, but new nodes are made by `factory`.
    pub fn merge_path_with(
        &mut self,
        factory: &mut impl NodeFactory<V>,
        root: Option<NodeIndex>,
        ancestors: impl IntoIterator<Item = V>,
        leaf: V,
    ) -> Result<NodeIndex, TreeError>
    where
        V: PartialEq,
    {
        let root = match root {
            Some(root) => root,
            None => {
                debug!("merge_path: creating root");
                self.create_fresh(factory, None)?
            }
        };

        let mut current = None;
        for ancestor in ancestors {
            current = Some(match current {
                None => self.merge_first_ancestor(factory, root, ancestor)?,
                Some(parent) => self.merge_child(factory, parent, ancestor)?,
            });
        }

        match current {
            None => {
                self.set_value(root, leaf);
            }
            Some(parent) => {
                self.merge_child(factory, parent, leaf)?;
            }
        }
        Ok(root)
    }

    fn merge_first_ancestor(
        &mut self,
        factory: &mut impl NodeFactory<V>,
        root: NodeIndex,
        value: V,
    ) -> Result<NodeIndex, TreeError>
    where
        V: PartialEq,
    {
        match self.value(root) {
            None => {
                self.set_value(root, value);
                return Ok(root);
            }
            Some(root_value) if *root_value == value => return Ok(root),
            Some(_) => (),
        }
        if let Some(sibling) = self.sibling_with_value(root, &value) {
            return Ok(sibling);
        }
        debug!(?root, "merge_path: adding root-level sibling");
        self.add_value_with(factory, root, value, InsertMode::AsLastSibling)
    }

    fn merge_child(
        &mut self,
        factory: &mut impl NodeFactory<V>,
        parent: NodeIndex,
        value: V,
    ) -> Result<NodeIndex, TreeError>
    where
        V: PartialEq,
    {
        if let Some(child) = self.child_with_value(parent, &value) {
            return Ok(child);
        }
        debug!(?parent, "merge_path: adding child");
        self.add_value_with(factory, parent, value, InsertMode::AsLastChild)
    }

    /// Get a fresh node from `factory` and store `value` in it.
    fn create_with(
        &mut self,
        factory: &mut impl NodeFactory<V>,
        at: Option<NodeIndex>,
        value: V,
    ) -> Result<NodeIndex, TreeError> {
        let node = self.create_fresh(factory, at)?;
        self.set_value(node, value);
        Ok(node)
    }

    /// Get a node from `factory`, and check that it's fresh before anything touches it. `at` is
    /// the node it's about to be inserted next to, if any.
    fn create_fresh(
        &mut self,
        factory: &mut impl NodeFactory<V>,
        at: Option<NodeIndex>,
    ) -> Result<NodeIndex, TreeError> {
        let node = factory.create_empty(self)?;
        let fresh = self.is_valid(node)
            && self.is_detached(node)
            && !self.has_children(node)
            && Some(node) != at;
        if !fresh {
            return Err(TreeError::Construction(
                "factory returned a node that is already in use".to_owned(),
            ));
        }
        Ok(node)
    }
}
