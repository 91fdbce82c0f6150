/// Errors that a caller can provoke through the public tree API.
///
/// Stale node handles are not reported here: like the arena they live in,
/// the forest panics when handed a node that has been deleted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Index {index} is out of bounds for a view of {len} nodes")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("No more nodes in this view")]
    Exhausted,
    #[error("Failed to construct node: {0}")]
    Construction(String),
    #[error("Node is already attached to a tree")]
    AlreadyAttached,
    #[error("Cannot insert a node relative to itself")]
    SelfInsert,
    #[error("Inserting the node would make it its own ancestor")]
    Cycle,
    #[error("A node inserted as a parent must not have children of its own")]
    HasChildren,
}
