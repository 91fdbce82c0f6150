mod display;
mod error;
mod forest;
mod link;
mod merge;
mod traverse;
mod view;

pub use display::{NodeDisplay, Outline};
pub use error::TreeError;
pub use forest::{Forest, NodeIndex};
pub use link::InsertMode;
pub use merge::{NodeFactory, ValueNodes};
pub use traverse::TraverseAction;
pub use view::{View, ViewIter, ViewSpec};
