//! Ordered trees whose nodes are linked to their parent, first child, and neighboring siblings.
//!
//! Nodes live in a [`Forest`] and are referred to by [`NodeIndex`]. A forest can hold any number
//! of trees, and the roots of trees may themselves be chained together as siblings. Nodes are
//! moved around with [`Forest::insert`], [`Forest::remove`], and [`Forest::replace`]; walked with
//! [`Forest::traverse`]; and read through [`View`]s such as [`Forest::children`] and
//! [`Forest::descendants`].

mod infra;
pub mod serial;
mod tree;

pub use serial::{SerialError, TextFormat, TreeEvent, TreeShape};
pub use tree::{
    Forest, InsertMode, NodeDisplay, NodeFactory, NodeIndex, Outline, TraverseAction, TreeError,
    ValueNodes, View, ViewIter, ViewSpec,
};
