//! Saving trees to text and loading them back, as RON or JSON.

use crate::infra::TreeBug;
use crate::tree::{Forest, NodeIndex, TraverseAction};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// One step of a pre-order walk over a tree: a node being opened with its value, or some
/// number of open nodes being closed. Trees are saved as text in this form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeEvent<V> {
    Open(Option<V>),
    Close(usize),
}

/// An owned, nested copy of a tree's shape and values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct TreeShape<V> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<V>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeShape<V>>,
}

impl<V> TreeShape<V> {
    pub fn leaf(value: V) -> TreeShape<V> {
        TreeShape {
            value: Some(value),
            children: Vec::new(),
        }
    }

    pub fn new(value: V, children: Vec<TreeShape<V>>) -> TreeShape<V> {
        TreeShape {
            value: Some(value),
            children,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextFormat {
    Ron,
    Json,
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TextFormat::Ron => write!(f, "ron"),
            TextFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for TextFormat {
    type Err = SerialError;

    fn from_str(s: &str) -> Result<TextFormat, SerialError> {
        match s.to_ascii_lowercase().as_str() {
            "ron" => Ok(TextFormat::Ron),
            "json" => Ok(TextFormat::Json),
            _ => Err(SerialError::UnknownFormat(s.to_owned())),
        }
    }
}

/// A 0-indexed position in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPos {
    pub row: usize,
    pub col: usize,
}

impl TextPos {
    /// Convert 1-indexed line and column numbers, where 0 means "unknown".
    fn from_one_indexed(line: usize, col: usize) -> Option<TextPos> {
        if line == 0 || col == 0 {
            None
        } else {
            Some(TextPos {
                row: line - 1,
                col: col - 1,
            })
        }
    }
}

impl fmt::Display for TextPos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SerialError {
    #[error("Failed to write RON: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("Failed to write JSON: {0}")]
    JsonWrite(#[source] serde_json::Error),
    #[error("Failed to parse {format}{}: {message}", display_pos(.pos))]
    Parse {
        format: TextFormat,
        pos: Option<TextPos>,
        message: String,
    },
    #[error("Unknown format '{0}', expected 'ron' or 'json'")]
    UnknownFormat(String),
    #[error("Tree text closes a node before opening a root node")]
    RootNotOpened,
    #[error("Tree text continues after its root node was closed")]
    RootClosed,
    #[error("Tree text ends with {0} nodes still open")]
    Unclosed(usize),
}

fn display_pos(pos: &Option<TextPos>) -> String {
    match pos {
        Some(pos) => format!(" at {}", pos),
        None => String::new(),
    }
}

impl SerialError {
    fn from_ron_error(error: ron::error::SpannedError) -> SerialError {
        // Serde ron uses 1-indexed positions, with 0,0 as a sentinel value.
        SerialError::Parse {
            format: TextFormat::Ron,
            pos: TextPos::from_one_indexed(error.position.line, error.position.col),
            message: format!("{}", error.code),
        }
    }

    fn from_json_error(error: serde_json::Error) -> SerialError {
        SerialError::Parse {
            format: TextFormat::Json,
            pos: TextPos::from_one_indexed(error.line(), error.column()),
            message: format!("{}", error),
        }
    }
}

impl<V> Forest<V> {
    /// Copy the tree rooted at `root` (but not its siblings) into a `TreeShape`.
    pub fn to_shape(&self, root: NodeIndex) -> TreeShape<V>
    where
        V: Clone,
    {
        // Shapes under construction, one per level from `root` down to the current node.
        let mut stack: Vec<TreeShape<V>> = Vec::new();
        self.traverse(root, |node, level| {
            if level == 1 && node != root {
                return TraverseAction::Abort;
            }
            while stack.len() >= level {
                fold_into_parent(&mut stack);
            }
            stack.push(TreeShape {
                value: self.value(node).cloned(),
                children: Vec::new(),
            });
            TraverseAction::Continue
        });
        while stack.len() > 1 {
            fold_into_parent(&mut stack);
        }
        stack.pop().bug_msg("to_shape: no root")
    }

    /// Build a new detached tree from `shape`, returning its root.
    pub fn from_shape(&mut self, shape: TreeShape<V>) -> NodeIndex {
        let TreeShape { value, children } = shape;
        let root = self.new_node_with(value);
        let mut stack = vec![(root, children.into_iter())];
        while let Some((parent, children)) = stack.last_mut() {
            let parent = *parent;
            match children.next() {
                None => {
                    stack.pop();
                }
                Some(TreeShape { value, children }) => {
                    let node = self.new_node_with(value);
                    self.add_child(parent, node).bug();
                    stack.push((node, children.into_iter()));
                }
            }
        }
        root
    }

    fn new_node_with(&mut self, value: Option<V>) -> NodeIndex {
        match value {
            Some(value) => self.new_node(value),
            None => self.new_empty_node(),
        }
    }

    /// The tree rooted at `root` (but not its siblings) as a list of events, in document order.
    pub fn events(&self, root: NodeIndex) -> Vec<TreeEvent<&V>> {
        let mut events = Vec::new();
        // Number of nodes currently open.
        let mut depth = 0;
        self.traverse(root, |node, level| {
            if level == 1 && node != root {
                return TraverseAction::Abort;
            }
            if depth >= level {
                events.push(TreeEvent::Close(depth - level + 1));
            }
            events.push(TreeEvent::Open(self.value(node)));
            depth = level;
            TraverseAction::Continue
        });
        events.push(TreeEvent::Close(depth));
        events
    }

    /// Build a new detached tree from a list of events, returning its root. The events must open
    /// exactly one root node and close everything they open. On error, the forest is left
    /// unchanged.
    pub fn from_events(
        &mut self,
        events: impl IntoIterator<Item = TreeEvent<V>>,
    ) -> Result<NodeIndex, SerialError> {
        let mut root = None;
        let mut open = Vec::new();
        for event in events {
            match event {
                TreeEvent::Open(value) => {
                    if root.is_some() && open.is_empty() {
                        return self.abandon_tree(root, SerialError::RootClosed);
                    }
                    let node = self.new_node_with(value);
                    match open.last() {
                        Some(&parent) => {
                            self.add_child(parent, node).bug();
                        }
                        None => root = Some(node),
                    }
                    open.push(node);
                }
                TreeEvent::Close(count) => {
                    if count > open.len() {
                        let error = if root.is_none() {
                            SerialError::RootNotOpened
                        } else {
                            SerialError::RootClosed
                        };
                        return self.abandon_tree(root, error);
                    }
                    open.truncate(open.len() - count);
                }
            }
        }
        if !open.is_empty() {
            return self.abandon_tree(root, SerialError::Unclosed(open.len()));
        }
        root.ok_or(SerialError::RootNotOpened)
    }

    fn abandon_tree(
        &mut self,
        root: Option<NodeIndex>,
        error: SerialError,
    ) -> Result<NodeIndex, SerialError> {
        if let Some(root) = root {
            self.delete_tree(root);
        }
        Err(error)
    }

    pub fn write_tree(&self, root: NodeIndex, format: TextFormat) -> Result<String, SerialError>
    where
        V: Serialize,
    {
        debug!(%format, "writing tree");
        let events = self.events(root);
        match format {
            TextFormat::Ron => Ok(ron::ser::to_string_pretty(
                &events,
                ron::ser::PrettyConfig::default(),
            )?),
            TextFormat::Json => {
                serde_json::to_string_pretty(&events).map_err(SerialError::JsonWrite)
            }
        }
    }

    /// Parse a tree from `text` and add it to the forest as a new detached tree. Returns its root.
    /// On error, the forest is left unchanged.
    pub fn read_tree(&mut self, text: &str, format: TextFormat) -> Result<NodeIndex, SerialError>
    where
        V: DeserializeOwned,
    {
        debug!(%format, "reading tree");
        let events = match format {
            TextFormat::Ron => {
                ron::from_str::<Vec<TreeEvent<V>>>(text).map_err(SerialError::from_ron_error)?
            }
            TextFormat::Json => serde_json::from_str::<Vec<TreeEvent<V>>>(text)
                .map_err(SerialError::from_json_error)?,
        };
        self.from_events(events)
    }

    pub fn to_ron_string(&self, root: NodeIndex) -> Result<String, SerialError>
    where
        V: Serialize,
    {
        self.write_tree(root, TextFormat::Ron)
    }

    pub fn from_ron_str(&mut self, text: &str) -> Result<NodeIndex, SerialError>
    where
        V: DeserializeOwned,
    {
        self.read_tree(text, TextFormat::Ron)
    }

    pub fn to_json_string(&self, root: NodeIndex) -> Result<String, SerialError>
    where
        V: Serialize,
    {
        self.write_tree(root, TextFormat::Json)
    }

    pub fn from_json_str(&mut self, text: &str) -> Result<NodeIndex, SerialError>
    where
        V: DeserializeOwned,
    {
        self.read_tree(text, TextFormat::Json)
    }
}

fn fold_into_parent<V>(stack: &mut Vec<TreeShape<V>>) {
    let shape = stack.pop().bug();
    stack.last_mut().bug().children.push(shape);
}
