//! Command tree nodes

use std::path::{Path, PathBuf};

/// One node of a command tree.
///
/// A tree is executed depth-first, strictly in order. Leaves invoke a
/// single shell command; groups sequence their children under a message.
pub enum CommandNode {
    Leaf(Leaf),
    Group(Group),
}

/// A single external command invocation.
pub struct Leaf {
    /// Shell command line, run via `sh -c`.
    pub command: String,
    /// Explicit working directory. Takes precedence over everything else.
    pub dir: Option<PathBuf>,
    /// Working directory relative to the parent's; used when `dir` is unset.
    pub rel_dir: Option<PathBuf>,
    /// Continue silently to the next sibling when the command fails.
    pub ignore_error: bool,
    /// Sub-tree executed in place of error escalation when the command fails.
    pub fallback: Option<Box<CommandNode>>,
}

impl Leaf {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            dir: None,
            rel_dir: None,
            ignore_error: false,
            fallback: None,
        }
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn rel_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.rel_dir = Some(dir.into());
        self
    }

    pub fn ignore_error(mut self) -> Self {
        self.ignore_error = true;
        self
    }

    pub fn fallback(mut self, node: impl Into<CommandNode>) -> Self {
        self.fallback = Some(Box::new(node.into()));
        self
    }

    /// Resolve the working directory for this leaf.
    ///
    /// Precedence: explicit dir, then parent joined with the relative dir,
    /// then the inherited parent directory.
    pub fn working_dir(&self, parent: &Path) -> PathBuf {
        if let Some(dir) = &self.dir {
            dir.clone()
        } else if let Some(rel) = &self.rel_dir {
            parent.join(rel)
        } else {
            parent.to_path_buf()
        }
    }
}

/// A named group of child nodes executed in sequence.
///
/// Children may be `None` placeholders so callers can express conditional
/// steps without restructuring the tree; placeholders are skipped and do
/// not count toward the reported total.
pub struct Group {
    pub message: String,
    pub children: Vec<Option<CommandNode>>,
}

impl Group {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            children: Vec::new(),
        }
    }

    pub fn child(mut self, node: impl Into<CommandNode>) -> Self {
        self.children.push(Some(node.into()));
        self
    }

    /// Push a conditional step; `None` becomes a skipped placeholder.
    pub fn child_if<N: Into<CommandNode>>(mut self, node: Option<N>) -> Self {
        self.children.push(node.map(Into::into));
        self
    }

    /// Children that will actually execute, placeholders filtered out.
    pub fn active_children(&self) -> Vec<&CommandNode> {
        self.children.iter().flatten().collect()
    }
}

impl From<Leaf> for CommandNode {
    fn from(leaf: Leaf) -> Self {
        CommandNode::Leaf(leaf)
    }
}

impl From<Group> for CommandNode {
    fn from(group: Group) -> Self {
        CommandNode::Group(group)
    }
}

impl From<&str> for CommandNode {
    fn from(command: &str) -> Self {
        CommandNode::Leaf(Leaf::new(command))
    }
}

impl From<String> for CommandNode {
    fn from(command: String) -> Self {
        CommandNode::Leaf(Leaf::new(command))
    }
}
