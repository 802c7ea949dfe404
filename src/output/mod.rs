//! Deterministic rendering of digest results
//!
//! Both formats walk the same tree: at every level the keys are sorted
//! byte-wise and children are written in that order, so the text depends only
//! on the contents of the maps and never on their iteration order.

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

mod json;
mod nix;
pub mod sink;

pub use json::Json;
pub use nix::{escape_nix_string, Nix};
pub use sink::write_output;

/// Output formats accepted by `--output-format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Nix,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Nix => write!(f, "Nix"),
        }
    }
}

/// One node of a nested string mapping: either a leaf string or a map of nodes
pub trait TreeNode {
    /// The leaf value, if this node is a leaf
    fn leaf(&self) -> Option<&str>;

    /// Children ordered by key, empty for leaves
    fn sorted_children(&self) -> Vec<(&str, &dyn TreeNode)>;
}

impl TreeNode for String {
    fn leaf(&self) -> Option<&str> {
        Some(self)
    }

    fn sorted_children(&self) -> Vec<(&str, &dyn TreeNode)> {
        Vec::new()
    }
}

impl<V: TreeNode> TreeNode for HashMap<String, V> {
    fn leaf(&self) -> Option<&str> {
        None
    }

    fn sorted_children(&self) -> Vec<(&str, &dyn TreeNode)> {
        let mut children: Vec<(&str, &dyn TreeNode)> = self
            .iter()
            .map(|(k, v)| (k.as_str(), v as &dyn TreeNode))
            .collect();
        children.sort_by(|a, b| a.0.cmp(b.0));
        children
    }
}

impl<V: TreeNode> TreeNode for BTreeMap<String, V> {
    fn leaf(&self) -> Option<&str> {
        None
    }

    fn sorted_children(&self) -> Vec<(&str, &dyn TreeNode)> {
        self.iter()
            .map(|(k, v)| (k.as_str(), v as &dyn TreeNode))
            .collect()
    }
}

/// Surface syntax of an output format
pub trait Syntax {
    /// Text before the root map's opening brace
    fn prelude(&self) -> &str {
        ""
    }

    /// Quoted, escaped string literal
    fn quote(&self, s: &str) -> Result<String>;

    /// Separator between a key and its value
    fn assign(&self) -> &str;

    /// Terminator after a map entry, given whether another entry follows
    fn entry_end(&self, has_next: bool) -> &str;

    /// Whether an empty map is written as `{}` on one line
    fn compact_empty(&self) -> bool;
}

const INDENT: &str = "  ";

/// Render `root` with the given syntax
pub fn render(root: &dyn TreeNode, syntax: &dyn Syntax) -> Result<String> {
    let mut out = String::from(syntax.prelude());
    render_node(root, syntax, 0, &mut out)?;
    Ok(out)
}

fn render_node(
    node: &dyn TreeNode,
    syntax: &dyn Syntax,
    depth: usize,
    out: &mut String,
) -> Result<()> {
    if let Some(leaf) = node.leaf() {
        out.push_str(&syntax.quote(leaf)?);
        return Ok(());
    }

    let children = node.sorted_children();
    if children.is_empty() && syntax.compact_empty() {
        out.push_str("{}");
        return Ok(());
    }

    out.push_str("{\n");
    let last = children.len().saturating_sub(1);
    for (i, (key, child)) in children.into_iter().enumerate() {
        out.push_str(&INDENT.repeat(depth + 1));
        out.push_str(&syntax.quote(key)?);
        out.push_str(syntax.assign());
        render_node(child, syntax, depth + 1, out)?;
        out.push_str(syntax.entry_end(i < last));
        out.push('\n');
    }
    out.push_str(&INDENT.repeat(depth));
    out.push('}');
    Ok(())
}

/// Options that change the rendered text
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Emit a bare Nix attribute set rather than a `{pkgs, ...}:` function
    pub nix_bare: bool,
}

/// Serialize a tree in the requested format
pub fn serialize(
    root: &dyn TreeNode,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<String> {
    match format {
        OutputFormat::Json => render(root, &Json),
        OutputFormat::Nix => render(
            root,
            &Nix {
                bare: options.nix_bare,
            },
        ),
    }
}
