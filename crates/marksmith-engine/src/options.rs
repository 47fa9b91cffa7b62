use serde::{Deserialize, Serialize};

/// Switches for the Markdown extensions on top of the core syntax.
///
/// Turning an extension off removes its recognizers and builders from the
/// grammar, so the affected syntax falls through to plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Pipe tables with alignment rows.
    pub tables: bool,
    /// `$inline$` and `$$display$$` formulas.
    pub formulas: bool,
    /// `:::name` fenced custom containers.
    pub containers: bool,
    /// `[^label]` references and `[^label]: text` definitions.
    pub footnotes: bool,
    /// `- [ ]` / `- [x]` list items.
    pub task_lists: bool,
    /// `~~struck~~` text.
    pub strikethrough: bool,
    /// Bare URLs and email addresses become links.
    pub autolinks: bool,
    /// Resolve reference links against their definitions after parsing.
    pub resolve_references: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            formulas: true,
            containers: true,
            footnotes: true,
            task_lists: true,
            strikethrough: true,
            autolinks: true,
            resolve_references: true,
        }
    }
}

impl MarkdownOptions {
    /// Only the core syntax, every extension off.
    pub fn core() -> Self {
        Self {
            tables: false,
            formulas: false,
            containers: false,
            footnotes: false,
            task_lists: false,
            strikethrough: false,
            autolinks: false,
            resolve_references: true,
        }
    }
}
