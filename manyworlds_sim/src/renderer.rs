//! Text rendering of a multiverse tree.
//!
//! Two styles are supported:
//! - **Decorated**: box-drawing connectors (`├──`, `└──`) with the branch label
//! - **Plain**: ASCII indentation, safe for logs and dumb terminals
//!
//! Rendering only reads the tree; unmeasured leaves are shown as they are.

use manyworlds_core::Universe;

/// Tree drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII indentation
    Plain,
    /// Unicode box-drawing connectors
    #[default]
    Decorated,
}

impl std::fmt::Display for TreeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeStyle::Plain => write!(f, "plain"),
            TreeStyle::Decorated => write!(f, "decorated"),
        }
    }
}

impl std::str::FromStr for TreeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "ascii" => Ok(TreeStyle::Plain),
            "decorated" | "fancy" | "unicode" => Ok(TreeStyle::Decorated),
            _ => Err(format!("Unknown tree style: {}", s)),
        }
    }
}

/// Renders universes as an indented tree.
#[derive(Debug, Clone, Default)]
pub struct TreeRenderer {
    style: TreeStyle,
    show_history: bool,
}

impl TreeRenderer {
    /// Creates a renderer with the given style.
    pub fn new(style: TreeStyle) -> Self {
        Self {
            style,
            show_history: false,
        }
    }

    /// Appends each leaf's history below it.
    pub fn with_history(mut self, show: bool) -> Self {
        self.show_history = show;
        self
    }

    /// Renders the tree rooted at `root`.
    pub fn render(&self, root: &Universe) -> String {
        let mut out = String::new();
        match self.style {
            TreeStyle::Decorated => self.render_decorated(root, "", true, &mut out),
            TreeStyle::Plain => self.render_plain(root, 0, &mut out),
        }
        out
    }

    fn render_decorated(&self, universe: &Universe, prefix: &str, is_last: bool, out: &mut String) {
        let connector = if is_last { "└── " } else { "├── " };
        let label = match universe.origin() {
            Some(origin) => format!("[{}={}] ", origin.observable, origin.outcome),
            None => String::new(),
        };
        out.push_str(&format!("{}{}{}{}\n", prefix, connector, label, describe(universe)));

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        if self.show_history && universe.is_leaf() {
            out.push_str(&format!("{}  History: {}\n", child_prefix, universe.history().join(" | ")));
        }

        let children = universe.children();
        for (i, child) in children.iter().enumerate() {
            self.render_decorated(child, &child_prefix, i + 1 == children.len(), out);
        }
    }

    fn render_plain(&self, universe: &Universe, level: usize, out: &mut String) {
        let indent = "    ".repeat(level);
        let label = match universe.origin() {
            Some(origin) => format!("{}={} ", origin.observable, origin.outcome),
            None => String::new(),
        };
        out.push_str(&format!("{}- {}{}\n", indent, label, describe(universe)));

        if self.show_history && universe.is_leaf() {
            out.push_str(&format!("{}    history: {}\n", indent, universe.history().join(" | ")));
        }

        for child in universe.children() {
            self.render_plain(child, level + 1, out);
        }
    }
}

/// Renders `root` with default settings for `style`.
pub fn render_tree(root: &Universe, style: TreeStyle) -> String {
    TreeRenderer::new(style).render(root)
}

fn describe(universe: &Universe) -> String {
    let probabilities = universe
        .system()
        .probabilities()
        .iter()
        .map(|(outcome, p)| format!("{}:{:.2}", outcome, p))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Universe {} (w={:.5}): {{{}}}",
        universe.id(),
        universe.weight(),
        probabilities
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use manyworlds_core::{HookRegistry, QuantumSystem};

    fn spin_tree() -> Universe {
        let mut root = Universe::root(QuantumSystem::uniform(["up", "down"]).unwrap());
        root.measure_with("spin_z", &HookRegistry::new()).unwrap();
        root
    }

    #[test]
    fn test_decorated_layout() {
        let root = spin_tree();
        let text = render_tree(&root, TreeStyle::Decorated);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("└── Universe "));
        assert!(lines[0].ends_with("(w=1.00000): {up:0.50, down:0.50}"));
        assert!(lines[1].starts_with("    ├── [spin_z=up] Universe "));
        assert!(lines[2].starts_with("    └── [spin_z=down] Universe "));
        assert!(lines[2].ends_with("(w=0.50000): {up:0.00, down:1.00}"));
    }

    #[test]
    fn test_plain_layout() {
        let root = spin_tree();
        let text = render_tree(&root, TreeStyle::Plain);

        assert!(text.is_ascii());
        assert!(text.contains("\n    - spin_z=up Universe "));
    }

    #[test]
    fn test_every_universe_rendered() {
        let root = spin_tree();
        for style in [TreeStyle::Plain, TreeStyle::Decorated] {
            let text = render_tree(&root, style);
            for universe in root.iter() {
                assert!(text.contains(&universe.id().to_string()));
            }
        }
    }

    #[test]
    fn test_every_line_terminated() {
        let root = spin_tree();
        for style in [TreeStyle::Plain, TreeStyle::Decorated] {
            let text = TreeRenderer::new(style).with_history(true).render(&root);
            assert!(text.ends_with('\n'));
            assert_eq!(text.lines().count(), text.matches('\n').count());
        }
    }

    #[test]
    fn test_history_only_on_leaves() {
        let root = spin_tree();
        let text = TreeRenderer::new(TreeStyle::Plain).with_history(true).render(&root);

        assert_eq!(text.matches("history:").count(), 2);
        assert!(text.contains("Universe created | Measured 'spin_z'"));
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("PLAIN".parse::<TreeStyle>(), Ok(TreeStyle::Plain));
        assert_eq!("fancy".parse::<TreeStyle>(), Ok(TreeStyle::Decorated));
        assert!("sparkly".parse::<TreeStyle>().is_err());
    }
}
