//! Directed graph builder with Graphviz DOT output.
//!
//! Holds declaration order, serializes to DOT text, and shells out to the
//! `dot` binary for SVG rendering. Node labels are either plain text
//! (quoted and escaped on output) or HTML-like markup (emitted verbatim
//! between angle brackets, so callers escape interpolated values with
//! [`escape_html`]).

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DotError {
    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot run 'dot' (is Graphviz installed?): {source}")]
    Exec {
        #[source]
        source: std::io::Error,
    },
    #[error("dot failed ({status}): {stderr}")]
    Render { status: ExitStatus, stderr: String },
    #[error("cannot open '{path}' in a viewer: {source}")]
    View {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A node label, distinguishing the two DOT label grammars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Quoted string label; escaped when serialized.
    Text(String),
    /// HTML-like label; serialized as `<...>` without further escaping.
    Html(String),
}

/// Visual attributes shared by every node of one step type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    pub shape: &'static str,
    pub style: &'static str,
    pub fillcolor: Option<&'static str>,
}

#[derive(Debug)]
struct Node {
    id: String,
    label: Label,
    style: NodeStyle,
}

/// An append-only directed graph.
#[derive(Debug)]
pub struct Digraph {
    name: String,
    comment: Option<String>,
    graph_attrs: Vec<(String, String)>,
    nodes: Vec<Node>,
    edges: Vec<(String, String)>,
}

impl Digraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            graph_attrs: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Leading `//` comment line in the DOT output.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    pub fn set_graph_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.graph_attrs.push((key.into(), value.into()));
    }

    pub fn add_node(&mut self, id: impl Into<String>, label: Label, style: NodeStyle) {
        self.nodes.push(Node {
            id: id.into(),
            label,
            style,
        });
    }

    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.push((from.into(), to.into()));
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Serialize to DOT text, in declaration order.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        if let Some(comment) = &self.comment {
            out.push_str("// ");
            out.push_str(comment);
            out.push('\n');
        }
        out.push_str("digraph ");
        out.push_str(&id_token(&self.name));
        out.push_str(" {\n");
        if !self.graph_attrs.is_empty() {
            let attrs: Vec<String> = self
                .graph_attrs
                .iter()
                .map(|(key, value)| format!("{}={}", id_token(key), id_token(value)))
                .collect();
            out.push_str(&format!("\tgraph [{}]\n", attrs.join(" ")));
        }
        for node in &self.nodes {
            let mut attrs = vec![format!("label={}", label_token(&node.label))];
            if let Some(fillcolor) = node.style.fillcolor {
                attrs.push(format!("fillcolor={}", id_token(fillcolor)));
            }
            attrs.push(format!("shape={}", id_token(node.style.shape)));
            attrs.push(format!("style={}", id_token(node.style.style)));
            out.push_str(&format!(
                "\t{} [{}]\n",
                id_token(&node.id),
                attrs.join(" ")
            ));
        }
        for (from, to) in &self.edges {
            out.push_str(&format!("\t{} -> {}\n", id_token(from), id_token(to)));
        }
        out.push_str("}\n");
        out
    }

    /// Write the DOT text to a file.
    pub fn save(&self, path: &Path) -> Result<(), DotError> {
        std::fs::write(path, self.to_dot()).map_err(|source| DotError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Render a DOT file to SVG with the Graphviz `dot` binary.
pub fn render_svg(dot_path: &Path, svg_path: &Path) -> Result<(), DotError> {
    let output = Command::new("dot")
        .arg("-Tsvg")
        .arg(dot_path)
        .arg("-o")
        .arg(svg_path)
        .output()
        .map_err(|source| DotError::Exec { source })?;

    if !output.status.success() {
        return Err(DotError::Render {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// Open a rendered file in the platform's default viewer.
pub fn view(path: &Path) -> Result<(), DotError> {
    open::that(path).map_err(|source| DotError::View {
        path: path.to_path_buf(),
        source,
    })
}

/// Escape a value for interpolation into an HTML-like label.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn label_token(label: &Label) -> String {
    match label {
        Label::Text(text) => id_token(text),
        Label::Html(html) => format!("<{}>", html),
    }
}

/// Emit a DOT id, quoting unless it is a bare identifier or numeral.
fn id_token(value: &str) -> String {
    if is_bare_id(value) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_bare_id(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if first.is_ascii_digit() {
        // Numerals stand alone; "12a" would need quotes.
        return value.chars().all(|c| c.is_ascii_digit());
    }
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX_STYLE: NodeStyle = NodeStyle {
        shape: "box",
        style: "filled",
        fillcolor: Some("beige"),
    };

    #[test]
    fn serializes_nodes_and_edges_in_order() {
        let mut graph = Digraph::new("dfs");
        graph.set_comment("DFS");
        graph.set_graph_attr("rankdir", "LR");
        graph.add_node("2", Label::Text("a".to_string()), BOX_STYLE);
        graph.add_node("3", Label::Text("b".to_string()), BOX_STYLE);
        graph.add_edge("2", "3");
        let dot = graph.to_dot();
        assert_eq!(
            dot,
            "// DFS\n\
             digraph dfs {\n\
             \tgraph [rankdir=LR]\n\
             \t2 [label=a fillcolor=beige shape=box style=filled]\n\
             \t3 [label=b fillcolor=beige shape=box style=filled]\n\
             \t2 -> 3\n\
             }\n"
        );
    }

    #[test]
    fn quotes_and_escapes_text_labels() {
        let mut graph = Digraph::new("g");
        graph.add_node(
            "1",
            Label::Text("pk: \"a\\b\"".to_string()),
            NodeStyle {
                shape: "box",
                style: "rounded",
                fillcolor: None,
            },
        );
        let dot = graph.to_dot();
        assert!(dot.contains(r#"label="pk: \"a\\b\"""#));
        assert!(!dot.contains("fillcolor"));
    }

    #[test]
    fn html_labels_pass_through_in_angle_brackets() {
        let mut graph = Digraph::new("g");
        graph.add_node("1", Label::Html("<b>Start</b>".to_string()), BOX_STYLE);
        assert!(graph.to_dot().contains("label=<<b>Start</b>>"));
    }

    #[test]
    fn bare_ids_stay_unquoted() {
        assert_eq!(id_token("12"), "12");
        assert_eq!(id_token("rankdir"), "rankdir");
        assert_eq!(id_token("darkseagreen1"), "darkseagreen1");
        assert_eq!(id_token("12a"), "\"12a\"");
        assert_eq!(id_token("two words"), "\"two words\"");
        assert_eq!(id_token(""), "\"\"");
    }

    #[test]
    fn escapes_html_entities() {
        assert_eq!(escape_html("a&b<c>d\"e"), "a&amp;b&lt;c&gt;d&quot;e");
        assert_eq!(escape_html("plain"), "plain");
    }
}
