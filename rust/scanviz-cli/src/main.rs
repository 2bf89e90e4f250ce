//! Scanviz CLI — render recorded table prefix scan traces as diagrams.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use scanviz_core::{check_trace, dot, render_trace, LabelMode, Trace};

// ANSI color helpers
fn green(s: &str) -> String {
    format!("\x1b[32m{}\x1b[0m", s)
}
fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}
fn gray(s: &str) -> String {
    format!("\x1b[90m{}\x1b[0m", s)
}
fn status_label(label: &str) -> String {
    format!("\x1b[1;32m{:>12}\x1b[0m", label)
}

#[derive(Parser)]
#[command(
    name = "scanviz",
    version,
    about = "Render table prefix scan traces as Graphviz diagrams"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render trace files to DOT and SVG
    Render {
        /// Path to the depth-first trace
        #[arg(long, default_value = "steps-example1-DFS.json")]
        dfs: PathBuf,

        /// Path to a breadth-first trace, rendered as a second graph
        #[arg(long)]
        bfs: Option<PathBuf>,

        /// Strip prefixes and hyperlink keys to the package registry
        #[arg(long)]
        linked: bool,

        /// Directory for the .dot and .svg outputs
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Write DOT files only, skip SVG rendering and the viewer
        #[arg(long)]
        no_render: bool,

        /// Render SVG files but do not open them in a viewer
        #[arg(long)]
        no_open: bool,
    },
    /// Validate trace files without writing any output
    Check {
        /// Trace files (default: the example traces in the working directory)
        #[arg()]
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            dfs,
            bfs,
            linked,
            out_dir,
            no_render,
            no_open,
        } => cmd_render(&dfs, bfs.as_deref(), linked, &out_dir, no_render, no_open),
        Commands::Check { files } => cmd_check(&files),
    }
}

fn cmd_render(
    dfs: &Path,
    bfs: Option<&Path>,
    linked: bool,
    out_dir: &Path,
    no_render: bool,
    no_open: bool,
) {
    let mode = if linked {
        LabelMode::Linked
    } else {
        LabelMode::Plain
    };

    std::fs::create_dir_all(out_dir).unwrap_or_else(|e| {
        eprintln!(
            "{} cannot create '{}': {}",
            red("error:"),
            out_dir.display(),
            e
        );
        std::process::exit(1);
    });

    render_one(dfs, "dfs", mode, out_dir, no_render, no_open);
    if let Some(bfs) = bfs {
        render_one(bfs, "bfs", mode, out_dir, no_render, no_open);
    }
}

fn render_one(
    path: &Path,
    name: &str,
    mode: LabelMode,
    out_dir: &Path,
    no_render: bool,
    no_open: bool,
) {
    println!("{} {}", status_label("Loading"), path.display());
    let trace = match Trace::load(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{} {}", red("error:"), e);
            std::process::exit(1);
        }
    };

    let graph = match render_trace(&trace, mode, name) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{} {}", red("error:"), e);
            std::process::exit(1);
        }
    };

    let dot_path = out_dir.join(format!("{}.dot", name));
    graph.save(&dot_path).unwrap_or_else(|e| {
        eprintln!("{} {}", red("error:"), e);
        std::process::exit(1);
    });
    println!(
        "{} {} ({} nodes, {} edges)",
        status_label("Wrote"),
        dot_path.display(),
        graph.node_count(),
        graph.edge_count()
    );

    if no_render {
        return;
    }
    let svg_path = out_dir.join(format!("{}.svg", name));
    println!("{} {}", status_label("Rendering"), svg_path.display());
    dot::render_svg(&dot_path, &svg_path).unwrap_or_else(|e| {
        eprintln!("{} {}", red("error:"), e);
        std::process::exit(1);
    });

    if no_open {
        return;
    }
    println!("{} {}", status_label("Opening"), svg_path.display());
    dot::view(&svg_path).unwrap_or_else(|e| {
        eprintln!("{} {}", red("error:"), e);
        std::process::exit(1);
    });
}

const DEFAULT_TRACES: [&str; 2] = ["steps-example1-DFS.json", "steps-example1-BFS.json"];

fn cmd_check(files: &[PathBuf]) {
    let files: Vec<PathBuf> = if files.is_empty() {
        DEFAULT_TRACES
            .iter()
            .map(PathBuf::from)
            .filter(|p| p.exists())
            .collect()
    } else {
        files.to_vec()
    };

    if files.is_empty() {
        eprintln!(
            "{} no trace files given and no example traces found",
            red("error:")
        );
        std::process::exit(1);
    }

    for path in &files {
        let trace = match Trace::load(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("{} {}", red("error:"), e);
                std::process::exit(1);
            }
        };
        match check_trace(&trace) {
            Ok(summary) => {
                println!(
                    "{} {} {}",
                    green("✓"),
                    bold(&path.display().to_string()),
                    gray(&format!(
                        "— {} steps, {} queries, {} rows, {} nodes, {} edges",
                        summary.steps,
                        summary.queries,
                        summary.rows,
                        summary.nodes,
                        summary.edges
                    ))
                );
            }
            Err(e) => {
                eprintln!("{} {}: {}", red("error:"), path.display(), e);
                std::process::exit(1);
            }
        }
    }
}
