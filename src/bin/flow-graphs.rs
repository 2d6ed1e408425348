// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! A thin demonstration harness: loads a JSON-encoded AST, runs the analyzer, and prints the
//! resulting per-name function and member sets. Not a tree-shaking pass — the downstream pruning
//! consumer remains out of scope; this exists only so the crate is runnable end to end.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use flow_graphs::ast_json;
use flow_graphs::error::NoCancellation;
use flow_graphs::graph::FlowGraph;

#[derive(Parser)]
#[clap(about, version)]
struct Cli {
    /// Path to a JSON-encoded program, in this crate's small AST format (see `ast_json::JsonAst`).
    path: PathBuf,

    /// Output format.
    #[clap(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase logging verbosity; repeat for more detail (-v, -vv, -vvv).
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let source = fs::read_to_string(&cli.path).with_context(|| format!("reading {}", cli.path.display()))?;
    let json_ast: ast_json::JsonAst = serde_json::from_str(&source).with_context(|| format!("parsing {}", cli.path.display()))?;
    let (ast, bindings) = ast_json::lower(&json_ast)?;

    let mut graph = FlowGraph::new();
    let stats = graph.apply(&ast, &NoCancellation)?;
    log::info!(
        "saturated {} nodes, {} edges, {} handlers ({} work items processed of {} enqueued)",
        stats.nodes,
        stats.edges,
        stats.handlers,
        stats.work_items_processed,
        stats.work_items_enqueued,
    );

    let summary = graph.summarize(&bindings);
    match cli.format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Format::Text => {
            for entry in &summary.names {
                println!("{}:", entry.name);
                if entry.functions.is_empty() {
                    println!("  functions: (none)");
                } else {
                    let names: Vec<&str> = entry
                        .functions
                        .iter()
                        .map(|&index| summary.functions[index].as_str())
                        .collect();
                    println!("  functions: {}", names.join(", "));
                }
                if entry.members.is_empty() {
                    println!("  members: (none)");
                } else {
                    println!("  members: {}", entry.members.join(", "));
                }
                println!("  dynamic member: {}", entry.has_dynamic_member);
            }
        }
    }

    Ok(())
}
