//! Command-line demo: build a graph from flags and animate a traversal.
//!
//! ```text
//! stepgraph --node a --node b --node c \
//!     --edge a:b --edge a:c \
//!     --start a --algorithm bfs --speed 8
//! ```
//!
//! Frames are printed as they arrive; pass `--json` for one JSON object
//! per line instead of the human-readable form.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stepgraph_engine::{Algorithm, FrameEvent, Session};

#[derive(Debug, Parser)]
#[command(name = "stepgraph", version, about = "Animate BFS/DFS over a small undirected graph")]
struct Cli {
    /// Node id to add; repeatable. Ids are trimmed and case-normalized.
    #[arg(long = "node", value_name = "ID")]
    nodes: Vec<String>,

    /// Edge to add as `FROM:TO`; repeatable.
    #[arg(long = "edge", value_name = "FROM:TO")]
    edges: Vec<String>,

    /// Node the traversal starts from.
    #[arg(long)]
    start: String,

    /// Traversal algorithm.
    #[arg(long, default_value = "bfs")]
    algorithm: Algorithm,

    /// Animation speed, 1 (slowest) to 10 (fastest); clamped.
    #[arg(long, default_value_t = 5)]
    speed: u8,

    /// Emit frames as JSON lines instead of the human-readable form.
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn split_edge(raw: &str) -> Result<(&str, &str)> {
    raw.split_once(':')
        .ok_or_else(|| anyhow!("invalid edge '{raw}': expected FROM:TO"))
}

fn render(frame: &FrameEvent) -> String {
    match frame {
        FrameEvent::GraphChanged { nodes, edges, .. } => {
            format!("graph: {} nodes, {} edges", nodes.len(), edges.len())
        }
        FrameEvent::VisitStep { order, current, .. } => {
            let order = order
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join(" -> ");
            format!("visit {current}: [{order}]")
        }
        FrameEvent::StateChanged { from, to, .. } => format!("state: {from} -> {to}"),
        FrameEvent::ErrorRaised { kind, message, .. } => format!("error [{kind}]: {message}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let session = Session::new();
    let mut frames = session.subscribe();

    for node in &cli.nodes {
        session
            .add_node(node)
            .await
            .with_context(|| format!("adding node '{node}'"))?;
    }
    for edge in &cli.edges {
        let (from, to) = split_edge(edge)?;
        session
            .add_edge(from, to)
            .await
            .with_context(|| format!("adding edge '{edge}'"))?;
    }
    session.set_built(true).await;
    let speed = session.set_speed(cli.speed);
    debug!(%speed, "session configured");

    let run = session
        .start(&cli.start, cli.algorithm)
        .await
        .with_context(|| format!("starting {} from '{}'", cli.algorithm, cli.start))?;
    debug!(%run, "run started");

    // Drain frames until the run reaches a terminal state.
    while let Ok(frame) = frames.recv().await {
        if cli.json {
            println!("{}", serde_json::to_string(&frame)?);
        } else {
            println!("{}", render(&frame));
        }
        if let FrameEvent::StateChanged { to, .. } = &frame {
            if to.is_terminal() {
                break;
            }
        }
    }

    let order = session.visit_order().await;
    println!(
        "visited {} of {} nodes",
        order.len(),
        session.node_ids().await.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_split_edge_accepts_from_to() {
        assert_eq!(split_edge("a:b").unwrap(), ("a", "b"));
        // Only the first colon splits; ids never contain one anyway.
        assert_eq!(split_edge("a:b:c").unwrap(), ("a", "b:c"));
    }

    #[test]
    fn test_split_edge_rejects_missing_colon() {
        let err = split_edge("ab").unwrap_err();
        assert!(err.to_string().contains("expected FROM:TO"));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["stepgraph", "--start", "a"]).unwrap();
        assert_eq!(cli.algorithm, Algorithm::Bfs);
        assert_eq!(cli.speed, 5);
        assert!(!cli.json);
        assert!(cli.nodes.is_empty());
        assert!(cli.edges.is_empty());
    }

    #[test]
    fn test_cli_parses_repeated_flags_and_algorithm() {
        let cli = Cli::try_parse_from([
            "stepgraph",
            "--node",
            "a",
            "--node",
            "b",
            "--edge",
            "a:b",
            "--start",
            "a",
            "--algorithm",
            "dfs",
            "--speed",
            "9",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.nodes, vec!["a", "b"]);
        assert_eq!(cli.edges, vec!["a:b"]);
        assert_eq!(cli.algorithm, Algorithm::Dfs);
        assert_eq!(cli.speed, 9);
        assert!(cli.json);
    }

    #[test]
    fn test_cli_requires_start_and_a_known_algorithm() {
        assert!(Cli::try_parse_from(["stepgraph"]).is_err());
        assert!(
            Cli::try_parse_from(["stepgraph", "--start", "a", "--algorithm", "dijkstra"]).is_err()
        );
    }
}
