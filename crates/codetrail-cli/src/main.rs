use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use codetrail_api::{ApiError, GraphResponse, LayoutDirection};
use codetrail_graph::elements::{DensityInputs, LayoutOptions};
use codetrail_graph::profile::LayoutProfile;
use codetrail_graph::{channel_reports, format_route_reports, render_edges, route_reports, run_pipeline};
use std::io::Read;
use std::path::PathBuf;

/// Lay out a graph response offline: JSON in, layout elements JSON out.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the graph response JSON ("-" reads stdin)
    #[arg(default_value = "-")]
    input: String,

    #[arg(long, value_enum, default_value_t = DirectionArg::Horizontal)]
    direction: DirectionArg,

    /// Split large outgoing fans through virtual bundle junctions
    #[arg(long)]
    bundle_fan_out: bool,

    /// Density hint: request depth (node/edge counts come from the payload)
    #[arg(long)]
    density_depth: Option<u32>,

    /// Log channel assignment decisions
    #[arg(long)]
    debug_channels: bool,

    /// Log per-edge routing decisions
    #[arg(long)]
    debug_routes: bool,

    /// Print route and channel diagnostics to stderr
    #[arg(long)]
    diagnostics: bool,

    /// Emit per-edge render instructions instead of the raw layout
    #[arg(long)]
    render: bool,

    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Horizontal,
    Vertical,
}

impl From<DirectionArg> for LayoutDirection {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Horizontal => LayoutDirection::Horizontal,
            DirectionArg::Vertical => LayoutDirection::Vertical,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let text = if args.input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading graph response from stdin")?;
        buffer
    } else {
        let path = PathBuf::from(&args.input);
        std::fs::read_to_string(&path)
            .with_context(|| format!("reading graph response from {}", path.display()))?
    };
    let response: GraphResponse =
        serde_json::from_str(&text).context("parsing graph response JSON")?;

    let options = LayoutOptions {
        direction: args.direction.into(),
        bundle_fan_out_edges: args.bundle_fan_out,
        debug_channels: args.debug_channels,
        debug_routes: args.debug_routes,
        density: args.density_depth.map(|depth| DensityInputs {
            depth,
            node_count: response.nodes.len(),
            edge_count: response.edges.len(),
        }),
    };
    let profile = LayoutProfile::default();

    let run = run_pipeline(&response, &options, &profile);
    // Degradations go to stderr as ApiError JSON, the same shape the server
    // reports them in.
    if let Some(cause) = &run.seed_rejection {
        let note = ApiError::invalid_argument(format!("canonical seed rejected: {cause}"));
        eprintln!("{}", serde_json::to_string(&note)?);
    }
    for dropped in &run.dropped_edges {
        let note = ApiError::not_found(format!("edge {dropped} references an unknown node"));
        eprintln!("{}", serde_json::to_string(&note)?);
    }

    if args.diagnostics {
        eprint!("{}", format_route_reports(&route_reports(&run.elements)));
        for report in channel_reports(&run.elements) {
            eprintln!("{report}");
        }
    }

    let json = if args.render {
        let rendered = render_edges(&run.elements, &profile);
        if args.pretty {
            serde_json::to_string_pretty(&rendered)?
        } else {
            serde_json::to_string(&rendered)?
        }
    } else if args.pretty {
        serde_json::to_string_pretty(&run.elements)?
    } else {
        serde_json::to_string(&run.elements)?
    };
    println!("{json}");

    Ok(())
}
