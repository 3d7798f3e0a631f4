use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use routefinder_cli::commands::nearest::{handle_nearest, NearestArgs};
use routefinder_cli::commands::route::{handle_compare, handle_route, EndpointArgs, RouteArgs};
use routefinder_cli::commands::stats::handle_stats;
use routefinder_cli::commands::GraphArgs;
use routefinder_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Road network route finder")]
struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    graph: GraphArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the graph and report node and edge counts.
    Stats,
    /// Find a route between two coordinates.
    Route(RouteArgs),
    /// Run shortest, fewest-edges and alternatives searches side by side.
    Compare(EndpointArgs),
    /// Report the graph node nearest to a coordinate.
    Nearest(NearestArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Stats => handle_stats(&cli.graph, cli.format),
        Command::Route(args) => handle_route(&cli.graph, args, cli.format),
        Command::Compare(args) => handle_compare(&cli.graph, args, cli.format),
        Command::Nearest(args) => handle_nearest(&cli.graph, args, cli.format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
