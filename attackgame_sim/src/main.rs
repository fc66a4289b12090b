//! AttackGame Simulator CLI
//!
//! Plays repeated episodes of the attack-graph game with the baseline
//! strategies and reports the mean discounted payoffs.

use attackgame_core::{DependencyGraph, GraphSpec};
use attackgame_sim::baseline::{PassiveDefender, ThresholdDefender, UniformAttacker};
use attackgame_sim::fixtures::FixtureId;
use attackgame_sim::{
    DefenderPolicy, EpisodeExport, GameSimulation, PayoffAccumulator, SimError, SimulationConfig,
};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// AttackGame episode simulator
#[derive(Parser, Debug)]
#[command(name = "attackgame-sim")]
#[command(about = "Simulate attacker/defender episodes on a dependency graph", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Horizon T; each episode plays rounds 0..=T
    #[arg(short = 'T', long, default_value = "10")]
    time_steps: usize,

    /// Per-step payoff discount in (0, 1]
    #[arg(short, long, default_value = "0.9")]
    discount: f64,

    /// Number of episodes to average over
    #[arg(short, long, default_value = "100")]
    episodes: usize,

    /// Built-in graph (single_root, chain, diamond, layered)
    #[arg(short, long, default_value = "layered")]
    fixture: String,

    /// Load the graph from a JSON file instead of a fixture
    #[arg(short, long)]
    graph: Option<String>,

    /// Probability that the attacker attempts each candidate node
    #[arg(long, default_value = "0.5")]
    attack_prob: f64,

    /// Disable nodes whose belief marginal reaches this value (omit for a passive defender)
    #[arg(long)]
    defend_threshold: Option<f64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for scripting
    #[arg(long)]
    json: bool,

    /// Export the last episode to a JSON file
    #[arg(long)]
    export: Option<String>,
}

/// Loads the graph and returns it with a display name.
fn load_graph(args: &Args) -> Result<(String, DependencyGraph), SimError> {
    if let Some(path) = &args.graph {
        let json = std::fs::read_to_string(path)?;
        let graph = GraphSpec::from_json(&json)?.build()?;
        return Ok((path.clone(), graph));
    }
    let fixture: FixtureId = args.fixture.parse().map_err(|_| SimError::UnknownFixture(args.fixture.clone()))?;
    Ok((fixture.name().to_string(), fixture.build()?))
}

fn run(args: &Args, seed: u64) -> Result<(), SimError> {
    let (graph_name, graph) = load_graph(args)?;
    info!(
        "Graph {}: {} nodes, {} edges, {} targets",
        graph_name,
        graph.node_count(),
        graph.edge_count(),
        graph.target_set().len()
    );

    let config = SimulationConfig::default()
        .with_seed(seed)
        .with_time_steps(args.time_steps)
        .with_discount(args.discount);

    let attacker = UniformAttacker::new(args.attack_prob)?;
    let defender: Box<dyn DefenderPolicy> = match args.defend_threshold {
        Some(threshold) => Box::new(ThresholdDefender::new(threshold, attacker.clone())?),
        None => Box::new(PassiveDefender),
    };
    let defender_name = defender.name().to_string();

    let mut sim = GameSimulation::new(graph, Box::new(attacker), defender, config.clone())?;
    let acc: PayoffAccumulator = sim.estimate_payoffs(args.episodes)?;

    if let Some(path) = &args.export {
        let mut export = EpisodeExport::new(&graph_name, &config, "UniformAttacker", &defender_name);
        export.record(sim.result());
        export.write_to_file(path)?;
        info!("Exported {} frames to {}", export.frames.len(), path);
    }

    let means = acc.mean_payoffs()?;
    if args.json {
        let summary = serde_json::json!({
            "graph": graph_name,
            "seed": seed,
            "episodes": acc.episode_count(),
            "num_time_steps": config.num_time_steps,
            "discount_factor": config.discount_factor,
            "defender": defender_name,
            "mean_defender_payoff": means.defender,
            "mean_attacker_payoff": means.attacker,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("Episodes:              {}", acc.episode_count());
        info!("Mean defender payoff:  {:.4}", means.defender);
        info!("Mean attacker payoff:  {:.4}", means.attacker);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.json { Level::WARN } else { level })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("AttackGame Simulator v{}", env!("CARGO_PKG_VERSION"));
    }

    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    if let Err(e) = run(&args, seed) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
