use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{self, WrapErr};
use cuboid_core::{Color, Cube, Dimensions, MoveSet};
use log::info;
use owo_colors::{OwoColorize, Rgb};
use state_graph::{DEFAULT_MAX_NODES, ExploreConfig, GraphError, StateGraph, explore_with};

#[derive(Parser)]
#[command(name = "cuboid", version)]
#[command(about = "Turn generalized Rubik's cuboids and explore their state spaces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the unfolded net of a cuboid, optionally after some moves
    Show {
        /// Height, width and length, as `3x2x1` or `3,2,1`
        #[arg(long)]
        dims: Dimensions,

        /// A sequence of moves to apply to the solved cuboid, as `"R2 U2"`
        #[arg(long)]
        moves: Option<String>,

        /// Print sticker letters without color
        #[arg(long)]
        plain: bool,
    },
    /// Find every state reachable under a set of moves
    Explore {
        /// Height, width and length, as `3x2x1` or `3,2,1`
        #[arg(long)]
        dims: Dimensions,

        /// The permitted moves, as `"R2 U2 D2"`
        #[arg(long)]
        moves: MoveSet,

        /// Give up after finding this many states
        #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
        max_nodes: usize,

        /// Never give up, however large the state space is
        #[arg(long, conflicts_with = "max_nodes")]
        unbounded: bool,

        /// Expand each level of the search on all cores
        #[arg(long)]
        parallel: bool,

        /// Print the net of every state with its id
        #[arg(long)]
        states: bool,

        /// Write the graph as an edge list to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    match Cli::parse().command {
        Commands::Show { dims, moves, plain } => {
            let mut cube = Cube::solved(dims)?;
            if let Some(moves) = moves {
                cube = cube.apply_str(&moves)?;
            }

            print_net(&cube, plain);
        }
        Commands::Explore {
            dims,
            moves,
            max_nodes,
            unbounded,
            parallel,
            states,
            output,
        } => {
            let config = ExploreConfig {
                max_nodes: (!unbounded).then_some(max_nodes),
                parallel,
            };

            let graph = explore_with(dims, moves, &config)?;
            report(&graph)?;

            if states {
                for (id, cube) in graph.nodes().iter().enumerate() {
                    println!("\n{}", format!("State {id}").bold());
                    print_net(cube, false);
                }
            }

            if let Some(path) = output {
                graph
                    .save_edge_list(&path)
                    .wrap_err_with(|| format!("Could not write the edge list to {}", path.display()))?;
                info!("Wrote the edge list to {}", path.display());
            }
        }
    }

    Ok(())
}

fn report(graph: &StateGraph) -> eyre::Result<()> {
    println!(
        "{} states, {} edges, {} self-loops",
        graph.node_count().bold(),
        graph.edge_count().bold(),
        graph.self_loop_count()
    );

    match graph.bipartition() {
        Ok(parts) => {
            let opposite = parts.opposite(graph.root()).map_or(0, <[_]>::len);
            println!(
                "Bipartite: {} states on the solved side, {opposite} on the other",
                graph.node_count() - opposite
            );
        }
        Err(GraphError::NotBipartite { a, b }) => println!(
            "{}: states {a} and {b} are adjacent but share a side",
            "Not bipartite".yellow()
        ),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn rgb(color: Color) -> Rgb {
    match color {
        Color::Green => Rgb(0, 155, 72),
        Color::Red => Rgb(183, 18, 52),
        Color::Yellow => Rgb(255, 213, 0),
        Color::Orange => Rgb(255, 88, 0),
        Color::Blue => Rgb(0, 70, 173),
        Color::White => Rgb(255, 255, 255),
    }
}

fn print_net(cube: &Cube, plain: bool) {
    let net = cube.to_string();
    if plain {
        println!("{net}");
        return;
    }

    let painted: String = net
        .chars()
        .map(|c| match Color::try_from(c) {
            Ok(color) => c.color(rgb(color)).bold().to_string(),
            Err(_) => c.to_string(),
        })
        .collect();
    println!("{painted}");
}
