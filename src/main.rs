use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::debug;

use cachesim_trace::{simulate, Geometry};

/// Replays a memory trace against a set-associative cache with FIFO
/// replacement and prints the hit, miss and eviction counts.
#[derive(Parser, Debug)]
#[command(name = "csim", allow_negative_numbers = true)]
struct Cli {
    /// Number of set index bits (the cache has 2^s sets)
    #[arg(short = 's', value_name = "s")]
    set_bits: i64,
    /// Associativity (number of lines per set)
    #[arg(short = 'E', value_name = "E")]
    lines_per_set: i64,
    /// Number of block offset bits (blocks are 2^b bytes)
    #[arg(short = 'b', value_name = "b")]
    block_bits: i64,
    /// Trace to replay
    #[arg(short = 't', value_name = "tracefile")]
    trace: PathBuf,
}

fn main() -> Result<()> {
    // logging
    let env = Env::default()
        .filter_or("CSIM_LOG", "warn")
        .write_style_or("CSIM_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    let cli = Cli::parse();
    debug!("{cli:?}");

    let geometry = Geometry::new(cli.set_bits, cli.lines_per_set, cli.block_bits)?;
    let stats = simulate(geometry, &cli.trace)
        .with_context(|| format!("failed to simulate {}", cli.trace.display()))?;

    println!("{stats}");
    Ok(())
}
