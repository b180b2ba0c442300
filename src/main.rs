//                    ,--.          ,--.   
//  ,---.  ,---. ,-.  `--',--,--,  ,---. ,-'  '-. 
// | .-. || .-. ||   | ,--.|      \| .-. :'-.  .-' 
// ' '-' '| '-' '|   | |  ||  ||  |\   --.  |  |   
//  `---' |  |-' `---' `--'`--''--' `----'  `--'   
//        `--'

// Interactive set-up and launch of opinion dynamics simulations on signed digraphs.

// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.                                                                          

use opinet::prelude::*;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::time::Instant;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Seed for every random draw of the launch
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new simulation interactively (default)
    New,
    /// List the known digraph topologies and models
    List,
}

fn main() -> Result<()> {
    let program_start = Instant::now();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::New) {
        Commands::New => new_simulation(cli.seed)?,
        Commands::List => {
            println!("\nAvailable digraph topologies (dig_lab)");
            for topology in TopologyRegistry::global().list() {
                println!("  - {}", topology);
            }

            println!("\nAvailable models (mod_lab)");
            for model in ModelRegistry::global().list() {
                println!("  - {}", model);
            }
            println!();
        }
    }

    info!("Total runtime: {:.2}s", program_start.elapsed().as_secs_f64());

    Ok(())
}

fn new_simulation(seed: Option<u64>) -> Result<()> {
    let stdin = io::stdin();
    let assembler = ConfigAssembler::new(Prompter::new(stdin.lock(), io::stdout()));

    let config = match assembler.assemble() {
        Ok(config) => config,
        Err(ConfigError::InputClosed) => {
            println!();
            info!("Input closed before the set-up finished, nothing to launch");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let rng = match seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut simulation = Simulation::new(config, rng);
    let mut engine = LocalEngine::new();

    match simulation.run(&mut engine) {
        Ok(trace) => print_results(&trace),
        Err(e) => error!("Simulation not launched: {}", e),
    }

    Ok(())
}

fn print_results(trace: &Trace) {
    let (Some(first), Some(last)) = (trace.snapshots.first(), trace.snapshots.last()) else {
        return;
    };

    println!("\n{:<10} {:>10} {:>10} {:>10} {:>10} {:>10}", "Step", "Mean", "|Mean|", "Std", "Min", "Max");
    println!("{}", "-".repeat(65));
    for s in [first, last] {
        println!(
            "{:<10} {:>+10.4} {:>10.4} {:>10.4} {:>+10.4} {:>+10.4}",
            s.step, s.mean, s.abs_mean, s.std_dev, s.min, s.max
        );
    }
    println!();
}
