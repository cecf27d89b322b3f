//! Cartesian GP CLI - Run symbolic regression from a JSON run file.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use cartesian_gp::{
    compute::evolution::evolve,
    schema::{EvolutionResult, RunConfig, RunFile},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <run.json> [repetitions]", args[0]);
        eprintln!();
        eprintln!("Evolve a program matching the run file's dataset.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  run.json     Path to run file (config + dataset)");
        eprintln!("  repetitions  Number of independent runs (default: 1)");
        eprintln!();
        eprintln!("Example run file is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_run();
        return;
    }

    let run_path = PathBuf::from(&args[1]);
    let repetitions: u64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
        .max(1);

    let run = RunFile::from_path(&run_path).unwrap_or_else(|e| {
        eprintln!("Error loading run file: {}", e);
        std::process::exit(1);
    });

    let base_seed = run.config.random_seed.unwrap_or_else(rand::random);

    println!("Cartesian GP");
    println!("============");
    println!(
        "Grid: {}x{}, population {}",
        run.config.rows, run.config.columns, run.config.population_size
    );
    println!("Algorithm: {}", run.config.algorithm.name());
    println!(
        "Samples: {} ({} inputs)",
        run.dataset.sample_count(),
        run.dataset.input_count()
    );
    println!("Budget: {} evaluations", run.config.max_evaluations);
    println!("Repetitions: {} (base seed {})", repetitions, base_seed);
    println!();

    let start = Instant::now();

    // Repetitions share nothing but the read-only dataset.
    let results: Vec<EvolutionResult> = (0..repetitions)
        .into_par_iter()
        .map(|i| {
            let config = RunConfig {
                random_seed: Some(base_seed.wrapping_add(i)),
                ..run.config.clone()
            };
            evolve(&config, &run.dataset)
        })
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error running evolution: {}", e);
            std::process::exit(1);
        });

    let elapsed = start.elapsed();

    for result in &results {
        match serde_json::to_string(result) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing result: {}", e),
        }
    }

    let found = results.iter().filter(|r| r.found).count();
    let mean_evaluations =
        results.iter().map(|r| r.evaluations as f64).sum::<f64>() / results.len() as f64;
    let best = results
        .iter()
        .map(|r| r.fitness)
        .fold(f64::INFINITY, f64::min);

    println!();
    println!(
        "Solved {}/{} runs, mean {:.0} evaluations, best fitness {}",
        found,
        results.len(),
        mean_evaluations,
        best
    );
    println!("Time: {:.2}s", elapsed.as_secs_f32());
}

fn print_example_run() {
    match RunFile::example().map(|run| serde_json::to_string_pretty(&run)) {
        Ok(Ok(json)) => println!("{}", json),
        Ok(Err(e)) => eprintln!("Error serializing example: {}", e),
        Err(e) => eprintln!("Error building example: {}", e),
    }
}
