use clap::Parser;
use framealign::{
    algorithm::{
        benchmark::{evaluate, EditRates, TestcaseGenerator},
        format_side_by_side,
        hashing::SymbolHasher,
        scoring::ExactMatchMetric,
    },
    config::{resolve, AlgorithmChoice, ConfigOpt},
};
use log::info;
use std::path::PathBuf;

/// Aligns randomly edited sequences and compares the result with the edits
/// that produced them.
#[derive(Parser)]
struct Args {
    /// Number of generated testcases.
    #[arg(short = 'n', long, default_value_t = 10)]
    cases: usize,

    /// Length of the base sequence of each testcase.
    #[arg(short, long, default_value_t = 1000)]
    length: usize,

    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 0.05)]
    insertion_rate: f64,

    #[arg(long, default_value_t = 0.05)]
    deletion_rate: f64,

    #[arg(long, default_value_t = 0.05)]
    mutation_rate: f64,

    /// Print each produced alignment next to the sequences.
    #[arg(short, long)]
    verbose: bool,

    /// TOML file with aligner settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(flatten)]
    options: ConfigOpt,

    #[arg(value_enum, required = true)]
    algorithms: Vec<AlgorithmChoice>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut args = Args::parse();
    let options = std::mem::take(&mut args.options);
    let config = resolve(args.config.as_deref(), options)?;

    let rates = EditRates {
        insertion: args.insertion_rate,
        deletion: args.deletion_rate,
        mutation: args.mutation_rate,
    };
    let mut generator = TestcaseGenerator::new(args.seed, rates);
    let mut total_distance = vec![0; args.algorithms.len()];

    for case in 0..args.cases {
        let testcase = generator.generate(args.length);
        println!("Case {case}: {} vs {} elements", testcase.a.len(), testcase.b.len());

        for (algorithm_index, &algorithm) in args.algorithms.iter().enumerate() {
            let mut config = config.clone();
            config.algorithm = algorithm;
            let aligner = config.build_aligner(ExactMatchMetric::new(config.mismatch)?, SymbolHasher)?;
            let evaluation = evaluate(&aligner, &testcase)?;
            println!(
                "  {algorithm:?}: score {} (optimal {}, reference {}), distance {}",
                evaluation.score, evaluation.optimal_score, evaluation.expected_score, evaluation.distance
            );
            if args.verbose {
                for row in format_side_by_side(&evaluation.alignment, &testcase.a, &testcase.b) {
                    println!("    {row}");
                }
            }
            total_distance[algorithm_index] += evaluation.distance;
        }
    }

    if args.cases > 0 {
        for (algorithm, total) in args.algorithms.iter().zip(&total_distance) {
            info!(
                "{algorithm:?}: average distance {:.3}",
                *total as f64 / args.cases as f64
            );
        }
    }

    Ok(())
}
