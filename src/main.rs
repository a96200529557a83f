use anyhow::{bail, Context as _};
use clap::Parser;
use framealign::{
    algorithm::{
        hashing::{ContentHasher, FullFrameHasher, SampledFrameHasher, SymbolHasher},
        scoring::{AffineScoring, DistanceMetric, ExactMatchMetric, PixelCountMetric, TScore},
        AlignedPair, Alignment, AlignmentAlgorithm,
    },
    config::{resolve, Config, ConfigOpt, HasherChoice, OutputFormat},
    input::{check_preconditions, intern_lines, load_frames, load_mask},
    validate::{print_errors, validate},
};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

/// Aligns two sequences of video frames (directories of images), or two text
/// files line by line.
#[derive(Parser, Debug)]
#[command(version, arg_required_else_help(true))]
struct Args {
    #[arg(value_name = "FIRST")]
    first: PathBuf,
    #[arg(value_name = "SECOND")]
    second: PathBuf,
    /// Treat the inputs as text files and align their lines.
    #[arg(long)]
    lines: bool,
    /// Grayscale image selecting the pixels that take part in frame comparison.
    #[arg(long, value_name = "PATH", conflicts_with = "lines")]
    mask: Option<PathBuf>,
    /// TOML file with defaults for the options below.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(flatten)]
    options: ConfigOpt,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    alignment: &'a Alignment,
    score: TScore,
}

fn align_with<T, D, H>(config: &Config, metric: D, hasher: H, a: &[T], b: &[T]) -> anyhow::Result<(Alignment, TScore)>
where
    T: Sync,
    D: DistanceMetric<T> + Sync,
    H: ContentHasher<T> + Sync,
{
    let aligner = config.build_aligner(metric, hasher)?;
    info!(
        "Aligning {} against {} elements with {:?}",
        a.len(),
        b.len(),
        config.algorithm
    );
    let alignment = aligner.align(a, b)?;
    let errors = validate(&alignment, [a.len(), b.len()]);
    print_errors(&errors);
    if !errors.is_empty() {
        bail!("the aligner produced an invalid alignment");
    }
    let score = aligner
        .alignment_score(&alignment, a, b)
        .context("the alignment does not fit the input")?;
    Ok((alignment, score))
}

fn print_alignment(
    alignment: &Alignment,
    score: TScore,
    format: OutputFormat,
    render_pair: impl Fn(AlignedPair) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Ops => {
            for element in alignment.iter() {
                println!("{}", element.symbol());
            }
        }
        OutputFormat::RunLength => println!("{}", alignment.run_length()),
        OutputFormat::SideBySide => {
            for pair in alignment.pairs() {
                println!("{}", render_pair(pair));
            }
        }
        OutputFormat::Json => {
            let output = JsonOutput { alignment, score };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    if format != OutputFormat::Json {
        let counts = alignment.counts();
        info!(
            "Score {score}: {} matches, {} insertions, {} deletions",
            counts.matches, counts.insertions, counts.deletions
        );
    }
    Ok(())
}

fn align_lines(args: &Args, config: &Config) -> anyhow::Result<()> {
    let read = |path: &PathBuf| std::fs::read_to_string(path).with_context(|| format!("cannot read {path:?}"));
    let texts = [read(&args.first)?, read(&args.second)?];
    let (interner, [a, b]) = intern_lines([texts[0].as_str(), texts[1].as_str()]);
    let metric = ExactMatchMetric::new(config.mismatch)?;
    let (alignment, score) = align_with(config, metric, SymbolHasher, &a, &b)?;

    let line = |symbol| interner.resolve(symbol).unwrap_or_default();
    print_alignment(&alignment, score, config.format, |pair| match pair {
        AlignedPair::Match(i, j) if a[i] == b[j] => format!("{:>6} {:>6}   {}", i + 1, j + 1, line(a[i])),
        AlignedPair::Match(i, j) => format!("{:>6} {:>6} ~ {} | {}", i + 1, j + 1, line(a[i]), line(b[j])),
        AlignedPair::Insertion(j) => format!("{:>6} {:>6} + {}", "", j + 1, line(b[j])),
        AlignedPair::Deletion(i) => format!("{:>6} {:>6} - {}", i + 1, "", line(a[i])),
    })
}

fn align_frames(args: &Args, config: &Config) -> anyhow::Result<()> {
    let a = load_frames(&args.first).with_context(|| format!("cannot load frames of {:?}", args.first))?;
    let b = load_frames(&args.second).with_context(|| format!("cannot load frames of {:?}", args.second))?;
    let mask = args
        .mask
        .as_deref()
        .map(load_mask)
        .transpose()
        .context("cannot load the mask")?;
    check_preconditions(&a, &b, mask.as_ref())?;

    let metric = PixelCountMetric::new(config.normalize).with_mask(mask);
    let (alignment, score) = match config.hasher {
        HasherChoice::Sampled => align_with(config, metric, SampledFrameHasher::new(config.hash_samples), &a, &b)?,
        HasherChoice::Full => align_with(config, metric, FullFrameHasher, &a, &b)?,
    };
    print_alignment(&alignment, score, config.format, |pair| match pair {
        AlignedPair::Match(i, j) => format!("{i:>6} {j:>6}"),
        AlignedPair::Insertion(j) => format!("{:>6} {j:>6}", "-"),
        AlignedPair::Deletion(i) => format!("{i:>6} {:>6}", "-"),
    })
}

fn try_main() -> anyhow::Result<()> {
    let mut args = Args::parse();
    let options = std::mem::take(&mut args.options);
    let config = resolve(args.config.as_deref(), options).context("invalid configuration")?;
    if args.lines {
        align_lines(&args, &config)
    } else {
        align_frames(&args, &config)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    // Returning Result from main() would print the error with Debug, not Display.
    if let Err(e) = try_main() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
