use clap::{Args, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{
    algorithm::{
        hashing::ContentHasher,
        scoring::{AffineScoring, DistanceMetric, ExactMatchMetric, GapPenalties, TScore},
        Alignment, AlignmentAlgorithm, DivideAndConquerAligner, DivideAndConquerOptions, GapContext, GotohAligner,
    },
    error::{AlignResult, ConfigError, ConfigResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmChoice {
    /// Full quadratic matrix. Reference implementation.
    Gotoh,
    /// Linear-space divide and conquer with the content-hash fast path.
    DivideAndConquer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HasherChoice {
    /// Dimensions plus an evenly strided pixel sample.
    Sampled,
    /// Every byte of the frame.
    Full,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One element per line.
    Ops,
    /// Runs such as `M3 I1 M8`.
    RunLength,
    /// Aligned pairs with the elements they refer to.
    SideBySide,
    /// JSON array of elements.
    Json,
}

macro_rules! config_structs {
    {
        $(
            $( #[config_opt($attr:meta)] )*
            pub $name:ident: $typ:ty,
        )*
        $(
            #[config_alias($atarget:ident = $avalue:expr)]
            $( #[config_opt($aattr:meta)] )*
            pub $aname:ident: bool,
        )*
    } => {
        #[derive(Clone, Debug, PartialEq)]
        pub struct Config {
            $( pub $name: $typ, )*
        }

        #[derive(Args, Deserialize, Default, Debug)]
        #[serde(deny_unknown_fields, rename_all = "kebab-case")]
        pub struct ConfigOpt {
            $( $( #[$aattr] )* #[serde(skip)] pub $aname: bool, )*
            $( $( #[$attr] )* pub $name: Option<$typ>, )*
        }

        impl Config {
            pub fn update(self, mut opt: ConfigOpt) -> Config {
                $(
                    if opt.$aname {
                        opt.$atarget = Some($avalue);
                    }
                )*
                Config {
                    $( $name: opt.$name.unwrap_or(self.$name), )*
                }
            }
        }
    }
}

config_structs! {
    #[config_opt(arg(short, long))]
    pub algorithm: AlgorithmChoice,

    #[config_opt(arg(long, value_name = "SCORE", allow_negative_numbers = true))]
    pub gap_open: TScore,

    #[config_opt(arg(long, value_name = "SCORE", allow_negative_numbers = true))]
    pub gap_extension: TScore,

    #[config_opt(arg(long, value_name = "SCORE", allow_negative_numbers = true))]
    pub mismatch: TScore,

    #[config_opt(arg(long, value_name = "NUM"))]
    pub base_case_size: usize,

    #[config_opt(arg(long, value_name = "NUM"))]
    pub parallel_depth: usize,

    #[config_opt(arg(long, require_equals = true, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL", group = "normalize_group"))]
    pub normalize: bool,

    #[config_opt(arg(long))]
    pub hasher: HasherChoice,

    #[config_opt(arg(long, value_name = "NUM"))]
    pub hash_samples: usize,

    #[config_opt(arg(short, long))]
    pub format: OutputFormat,

    #[config_alias(normalize = false)]
    #[config_opt(arg(long, group = "normalize_group"))]
    pub no_normalize: bool,

    #[config_alias(algorithm = AlgorithmChoice::Gotoh)]
    #[config_opt(arg(long, conflicts_with = "algorithm"))]
    pub full_matrix: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            algorithm: AlgorithmChoice::DivideAndConquer,
            gap_open: -0.5,
            gap_extension: 0.0,
            mismatch: -1.0,
            base_case_size: DivideAndConquerOptions::DEFAULT_BASE_CASE_SIZE,
            parallel_depth: DivideAndConquerOptions::default_parallel_depth(),
            normalize: true,
            hasher: HasherChoice::Sampled,
            hash_samples: 1024,
            format: OutputFormat::RunLength,
        }
    }
}

pub fn parse_config(text: &str) -> ConfigResult<ConfigOpt> {
    Ok(toml::from_str(text)?)
}

pub fn load_config_file(path: &Path) -> ConfigResult<ConfigOpt> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: PathBuf::from(path),
        source,
    })?;
    parse_config(&text)
}

/// Defaults, then the config file if any, then command line options.
pub fn resolve(file: Option<&Path>, command_line: ConfigOpt) -> ConfigResult<Config> {
    let mut config = Config::default();
    if let Some(path) = file {
        config = config.update(load_config_file(path)?);
    }
    let config = config.update(command_line);
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> ConfigResult<()> {
        self.gap_penalties()?;
        ExactMatchMetric::new(self.mismatch)?;
        if self.hash_samples == 0 {
            return Err(ConfigError::InvalidHashSamples);
        }
        Ok(())
    }

    pub fn gap_penalties(&self) -> ConfigResult<GapPenalties> {
        GapPenalties::new(self.gap_open, self.gap_extension)
    }

    pub fn divide_and_conquer_options(&self) -> DivideAndConquerOptions {
        DivideAndConquerOptions {
            base_case_size: self.base_case_size,
            parallel_depth: self.parallel_depth,
        }
    }

    /// The aligner selected by this configuration for the given metric and hasher.
    pub fn build_aligner<D, H>(&self, metric: D, hasher: H) -> ConfigResult<ConfiguredAligner<D, H>> {
        let inner = GotohAligner::new(metric, self.gap_penalties()?);
        Ok(match self.algorithm {
            AlgorithmChoice::Gotoh => ConfiguredAligner::Gotoh(inner),
            AlgorithmChoice::DivideAndConquer => ConfiguredAligner::DivideAndConquer(
                DivideAndConquerAligner::with_options(inner, hasher, self.divide_and_conquer_options()),
            ),
        })
    }
}

pub enum ConfiguredAligner<D, H> {
    Gotoh(GotohAligner<D>),
    DivideAndConquer(DivideAndConquerAligner<GotohAligner<D>, H>),
}

impl<T, D, H> AlignmentAlgorithm<T> for ConfiguredAligner<D, H>
where
    T: Sync,
    D: DistanceMetric<T> + Sync,
    H: ContentHasher<T> + Sync,
{
    fn align_in_context(&self, a: &[T], b: &[T], context: GapContext) -> AlignResult<Alignment> {
        match self {
            ConfiguredAligner::Gotoh(aligner) => aligner.align_in_context(a, b, context),
            ConfiguredAligner::DivideAndConquer(aligner) => aligner.align_in_context(a, b, context),
        }
    }
}

impl<T, D: DistanceMetric<T>, H> AffineScoring<T> for ConfiguredAligner<D, H> {
    fn match_score(&self, a: &T, b: &T) -> TScore {
        match self {
            ConfiguredAligner::Gotoh(aligner) => aligner.match_score(a, b),
            ConfiguredAligner::DivideAndConquer(aligner) => aligner.match_score(a, b),
        }
    }

    fn gap_penalties(&self) -> GapPenalties {
        match self {
            ConfiguredAligner::Gotoh(aligner) => AffineScoring::<T>::gap_penalties(aligner),
            ConfiguredAligner::DivideAndConquer(aligner) => AffineScoring::<T>::gap_penalties(aligner),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algorithm::hashing::SymbolHasher;
    use clap::Parser;
    use std::io::Write as _;

    #[derive(Parser)]
    struct TestArgs {
        #[command(flatten)]
        config: ConfigOpt,
    }

    #[test]
    fn command_line_overrides_file_overrides_defaults() {
        let file = parse_config("gap-open = -2.0\ngap-extension = -0.5\nalgorithm = \"gotoh\"\nbase-case-size = 4\n").unwrap();
        let args = TestArgs::parse_from(["test", "--gap-open", "-3", "--no-normalize", "-f", "json"]);
        let config = Config::default().update(file).update(args.config);
        assert_eq!(config.gap_open, -3.0);
        assert_eq!(config.gap_extension, -0.5);
        assert_eq!(config.algorithm, AlgorithmChoice::Gotoh);
        assert_eq!(config.base_case_size, 4);
        assert!(!config.normalize);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.mismatch, Config::default().mismatch);
    }

    #[test]
    fn boolean_flags() {
        let args = TestArgs::parse_from(["test", "--normalize=false"]);
        assert!(!Config::default().update(args.config).normalize);
        let args = TestArgs::parse_from(["test", "--normalize"]);
        assert!(Config::default().update(args.config).normalize);
        let args = TestArgs::parse_from(["test", "--full-matrix"]);
        assert_eq!(Config::default().update(args.config).algorithm, AlgorithmChoice::Gotoh);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(parse_config("gap_opening = 1"), Err(ConfigError::Parse(_))));
        assert!(matches!(parse_config("no-normalize = true"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = Config {
            gap_open: -0.1,
            gap_extension: -0.2,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGapPenalties { .. })));
        let config = Config {
            mismatch: 2.0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMismatch(_))));
        let config = Config {
            hash_samples: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHashSamples)));
    }

    #[test]
    fn resolve_reads_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hasher = \"full\"\nparallel-depth = 0").unwrap();
        let config = resolve(Some(file.path()), ConfigOpt::default()).unwrap();
        assert_eq!(config.hasher, HasherChoice::Full);
        assert_eq!(config.parallel_depth, 0);

        let missing = resolve(Some(Path::new("/nonexistent/framealign.toml")), ConfigOpt::default());
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn built_aligners_agree() {
        let a: Vec<char> = "a quick brown fox".chars().collect();
        let b: Vec<char> = "the quick brown box".chars().collect();
        let mut scores = vec![];
        for algorithm in [AlgorithmChoice::Gotoh, AlgorithmChoice::DivideAndConquer] {
            let config = Config {
                algorithm,
                base_case_size: 2,
                ..Config::default()
            };
            let aligner = config.build_aligner(ExactMatchMetric::default(), SymbolHasher).unwrap();
            let alignment = aligner.align(&a, &b).unwrap();
            scores.push(aligner.alignment_score(&alignment, &a, &b).unwrap());
        }
        assert!((scores[0] - scores[1]).abs() < 1e-9);
    }
}
