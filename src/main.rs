use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use nw_aligner::{
    generate_pair, Aligner, AlignerConfig, FillStrategy, GapPenalty, ScoreParams, SequencePair,
    StartCell, WeightTable, DNA_MATCH, DNA_MISMATCH,
};

#[derive(Parser)]
#[command(name = "nw-align")]
#[command(about = "Needleman-Wunsch global alignment of two DNA sequences", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    source: Source,

    #[command(flatten)]
    options: AlignOptions,
}

/// Where the two sequences come from
#[derive(Subcommand)]
enum Source {
    /// Sequences given on the command line
    Manual {
        /// Major (longer) sequence
        #[arg(value_name = "MAJOR")]
        major: String,

        /// Minor (shorter or equal) sequence
        #[arg(value_name = "MINOR")]
        minor: String,
    },

    /// Two-line file: major sequence, then minor sequence
    File {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Random major sequence, minor sequence cut from it and mutated
    Random {
        #[arg(value_name = "MAJOR_LEN")]
        major_len: usize,

        #[arg(value_name = "MINOR_LEN")]
        minor_len: usize,

        /// Maximum percentage of mutated minor bases
        #[arg(short = 'm', long, value_name = "PCT", default_value = "0")]
        mutation: u32,

        /// Seed for reproducible sequences
        #[arg(short = 's', long, value_name = "INT")]
        seed: Option<u64>,
    },
}

#[derive(Args)]
struct AlignOptions {
    // ===== Scoring =====
    /// Weight of two equal bases
    #[arg(
        long = "match",
        global = true,
        value_name = "INT",
        default_value_t = DNA_MATCH,
        allow_hyphen_values = true
    )]
    match_score: i32,

    /// Weight of two different bases
    #[arg(
        long,
        global = true,
        value_name = "INT",
        default_value_t = DNA_MISMATCH,
        allow_hyphen_values = true
    )]
    mismatch: i32,

    /// Full 4x4 weight table: 16 integers, rows and columns in A T G C order.
    /// Overrides --match and --mismatch
    #[arg(long, global = true, value_name = "TABLE", allow_hyphen_values = true)]
    weights: Option<String>,

    /// Gap penalty
    #[arg(
        short = 'g',
        long,
        global = true,
        value_name = "INT",
        default_value = "0",
        allow_hyphen_values = true
    )]
    gap: i32,

    // ===== Execution =====
    /// Number of fill workers
    #[arg(short = 't', long, global = true, value_name = "INT", default_value = "1")]
    workers: usize,

    /// Fill strategy: sequential, row-claim or pipeline
    #[arg(long, global = true, value_name = "NAME", default_value = "row-claim")]
    strategy: FillStrategy,

    /// Traceback start: first or last maximal cell
    #[arg(long, global = true, value_name = "WHICH", default_value = "first")]
    start: StartCell,

    /// Number of concurrent tracebacks
    #[arg(short = 'k', long, global = true, value_name = "INT", default_value = "1")]
    tracebacks: usize,

    // ===== Output =====
    /// Print the weight table and gap penalty
    #[arg(long, global = true)]
    show_weights: bool,

    /// Print the filled score matrix
    #[arg(long, global = true)]
    show_matrix: bool,

    /// Verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_pair(source: &Source, capacity: usize) -> nw_aligner::Result<SequencePair> {
    match source {
        Source::Manual { major, minor } => SequencePair::parse(major, minor, capacity),
        Source::File { path } => {
            log::info!("reading sequences from {}", path.display());
            SequencePair::from_file(path, capacity)
        }
        Source::Random {
            major_len,
            minor_len,
            mutation,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            generate_pair(&mut rng, *major_len, *minor_len, *mutation, capacity)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let opts = &cli.options;
    init_logging(opts.verbose);

    let config = AlignerConfig::new()
        .with_workers(opts.workers)?
        .with_strategy(opts.strategy)
        .with_tracebacks(opts.tracebacks)?;

    let weights = match &opts.weights {
        Some(table) => WeightTable::parse(table)?,
        None => WeightTable::uniform(opts.match_score, opts.mismatch),
    };
    let params = ScoreParams::new(weights, GapPenalty::new(opts.gap)?);

    let pair = load_pair(&cli.source, config.max_sequence_len())?;

    let mut aligner = Aligner::new(config).with_score_params(params);
    aligner.set_sequences(pair)?;

    if opts.show_weights {
        println!("Weight table:\n{}", params.weights);
        println!("Gap penalty = {}\n", params.gap);
    }

    aligner.fill_matrix()?;

    if let (Some(pair), Some(matrix), Some(extrema)) =
        (aligner.sequences(), aligner.matrix(), aligner.extrema())
    {
        println!("{}", pair);
        if opts.show_matrix {
            println!("Score matrix:\n{}", matrix.grid(pair));
        }
        println!(
            "First max score = {} at {}",
            extrema.first.score, extrema.first.position
        );
        println!(
            "Last max score = {} at {}\n",
            extrema.last.score, extrema.last.position
        );
    }

    let alignments = aligner.align_many(opts.start)?;
    for (n, alignment) in alignments.iter().enumerate() {
        let stats = alignment.stats(&params);
        println!("#{} from {} {}", n + 1, opts.start, alignment.start());
        print!("{}", alignment);
        println!(
            "matches = {}, mismatches = {}, gaps = {}, score = {}\n",
            stats.matches, stats.mismatches, stats.gaps, stats.score
        );
    }

    Ok(())
}
