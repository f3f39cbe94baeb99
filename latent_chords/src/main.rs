// Latent chord substitution: CLI demo driver.
//
// Loads a chord dictionary from JSON, runs one substitution on a phrase and
// prints the generated phrase plus substitution details as JSON, the same
// record the UI layer receives.
//
// Usage:
//   cargo run -p latent_chords -- --dictionary chords.json --phrase C,Am,F,G \
//     --index 1 [--strategy linear|knn|angular] [--k N] [--metric euclidean] [-v]
//
// Logging goes to stderr; set RUST_LOG to override the -v level.

use clap::Parser;
use latent_chords::{ChordDictionary, ChordId, Metric, PhraseSubstitutor, StrategyParams};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Substitute one chord of a phrase using the latent chord dictionary.
#[derive(Parser)]
#[command(name = "substitute", version, about)]
struct Cli {
    /// Chord dictionary JSON (array of {id, z, z2D?, pitchclass?} rows).
    #[arg(long)]
    dictionary: PathBuf,

    /// Comma-separated chord ids.
    #[arg(long, value_delimiter = ',', required = true)]
    phrase: Vec<String>,

    /// Position to substitute. Repeat to select several (which declines).
    #[arg(long = "index")]
    indices: Vec<usize>,

    /// linear, knn or angular.
    #[arg(long, default_value = "linear")]
    strategy: String,

    /// Candidate pool size for knn / angular.
    #[arg(long, default_value_t = latent_chords::params::DEFAULT_K)]
    k: usize,

    #[arg(long, default_value = "euclidean")]
    metric: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> latent_chords::Result<()> {
    let params = StrategyParams {
        k: cli.k,
        metric: cli.metric.parse::<Metric>()?,
    };

    let dictionary = ChordDictionary::load(&cli.dictionary)?;
    info!(path = %cli.dictionary.display(), chords = dictionary.len(), "loaded dictionary");
    let substitutor = PhraseSubstitutor::with_dictionary(dictionary);

    let phrase: Vec<ChordId> = cli.phrase.iter().map(|id| ChordId::new(id.trim())).collect();
    let result =
        substitutor.substitute_phrase_named(&phrase, &cli.indices, &cli.strategy, &params)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
