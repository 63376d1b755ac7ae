use rand::rngs::StdRng;
use rand::SeedableRng;

use nw_aligner::{
    generate_pair,
    Aligner,
    AlignerConfig,
    FillStrategy,
    StartCell,
    MAX_SEQUENCE_LEN,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Seeded random pair: 60 bases, minor cut from it with up to 15% mutations
    let mut rng = StdRng::seed_from_u64(2024);
    let pair = generate_pair(&mut rng, 60, 48, 15, MAX_SEQUENCE_LEN)?;
    println!("{}", pair);

    let config = AlignerConfig::new()
        .with_workers(8)?
        .with_strategy(FillStrategy::Pipeline)
        .with_tracebacks(4)?;

    let mut aligner = Aligner::new(config);
    aligner.set_sequences(pair)?;
    aligner.fill_matrix()?;

    // Four concurrent tracebacks from the last maximal cell
    let results = aligner.align_many(StartCell::LastMax)?;

    for (i, result) in results.iter().enumerate() {
        let stats = result.stats(aligner.score_params());
        println!("Traceback {}: Score = {}", i, stats.score);
        println!("Major: {}", result.major_string());
        println!("Minor: {}", result.minor_string());
        println!();
    }

    Ok(())
}
