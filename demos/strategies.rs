use nw_aligner::{
    Aligner,
    AlignerConfig,
    FillStrategy,
    GapPenalty,
    ScoreParams,
    SequencePair,
    StartCell,
    WeightTable,
    MAX_SEQUENCE_LEN,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let pair = SequencePair::parse("ACGTACGTTAGC", "ACGTAGCTAG", MAX_SEQUENCE_LEN)?;
    let params = ScoreParams::new(WeightTable::uniform(2, -1), GapPenalty::new(1)?);

    let mut aligner = Aligner::default().with_score_params(params);
    aligner.set_sequences(pair)?;

    // Fill the same matrix with every strategy
    let mut reference = None;
    for strategy in FillStrategy::ALL {
        let config = AlignerConfig::new()
            .with_workers(4)?
            .with_strategy(strategy);
        aligner.set_config(config)?;

        let matrix = aligner.fill_matrix()?.clone();

        match &reference {
            None => reference = Some(matrix),
            Some(expected) => assert_eq!(expected, &matrix, "{strategy} diverged"),
        }

        let alignment = aligner.align(StartCell::LastMax)?;
        println!("Strategy: {}", strategy);
        print!("{}", alignment);
        println!("Score: {}", alignment.score(&params));
        println!();
    }

    Ok(())
}
