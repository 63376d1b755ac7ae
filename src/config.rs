use crate::strategy::FillStrategy;
use crate::{AlignerError, Result, MAX_SEQUENCE_LEN, MAX_WORKERS};

#[derive(Debug, Clone)]
pub struct AlignerConfig {
    workers: usize,
    strategy: FillStrategy,
    tracebacks: usize,
    max_sequence_len: usize,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            strategy: FillStrategy::RowClaim,
            tracebacks: 1,
            max_sequence_len: MAX_SEQUENCE_LEN,
        }
    }
}

impl AlignerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self> {
        check_worker_count(workers)?;
        self.workers = workers;
        Ok(self)
    }

    pub fn with_strategy(mut self, strategy: FillStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_tracebacks(mut self, tracebacks: usize) -> Result<Self> {
        if tracebacks == 0 || tracebacks > MAX_WORKERS {
            return Err(AlignerError::InvalidTracebackCount {
                requested: tracebacks,
                max: MAX_WORKERS,
            });
        }
        self.tracebacks = tracebacks;
        Ok(self)
    }

    /// Capacity ceiling applied to every sequence handed to the aligner.
    pub fn with_max_sequence_len(mut self, max_sequence_len: usize) -> Self {
        self.max_sequence_len = max_sequence_len;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn strategy(&self) -> FillStrategy {
        self.strategy
    }

    pub fn tracebacks(&self) -> usize {
        self.tracebacks
    }

    pub fn max_sequence_len(&self) -> usize {
        self.max_sequence_len
    }
}

pub(crate) fn check_worker_count(workers: usize) -> Result<()> {
    if workers == 0 || workers > MAX_WORKERS {
        return Err(AlignerError::InvalidWorkerCount {
            requested: workers,
            max: MAX_WORKERS,
        });
    }
    Ok(())
}
