use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;

use crate::fill::RowKernel;
use crate::matrix::ScoreMatrix;
use crate::scoring::ScoreParams;
use crate::{AlignerError, Result};

struct BoardState {
    rows: Vec<Option<Arc<[i32]>>>,
    abandoned: bool,
}

/// Finished rows published by row-claiming workers.
///
/// A row is written exactly once. Readers block until the row they depend
/// on has been published, or until a worker gives up, which wakes everyone.
struct RowBoard {
    state: Mutex<BoardState>,
    ready: Condvar,
}

impl RowBoard {
    fn new(rows: usize, border: Vec<i32>) -> Self {
        let mut published = vec![None; rows];
        published[0] = Some(Arc::from(border));
        Self {
            state: Mutex::new(BoardState {
                rows: published,
                abandoned: false,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BoardState>> {
        self.state
            .lock()
            .map_err(|_| AlignerError::WorkerError("row board lock poisoned".into()))
    }

    fn publish(&self, row: usize, values: Vec<i32>) -> Result<()> {
        let mut state = self.lock()?;
        state.rows[row] = Some(Arc::from(values));
        drop(state);
        self.ready.notify_all();
        Ok(())
    }

    fn wait_for(&self, row: usize) -> Result<Arc<[i32]>> {
        let mut state = self.lock()?;
        loop {
            if let Some(values) = &state.rows[row] {
                return Ok(Arc::clone(values));
            }
            if state.abandoned {
                return Err(AlignerError::WorkerError(format!(
                    "row {row} was abandoned by its worker"
                )));
            }
            state = self
                .ready
                .wait(state)
                .map_err(|_| AlignerError::WorkerError("row board lock poisoned".into()))?;
        }
    }

    fn abandon(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.abandoned = true;
        }
        self.ready.notify_all();
    }

    fn into_rows(self) -> Result<Vec<Arc<[i32]>>> {
        let state = self
            .state
            .into_inner()
            .map_err(|_| AlignerError::WorkerError("row board lock poisoned".into()))?;
        state
            .rows
            .into_iter()
            .enumerate()
            .map(|(row, values)| {
                values.ok_or_else(|| {
                    AlignerError::WorkerError(format!("row {row} was never computed"))
                })
            })
            .collect()
    }
}

/// Marks the board abandoned if a worker leaves early, so that workers
/// waiting on its claimed row do not block forever.
struct AbandonOnDrop<'a> {
    board: &'a RowBoard,
    armed: bool,
}

impl<'a> AbandonOnDrop<'a> {
    fn new(board: &'a RowBoard) -> Self {
        Self { board, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.board.abandon();
        }
    }
}

/// Dynamic partition: each worker claims the next row index from a shared
/// counter, waits for the row above it, and computes the whole row before
/// claiming again.
pub(crate) fn fill_row_claim(
    kernel: &RowKernel<'_>,
    params: &ScoreParams,
    workers: usize,
) -> Result<ScoreMatrix> {
    let board = RowBoard::new(kernel.rows(), kernel.border_row());
    let next_row = AtomicUsize::new(1);
    let spawned = workers.min(kernel.rows() - 1);

    thread::scope(|s| -> Result<()> {
        let handles: Vec<_> = (0..spawned)
            .map(|worker| {
                let board = &board;
                let next_row = &next_row;
                s.spawn(move || claim_rows(worker, kernel, board, next_row))
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();

        for (worker, outcome) in outcomes.into_iter().enumerate() {
            let computed = outcome
                .map_err(|_| AlignerError::WorkerError(format!("row worker {worker} panicked")))??;
            debug!("row worker {worker} computed {computed} rows");
        }
        Ok(())
    })?;

    let mut matrix = ScoreMatrix::with_borders(kernel.rows(), kernel.cols(), params);
    for (row, values) in board.into_rows()?.into_iter().enumerate().skip(1) {
        matrix.row_mut(row).copy_from_slice(&values);
    }
    Ok(matrix)
}

fn claim_rows(
    worker: usize,
    kernel: &RowKernel<'_>,
    board: &RowBoard,
    next_row: &AtomicUsize,
) -> Result<usize> {
    let guard = AbandonOnDrop::new(board);
    let mut computed = 0;

    loop {
        let row = next_row.fetch_add(1, Ordering::AcqRel);
        if row >= kernel.rows() {
            break;
        }

        let prev = board.wait_for(row - 1)?;
        let mut values = vec![0; kernel.cols()];
        kernel.compute_row(row, &prev, &mut values);
        board.publish(row, values)?;
        computed += 1;
    }

    debug!("row worker {worker} found no rows left");
    guard.disarm();
    Ok(computed)
}

/// Splits rows `1..=rows` into at most `workers` contiguous ranges; the
/// first `rows % n` ranges get one extra row.
pub(crate) fn row_ranges(rows: usize, workers: usize) -> Vec<Range<usize>> {
    let count = workers.min(rows).max(1);
    let base = rows / count;
    let rest = rows % count;

    let mut ranges = Vec::with_capacity(count);
    let mut start = 1;
    for k in 0..count {
        let len = base + usize::from(k < rest);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Static partition: worker `k` owns a contiguous range of rows, waits for
/// the last row of range `k - 1` on its hand-off channel, and forwards its
/// own last row to worker `k + 1` when done.
pub(crate) fn fill_pipeline(
    kernel: &RowKernel<'_>,
    params: &ScoreParams,
    workers: usize,
) -> Result<ScoreMatrix> {
    let ranges = row_ranges(kernel.rows() - 1, workers);
    let (senders, receivers): (Vec<Sender<Vec<i32>>>, Vec<Receiver<Vec<i32>>>) =
        ranges.iter().map(|_| bounded(1)).unzip();
    let mut senders = senders.into_iter();

    let seed = senders
        .next()
        .ok_or_else(|| AlignerError::WorkerError("no pipeline stages".into()))?;
    seed.send(kernel.border_row())
        .map_err(|_| AlignerError::WorkerError("pipeline stage 0 hung up".into()))?;
    drop(seed);

    let chunks = thread::scope(|s| {
        let handles: Vec<_> = ranges
            .iter()
            .cloned()
            .zip(receivers)
            .enumerate()
            .map(|(worker, (range, handoff))| {
                let next = senders.next();
                s.spawn(move || run_range(worker, range, kernel, handoff, next))
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();

        outcomes
            .into_iter()
            .enumerate()
            .map(|(worker, outcome)| {
                outcome.map_err(|_| {
                    AlignerError::WorkerError(format!("pipeline worker {worker} panicked"))
                })?
            })
            .collect::<Result<Vec<Vec<i32>>>>()
    })?;

    let mut matrix = ScoreMatrix::with_borders(kernel.rows(), kernel.cols(), params);
    for (range, chunk) in ranges.into_iter().zip(chunks) {
        matrix.rows_mut(range).copy_from_slice(&chunk);
    }
    Ok(matrix)
}

fn run_range(
    worker: usize,
    range: Range<usize>,
    kernel: &RowKernel<'_>,
    handoff: Receiver<Vec<i32>>,
    next: Option<Sender<Vec<i32>>>,
) -> Result<Vec<i32>> {
    let mut prev = handoff.recv().map_err(|_| {
        AlignerError::WorkerError(format!(
            "pipeline worker {worker}: row {} was never handed off",
            range.start - 1
        ))
    })?;
    debug!(
        "pipeline worker {worker} received row {}, computing rows {}..{}",
        range.start - 1,
        range.start,
        range.end
    );

    let mut chunk = Vec::with_capacity(range.len() * kernel.cols());
    let mut cur = vec![0; kernel.cols()];
    for row in range.clone() {
        kernel.compute_row(row, &prev, &mut cur);
        chunk.extend_from_slice(&cur);
        std::mem::swap(&mut prev, &mut cur);
    }

    if let Some(next) = next {
        next.send(prev).map_err(|_| {
            AlignerError::WorkerError(format!(
                "pipeline worker {}: hand-off of row {} failed",
                worker + 1,
                range.end - 1
            ))
        })?;
    }
    Ok(chunk)
}
