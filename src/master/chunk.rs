use uuid::Uuid;

use crate::protocol::ResultStatus;

/// Chunk lifecycle states.
///
/// An `ERROR` outcome never rests on the chunk: reporting one either requeues
/// the chunk as `Ready` (attempts budget remaining) or parks it as
/// `Exhausted` (fatal for the job).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    Ready,
    InFlight,
    Found,
    NotFound,
    Cancelled,
    Exhausted,
}

/// An inclusive index range `[lo, hi]` of one job's search space.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: Uuid,
    pub job_id: Uuid,
    pub lo: u64,
    pub hi: u64,
    pub attempts: u32,
    pub status: ChunkStatus,
}

/// What a `report` call did with the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Recorded,
    Requeued,
    Exhausted,
}

/// Per-job chunk plan and state tracking.
///
/// Owned by the job's scheduler task; completions are applied from that one
/// task, so no internal locking is needed.
#[derive(Debug)]
pub struct ChunkManager {
    chunks: Vec<Chunk>,
    max_attempts: u32,
}

impl ChunkManager {
    /// Tile `[0, total_size)` into inclusive ranges of `chunk_size` indices,
    /// the last chunk possibly shorter. Gap-free and overlap-free.
    pub fn plan(job_id: Uuid, total_size: u64, chunk_size: u64, max_attempts: u32) -> Self {
        debug_assert!(chunk_size > 0);
        let mut chunks = Vec::new();
        let mut lo = 0u64;
        while lo < total_size {
            let hi = (lo + chunk_size - 1).min(total_size - 1);
            chunks.push(Chunk {
                id: Uuid::new_v4(),
                job_id,
                lo,
                hi,
                attempts: 0,
                status: ChunkStatus::Ready,
            });
            lo = hi + 1;
        }
        tracing::debug!(
            job_id = %job_id,
            chunks = chunks.len(),
            total_size,
            chunk_size,
            "Planned chunks"
        );
        Self {
            chunks,
            max_attempts,
        }
    }

    /// Take the next `Ready` chunk, marking it `InFlight`.
    pub fn take_ready(&mut self) -> Option<Chunk> {
        let chunk = self
            .chunks
            .iter_mut()
            .find(|c| c.status == ChunkStatus::Ready)?;
        chunk.status = ChunkStatus::InFlight;
        Some(chunk.clone())
    }

    /// Put an `InFlight` chunk back to `Ready` without charging an attempt
    /// (used when no minion was available to take it).
    pub fn requeue(&mut self, chunk_id: Uuid) {
        if let Some(chunk) = self.get_mut(chunk_id) {
            if chunk.status == ChunkStatus::InFlight {
                chunk.status = ChunkStatus::Ready;
            }
        }
    }

    /// Apply a dispatch outcome to the chunk state machine.
    ///
    /// - `FOUND` / `NOT_FOUND` / `CANCELLED` record the terminal chunk state;
    ///   cancelled chunks are not re-enqueued and consume no attempt.
    /// - `ERROR` charges one attempt, then requeues the chunk or, at the
    ///   attempts budget, parks it as `Exhausted`.
    pub fn report(&mut self, chunk_id: Uuid, outcome: ResultStatus) -> ReportOutcome {
        let max_attempts = self.max_attempts;
        let Some(chunk) = self.get_mut(chunk_id) else {
            tracing::warn!(chunk_id = %chunk_id, "Report for unknown chunk");
            return ReportOutcome::Recorded;
        };
        match outcome {
            ResultStatus::Found => {
                chunk.status = ChunkStatus::Found;
                ReportOutcome::Recorded
            }
            ResultStatus::NotFound => {
                chunk.status = ChunkStatus::NotFound;
                ReportOutcome::Recorded
            }
            ResultStatus::Cancelled => {
                chunk.status = ChunkStatus::Cancelled;
                ReportOutcome::Recorded
            }
            ResultStatus::Error | ResultStatus::InvalidInput => {
                chunk.attempts += 1;
                if chunk.attempts >= max_attempts {
                    chunk.status = ChunkStatus::Exhausted;
                    tracing::warn!(
                        chunk_id = %chunk_id,
                        attempts = chunk.attempts,
                        "Chunk exhausted its attempts budget"
                    );
                    ReportOutcome::Exhausted
                } else {
                    chunk.status = ChunkStatus::Ready;
                    tracing::info!(
                        chunk_id = %chunk_id,
                        attempt = chunk.attempts,
                        max_attempts,
                        "Chunk will retry"
                    );
                    ReportOutcome::Requeued
                }
            }
        }
    }

    /// True when no chunk is `Ready` or `InFlight`.
    pub fn all_resolved(&self) -> bool {
        self.chunks
            .iter()
            .all(|c| !matches!(c.status, ChunkStatus::Ready | ChunkStatus::InFlight))
    }

    pub fn any_found(&self) -> bool {
        self.chunks.iter().any(|c| c.status == ChunkStatus::Found)
    }

    pub fn any_exhausted(&self) -> bool {
        self.chunks
            .iter()
            .any(|c| c.status == ChunkStatus::Exhausted)
    }

    pub fn ready_count(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.status == ChunkStatus::Ready)
            .count()
    }

    pub fn in_flight_count(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.status == ChunkStatus::InFlight)
            .count()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn get_mut(&mut self, chunk_id: Uuid) -> Option<&mut Chunk> {
        self.chunks.iter_mut().find(|c| c.id == chunk_id)
    }
}
