use crate::clip::ClipSpec;
use crate::error::{ScheduleError, ScheduleResult};

/// Cycle the filler clips into enough occurrences to cover the rest of the day.
///
/// Starting from `committed_secs`, clips are taken in order, round after
/// round, until the next one would run past `total_secs`.
pub fn build_filler_pool(
    fillers: &[ClipSpec],
    committed_secs: u64,
    total_secs: u32,
) -> ScheduleResult<Vec<ClipSpec>> {
    let total = u64::from(total_secs);
    if committed_secs >= total {
        return Ok(Vec::new());
    }
    let remaining = total - committed_secs;

    let min_duration = match fillers.iter().map(|f| u64::from(f.duration)).min() {
        Some(0) | None => return Err(ScheduleError::NoFillerAvailable { remaining }),
        Some(d) => d,
    };

    // Every full round adds at least `min_duration`.
    let max_rounds = remaining / min_duration + 1;
    let mut running = committed_secs;
    let mut pool = Vec::new();

    'rounds: for _ in 0..max_rounds {
        for filler in fillers {
            let next = running + u64::from(filler.duration);
            if next > total {
                break 'rounds;
            }
            running = next;
            pool.push(filler.clone());
        }
    }

    log::debug!(
        "Filler pool: {} occurrence(s) covering {}s of {}s free",
        pool.len(),
        running - committed_secs,
        remaining
    );
    Ok(pool)
}
