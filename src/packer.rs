use crate::clip::ClipSpec;
use crate::timeline::{Occurrence, Timeline};
use std::cmp::Reverse;

/// Default number of occurrences per round-robin batch.
pub const DEFAULT_BATCH_SIZE: usize = 30;

/// Lay out every flexible occurrence back to back from midnight.
///
/// Occurrences are ordered by descending frequency (stable), cut into
/// batches of `batch_size`, and drained one from each batch per pass, so
/// repeats of a heavy clip spread across the day instead of clustering.
pub fn pack_flexible(flexible: &[ClipSpec], batch_size: usize) -> Timeline {
    let batch_size = batch_size.max(1);

    let mut expanded: Vec<&ClipSpec> = flexible
        .iter()
        .flat_map(|clip| std::iter::repeat_n(clip, clip.frequency as usize))
        .collect();
    expanded.sort_by_key(|clip| Reverse(clip.frequency));

    let batches: Vec<&[&ClipSpec]> = expanded.chunks(batch_size).collect();
    let mut timeline = Timeline::new();

    // Pass `round` takes the round-th item of every batch still holding one.
    for round in 0..batch_size {
        for batch in &batches {
            if let Some(clip) = batch.get(round) {
                timeline.push(Occurrence::new((*clip).clone()));
            }
        }
    }

    log::debug!(
        "Packed {} flexible occurrence(s) in {} batch(es), ending at {}s",
        timeline.len(),
        batches.len(),
        timeline.end()
    );
    timeline
}
