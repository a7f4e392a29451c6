use crate::clip::ClipSpec;
use crate::timeline::{Occurrence, Timeline};

/// Outcome of a filler interleaving pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterleaveStats {
    pub inserted: usize,
    /// Pool entries left over once no position remained.
    pub discarded: usize,
}

/// Splice filler occurrences into the timeline every `rate` entries.
///
/// Each time the next position runs off the end, the skip counter grows by
/// one and the position restarts near the front, offset by it; the spacing
/// after every insertion grows by the same counter.
pub fn interleave_fillers(
    timeline: &mut Timeline,
    pool: Vec<ClipSpec>,
    rate: usize,
) -> InterleaveStats {
    let first = rate.saturating_sub(1);
    let mut pos = first;
    let mut skip = 0usize;
    let mut stats = InterleaveStats::default();
    let pool_len = pool.len();

    for filler in pool {
        if pos > timeline.len() {
            skip += 1;
            pos = first + skip;
            if pos > timeline.len() {
                break;
            }
        }
        timeline.insert_and_shift(pos, Occurrence::new(filler));
        stats.inserted += 1;
        pos += rate + 1 + skip;
    }
    stats.discarded = pool_len - stats.inserted;

    log::debug!(
        "Interleaved {} filler(s) at rate {}, discarded {}",
        stats.inserted,
        rate,
        stats.discarded
    );
    stats
}
