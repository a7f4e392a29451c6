use crate::clip::{ClipSpec, Window};
use crate::timeline::{Occurrence, Timeline};

/// Evenly spaced target instants for `frequency` airings inside `window`.
///
/// `target_i = start + floor(i * span / frequency)`, so every target lies in
/// `[start, end)`.
pub fn window_targets(window: Window, frequency: u32) -> Vec<u32> {
    let span = u64::from(window.span());
    let f = u64::from(frequency.max(1));
    (0..f)
        .map(|i| window.start + (i * span / f) as u32)
        .collect()
}

/// Splice every fixed-window occurrence into the timeline at its target.
///
/// Clips are taken in the given order (ascending window start); each
/// insertion shifts later entries, so later targets see the earlier ones.
pub fn insert_windows(timeline: &mut Timeline, fixed: &[ClipSpec]) {
    for clip in fixed {
        let Some(window) = clip.window else {
            continue;
        };
        for target in window_targets(window, clip.frequency) {
            let at = timeline.insert_at_instant(target, Occurrence::targeted(clip.clone(), target));
            log::debug!(
                "Placed '{}' for {} at {} (entry {})",
                clip.name,
                crate::clock::to_clock_string(target),
                crate::clock::to_clock_string(timeline.entries()[at].start),
                at
            );
        }
    }
}
