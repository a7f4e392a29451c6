use crate::clip::ClipSpec;
use crate::error::{ScheduleError, ScheduleResult};

/// The catalog split into the three buckets the pipeline works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub fillers: Vec<ClipSpec>,
    /// Normal clips with no window, in catalog order.
    pub flexible: Vec<ClipSpec>,
    /// Normal clips with a window, ascending by window start.
    pub fixed: Vec<ClipSpec>,
    /// Seconds of non-filler airtime (duration * frequency, summed).
    pub committed_secs: u64,
    /// Non-filler entries expected between two filler insertions.
    pub filler_rate: usize,
}

/// Validate and partition a catalog for a day of `total_secs`.
pub fn classify(catalog: &[ClipSpec], total_secs: u32) -> ScheduleResult<Classified> {
    let mut fillers = Vec::new();
    let mut flexible = Vec::new();
    let mut fixed = Vec::new();

    for clip in catalog {
        clip.validate()?;
        if clip.is_filler() {
            fillers.push(clip.clone());
        } else if clip.window.is_some() {
            fixed.push(clip.clone());
        } else {
            flexible.push(clip.clone());
        }
    }
    fixed.sort_by_key(|c| c.window.map(|w| w.start));

    let committed_secs: u64 = flexible
        .iter()
        .chain(fixed.iter())
        .map(ClipSpec::committed_secs)
        .sum();

    let total = u64::from(total_secs);
    if committed_secs >= total {
        return Err(ScheduleError::ScheduleOverbooked {
            committed: committed_secs,
            total: total_secs,
        });
    }
    let filler_rate = filler_rate(committed_secs, total - committed_secs);

    log::debug!(
        "Classified {} filler, {} flexible, {} fixed clip(s); committed {}s, filler rate {}",
        fillers.len(),
        flexible.len(),
        fixed.len(),
        committed_secs,
        filler_rate
    );

    Ok(Classified {
        fillers,
        flexible,
        fixed,
        committed_secs,
        filler_rate,
    })
}

/// `committed / free` rounded half up, in exact integer arithmetic. `free` must be positive.
pub fn filler_rate(committed: u64, free: u64) -> usize {
    ((2 * committed + free) / (2 * free)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Window;

    fn window(start: u32, end: u32) -> Window {
        Window { start, end }
    }

    #[test]
    fn partitions_by_kind_and_window() {
        let catalog = vec![
            ClipSpec::filler("Song", 180),
            ClipSpec::flexible("Promo", 20, 3),
            ClipSpec::fixed("Greeting", 5, 2, window(28_800, 29_400)),
        ];
        let c = classify(&catalog, 54_000).unwrap();
        assert_eq!(c.fillers.len(), 1);
        assert_eq!(c.flexible[0].name, "Promo");
        assert_eq!(c.fixed[0].name, "Greeting");
        assert_eq!(c.committed_secs, 70);
    }

    #[test]
    fn fixed_sorted_by_window_start() {
        let catalog = vec![
            ClipSpec::fixed("Evening", 5, 1, window(60_000, 61_000)),
            ClipSpec::fixed("Morning", 5, 1, window(28_800, 29_400)),
            ClipSpec::fixed("Noon", 5, 1, window(43_200, 44_000)),
        ];
        let c = classify(&catalog, 86_399).unwrap();
        let order: Vec<&str> = c.fixed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["Morning", "Noon", "Evening"]);
    }

    #[test]
    fn filler_only_catalog_has_zero_rate() {
        let c = classify(&[ClipSpec::filler("Jingle", 10)], 30).unwrap();
        assert_eq!(c.committed_secs, 0);
        assert_eq!(c.filler_rate, 0);
    }

    #[test]
    fn overbooked_when_committed_meets_total() {
        let err = classify(&[ClipSpec::flexible("Promo", 20, 2)], 40).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::ScheduleOverbooked {
                committed: 40,
                total: 40
            }
        ));
        assert!(classify(&[ClipSpec::flexible("Promo", 20, 3)], 40).is_err());
    }

    #[test]
    fn invalid_clip_aborts_classification() {
        let err = classify(&[ClipSpec::flexible("Broken", 0, 1)], 100).unwrap_err();
        assert!(matches!(err, ScheduleError::NonPositiveDuration { .. }));
    }

    #[test]
    fn filler_rate_rounds_half_up() {
        assert_eq!(filler_rate(1, 2), 1); // 0.5
        assert_eq!(filler_rate(1, 3), 0); // 0.33
        assert_eq!(filler_rate(3, 2), 2); // 1.5
        assert_eq!(filler_rate(5, 2), 3); // 2.5
        assert_eq!(filler_rate(7, 3), 2); // 2.33
        assert_eq!(filler_rate(0, 10), 0);
    }
}
