use crate::clip::ClipSpec;
use crate::clock;

/// One scheduled airing of a clip. Occurrences of the same clip are independent copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub clip: ClipSpec,
    /// Instant the occurrence was aimed at, for fixed-window clips.
    pub target: Option<u32>,
}

impl Occurrence {
    pub fn new(clip: ClipSpec) -> Self {
        Occurrence { clip, target: None }
    }

    pub fn targeted(clip: ClipSpec, target: u32) -> Self {
        Occurrence {
            clip,
            target: Some(target),
        }
    }
}

/// What fills a stretch of the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Clip(Occurrence),
    /// Dead air ahead of a fixed-window clip. Absorbs later shifts.
    Silence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub start: u32,
    pub end: u32,
    pub slot: Slot,
}

impl TimelineEntry {
    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    pub fn clip(&self) -> Option<&ClipSpec> {
        match &self.slot {
            Slot::Clip(occ) => Some(&occ.clip),
            Slot::Silence => None,
        }
    }

    pub fn occurrence(&self) -> Option<&Occurrence> {
        match &self.slot {
            Slot::Clip(occ) => Some(occ),
            Slot::Silence => None,
        }
    }

    pub fn is_silence(&self) -> bool {
        matches!(self.slot, Slot::Silence)
    }

    /// The "HH:MM:SS-HH:MM:SS" key for this entry.
    pub fn window_key(&self) -> String {
        clock::format_range(self.start, self.end)
    }
}

/// Ordered, contiguous sequence of scheduled entries starting at midnight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TimelineEntry> {
        self.entries
    }

    /// End of the last entry, or 0 for an empty timeline.
    pub fn end(&self) -> u32 {
        self.entries.last().map(|e| e.end).unwrap_or(0)
    }

    fn end_before(&self, pos: usize) -> u32 {
        if pos == 0 { 0 } else { self.entries[pos - 1].end }
    }

    /// Append an occurrence directly after the last entry.
    pub fn push(&mut self, occurrence: Occurrence) {
        let start = self.end();
        self.entries.push(TimelineEntry {
            start,
            end: start + occurrence.clip.duration,
            slot: Slot::Clip(occurrence),
        });
    }

    /// Index of the first entry starting strictly after `instant`, or `len()` if none.
    pub fn position_after(&self, instant: u32) -> usize {
        self.entries
            .iter()
            .position(|e| e.start > instant)
            .unwrap_or(self.entries.len())
    }

    /// Splice an occurrence in before `pos` and shift everything after it.
    ///
    /// `pos` past the end appends. The new entry starts where the previous one
    /// ends; each later clip keeps its duration and moves to follow its
    /// predecessor. Silence shrinks instead of moving, which ends the shift.
    /// A position right behind silence goes in front of it, so the entry
    /// after the silence keeps its start while any silence is left.
    pub fn insert_and_shift(&mut self, pos: usize, occurrence: Occurrence) -> usize {
        let mut pos = pos.min(self.entries.len());
        while pos > 0 && self.entries[pos - 1].is_silence() {
            pos -= 1;
        }
        let start = self.end_before(pos);
        self.entries.insert(
            pos,
            TimelineEntry {
                start,
                end: start + occurrence.clip.duration,
                slot: Slot::Clip(occurrence),
            },
        );
        self.reflow(pos + 1);
        pos
    }

    /// Place an occurrence aimed at `target` and return its index.
    ///
    /// Positioning follows [`insert_and_shift`](Self::insert_and_shift) at
    /// [`position_after`](Self::position_after). When the timeline ends before
    /// `target`, silence pads up to it; when `target` falls inside silence, the
    /// silence is split there so the occurrence starts exactly on target.
    pub fn insert_at_instant(&mut self, target: u32, occurrence: Occurrence) -> usize {
        let pos = self.position_after(target);
        let prev_end = self.end_before(pos);

        if pos == self.entries.len() && prev_end < target {
            self.entries.push(TimelineEntry {
                start: prev_end,
                end: target,
                slot: Slot::Silence,
            });
            self.push(occurrence);
            return self.entries.len() - 1;
        }

        if pos > 0 && self.entries[pos - 1].is_silence() && target < prev_end {
            let mut at = pos - 1;
            if self.entries[at].start == target {
                self.entries.remove(at);
            } else {
                self.entries[at].end = target;
                at += 1;
            }
            let duration = occurrence.clip.duration;
            self.entries.insert(
                at,
                TimelineEntry {
                    start: target,
                    end: target + duration,
                    slot: Slot::Clip(occurrence),
                },
            );
            // Remainder of the split silence; reflow trims it behind the clip.
            self.entries.insert(
                at + 1,
                TimelineEntry {
                    start: target,
                    end: prev_end,
                    slot: Slot::Silence,
                },
            );
            self.reflow(at + 1);
            return at;
        }

        self.insert_and_shift(pos, occurrence)
    }

    /// Re-establish contiguity from index `from` onwards.
    fn reflow(&mut self, from: usize) {
        let mut j = from;
        while j < self.entries.len() {
            let prev_end = self.end_before(j);
            let entry = &mut self.entries[j];
            if entry.start == prev_end {
                break;
            }
            if entry.is_silence() {
                if prev_end >= entry.end {
                    self.entries.remove(j);
                    continue;
                }
                entry.start = prev_end;
                break;
            }
            let duration = entry.duration();
            entry.start = prev_end;
            entry.end = prev_end + duration;
            j += 1;
        }
    }

    /// True when the first entry starts at 0 and every entry starts where the previous ends.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 0;
        for entry in &self.entries {
            if entry.start != expected || entry.end < entry.start {
                return false;
            }
            expected = entry.end;
        }
        true
    }

    /// Total seconds of silence left in the timeline.
    pub fn silence_secs(&self) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.is_silence())
            .map(|e| e.duration())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn occ(name: &str, duration: u32) -> Occurrence {
        Occurrence::new(ClipSpec::flexible(name, duration, 1))
    }

    fn names(tl: &Timeline) -> Vec<String> {
        tl.entries()
            .iter()
            .map(|e| match e.clip() {
                Some(c) => c.name.clone(),
                None => "~".to_string(),
            })
            .collect()
    }

    #[test]
    fn new_timeline_is_empty() {
        let tl = Timeline::new();
        assert!(tl.is_empty());
        assert_eq!(tl.end(), 0);
        assert!(tl.is_contiguous());
    }

    #[test]
    fn push_is_contiguous_from_midnight() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 10));
        tl.push(occ("B", 20));
        assert_eq!(tl.entries()[0].start, 0);
        assert_eq!(tl.entries()[1].start, 10);
        assert_eq!(tl.end(), 30);
        assert!(tl.is_contiguous());
    }

    #[test]
    fn insert_at_front_shifts_everything() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 10));
        tl.push(occ("B", 20));
        tl.insert_and_shift(0, occ("X", 5));
        assert_eq!(names(&tl), ["X", "A", "B"]);
        assert_eq!(tl.entries()[1].start, 5);
        assert_eq!(tl.entries()[2].start, 15);
        assert_eq!(tl.entries()[2].duration(), 20);
        assert!(tl.is_contiguous());
    }

    #[test]
    fn insert_in_middle_and_at_end() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 10));
        tl.push(occ("B", 10));
        tl.insert_and_shift(1, occ("X", 3));
        tl.insert_and_shift(3, occ("Y", 4));
        assert_eq!(names(&tl), ["A", "X", "B", "Y"]);
        assert_eq!(tl.end(), 27);
        assert!(tl.is_contiguous());
    }

    #[test]
    fn insert_past_end_appends() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 10));
        let at = tl.insert_and_shift(99, occ("X", 3));
        assert_eq!(at, 1);
        assert_eq!(tl.entries()[1].start, 10);
    }

    #[test]
    fn position_after_finds_first_later_start() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 10));
        tl.push(occ("B", 10));
        tl.push(occ("C", 10));
        assert_eq!(tl.position_after(0), 1);
        assert_eq!(tl.position_after(10), 2);
        assert_eq!(tl.position_after(15), 2);
        assert_eq!(tl.position_after(20), 3);
    }

    #[test]
    fn instant_past_end_pads_with_silence() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 10));
        let at = tl.insert_at_instant(100, occ("G", 5));
        assert_eq!(at, 2);
        assert_eq!(names(&tl), ["A", "~", "G"]);
        assert_eq!(tl.entries()[2].start, 100);
        assert_eq!(tl.silence_secs(), 90);
        assert!(tl.is_contiguous());
    }

    #[test]
    fn instant_inside_silence_splits_it() {
        let mut tl = Timeline::new();
        tl.insert_at_instant(100, occ("G", 5));
        tl.insert_at_instant(40, occ("H", 10));
        assert_eq!(names(&tl), ["~", "H", "~", "G"]);
        assert_eq!(tl.entries()[1].start, 40);
        assert_eq!(tl.entries()[2].start, 50);
        assert_eq!(tl.entries()[3].start, 100);
        assert!(tl.is_contiguous());
    }

    #[test]
    fn instant_at_silence_start_replaces_its_head() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 10));
        tl.insert_at_instant(100, occ("G", 5));
        tl.insert_at_instant(10, occ("H", 10));
        assert_eq!(names(&tl), ["A", "H", "~", "G"]);
        assert_eq!(tl.entries()[2].start, 20);
        assert_eq!(tl.entries()[3].start, 100);
    }

    #[test]
    fn silence_absorbs_shift() {
        let mut tl = Timeline::new();
        tl.insert_at_instant(100, occ("G", 5));
        tl.insert_and_shift(0, occ("M", 30));
        assert_eq!(names(&tl), ["M", "~", "G"]);
        assert_eq!(tl.entries()[1].start, 30);
        assert_eq!(tl.entries()[2].start, 100);
        assert_eq!(tl.silence_secs(), 70);
    }

    #[test]
    fn exhausted_silence_is_removed_and_shift_continues() {
        let mut tl = Timeline::new();
        tl.insert_at_instant(20, occ("G", 5));
        tl.insert_and_shift(0, occ("M", 30));
        assert_eq!(names(&tl), ["M", "G"]);
        assert_eq!(tl.entries()[1].start, 30);
        assert_eq!(tl.silence_secs(), 0);
        assert!(tl.is_contiguous());
    }

    #[test]
    fn insert_behind_silence_takes_from_the_silence() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 10));
        tl.insert_at_instant(300, occ("G", 10));
        // Index 2 is G, directly behind the silence.
        let at = tl.insert_and_shift(2, occ("M", 10));
        assert_eq!(at, 1);
        assert_eq!(names(&tl), ["A", "M", "~", "G"]);
        assert_eq!(tl.entries()[1].start, 10);
        assert_eq!(tl.entries()[2].start, 20);
        assert_eq!(tl.entries()[3].start, 300);
        assert_eq!(tl.silence_secs(), 280);
        assert!(tl.is_contiguous());
    }

    #[test]
    fn insert_behind_short_silence_shifts_only_the_excess() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 10));
        tl.insert_at_instant(15, occ("G", 10));
        tl.insert_and_shift(2, occ("M", 20));
        assert_eq!(names(&tl), ["A", "M", "G"]);
        assert_eq!(tl.entries()[2].start, 30);
        assert_eq!(tl.silence_secs(), 0);
        assert!(tl.is_contiguous());
    }

    #[test]
    fn window_key_formats_range() {
        let mut tl = Timeline::new();
        tl.push(occ("A", 65));
        assert_eq!(tl.entries()[0].window_key(), "00:00:00-00:01:05");
    }

    proptest! {
        #[test]
        fn random_insertions_stay_contiguous(
            ops in prop::collection::vec((0usize..40, 1u32..120, any::<bool>(), 0u32..4000), 1..60)
        ) {
            let mut tl = Timeline::new();
            let mut clips = 0usize;
            for (pos, duration, by_instant, target) in ops {
                if by_instant {
                    tl.insert_at_instant(target, occ("T", duration));
                } else {
                    tl.insert_and_shift(pos, occ("P", duration));
                }
                clips += 1;
                prop_assert!(tl.is_contiguous());
            }
            let placed = tl.entries().iter().filter(|e| !e.is_silence()).count();
            prop_assert_eq!(placed, clips);
            prop_assert!(tl.entries().iter().all(|e| e.duration() > 0));
        }
    }
}
