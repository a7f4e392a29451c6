use crate::clock::{self, SECONDS_PER_DAY};
use crate::error::{ScheduleError, ScheduleResult};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Clip type string that marks filler in the external catalog.
pub const FILLER_TYPE: &str = "Music";

/// Whether a clip pads the schedule or carries its own repeat count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipKind {
    Filler,
    Normal,
}

/// A fixed broadcast window `[start, end)` in seconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: u32,
    pub end: u32,
}

impl Window {
    /// Build a window, rejecting empty, inverted, or out-of-day ranges.
    pub fn new(clip: &str, start: u32, end: u32) -> ScheduleResult<Self> {
        if end <= start {
            return Err(ScheduleError::InvalidWindow {
                clip: clip.to_string(),
                reason: format!(
                    "end {} is not after start {}",
                    clock::to_clock_string(end),
                    clock::to_clock_string(start)
                ),
            });
        }
        if end >= SECONDS_PER_DAY {
            return Err(ScheduleError::InvalidWindow {
                clip: clip.to_string(),
                reason: format!("end {} is past the end of the day", clock::to_clock_string(end)),
            });
        }
        Ok(Window { start, end })
    }

    /// Parse a "HH:MM-HH:MM" time slot.
    pub fn parse(clip: &str, slot: &str) -> ScheduleResult<Self> {
        let (start, end) = clock::parse_range(slot)?;
        Window::new(clip, start, end)
    }

    pub fn contains(&self, secs: u32) -> bool {
        self.start <= secs && secs < self.end
    }

    pub fn span(&self) -> u32 {
        self.end - self.start
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", clock::format_range(self.start, self.end))
    }
}

/// A validated clip descriptor consumed by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipSpec {
    pub name: String,
    pub kind: ClipKind,
    /// Length in whole seconds.
    pub duration: u32,
    /// Required occurrences per day. Ignored for filler.
    pub frequency: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<Window>,
}

impl ClipSpec {
    pub fn filler(name: &str, duration: u32) -> Self {
        ClipSpec {
            name: name.to_string(),
            kind: ClipKind::Filler,
            duration,
            frequency: 1,
            window: None,
        }
    }

    pub fn flexible(name: &str, duration: u32, frequency: u32) -> Self {
        ClipSpec {
            name: name.to_string(),
            kind: ClipKind::Normal,
            duration,
            frequency,
            window: None,
        }
    }

    pub fn fixed(name: &str, duration: u32, frequency: u32, window: Window) -> Self {
        ClipSpec {
            name: name.to_string(),
            kind: ClipKind::Normal,
            duration,
            frequency,
            window: Some(window),
        }
    }

    pub fn is_filler(&self) -> bool {
        self.kind == ClipKind::Filler
    }

    /// The external type label: "Music" for filler, "Audio" otherwise.
    pub fn type_label(&self) -> &'static str {
        match self.kind {
            ClipKind::Filler => FILLER_TYPE,
            ClipKind::Normal => "Audio",
        }
    }

    /// Check field ranges. Windows are re-validated since the fields are public.
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.duration == 0 {
            return Err(ScheduleError::NonPositiveDuration {
                clip: self.name.clone(),
            });
        }
        if self.is_filler() {
            return Ok(());
        }
        if self.frequency == 0 {
            return Err(ScheduleError::NonPositiveFrequency {
                clip: self.name.clone(),
            });
        }
        if let Some(w) = self.window {
            Window::new(&self.name, w.start, w.end)?;
        }
        Ok(())
    }

    /// Seconds this clip commits to the day (duration * frequency).
    pub fn committed_secs(&self) -> u64 {
        u64::from(self.duration) * u64::from(self.frequency)
    }
}

/// A numeric field as it arrives from the console: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    fn as_integer(&self) -> Option<i64> {
        match self {
            Numeric::Int(n) => Some(*n),
            Numeric::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            Numeric::Float(_) => None,
            Numeric::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(n) => write!(f, "{}", n),
            Numeric::Float(x) => write!(f, "{}", x),
            Numeric::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A clip record in the loose shape the broadcast console stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Numeric>,
}

impl ClipDescriptor {
    /// Build a descriptor by reading title and duration from an audio file's tags.
    pub fn from_audio_file(
        path: &Path,
        kind: &str,
        frequency: Option<u32>,
        time_slot: Option<String>,
    ) -> Result<Self, String> {
        let tagged_file = lofty::read_from_path(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;

        let millis = tagged_file.properties().duration().as_millis();
        let duration = ((millis + 500) / 1000).max(1) as i64;

        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());
        let name = tag
            .and_then(|t| t.title().map(|s| s.to_string()))
            .unwrap_or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "Unknown".to_string())
            });

        Ok(ClipDescriptor {
            name,
            kind: kind.to_string(),
            frequency: frequency.map(|f| Numeric::Int(i64::from(f))),
            time_slot,
            duration: Some(Numeric::Int(duration)),
        })
    }

    /// Validate and convert into a [`ClipSpec`].
    pub fn into_spec(self) -> ScheduleResult<ClipSpec> {
        let kind = if self.kind == FILLER_TYPE {
            ClipKind::Filler
        } else {
            ClipKind::Normal
        };

        let duration = match &self.duration {
            Some(raw) => parse_count(&self.name, "duration", raw)?,
            None => return Err(missing(&self.name, "duration")),
        };
        if duration <= 0 {
            return Err(ScheduleError::NonPositiveDuration { clip: self.name });
        }

        let slot = self
            .time_slot
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if kind == ClipKind::Filler {
            if let Some(slot) = slot {
                log::warn!("Ignoring time slot '{}' on filler clip '{}'", slot, self.name);
            }
            return Ok(ClipSpec::filler(&self.name, clamp_u32(&self.name, "duration", duration)?));
        }

        let frequency = match &self.frequency {
            Some(raw) => parse_count(&self.name, "frequency", raw)?,
            None => return Err(missing(&self.name, "frequency")),
        };
        if frequency <= 0 {
            return Err(ScheduleError::NonPositiveFrequency { clip: self.name });
        }

        let window = slot.map(|s| Window::parse(&self.name, s)).transpose()?;
        Ok(ClipSpec {
            duration: clamp_u32(&self.name, "duration", duration)?,
            frequency: clamp_u32(&self.name, "frequency", frequency)?,
            kind,
            window,
            name: self.name,
        })
    }
}

fn missing(clip: &str, field: &'static str) -> ScheduleError {
    ScheduleError::InvalidField {
        clip: clip.to_string(),
        field,
        value: "<missing>".to_string(),
    }
}

fn parse_count(clip: &str, field: &'static str, raw: &Numeric) -> ScheduleResult<i64> {
    raw.as_integer().ok_or_else(|| ScheduleError::InvalidField {
        clip: clip.to_string(),
        field,
        value: raw.to_string(),
    })
}

fn clamp_u32(clip: &str, field: &'static str, n: i64) -> ScheduleResult<u32> {
    u32::try_from(n).map_err(|_| ScheduleError::InvalidField {
        clip: clip.to_string(),
        field,
        value: n.to_string(),
    })
}

/// Parse a JSON array of console clip records into validated clips.
pub fn parse_catalog(json: &str) -> ScheduleResult<Vec<ClipSpec>> {
    let descriptors: Vec<ClipDescriptor> = serde_json::from_str(json)?;
    descriptors.into_iter().map(ClipDescriptor::into_spec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(json: &str) -> ClipDescriptor {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let clip = descriptor(
            r#"{"name":"Promo","type":"Ad","frequency":"3","time_slot":"","duration":"20"}"#,
        )
        .into_spec()
        .unwrap();
        assert_eq!(clip, ClipSpec::flexible("Promo", 20, 3));
    }

    #[test]
    fn music_type_is_filler_and_ignores_frequency() {
        let clip = descriptor(r#"{"name":"Jingle","type":"Music","duration":10}"#)
            .into_spec()
            .unwrap();
        assert!(clip.is_filler());
        assert_eq!(clip.duration, 10);
        assert_eq!(clip.type_label(), "Music");
    }

    #[test]
    fn time_slot_becomes_window() {
        let clip = descriptor(
            r#"{"name":"Greeting","type":"Voice","frequency":2,
                "time_slot":"08:00-08:10","duration":5}"#,
        )
        .into_spec()
        .unwrap();
        assert_eq!(
            clip.window,
            Some(Window {
                start: 28_800,
                end: 29_400
            })
        );
    }

    #[test]
    fn missing_duration_rejected() {
        let err = descriptor(r#"{"name":"X","type":"Ad","frequency":1}"#)
            .into_spec()
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidField { field: "duration", .. }
        ));
    }

    #[test]
    fn missing_frequency_rejected_for_normal_clips() {
        let err = descriptor(r#"{"name":"X","type":"Ad","duration":5}"#)
            .into_spec()
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidField { field: "frequency", .. }
        ));
    }

    #[test]
    fn malformed_numbers_rejected() {
        for raw in [r#""abc""#, "12.5", r#""""#] {
            let json = format!(r#"{{"name":"X","type":"Ad","frequency":1,"duration":{}}}"#, raw);
            let err = descriptor(&json).into_spec().unwrap_err();
            assert!(
                matches!(err, ScheduleError::InvalidField { .. }),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn non_positive_fields_rejected() {
        let err = descriptor(r#"{"name":"X","type":"Ad","frequency":1,"duration":0}"#)
            .into_spec()
            .unwrap_err();
        assert!(matches!(err, ScheduleError::NonPositiveDuration { .. }));

        let err = descriptor(r#"{"name":"X","type":"Ad","frequency":"-2","duration":5}"#)
            .into_spec()
            .unwrap_err();
        assert!(matches!(err, ScheduleError::NonPositiveFrequency { .. }));
    }

    #[test]
    fn inverted_window_rejected() {
        let err = descriptor(
            r#"{"name":"X","type":"Ad","frequency":1,"time_slot":"09:00-08:00","duration":5}"#,
        )
        .into_spec()
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidWindow { .. }));
    }

    #[test]
    fn malformed_time_slot_rejected() {
        let err = descriptor(
            r#"{"name":"X","type":"Ad","frequency":1,"time_slot":"8am-9am","duration":5}"#,
        )
        .into_spec()
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTimeFormat(_)));
    }

    #[test]
    fn parse_catalog_reports_malformed_json() {
        assert!(matches!(
            parse_catalog("{not json"),
            Err(ScheduleError::MalformedCatalog(_))
        ));
        let clips = parse_catalog(
            r#"[{"name":"A","type":"Music","duration":"30"},
                {"name":"B","type":"Ad","frequency":2,"duration":15,"time_slot":null}]"#,
        )
        .unwrap();
        assert_eq!(clips.len(), 2);
        assert!(clips[0].is_filler());
        assert_eq!(clips[1].committed_secs(), 30);
    }

    #[test]
    fn validate_catches_zero_fields() {
        assert!(ClipSpec::flexible("A", 0, 1).validate().is_err());
        assert!(ClipSpec::flexible("A", 5, 0).validate().is_err());
        assert!(ClipSpec::filler("M", 5).validate().is_ok());
        let bad = ClipSpec {
            window: Some(Window { start: 100, end: 50 }),
            ..ClipSpec::flexible("A", 5, 1)
        };
        assert!(matches!(
            bad.validate(),
            Err(ScheduleError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn window_display_and_contains() {
        let w = Window::new("G", 28_800, 29_400).unwrap();
        assert_eq!(w.to_string(), "08:00:00-08:10:00");
        assert!(w.contains(28_800));
        assert!(!w.contains(29_400));
        assert_eq!(w.span(), 600);
    }

    #[test]
    fn from_audio_file_rejects_missing_file() {
        let result =
            ClipDescriptor::from_audio_file(Path::new("nonexistent.mp3"), "Music", None, None);
        assert!(result.is_err());
    }
}
