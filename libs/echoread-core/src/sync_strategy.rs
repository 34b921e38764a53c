//! Audio/text synchronization view over a summary.
//!
//! A summary stores three independent sync representations: detailed
//! per-segment timings, coarse chapter markers, and an auto-scroll flag.
//! Only one is meaningful per row. Storage stays lenient so older rows keep
//! reading; [`Summary::sync_strategy`] resolves the one that applies.
//!
//! Precedence: non-empty timings, then non-empty chapter markers, then the
//! auto-scroll flag.

use serde::Serialize;

use crate::types::{ChapterMarker, Summary, TextTiming};

/// Resolved sync representation of a summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncStrategy<'a> {
    DetailedTimings(&'a [TextTiming]),
    ChapterMarkers(&'a [ChapterMarker]),
    AutoScroll,
    Unsynced,
}

/// Label for a [`SyncStrategy`] without the borrowed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    DetailedTimings,
    ChapterMarkers,
    AutoScroll,
    Unsynced,
}

impl SyncStrategy<'_> {
    pub fn kind(&self) -> SyncKind {
        match self {
            Self::DetailedTimings(_) => SyncKind::DetailedTimings,
            Self::ChapterMarkers(_) => SyncKind::ChapterMarkers,
            Self::AutoScroll => SyncKind::AutoScroll,
            Self::Unsynced => SyncKind::Unsynced,
        }
    }
}

impl Summary {
    /// Resolve which sync representation applies to this summary.
    pub fn sync_strategy(&self) -> SyncStrategy<'_> {
        if let Some(timings) = self.text_timings.as_deref().filter(|t| !t.is_empty()) {
            return SyncStrategy::DetailedTimings(timings);
        }
        if let Some(markers) = self.chapter_markers.as_deref().filter(|m| !m.is_empty()) {
            return SyncStrategy::ChapterMarkers(markers);
        }
        if self.use_auto_scroll {
            SyncStrategy::AutoScroll
        } else {
            SyncStrategy::Unsynced
        }
    }
}

/// Estimated scroll position for auto-scroll, as a fraction of the content.
///
/// Clamped to `[0.0, 1.0]`. A zero reading time yields `0.0`.
pub fn estimate_scroll_fraction(elapsed_secs: f64, reading_time_minutes: i32) -> f64 {
    if reading_time_minutes <= 0 || !elapsed_secs.is_finite() {
        return 0.0;
    }
    let total = reading_time_minutes as f64 * 60.0;
    (elapsed_secs / total).clamp(0.0, 1.0)
}

/// Segment being spoken at `t` seconds: `start_time <= t < end_time`.
pub fn active_segment(timings: &[TextTiming], t: f64) -> Option<&TextTiming> {
    timings
        .iter()
        .find(|seg| seg.start_time <= t && t < seg.end_time)
}

/// Chapter in effect at `t` seconds: the last marker that has started.
pub fn active_chapter(markers: &[ChapterMarker], t: f64) -> Option<&ChapterMarker> {
    markers
        .iter()
        .filter(|m| m.start_time <= t)
        .max_by(|a, b| a.start_time.total_cmp(&b.start_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SummaryType;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn summary() -> Summary {
        let now = Utc::now();
        Summary {
            id: "s1".to_string(),
            book_id: "b1".to_string(),
            title: "Atomic Habits".to_string(),
            content: "...".to_string(),
            in_this_summary: None,
            key_takeaways: None,
            big_ideas: None,
            about_author: None,
            reading_time_minutes: 15,
            audio_url: None,
            audio_duration_minutes: None,
            text_timings: None,
            chapter_markers: None,
            use_auto_scroll: true,
            summary_type: SummaryType::Opening,
            sequence_number: 1,
            is_published: false,
            is_premium: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn marker(title: &str, start: f64) -> ChapterMarker {
        ChapterMarker {
            title: title.to_string(),
            start_time: start,
            content: String::new(),
        }
    }

    #[test]
    fn defaults_to_auto_scroll() {
        assert_eq!(summary().sync_strategy(), SyncStrategy::AutoScroll);
    }

    #[test]
    fn unsynced_when_auto_scroll_disabled() {
        let mut s = summary();
        s.use_auto_scroll = false;
        assert_eq!(s.sync_strategy().kind(), SyncKind::Unsynced);
    }

    #[test]
    fn timings_win_over_markers() {
        let mut s = summary();
        s.chapter_markers = Some(vec![marker("Intro", 0.0)]);
        s.text_timings = Some(vec![TextTiming {
            text_segment: "Hello".to_string(),
            start_time: 0.0,
            end_time: 2.5,
        }]);
        assert_eq!(s.sync_strategy().kind(), SyncKind::DetailedTimings);
    }

    #[test]
    fn empty_timings_fall_through_to_markers() {
        let mut s = summary();
        s.text_timings = Some(vec![]);
        s.chapter_markers = Some(vec![marker("Intro", 0.0)]);
        assert_eq!(s.sync_strategy().kind(), SyncKind::ChapterMarkers);
    }

    #[test]
    fn scroll_fraction_is_clamped() {
        assert_eq!(estimate_scroll_fraction(450.0, 15), 0.5);
        assert_eq!(estimate_scroll_fraction(10_000.0, 15), 1.0);
        assert_eq!(estimate_scroll_fraction(-5.0, 15), 0.0);
        assert_eq!(estimate_scroll_fraction(30.0, 0), 0.0);
    }

    #[test]
    fn finds_active_segment() {
        let timings = vec![
            TextTiming {
                text_segment: "one".to_string(),
                start_time: 0.0,
                end_time: 1.0,
            },
            TextTiming {
                text_segment: "two".to_string(),
                start_time: 1.0,
                end_time: 2.0,
            },
        ];
        assert_eq!(active_segment(&timings, 1.0).unwrap().text_segment, "two");
        assert!(active_segment(&timings, 2.0).is_none());
    }

    #[test]
    fn finds_active_chapter() {
        let markers = vec![marker("Intro", 0.0), marker("Habits", 60.0), marker("Wrap", 120.0)];
        assert_eq!(active_chapter(&markers, 90.0).unwrap().title, "Habits");
        assert_eq!(active_chapter(&markers, 500.0).unwrap().title, "Wrap");
        assert!(active_chapter(&markers[1..], 10.0).is_none());
    }
}
