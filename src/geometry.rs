use chrono::{Local, NaiveDate};

/// Visibility floor for clipped bars: a sliver still shows as a thin mark.
pub const MIN_BAR_WIDTH: i64 = 4;

/// Horizontal extent of a task bar, in pixels from the chart's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarRect {
    pub left: i64,
    pub width: i64,
}

/// A run of consecutive days sharing a calendar month, for header columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSegment {
    pub label: String,
    pub span: usize,
}

/// Maps a task's date interval onto the visible window's pixel grid.
///
/// Returns `None` exactly when the interval and the window are disjoint;
/// otherwise the rectangle is clipped so that `0 <= left` and
/// `left + width <= view_days * cell_width` (given `cell_width` at least
/// [`MIN_BAR_WIDTH`]; narrower cells cap the floor at one cell).
pub fn bar_rect(
    task_start: NaiveDate,
    task_end: NaiveDate,
    view_start: NaiveDate,
    view_days: i64,
    cell_width: i64,
) -> Option<BarRect> {
    let mut offset = (task_start - view_start).num_days();
    let mut span = (task_end - task_start).num_days() + 1;

    if offset >= view_days || offset + span <= 0 {
        return None;
    }
    if offset < 0 {
        span += offset;
        offset = 0;
    }
    if offset + span > view_days {
        span = view_days - offset;
    }

    Some(BarRect {
        left: offset * cell_width,
        width: (span * cell_width).max(MIN_BAR_WIDTH.min(cell_width)),
    })
}

/// Groups a chronologically ordered date sequence into month runs.
///
/// Labels carry the year so adjacent Januaries a year apart never merge.
/// The segment spans always sum to the input length.
pub fn month_segments(days: &[NaiveDate]) -> Vec<MonthSegment> {
    let mut segments: Vec<MonthSegment> = Vec::new();
    for day in days {
        match segments.last_mut() {
            Some(seg) if seg.label == month_label(*day) => seg.span += 1,
            _ => segments.push(MonthSegment {
                label: month_label(*day),
                span: 1,
            }),
        }
    }
    segments
}

fn month_label(day: NaiveDate) -> String {
    day.format("%b %Y").to_string()
}

/// Day offset of the current date inside the window, `None` when outside.
///
/// Reads "today" at call time so a long-lived window tracks date rollover.
pub fn today_offset(view_start: NaiveDate, view_days: i64) -> Option<i64> {
    today_offset_on(Local::now().date_naive(), view_start, view_days)
}

pub fn today_offset_on(today: NaiveDate, view_start: NaiveDate, view_days: i64) -> Option<i64> {
    let offset = (today - view_start).num_days();
    if offset < 0 || offset >= view_days {
        None
    } else {
        Some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::date_range;
    use chrono::Duration;

    const CELL_W: i64 = 24;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn base() -> NaiveDate {
        d(2026, 3, 1)
    }

    #[test]
    fn five_day_task_inside_the_window() {
        let rect = bar_rect(
            base() + Duration::days(5),
            base() + Duration::days(9),
            base(),
            30,
            CELL_W,
        )
        .unwrap();
        assert_eq!(rect, BarRect { left: 120, width: 120 });
    }

    #[test]
    fn task_entirely_before_the_window_is_clipped_away() {
        let rect = bar_rect(
            base() - Duration::days(10),
            base() - Duration::days(1),
            base(),
            30,
            CELL_W,
        );
        assert_eq!(rect, None);
    }

    #[test]
    fn task_entirely_after_the_window_is_clipped_away() {
        let rect = bar_rect(
            base() + Duration::days(30),
            base() + Duration::days(35),
            base(),
            30,
            CELL_W,
        );
        assert_eq!(rect, None);
    }

    #[test]
    fn left_overhang_clips_to_the_window_edge() {
        // 6-day task, 3 days before the window: 3 visible days at left 0.
        let rect = bar_rect(
            base() - Duration::days(3),
            base() + Duration::days(2),
            base(),
            30,
            CELL_W,
        )
        .unwrap();
        assert_eq!(rect, BarRect { left: 0, width: 72 });
    }

    #[test]
    fn right_overhang_clips_to_the_window_edge() {
        let rect = bar_rect(
            base() + Duration::days(28),
            base() + Duration::days(40),
            base(),
            30,
            CELL_W,
        )
        .unwrap();
        assert_eq!(rect, BarRect { left: 672, width: 48 });
    }

    #[test]
    fn none_iff_disjoint_and_always_in_bounds() {
        let view_days = 30;
        for start_off in -40i64..40 {
            for len in 0i64..15 {
                let start = base() + Duration::days(start_off);
                let end = start + Duration::days(len);
                let rect = bar_rect(start, end, base(), view_days, CELL_W);
                let overlaps = start_off + len >= 0 && start_off < view_days;
                assert_eq!(rect.is_some(), overlaps, "start {start_off} len {len}");
                if let Some(rect) = rect {
                    assert!(rect.left >= 0);
                    assert!(rect.left + rect.width <= view_days * CELL_W);
                }
            }
        }
    }

    #[test]
    fn narrow_cells_keep_the_guarantee() {
        // One visible day at the far right edge with 1-wide cells.
        let rect = bar_rect(
            base() + Duration::days(29),
            base() + Duration::days(40),
            base(),
            30,
            1,
        )
        .unwrap();
        assert_eq!(rect, BarRect { left: 29, width: 1 });
    }

    #[test]
    fn month_segment_spans_sum_to_the_range_length() {
        for n in [1u32, 28, 30, 31, 60, 365] {
            let days = date_range(d(2026, 2, 14), n);
            let segments = month_segments(&days);
            let total: usize = segments.iter().map(|s| s.span).sum();
            assert_eq!(total, n as usize);
        }
    }

    #[test]
    fn month_segments_respect_calendar_boundaries() {
        // Feb 27 .. Mar 2 2026
        let segments = month_segments(&date_range(d(2026, 2, 27), 4));
        assert_eq!(
            segments,
            vec![
                MonthSegment { label: "Feb 2026".into(), span: 2 },
                MonthSegment { label: "Mar 2026".into(), span: 2 },
            ]
        );
    }

    #[test]
    fn month_segments_never_alias_across_years() {
        // Jan 2026 .. Jan 2027 in one window
        let segments = month_segments(&date_range(d(2026, 1, 31), 366));
        let labels: Vec<&str> = segments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels.first(), Some(&"Jan 2026"));
        assert_eq!(labels.last(), Some(&"Jan 2027"));
        assert_eq!(segments.len(), 13);
    }

    #[test]
    fn today_marker_only_inside_the_window() {
        let today = d(2026, 3, 10);
        assert_eq!(today_offset_on(today, base(), 30), Some(9));
        assert_eq!(today_offset_on(today, base(), 9), None);
        assert_eq!(today_offset_on(today, d(2026, 3, 11), 30), None);
    }
}
