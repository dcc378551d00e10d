use chrono::NaiveDate;
use study_plan_tool::{ReviewEvent, ReviewMap, StudyCalendar, remap_reviews};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn event(lesson: &str, watched_on: NaiveDate) -> ReviewEvent {
    ReviewEvent {
        lesson: lesson.to_string(),
        module: "Cardiology".to_string(),
        weight: 2,
        watched_on,
    }
}

fn calendar() -> StudyCalendar {
    StudyCalendar::from_days(vec![d(2025, 11, 3), d(2025, 11, 5), d(2025, 11, 7)])
}

#[test]
fn target_on_a_study_day_is_never_moved() {
    let mut raw = ReviewMap::new();
    raw.insert(d(2025, 11, 5), vec![event("A", d(2025, 11, 4))]);

    let remapped = remap_reviews(raw, &calendar());
    assert_eq!(remapped[&d(2025, 11, 5)].len(), 1);
    assert_eq!(remapped.len(), 1);
}

#[test]
fn target_between_study_days_moves_forward() {
    let mut raw = ReviewMap::new();
    raw.insert(d(2025, 11, 4), vec![event("A", d(2025, 11, 3))]);
    raw.insert(d(2025, 11, 6), vec![event("B", d(2025, 11, 3))]);

    let remapped = remap_reviews(raw, &calendar());
    assert_eq!(remapped[&d(2025, 11, 5)][0].lesson, "A");
    assert_eq!(remapped[&d(2025, 11, 7)][0].lesson, "B");
}

#[test]
fn targets_past_the_last_study_day_are_dropped() {
    let mut raw = ReviewMap::new();
    raw.insert(d(2025, 11, 8), vec![event("A", d(2025, 11, 3))]);
    raw.insert(d(2025, 12, 3), vec![event("B", d(2025, 11, 3))]);

    let remapped = remap_reviews(raw, &calendar());
    assert!(remapped.is_empty());
}

#[test]
fn events_landing_on_the_same_day_are_merged() {
    let mut raw = ReviewMap::new();
    raw.insert(d(2025, 11, 4), vec![event("A", d(2025, 11, 3))]);
    raw.insert(d(2025, 11, 5), vec![event("B", d(2025, 11, 2))]);

    let remapped = remap_reviews(raw, &calendar());
    let lessons: Vec<&str> = remapped[&d(2025, 11, 5)]
        .iter()
        .map(|e| e.lesson.as_str())
        .collect();
    assert_eq!(lessons, vec!["A", "B"]);
}

#[test]
fn empty_calendar_drops_everything() {
    let mut raw = ReviewMap::new();
    raw.insert(d(2025, 11, 4), vec![event("A", d(2025, 11, 3))]);

    let remapped = remap_reviews(raw, &StudyCalendar::from_days(Vec::new()));
    assert!(remapped.is_empty());
}

#[test]
fn days_since_watch_counts_whole_days() {
    let e = event("A", d(2025, 11, 3));
    assert_eq!(e.days_since_watch(d(2025, 11, 3)), 0);
    assert_eq!(e.days_since_watch(d(2025, 11, 7)), 4);
}
