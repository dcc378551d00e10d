use chrono::NaiveDate;
use study_plan_tool::{
    LessonRecord, PlanError, PlanParameters, StudyPlan, WeightTable, build_backlog,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn record(lesson: &str, module: &str, duration_min: i64) -> LessonRecord {
    LessonRecord {
        lesson: lesson.to_string(),
        module: module.to_string(),
        duration_min,
    }
}

fn single_exam_table(rows: &[(&str, i32)]) -> WeightTable {
    let mut table = WeightTable::new(vec!["TEA".to_string()]);
    for (module, weight) in rows {
        table.insert(*module, vec![*weight]).unwrap();
    }
    table
}

fn base_params() -> PlanParameters {
    PlanParameters {
        start_date: d(2025, 11, 2),
        exam_date: d(2025, 11, 5),
        daily_minutes: 100,
        days_per_week: 7,
        ..Default::default()
    }
}

#[test]
fn build_rejects_invalid_parameters() {
    let table = single_exam_table(&[("Cardiology", 2)]);
    let bundle = build_backlog(&table, &[record("Intro", "Cardiology", 60)], "TEA").unwrap();

    let mut params = base_params();
    params.daily_minutes = 0;
    let err = StudyPlan::build(params, &bundle).unwrap_err();
    assert!(matches!(err, PlanError::Parameters(_)));
}

#[test]
fn build_rejects_an_empty_calendar() {
    let table = single_exam_table(&[("Cardiology", 2)]);
    let bundle = build_backlog(&table, &[record("Intro", "Cardiology", 60)], "TEA").unwrap();

    let mut params = base_params();
    // 2025-11-04 is a Tuesday; restricting to Mondays leaves no study days.
    params.start_date = d(2025, 11, 4);
    params.exam_date = d(2025, 11, 4);
    params.fixed_weekdays = vec![chrono::Weekday::Mon];
    let err = StudyPlan::build(params, &bundle).unwrap_err();
    assert!(matches!(err, PlanError::EmptyCalendar));
}

#[test]
fn weight_zero_modules_never_show_up_anywhere() {
    let table = single_exam_table(&[("Ghost", 0), ("Real", 2)]);
    let records = vec![
        record("Invisible", "Ghost", 60),
        record("Visible", "Real", 60),
    ];
    let bundle = build_backlog(&table, &records, "TEA").unwrap();

    let plan = StudyPlan::build(base_params(), &bundle).unwrap();

    assert!(
        plan.days()
            .iter()
            .flat_map(|day| &day.lessons)
            .all(|lesson| lesson.module != "Ghost")
    );
    assert!(plan.removed_lessons().iter().all(|l| l.module != "Ghost"));
    assert!(plan.unallocated().iter().all(|l| l.module != "Ghost"));
}

#[test]
fn totals_and_summary_add_up() {
    let table = single_exam_table(&[("Cardiology", 2)]);
    let bundle = build_backlog(&table, &[record("Intro", "Cardiology", 80)], "TEA").unwrap();

    // Nov 2 is a Sunday, so the calendar is exactly Nov 2..=5: four days in
    // one Sunday-anchored week.
    let plan = StudyPlan::build(base_params(), &bundle).unwrap();

    assert!(plan.is_complete());
    assert_eq!(plan.days().len(), 4);
    let totals = plan.totals();
    assert_eq!(totals.lesson_minutes, 80);
    assert_eq!(totals.total_weeks, 1);
    let per_day: i64 = plan
        .days()
        .iter()
        .map(|day| day.questions_min + day.review_min)
        .sum();
    assert_eq!(totals.practice_review_minutes, per_day);

    let summary = plan.summary();
    assert_eq!(summary.study_day_count, 4);
    assert_eq!(summary.scheduled_lesson_count, 1);
    assert_eq!(summary.first_day, Some(d(2025, 11, 2)));
    assert_eq!(summary.last_day, Some(d(2025, 11, 5)));
    assert!(summary.to_cli_summary().contains("complete"));
}

#[test]
fn reviews_are_listed_heaviest_module_first() {
    let table = single_exam_table(&[("Light", 1), ("Heavy", 5)]);
    let records = vec![
        record("Light lesson", "Light", 10),
        record("Heavy lesson", "Heavy", 10),
    ];
    let bundle = build_backlog(&table, &records, "TEA").unwrap();

    let mut params = base_params();
    params.exam_date = d(2025, 11, 3);
    params.review_offsets = vec![1];
    let plan = StudyPlan::build(params, &bundle).unwrap();

    let reviews = plan.reviews_on(d(2025, 11, 3));
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].module, "Heavy");
    assert_eq!(reviews[1].module, "Light");
    assert_eq!(reviews[0].days_since_watch(d(2025, 11, 3)), 1);
}

#[test]
fn dataframe_has_one_row_per_allocated_lesson() {
    let table = single_exam_table(&[("Cardiology", 2)]);
    let records = vec![
        record("L1", "Cardiology", 30),
        record("L2", "Cardiology", 30),
        record("L3", "Cardiology", 30),
        record("L4", "Cardiology", 30),
        record("L5", "Cardiology", 30),
        record("L6", "Cardiology", 30),
    ];
    let bundle = build_backlog(&table, &records, "TEA").unwrap();

    let mut params = base_params();
    params.exam_date = d(2025, 11, 15);
    params.days_per_week = 2;
    let plan = StudyPlan::build(params, &bundle).unwrap();
    assert!(plan.is_complete());

    let df = plan.to_dataframe().unwrap();
    assert_eq!(df.height(), 6);
    let weeks: Vec<i64> = df.column("week").unwrap().i64().unwrap().into_iter().flatten().collect();
    assert_eq!(weeks, vec![1, 1, 1, 1, 2, 2]);

    let weekly = plan.weekly_minutes().unwrap();
    assert_eq!(weekly.height(), 2);
    let minutes: Vec<i64> = weekly
        .column("lesson_min")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(minutes, vec![120, 60]);
}

#[test]
fn removed_lessons_group_by_module() {
    let table = single_exam_table(&[("Aleph", 1), ("Beth", 2)]);
    let records = vec![
        record("A only", "Aleph", 500),
        record("B first", "Beth", 400),
        record("B second", "Beth", 400),
    ];
    let bundle = build_backlog(&table, &records, "TEA").unwrap();

    let mut params = base_params();
    params.exam_date = d(2025, 11, 2);
    params.daily_minutes = 10;
    let plan = StudyPlan::build(params, &bundle).unwrap();

    assert!(!plan.removed_lessons().is_empty());
    let grouped = plan.removed_by_module();
    assert_eq!(grouped["Aleph"].len(), 1);
    assert_eq!(grouped["Beth"].len(), 2);
    assert!(plan.is_abridged());
    assert!(
        plan.summary()
            .to_cli_summary()
            .contains("abridged(-2 modules)")
    );
}
