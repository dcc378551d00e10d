use chrono::{NaiveDate, Weekday};
use polars::prelude::{AnyValue, DataFrame};
use std::io::{self, Write};
use study_plan_tool::{
    LessonRecord, PlanParameters, StudyPlan, WeightTable, build_backlog, load_lessons_from_csv,
    load_weight_table_from_csv, save_plan_to_csv, save_plan_to_json,
};

fn weekday_from_index(value: u8) -> Option<Weekday> {
    match value {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_weekday_list(s: &str) -> Option<Vec<Weekday>> {
    let mut weekdays = Vec::new();
    for part in s.split(',') {
        let value: u8 = part.trim().parse().ok()?;
        weekdays.push(weekday_from_index(value)?);
    }
    Some(weekdays)
}

fn parse_offset_list(s: &str) -> Option<Vec<i64>> {
    s.split(',')
        .map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    // Compute column widths
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell_text = |av: &AnyValue| -> String {
        match av {
            AnyValue::Null => String::new(),
            AnyValue::Int32(v) => v.to_string(),
            AnyValue::Int64(v) => v.to_string(),
            AnyValue::String(s) => s.to_string(),
            _ => av.to_string(),
        }
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                let s = cell_text(av);
                if s.len() > widths[ci] {
                    widths[ci] = s.len();
                }
            }
        }
    }

    // Build horizontal separator
    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    // Header
    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    // Rows
    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let s = col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default();
            out.push(' ');
            out.push_str(&s);
            let pad = widths[ci].saturating_sub(s.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  params                             Show current parameters\n  exam <type>                        Set exam type\n  dates <start> <end>                Set start and exam dates (YYYY-MM-DD)\n  minutes <n>                        Set daily study minutes\n  dpw <n>                            Set study days per week\n  weekdays <csv|clear>               Fix weekdays (0=Mon .. 6=Sun), e.g. 0,2,4\n  offsets <csv>                      Set review offsets in days, e.g. 1,3,7,14,30\n  load <topics.csv> <lessons.csv>    Load weight table and lesson list\n  run                                Build the study plan\n  show                               Show the plan as a table\n  day <YYYY-MM-DD>                   Show one study day with its reviews\n  removed                            Show the removed-module checklist\n  save <json|csv> <path>             Save the plan\n  quit|exit                          Exit"
    );
}

fn print_params(params: &PlanParameters) {
    println!(
        "exam_type={} start={} exam={} minutes/day={} days/week={} weekdays={:?} offsets={:?}",
        params.exam_type,
        params.start_date,
        params.exam_date,
        params.daily_minutes,
        params.days_per_week,
        params.fixed_weekdays,
        params.review_offsets
    );
}

fn main() {
    let mut params = PlanParameters::default();
    let mut backlog: Option<(WeightTable, Vec<LessonRecord>)> = None;
    let mut plan: Option<StudyPlan> = None;

    println!("Study Plan Tool (CLI) - type 'help' for commands\n");
    print_params(&params);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => {
                print_help();
            }
            "quit" | "exit" => break,
            "params" => {
                print_params(&params);
            }
            "exam" => match parts.next() {
                Some(exam_type) => {
                    params.exam_type = exam_type.to_string();
                    println!("exam_type set.");
                }
                None => println!("Usage: exam <type>"),
            },
            "dates" => {
                let start_s = parts.next();
                let exam_s = parts.next();
                match (start_s, exam_s) {
                    (Some(start_s), Some(exam_s)) => {
                        let start = match NaiveDate::parse_from_str(start_s, "%Y-%m-%d") {
                            Ok(d) => d,
                            Err(_) => {
                                println!("Invalid start date (YYYY-MM-DD)");
                                continue;
                            }
                        };
                        let exam = match NaiveDate::parse_from_str(exam_s, "%Y-%m-%d") {
                            Ok(d) => d,
                            Err(_) => {
                                println!("Invalid exam date (YYYY-MM-DD)");
                                continue;
                            }
                        };
                        params.start_date = start;
                        params.exam_date = exam;
                        println!("Dates set.");
                    }
                    _ => println!("Usage: dates <start> <end>"),
                }
            }
            "minutes" => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                Some(minutes) => {
                    params.daily_minutes = minutes;
                    println!("daily_minutes set.");
                }
                None => println!("Usage: minutes <n>"),
            },
            "dpw" => match parts.next().and_then(|s| s.parse::<u32>().ok()) {
                Some(days) => {
                    params.days_per_week = days;
                    println!("days_per_week set.");
                }
                None => println!("Usage: dpw <n>"),
            },
            "weekdays" => match parts.next() {
                Some("clear") => {
                    params.fixed_weekdays.clear();
                    println!("Fixed weekdays cleared.");
                }
                Some(csv) => match parse_weekday_list(csv) {
                    Some(weekdays) => {
                        params.fixed_weekdays = weekdays;
                        println!("Fixed weekdays set.");
                    }
                    None => println!("Invalid weekday list (0=Mon .. 6=Sun)"),
                },
                None => println!("Usage: weekdays <csv|clear>"),
            },
            "offsets" => match parts.next().and_then(parse_offset_list) {
                Some(offsets) => {
                    params.review_offsets = offsets;
                    println!("Review offsets set.");
                }
                None => println!("Usage: offsets <csv>"),
            },
            "load" => {
                let topics_path = parts.next();
                let lessons_path = parts.next();
                match (topics_path, lessons_path) {
                    (Some(topics_path), Some(lessons_path)) => {
                        let table = match load_weight_table_from_csv(topics_path) {
                            Ok(table) => table,
                            Err(e) => {
                                println!("Error loading weight table: {}", e);
                                continue;
                            }
                        };
                        let lessons = match load_lessons_from_csv(lessons_path) {
                            Ok(lessons) => lessons,
                            Err(e) => {
                                println!("Error loading lessons: {}", e);
                                continue;
                            }
                        };
                        println!(
                            "Loaded {} modules and {} lessons.",
                            table.modules().count(),
                            lessons.len()
                        );
                        backlog = Some((table, lessons));
                    }
                    _ => println!("Usage: load <topics.csv> <lessons.csv>"),
                }
            }
            "run" => {
                let Some((table, lessons)) = backlog.as_ref() else {
                    println!("Load the backlog first ('load <topics.csv> <lessons.csv>').");
                    continue;
                };
                let bundle = match build_backlog(table, lessons, &params.exam_type) {
                    Ok(bundle) => bundle,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                match StudyPlan::build(params.clone(), &bundle) {
                    Ok(built) => {
                        println!("Plan built ({})", built.summary().to_cli_summary());
                        plan = Some(built);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "show" => match plan.as_ref() {
                Some(plan) => match plan.to_dataframe() {
                    Ok(df) => {
                        println!("{}", render_df_as_text_table(&df));
                        println!("({})", plan.summary().to_cli_summary());
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("No plan yet. Run 'run' first."),
            },
            "day" => {
                let Some(plan) = plan.as_ref() else {
                    println!("No plan yet. Run 'run' first.");
                    continue;
                };
                let date = match parts.next().map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d")) {
                    Some(Ok(date)) => date,
                    _ => {
                        println!("Usage: day <YYYY-MM-DD>");
                        continue;
                    }
                };
                match plan.day_on(date) {
                    Some(day) => {
                        println!(
                            "{} [{}] lessons={}min questions={}min review={}min",
                            day.date,
                            day.phase.as_str(),
                            day.lesson_minutes(),
                            day.questions_min,
                            day.review_min
                        );
                        for lesson in &day.lessons {
                            println!("  -> {} - {} min", lesson.name, lesson.duration_min);
                        }
                        let reviews = plan.reviews_on(date);
                        if reviews.is_empty() {
                            println!("  no reviews due");
                        }
                        for event in reviews {
                            println!(
                                "  review: {} (watched {} days ago)",
                                event.lesson,
                                event.days_since_watch(date)
                            );
                        }
                    }
                    None => println!("{} is not a study day.", date),
                }
            }
            "removed" => match plan.as_ref() {
                Some(plan) => {
                    if plan.removed_lessons().is_empty() {
                        println!("Nothing was removed.");
                    } else {
                        for (module, lessons) in plan.removed_by_module() {
                            println!("{}", module);
                            for lesson in lessons {
                                println!("  - {} ({} min)", lesson.name, lesson.duration_min);
                            }
                        }
                    }
                }
                None => println!("No plan yet. Run 'run' first."),
            },
            "save" => {
                let format = parts.next();
                let path = parts.next();
                let Some(plan) = plan.as_ref() else {
                    println!("No plan yet. Run 'run' first.");
                    continue;
                };
                match (format, path) {
                    (Some("json"), Some(path)) => match save_plan_to_json(plan, path) {
                        Ok(_) => println!("Plan saved to {}", path),
                        Err(e) => println!("Error: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_plan_to_csv(plan, path) {
                        Ok(_) => println!("Plan saved to {}", path),
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
