use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tally_core::service::TrackerService;

use super::helpers::{mark, parse_date};

pub(crate) fn cmd_plan_show(svc: &TrackerService, date: Option<String>, json: bool) -> Result<()> {
    let today = parse_date(date)?;
    let week = svc.plan_week(today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&week)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct TaskRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Done")]
        done: &'static str,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Task")]
        title: String,
    }

    println!(
        "Week of {} to {}",
        week[0].date.format("%Y-%m-%d"),
        week[6].date.format("%Y-%m-%d")
    );

    for day in &week {
        let label = if day.date == today { " (today)" } else { "" };
        println!();
        println!("{}{label}", day.date.format("%A %Y-%m-%d"));

        if day.tasks.is_empty() {
            println!("  —");
            continue;
        }

        let rows: Vec<TaskRow> = day
            .tasks
            .iter()
            .map(|t| TaskRow {
                id: t.id,
                done: mark(t.done),
                time: t.time.clone().unwrap_or_default(),
                title: t.title.clone(),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Modify::new(Columns::single(0)).with(Alignment::right()));
        println!("{table}");
    }

    Ok(())
}

pub(crate) fn cmd_plan_add(
    svc: &TrackerService,
    date: &str,
    title: &str,
    time: Option<String>,
    json: bool,
) -> Result<()> {
    let task = svc.add_task(date, title, time)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        match task.time {
            Some(ref t) => println!(
                "Added task {} for {} at {t}: {}",
                task.id,
                task.date.format("%Y-%m-%d"),
                task.title
            ),
            None => println!(
                "Added task {} for {}: {}",
                task.id,
                task.date.format("%Y-%m-%d"),
                task.title
            ),
        }
    }

    Ok(())
}

pub(crate) fn cmd_plan_toggle(svc: &TrackerService, id: i64, json: bool) -> Result<()> {
    let applied = svc.toggle_task(id)?;

    if json {
        println!("{}", serde_json::json!({ "applied": applied }));
    } else if applied {
        println!("Toggled task {id}");
    } else {
        eprintln!("No task with id {id}");
    }

    Ok(())
}
