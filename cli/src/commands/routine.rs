use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tally_core::service::TrackerService;

use super::helpers::{mark, parse_date};

pub(crate) fn cmd_routine_show(
    svc: &TrackerService,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let items = svc.routine_for(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct RoutineRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Done")]
        done: &'static str,
        #[tabled(rename = "Item")]
        item: String,
    }

    let rows: Vec<RoutineRow> = items
        .iter()
        .map(|item| RoutineRow {
            id: item.id,
            done: mark(item.done),
            item: item.item_name.clone(),
        })
        .collect();

    println!("Routine for {}", date.format("%Y-%m-%d"));
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()));
    println!("{table}");

    let done = items.iter().filter(|i| i.done).count();
    println!("{done}/{} done", items.len());

    Ok(())
}

pub(crate) fn cmd_routine_toggle(svc: &TrackerService, id: i64, json: bool) -> Result<()> {
    let applied = svc.toggle_routine_item(id)?;

    if json {
        println!("{}", serde_json::json!({ "applied": applied }));
    } else if applied {
        println!("Toggled routine item {id}");
    } else {
        eprintln!("No routine item with id {id}");
    }

    Ok(())
}
