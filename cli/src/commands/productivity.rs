use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tally_core::service::TrackerService;

use super::helpers::parse_date;

pub(crate) fn cmd_productivity_show(
    svc: &TrackerService,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let today = parse_date(date)?;
    let entry = svc.productivity_for(today)?;
    let history = svc.productivity_history(today)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "today": entry,
                "history": history,
            }))?
        );
        return Ok(());
    }

    match entry {
        Some(ref e) => {
            println!("{}: score {:.1}", today.format("%Y-%m-%d"), e.score);
            if let Some(ref note) = e.note {
                println!("  Note: {note}");
            }
        }
        None => println!("No score saved for {} yet.", today.format("%Y-%m-%d")),
    }

    if history.is_empty() {
        return Ok(());
    }

    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Score")]
        score: String,
        #[tabled(rename = "Note")]
        note: String,
    }

    let rows: Vec<HistoryRow> = history
        .iter()
        .map(|e| HistoryRow {
            date: e.date.format("%Y-%m-%d").to_string(),
            score: format!("{:.1}", e.score),
            note: e.note.clone().unwrap_or_default(),
        })
        .collect();

    println!();
    println!("History (last {} days)", history.len());
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()));
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_productivity_save(
    svc: &TrackerService,
    score: f64,
    date: Option<String>,
    note: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?.format("%Y-%m-%d").to_string();
    let entry = svc.save_productivity(&date, score, note.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Saved score {:.1} for {}",
            entry.score,
            entry.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}
