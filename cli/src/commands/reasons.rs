use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tally_core::service::TrackerService;

pub(crate) fn cmd_reason_list(svc: &TrackerService, json: bool) -> Result<()> {
    let reasons = svc.list_reasons()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reasons)?);
        return Ok(());
    }

    if reasons.is_empty() {
        eprintln!("No reasons yet. Use `tally reasons add <text>` to write one down.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct ReasonRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Reason")]
        text: String,
        #[tabled(rename = "Added")]
        added: String,
    }

    let rows: Vec<ReasonRow> = reasons
        .iter()
        .map(|r| ReasonRow {
            id: r.id,
            text: r.text.clone(),
            // created_at is RFC 3339; the date part is enough here
            added: r.created_at.chars().take(10).collect(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()));
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_reason_add(svc: &TrackerService, text: &str, json: bool) -> Result<()> {
    let reason = svc.add_reason(text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reason)?);
    } else {
        println!("Added reason {}: {}", reason.id, reason.text);
    }

    Ok(())
}

pub(crate) fn cmd_reason_delete(svc: &TrackerService, id: i64, json: bool) -> Result<()> {
    let applied = svc.delete_reason(id)?;

    if json {
        println!("{}", serde_json::json!({ "applied": applied }));
    } else if applied {
        println!("Deleted reason {id}");
    } else {
        eprintln!("No reason with id {id}");
    }

    Ok(())
}
