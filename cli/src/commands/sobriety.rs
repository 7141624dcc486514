use anyhow::{Result, bail};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tally_core::service::TrackerService;

use super::helpers::parse_date;

pub(crate) fn cmd_sobriety_show(svc: &TrackerService, json: bool) -> Result<()> {
    let overview = svc.sobriety_overview()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    if overview.is_empty() {
        eprintln!("No substances tracked. Use `tally sobriety add-substance <name>` to start.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct ConsumptionRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Note")]
        note: String,
    }

    for log in &overview {
        println!();
        println!("{} (id {})", log.substance.name, log.substance.id);

        if log.recent.is_empty() {
            println!("  no consumptions logged");
            continue;
        }

        let rows: Vec<ConsumptionRow> = log
            .recent
            .iter()
            .map(|c| ConsumptionRow {
                date: c.date.format("%Y-%m-%d").to_string(),
                quantity: c.quantity.clone().unwrap_or_default(),
                note: c.note.clone().unwrap_or_default(),
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

pub(crate) fn cmd_substance_add(svc: &TrackerService, name: &str, json: bool) -> Result<()> {
    let substance = svc.add_substance(name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&substance)?);
    } else {
        println!("Tracking substance {}: {}", substance.id, substance.name);
    }

    Ok(())
}

pub(crate) fn cmd_consumption_add(
    svc: &TrackerService,
    substance_id: i64,
    date: Option<String>,
    quantity: Option<String>,
    note: Option<String>,
    json: bool,
) -> Result<()> {
    let Some(substance) = svc.get_substance(substance_id)? else {
        bail!("No substance with id {substance_id}. Run `tally sobriety show` to list them.");
    };

    let date = parse_date(date)?.format("%Y-%m-%d").to_string();
    let consumption = svc.add_consumption(substance_id, &date, quantity, note)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&consumption)?);
    } else {
        println!(
            "Logged {} on {}",
            substance.name,
            consumption.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}
