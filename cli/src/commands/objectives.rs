use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tally_core::models::ObjectivesUpdate;
use tally_core::service::TrackerService;

use super::helpers::mark;

pub(crate) fn cmd_objectives_show(svc: &TrackerService, json: bool) -> Result<()> {
    let objectives = svc.objectives()?;
    let steps = svc.list_immigration_steps()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "objectives": objectives,
                "immigration_steps": steps,
            }))?
        );
        return Ok(());
    }

    println!("Objectives");
    println!("  Studies progress:  {}%", objectives.studies_progress);
    if let Some(ref notes) = objectives.studies_notes {
        println!("  Studies notes:     {notes}");
    }
    println!("  Current weight:    {:.1} kg", objectives.current_weight);
    match objectives.sleep_hours {
        Some(h) => println!("  Sleep:             {h:.1} h"),
        None => println!("  Sleep:             not tracked yet"),
    }
    println!("  Food satisfaction: {}/10", objectives.food_satisfaction);
    println!();

    #[derive(Tabled)]
    struct StepRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Done")]
        done: &'static str,
        #[tabled(rename = "Immigration step")]
        title: String,
    }

    let rows: Vec<StepRow> = steps
        .iter()
        .map(|s| StepRow {
            id: s.id,
            done: mark(s.done),
            title: s.title.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()));
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_objectives_update(
    svc: &TrackerService,
    update: &ObjectivesUpdate,
    json: bool,
) -> Result<()> {
    let objectives = svc.update_objectives(update)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&objectives)?);
    } else {
        match update {
            ObjectivesUpdate::Studies { progress, .. } => {
                println!("Studies progress set to {progress}%");
            }
            ObjectivesUpdate::Weight(kg) => println!("Weight set to {kg:.1} kg"),
            ObjectivesUpdate::Sleep(h) => println!("Sleep set to {h:.1} h"),
            ObjectivesUpdate::Food(score) => println!("Food satisfaction set to {score}/10"),
        }
    }

    Ok(())
}

pub(crate) fn cmd_step_toggle(svc: &TrackerService, id: i64, json: bool) -> Result<()> {
    let applied = svc.toggle_immigration_step(id)?;

    if json {
        println!("{}", serde_json::json!({ "applied": applied }));
    } else if applied {
        println!("Toggled step {id}");
    } else {
        eprintln!("No immigration step with id {id}");
    }

    Ok(())
}

pub(crate) fn cmd_step_add(svc: &TrackerService, title: &str, json: bool) -> Result<()> {
    let step = svc.add_immigration_step(title)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&step)?);
    } else {
        println!("Added step {} at position {}: {}", step.id, step.position, step.title);
    }

    Ok(())
}
