mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tally_core::models::ObjectivesUpdate;
use tally_core::service::TrackerService;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "tally", version, about = "Personal habit and life tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Daily routine checklist
    Routine {
        #[command(subcommand)]
        command: RoutineCommand,
    },
    /// Motivational reasons
    Reasons {
        #[command(subcommand)]
        command: ReasonsCommand,
    },
    /// Long-term objectives and immigration steps
    Objectives {
        #[command(subcommand)]
        command: ObjectivesCommand,
    },
    /// Weekly task planner
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },
    /// Substance use log
    Sobriety {
        #[command(subcommand)]
        command: SobrietyCommand,
    },
    /// Daily productivity score
    Productivity {
        #[command(subcommand)]
        command: ProductivityCommand,
    },
    /// Start the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[derive(Subcommand)]
enum RoutineCommand {
    /// Show the checklist for a day (creates it on first access)
    Show {
        /// Date (YYYY-MM-DD, "today", "yesterday" or "tomorrow")
        #[arg(long)]
        date: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip an item between done and not done
    Toggle {
        id: i64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ReasonsCommand {
    /// List all reasons
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a new reason
    Add {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a reason by id
    Delete {
        id: i64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ObjectivesCommand {
    /// Show objectives and immigration steps
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Update studies progress (0-100) with optional notes
    Studies {
        progress: i64,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Record current weight in kilograms
    Weight {
        kg: f64,
        #[arg(long)]
        json: bool,
    },
    /// Record last night's sleep in hours
    Sleep {
        hours: f64,
        #[arg(long)]
        json: bool,
    },
    /// Rate food satisfaction (0-10)
    Food {
        score: i64,
        #[arg(long)]
        json: bool,
    },
    /// Flip an immigration step between done and not done
    ToggleStep {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Append a new immigration step
    AddStep {
        title: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Show the week containing a given day
    Show {
        /// Date (YYYY-MM-DD, "today", "yesterday" or "tomorrow")
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Add a task to a day
    Add {
        /// Date (YYYY-MM-DD)
        date: String,
        title: String,
        /// Time of day, free text (e.g. "09:30")
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Flip a task between done and not done
    Toggle {
        id: i64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SobrietyCommand {
    /// Show tracked substances with their recent consumptions
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Register a new substance to track
    AddSubstance {
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// Log a consumption of a substance
    Log {
        substance_id: i64,
        /// Date (YYYY-MM-DD, "today", "yesterday" or "tomorrow")
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProductivityCommand {
    /// Show the score for a day plus recent history
    Show {
        /// Date (YYYY-MM-DD, "today", "yesterday" or "tomorrow")
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Record or overwrite the score for a day
    Save {
        score: f64,
        /// Date (YYYY-MM-DD, "today", "yesterday" or "tomorrow")
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = TrackerService::new(&config.db_path)?;

    match cli.command {
        Command::Routine { command } => match command {
            RoutineCommand::Show { date, json } => commands::cmd_routine_show(&svc, date, json),
            RoutineCommand::Toggle { id, json } => commands::cmd_routine_toggle(&svc, id, json),
        },
        Command::Reasons { command } => match command {
            ReasonsCommand::List { json } => commands::cmd_reason_list(&svc, json),
            ReasonsCommand::Add { text, json } => commands::cmd_reason_add(&svc, &text, json),
            ReasonsCommand::Delete { id, json } => commands::cmd_reason_delete(&svc, id, json),
        },
        Command::Objectives { command } => match command {
            ObjectivesCommand::Show { json } => commands::cmd_objectives_show(&svc, json),
            ObjectivesCommand::Studies {
                progress,
                notes,
                json,
            } => commands::cmd_objectives_update(
                &svc,
                &ObjectivesUpdate::Studies { progress, notes },
                json,
            ),
            ObjectivesCommand::Weight { kg, json } => {
                commands::cmd_objectives_update(&svc, &ObjectivesUpdate::Weight(kg), json)
            }
            ObjectivesCommand::Sleep { hours, json } => {
                commands::cmd_objectives_update(&svc, &ObjectivesUpdate::Sleep(hours), json)
            }
            ObjectivesCommand::Food { score, json } => {
                commands::cmd_objectives_update(&svc, &ObjectivesUpdate::Food(score), json)
            }
            ObjectivesCommand::ToggleStep { id, json } => {
                commands::cmd_step_toggle(&svc, id, json)
            }
            ObjectivesCommand::AddStep { title, json } => {
                commands::cmd_step_add(&svc, &title, json)
            }
        },
        Command::Plan { command } => match command {
            PlanCommand::Show { date, json } => commands::cmd_plan_show(&svc, date, json),
            PlanCommand::Add {
                date,
                title,
                time,
                json,
            } => commands::cmd_plan_add(&svc, &date, &title, time, json),
            PlanCommand::Toggle { id, json } => commands::cmd_plan_toggle(&svc, id, json),
        },
        Command::Sobriety { command } => match command {
            SobrietyCommand::Show { json } => commands::cmd_sobriety_show(&svc, json),
            SobrietyCommand::AddSubstance { name, json } => {
                commands::cmd_substance_add(&svc, &name, json)
            }
            SobrietyCommand::Log {
                substance_id,
                date,
                quantity,
                note,
                json,
            } => commands::cmd_consumption_add(&svc, substance_id, date, quantity, note, json),
        },
        Command::Productivity { command } => match command {
            ProductivityCommand::Show { date, json } => {
                commands::cmd_productivity_show(&svc, date, json)
            }
            ProductivityCommand::Save {
                score,
                date,
                note,
                json,
            } => commands::cmd_productivity_save(&svc, score, date, note, json),
        },
        Command::Serve { port, bind } => server::start_server(svc, port, &bind).await,
    }
}
