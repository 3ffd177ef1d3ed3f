use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fll_scheduler::display::{print_pivot, print_team_schedule, write_schedule_to_file};
use fll_scheduler::export::write_pivots_csv;
use fll_scheduler::parser::{load_request, load_teams};
use fll_scheduler::web::{self, ScheduleResponse};
use fll_scheduler::SeedPolicy;

#[derive(Parser, Debug)]
#[command(name = "fll-scheduler", version, about = "Tournament judging and robot game scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a schedule from a request file
    Schedule {
        /// Schedule request (JSON)
        #[arg(short, long)]
        request: PathBuf,

        /// Team roster (CSV); replaces the teams listed in the request
        #[arg(short, long)]
        teams: Option<PathBuf>,

        /// Seed for the tie-break shuffles
        #[arg(long, conflicts_with = "unseeded")]
        seed: Option<u64>,

        /// Use a fresh random seed
        #[arg(long)]
        unseeded: bool,

        /// Directory for the pivot CSVs and text summary
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Also print every pivot
        #[arg(long)]
        show_pivots: bool,
    },
    /// Start the web server
    Serve {
        #[arg(short, long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Serve { port } => {
            info!("starting web server on http://localhost:{}", port);
            web::start_server(port).await?;
        }
        Command::Schedule {
            request,
            teams,
            seed,
            unseeded,
            out_dir,
            show_pivots,
        } => {
            let mut request = load_request(&request)?;
            if let Some(path) = teams {
                request.teams = load_teams(&path)?;
                info!("loaded {} teams from {}", request.teams.len(), path.display());
            }
            if unseeded {
                request.seed = SeedPolicy::Entropy;
            } else if let Some(seed) = seed {
                request.seed = SeedPolicy::Fixed(seed);
            }

            let response = ScheduleResponse::build(request)?;
            let title = if response.request.name.is_empty() {
                "Team Schedule"
            } else {
                response.request.name.as_str()
            };
            print_team_schedule(title, &response.schedule.teams);
            if show_pivots {
                response.pivots.iter().for_each(print_pivot);
            }

            if let Some(dir) = out_dir {
                let written = write_pivots_csv(&dir, &response.pivots)?;
                write_schedule_to_file(title, &response.schedule.teams, dir.join("schedule.txt"))?;
                std::fs::write(dir.join("schedule.json"), serde_json::to_string_pretty(&response)?)?;
                info!(
                    "wrote {} pivot files, schedule.txt and schedule.json to {}",
                    written.len(),
                    dir.display()
                );
            }
        }
    }

    Ok(())
}
