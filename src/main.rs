use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;

use coach_planner_lib::auth::{self, LogMailer, SessionContext};
use coach_planner_lib::commands::{athlete, coach, stats};
use coach_planner_lib::config::AppConfig;
use coach_planner_lib::db::AppState;
use coach_planner_lib::models::{NewAccount, Role};
use coach_planner_lib::{logging, PlannerError, PlannerResult};

#[derive(Parser)]
#[command(name = "coach-planner")]
#[command(about = "Training plans, load and weekly statistics for coaches and athletes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Yearly statistics for an athlete, or the coach's athlete ranking
    Stats {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Athlete id (defaults to the signed-in athlete)
        #[arg(long)]
        athlete: Option<i64>,

        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Week view containing a date
    Week {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        athlete: Option<i64>,

        /// Any day of the week, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Create a coach or athlete account
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        name: String,

        /// coach or athlete
        #[arg(long)]
        role: Role,

        /// Coach enrollment code (athletes) or custom code (coaches)
        #[arg(long)]
        coach_code: Option<String>,
    },
    /// Issue a password reset token (delivered to the log)
    ResetPassword {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    logging::init(&config.log_filter);

    let state = AppState::connect(config).await?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats {
            email,
            password,
            athlete,
            year,
        } => {
            let ctx = auth::sign_in_with_password(&state.db, &email, &password).await?;
            let year = year.unwrap_or_else(|| Local::now().year());

            match resolve_athlete(&ctx, athlete) {
                Ok(athlete_id) => print_json(&stats::yearly_stats(&state, &ctx, athlete_id, year).await?)?,
                Err(_) if ctx.role() == Some(Role::Coach) => {
                    print_json(&coach::comparative_stats(&state, &ctx, year, None).await?)?
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Week {
            email,
            password,
            athlete,
            date,
        } => {
            let ctx = auth::sign_in_with_password(&state.db, &email, &password).await?;
            let athlete_id = resolve_athlete(&ctx, athlete)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            print_json(&athlete::load_week(&state, &ctx, athlete_id, date).await?)?;
        }
        Commands::Signup {
            email,
            password,
            name,
            role,
            coach_code,
        } => {
            let account = NewAccount {
                email,
                password,
                name,
                role,
                coach_code,
            };
            print_json(&auth::sign_up(&state.db, &state.config, &account).await?)?;
        }
        Commands::ResetPassword { email } => {
            auth::send_password_reset_email(&state.db, &state.config, &LogMailer, &email).await?;
        }
    }

    state.db.close().await;
    Ok(())
}

/// Explicit `--athlete`, or the signed-in user when they are an athlete
fn resolve_athlete(ctx: &SessionContext, requested: Option<i64>) -> PlannerResult<i64> {
    match (requested, ctx.role()) {
        (Some(id), _) => Ok(id),
        (None, Some(Role::Athlete)) => ctx.require_user().map(|u| u.id),
        _ => Err(PlannerError::Validation("--athlete is required for coaches".into())),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
