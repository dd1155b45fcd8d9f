use std::io;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{backend::CrosstermBackend, Terminal};

use clinic_manager::app::{run_app, AppState};
use clinic_manager::auth::hash_password;
use clinic_manager::config::{self, Config};
use clinic_manager::db::{self, Database};
use clinic_manager::logging::init_logging;
use clinic_manager::models::Role;
use clinic_manager::notify::Mailer;
use clinic_manager::scheduling::available_slots;
use clinic_manager::validation::is_valid_email;

#[derive(Parser)]
#[command(name = "clinic_manager", version, about = "Front desk for an esthetics clinic")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the terminal UI (default)
    Run,
    /// Apply pending database migrations
    Migrate,
    /// Create a staff account
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "admin")]
        role: Role,
    },
    /// Print the free start times of a service on a date
    Slots {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        service: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;
    init_logging(&config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config).await,
        Command::Migrate => {
            let db = Database::new(&config).await?;
            db.migrate().await?;
            println!("Migrations applied");
            Ok(())
        }
        Command::CreateUser {
            name,
            email,
            password,
            role,
        } => {
            if name.trim().is_empty() || !is_valid_email(&email) {
                bail!("a name and a valid e-mail address are required");
            }
            let db = db::init(&config).await?;
            let hash = hash_password(&password)?;
            let id = db.create_user(&name, &email, role, &hash).await?;
            println!("Created {} account #{} for {}", role, id, email.trim());
            Ok(())
        }
        Command::Slots { date, service } => {
            let db = db::init(&config).await?;
            let settings = db.get_settings().await?;
            let slots = available_slots(&db, &settings, date, service).await?;
            if slots.is_empty() {
                println!("No free times on {}", date);
            }
            for slot in slots {
                println!("{}", slot.format("%H:%M"));
            }
            Ok(())
        }
    }
}

async fn run(config: &Config) -> Result<()> {
    println!("Initializing clinic manager...");

    // Initialize database connection
    let db = db::init(config).await?;
    let mailer = Mailer::from_config(config)?;
    tracing::info!(mail = mailer.is_some(), "clinic manager starting");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(db, mailer, config);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!("{:#}", err);
        println!("Error: {:#}", err);
    }

    println!("Goodbye!");

    Ok(())
}
