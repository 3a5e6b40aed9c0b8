use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use assistant::{Assistant, View};
use chrono::Utc;
use clap::{Parser, Subcommand};
use engine::Profile;

mod settings;

#[derive(Parser)]
#[command(name = "dormdash", about = "Campus moving-service assistant", version)]
struct Cli {
    /// Settings file name, resolved by the config loader (e.g. `settings`
    /// finds `settings.toml`).
    #[arg(long, env = "DORMDASH_CONFIG", default_value = "settings")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat session (default).
    Chat,
    /// Export the active account's transaction log as CSV.
    Export {
        #[arg(long, default_value = "transactions.csv")]
        out: PathBuf,
    },
    /// Show the active account's spending for the current month.
    Stats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "dormdash={level},assistant={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let mut assistant = Assistant::builder()
        .accounts_path(&settings.storage.accounts_path)
        .state_path(&settings.storage.state_path)
        .build();
    ensure_active_account(&mut assistant)?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => chat(&mut assistant),
        Command::Export { out } => export(&assistant, &out),
        Command::Stats => stats(&assistant),
    }
}

/// Activates the first stored account, creating a starter one on a
/// fresh data directory.
fn ensure_active_account(assistant: &mut Assistant) -> Result<(), engine::EngineError> {
    if assistant.account().is_some() {
        return Ok(());
    }

    let existing = assistant.accounts().accounts().next().map(|a| a.id.clone());
    let id = match existing {
        Some(id) => id,
        None => {
            tracing::info!("no accounts found, creating a starter account");
            assistant
                .accounts_mut()
                .create(Profile {
                    username: "student".to_string(),
                    full_name: "Campus Student".to_string(),
                    email: "student@campus.edu".to_string(),
                    phone: String::new(),
                })?
                .id
                .clone()
        }
    };
    assistant.accounts_mut().set_active(&id)
}

fn chat(assistant: &mut Assistant) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(greeting) = assistant.transcript().first() {
        println!("{}\n", greeting.text);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let reply = assistant.handle(line, Utc::now());
        println!("{}", reply.text);
        match reply.goto {
            Some(View::Confirmation) => println!("[opening confirmation]"),
            Some(View::Payment) => println!("[opening payment]"),
            None => {}
        }
        println!();
    }
    Ok(())
}

fn export(assistant: &Assistant, out: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let account = assistant
        .account()
        .ok_or_else(|| engine::EngineError::KeyNotFound("active account".to_string()))?;

    let file = fs::File::create(out)?;
    account.wallet.export_csv(file)?;
    tracing::info!(path = %out.display(), "transactions exported");
    println!(
        "Exported {} transactions to {}",
        account.wallet.transactions().len(),
        out.display()
    );
    Ok(())
}

fn stats(assistant: &Assistant) -> Result<(), Box<dyn std::error::Error>> {
    let account = assistant
        .account()
        .ok_or_else(|| engine::EngineError::KeyNotFound("active account".to_string()))?;

    let stats = account.wallet.month_stats(Utc::now());
    println!("This month for {}:", account.profile.username);
    println!("  spent:     {}", stats.total_spent);
    println!("  moves:     {}", stats.move_count);
    println!("  avg/move:  {}", stats.avg_per_move);
    println!("  balance:   {}", account.wallet.balance());
    Ok(())
}
