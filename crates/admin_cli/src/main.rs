use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, RegisterCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

const MIN_PASSWORD_LEN: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "spendings_admin")]
#[command(about = "Admin utilities for Spendings (superusers, cleanup)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./spendings.db?mode=rwc"
    )]
    database_url: String,

    /// Directory holding uploaded images (also read from `MEDIA_ROOT`).
    #[arg(long, env = "MEDIA_ROOT", default_value = "./media")]
    media_root: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Wallet(Wallet),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account with staff and superuser rights.
    CreateSuperuser(SuperuserArgs),
    /// Delete an account with everything it owns.
    Delete(UserDeleteArgs),
}

#[derive(Args, Debug)]
struct SuperuserArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args, Debug)]
struct UserDeleteArgs {
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Wallet {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Delete a wallet with its transactions.
    Delete(WalletDeleteArgs),
}

#[derive(Args, Debug)]
struct WalletDeleteArgs {
    #[arg(long)]
    id: i32,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.chars().count() < MIN_PASSWORD_LEN {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!(
                    "Password must have at least {MIN_PASSWORD_LEN} characters.\r\n"
                ))
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Print a user-facing engine error and exit with a failure code.
fn fail(err: EngineError) -> ! {
    match err {
        EngineError::Validation(errors) => eprintln!("invalid input: {errors}"),
        other => eprintln!("{other}"),
    }
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db)
        .media_root(&cli.media_root)
        .build()
        .await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::CreateSuperuser(args),
        }) => {
            let password = prompt_password_twice()?;

            let mut cmd = RegisterCmd::new(&args.email, password);
            if let Some(name) = args.name {
                cmd = cmd.name(name);
            }
            let account = match engine.create_superuser(cmd).await {
                Ok(account) => account,
                Err(err @ EngineError::Validation(_)) => fail(err),
                Err(err) => return Err(err.into()),
            };

            println!("created superuser: {} ({})", account.email, account.id);
        }
        Command::User(User {
            command: UserCommand::Delete(args),
        }) => {
            let account = match engine.account_by_email(&args.email).await {
                Ok(account) => account,
                Err(err @ EngineError::KeyNotFound(_)) => fail(err),
                Err(err) => return Err(err.into()),
            };
            engine.delete_account(account.id).await?;

            println!("deleted user: {}", account.email);
        }
        Command::Wallet(Wallet {
            command: WalletCommand::Delete(args),
        }) => {
            match engine.delete_wallet(args.id).await {
                Ok(()) => {}
                Err(err @ EngineError::KeyNotFound(_)) => fail(err),
                Err(err) => return Err(err.into()),
            }

            println!("deleted wallet: {}", args.id);
        }
    }

    Ok(())
}
