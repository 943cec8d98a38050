mod app;
mod cli;
mod config;
mod logging;
mod runtime;
mod ui;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use cli::{Cli, Commands};
use config::TimekeepConfig;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use timekeep::dev_backend::{DEV_EMAIL, DEV_PASSWORD};
use timekeep::{ApiClient, FileTokenStore, Session, Store};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cfg = TimekeepConfig::load()?;
    logging::enable_logging(&TimekeepConfig::log_dir()?, &cfg.log_level)?;

    match cli.command() {
        Commands::Run => {
            let store = Store::new(real_client(&cfg)?);
            run_tui(&cfg, &store).await
        }
        Commands::Dev => {
            let client = ApiClient::dev(Session::in_memory())?;
            client
                .login(DEV_EMAIL, DEV_PASSWORD)
                .await
                .context("Dev backend rejected the seeded account")?;
            println!("Dev mode: in-memory data, signed in as {}", DEV_EMAIL);
            run_tui(&cfg, &Store::new(client)).await
        }
        Commands::Login => {
            let store = Store::new(real_client(&cfg)?);
            let (email, password) = prompt_credentials()?;
            store.login(&email, &password).await?;
            println!("Signed in as {}. Session saved.", email);
            Ok(())
        }
        Commands::Register => {
            let store = Store::new(real_client(&cfg)?);
            let (email, password) = prompt_credentials()?;
            store.register(&email, &password).await?;
            println!("Account {} created. Session saved.", email);
            Ok(())
        }
        Commands::Logout => {
            let store = Store::new(real_client(&cfg)?);
            store.logout()?;
            println!("Session removed.");
            Ok(())
        }
        Commands::ConfigPath => {
            let path = TimekeepConfig::config_path()?;
            if TimekeepConfig::ensure_exists(&path)? {
                println!("Created default config.");
            }
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn real_client(cfg: &TimekeepConfig) -> Result<ApiClient> {
    let tokens = FileTokenStore::default_location().context("Cannot locate session file")?;
    let session = Session::new(Arc::new(tokens));
    ApiClient::new(&cfg.api_url, session)
        .with_context(|| format!("Invalid api_url {:?}", cfg.api_url))
}

fn prompt_credentials() -> Result<(String, String)> {
    print!("Email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().lock().read_line(&mut email)?;
    let password = rpassword::prompt_password("Пароль: ")?;
    Ok((email.trim().to_string(), password))
}

async fn run_tui(cfg: &TimekeepConfig, store: &Store) -> Result<()> {
    let authenticated = store.client().session().is_authenticated();
    let mut app = App::new(cfg, authenticated);
    tracing::info!(
        api = %store.client().base_url(),
        dev = store.client().is_dev(),
        authenticated,
        "starting"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = runtime::run_app(&mut terminal, &mut app, store).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = ?err, "terminal UI exited with an error");
        eprintln!("Error: {:?}", err);
    }
    res
}
