mod cli;
mod commands;
mod prompt;

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use clinic_core::{AuthContext, BackendConfig, ClinicStore, Database, LocalAuth, RestClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use prompt::TerminalPrompt;

fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let (store, auth) = connect(&cli)?;
    let prompt = TerminalPrompt::new(cli.yes);

    let ctx = commands::Context {
        store: store.as_ref(),
        auth: &auth,
        prompt: &prompt,
        today: chrono::Utc::now().date_naive(),
    };
    commands::run(&ctx, cli.command, &mut std::io::stdout().lock())
}

/// Pick the backend and sign in. `--database` selects the local store;
/// otherwise the hosted backend is configured from the environment.
fn connect(cli: &Cli) -> Result<(Box<dyn ClinicStore>, AuthContext)> {
    let mut auth = AuthContext::new();

    if let Some(path) = &cli.database {
        let db = Database::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        auth.sign_in(&LocalAuth, &cli.staff_id, "")?;
        tracing::debug!(path = %path.display(), "using local database");
        return Ok((Box::new(db), auth));
    }

    let config = BackendConfig::from_env()
        .context("Hosted backend is not configured (set it up or pass --database)")?;
    let mut client = RestClient::new(&config)?;

    let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
        bail!("--email and --password (or CLINIC_EMAIL and CLINIC_PASSWORD) are required");
    };
    let token = auth.sign_in(&client, email, password)?.access_token.clone();
    client.set_access_token(token);
    tracing::debug!(url = %client.base_url(), "connected to hosted backend");

    Ok((Box::new(client), auth))
}
