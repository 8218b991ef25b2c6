//! arsip - command-line client for the arsip document-management backend.
//!
//! Thin consumer of `arsip-core`: logs in, inspects the session, and lists
//! documents and financial reports. Mainly useful for poking at a backend
//! without the web frontend.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arsip_core::auth::{FileSessionStore, SessionGuard, SessionHandle, SessionStore};
use arsip_core::{Client, Config};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn usage() -> ! {
    eprintln!("usage: arsip <command>");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  login [username] [code]   log in (prompts for password; code for 2FA)");
    eprintln!("  register <user> <email>   create an account");
    eprintln!("  profile                   show the current user profile");
    eprintln!("  status                    show session state");
    eprintln!("  logout                    drop the stored session");
    eprintln!("  documents                 list documents");
    eprintln!("  reports <company_id>      list financial reports for a company");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut config = Config::load().context("failed to load config")?;
    let store: Arc<dyn SessionStore> = Arc::new(
        FileSessionStore::new(Config::data_dir()?).context("failed to open session store")?,
    );
    let session = SessionHandle::new(store);
    if session.hydrate()? {
        info!("restored persisted session");
    }
    let client = Client::new(&config, session)?;
    let guard = SessionGuard::new(client.clone());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("");

    match command {
        "login" => {
            let username = match args.get(1) {
                Some(name) => name.clone(),
                None => prompt_username(config.last_username.as_deref())?,
            };
            let password = rpassword::prompt_password("Password: ")?;
            let profile = match args.get(2) {
                Some(code) => guard.login_with_code(&username, &password, code).await?,
                None => guard.login(&username, &password).await?,
            };
            config.last_username = Some(username);
            if let Err(e) = config.save() {
                tracing::warn!(error = %e, "failed to save config");
            }
            println!("logged in as {} <{}>", profile.username, profile.email);
        }
        "register" => {
            let (username, email) = match (args.get(1), args.get(2)) {
                (Some(u), Some(e)) => (u.clone(), e.clone()),
                _ => usage(),
            };
            let password = rpassword::prompt_password("Password: ")?;
            let profile = guard.register(&username, &email, &password).await?;
            println!("registered {} <{}>", profile.username, profile.email);
        }
        "profile" => {
            let profile = guard.fetch_profile().await?;
            println!("{:>12}: {}", "id", profile.id);
            println!("{:>12}: {}", "username", profile.username);
            println!("{:>12}: {}", "email", profile.email);
            println!("{:>12}: {}", "role", profile.role);
            if let Some(company) = &profile.company_id {
                println!("{:>12}: {}", "company", company);
            }
        }
        "status" => {
            if guard.is_authenticated() {
                match guard.fetch_profile().await {
                    Ok(profile) => println!("logged in as {}", profile.username),
                    Err(e) => {
                        guard.logout();
                        println!("session expired ({})", e);
                    }
                }
            } else {
                println!("not logged in");
            }
        }
        "logout" => {
            guard.logout();
            println!("logged out");
        }
        "documents" => {
            let documents = client.list_documents().await?;
            if documents.is_empty() {
                println!("no documents");
            }
            for doc in documents {
                println!(
                    "{}  {}  {}",
                    doc.id,
                    doc.title,
                    doc.company_id.as_deref().unwrap_or("-")
                );
            }
        }
        "reports" => {
            let Some(company_id) = args.get(1) else { usage() };
            let reports = client.reports_for_company(company_id).await?;
            if reports.is_empty() {
                println!("no reports for {}", company_id);
            }
            for report in reports {
                let kind = if report.is_rkap { "RKAP" } else { "realisasi" };
                println!(
                    "{}  {} {}  {}  revenue {:.0}  net {:.0}",
                    report.id, report.year, report.period, kind, report.revenue, report.net_profit
                );
            }
        }
        "" => usage(),
        other => bail!("unknown command: {other}"),
    }

    Ok(())
}

fn prompt_username(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        match last {
            Some(last) => Ok(last.to_string()),
            None => bail!("a username is required"),
        }
    } else {
        Ok(trimmed.to_string())
    }
}
