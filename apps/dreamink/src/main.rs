use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    auth::{PasswordStrength, SignInForm, SignUpForm},
    catalog::{self, Style},
    media::{decode_image_payload, SelectedFile},
    settings::{load_settings, Settings},
    workflow::UploadOutcome,
    AppContext, DeleteOutcome, HttpBackend, StageKind, StudioBackend, SystemClock,
};
use shared::domain::HistoryId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dreamink", about = "Turn photos into stylized artwork")]
struct Cli {
    /// Settings file; defaults to ./dreamink.toml, then the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long, env = "DREAMINK_EMAIL")]
    email: String,
    #[arg(long, env = "DREAMINK_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available styles.
    Styles,
    Health,
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to `--password`.
        #[arg(long)]
        confirm_password: Option<String>,
    },
    Signin {
        #[command(flatten)]
        credentials: Credentials,
    },
    Transform {
        #[command(flatten)]
        credentials: Credentials,
        /// Style title (e.g. "Oil Painting") or catalog id.
        #[arg(long)]
        style: String,
        #[arg(long)]
        image: PathBuf,
        /// Output path; defaults to the suggested download name.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    History {
        #[command(flatten)]
        credentials: Credentials,
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    List,
    Delete {
        #[arg(long)]
        id: i64,
    },
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.log_filter.as_deref().unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_style(query: &str) -> Result<Style> {
    let found = match query.trim().parse::<u32>() {
        Ok(id) => catalog::find_by_id(id),
        Err(_) => catalog::find_by_title(query),
    };
    found.copied().ok_or_else(|| {
        let known: Vec<_> = catalog::styles().iter().map(|style| style.title).collect();
        anyhow!("unknown style '{query}' (available: {})", known.join(", "))
    })
}

async fn signed_in(app: &mut AppContext, credentials: Credentials) -> Result<()> {
    let form = SignInForm {
        email: credentials.email,
        password: credentials.password,
    };
    app.sign_in(&form).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut loaded = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.backend_url {
        loaded.settings.backend_url = url;
    }
    let settings = loaded.settings;
    init_tracing(&settings);
    for warning in &loaded.warnings {
        warn!("{warning}");
    }
    if let Some(source) = &loaded.source {
        info!(path = %source.display(), "loaded settings");
    }

    let backend = HttpBackend::new(&settings.backend_url, settings.request_timeout())
        .context("failed to build backend client")?;
    let mut app = AppContext::new(
        Arc::new(backend),
        Arc::new(SystemClock),
        settings.workflow_policy(),
    );

    match cli.command {
        Command::Styles => {
            for style in catalog::styles() {
                println!(
                    "{:>2}  {:<14} /api/style/{:<8} {}",
                    style.id,
                    style.title,
                    style.endpoint().as_str(),
                    style.description
                );
            }
        }
        Command::Health => {
            let health = app.backend().health().await?;
            println!("{}: {}", settings.backend_url, health.message);
        }
        Command::Signup {
            first_name,
            last_name,
            email,
            password,
            confirm_password,
        } => {
            let strength = PasswordStrength::of(&password);
            println!("password strength: {}", strength.label());
            let form = SignUpForm {
                first_name,
                last_name,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                email,
                password,
            };
            app.sign_up(&form).await?;
            if let Some(notice) = app.take_notice() {
                println!("{notice}");
            }
        }
        Command::Signin { credentials } => {
            signed_in(&mut app, credentials).await?;
            println!("Welcome, {}", app.display_name());
        }
        Command::Transform {
            credentials,
            style,
            image,
            out,
        } => {
            let style = resolve_style(&style)?;
            let file = SelectedFile::from_path(&image).await?;
            signed_in(&mut app, credentials).await?;

            app.workflow_mut().select_style(style);
            if app.workflow_mut().upload_image(file)? == UploadOutcome::IgnoredNotImage {
                bail!("{} is not an image", image.display());
            }
            match app.transform().await? {
                StageKind::ResultReady => {}
                _ => bail!(
                    "{}",
                    app.workflow().error_message().unwrap_or("transform failed")
                ),
            }

            let result = app
                .workflow()
                .result()
                .ok_or_else(|| anyhow!("transform finished without a result"))?;
            let decoded = decode_image_payload(&result.image_data)?;
            let out = match out {
                Some(out) => out,
                None => PathBuf::from(app.workflow().result_download_name().unwrap_or_default()),
            };
            tokio::fs::write(&out, &decoded.bytes)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("saved {} ({} bytes)", out.display(), decoded.bytes.len());
        }
        Command::History {
            credentials,
            action,
        } => {
            signed_in(&mut app, credentials).await?;
            app.open_history().await?;
            if let HistoryAction::Delete { id } = action {
                match app.delete_history_entry(HistoryId(id)).await? {
                    DeleteOutcome::Deleted => println!("deleted entry {id}"),
                    DeleteOutcome::Failed => println!("could not delete entry {id}"),
                }
            }

            let view = app
                .workflow()
                .history()
                .ok_or_else(|| anyhow!("history view did not open"))?;
            if let Some(notice) = view.notice() {
                println!("{notice}");
            }
            if view.entries().is_empty() {
                println!("No transformations yet.");
            }
            let offset = settings.display_offset();
            for entry in view.entries() {
                println!(
                    "{:>5}  {:<8} {}  {}",
                    entry.id.0,
                    entry.style_badge(),
                    entry.display_time(offset),
                    entry.download_file_name()
                );
            }
        }
    }

    Ok(())
}
