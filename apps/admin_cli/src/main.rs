use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use form_core::{
    hydrate::{list_locations, load_for_edit, verify_creator},
    reduce,
    validation::{full, per_step},
    BackendGateway, FormAction, FormSession, HttpBackendGateway, SubmissionOrchestrator,
    SubmitError, WizardStep,
};
use shared::domain::{EntityId, EntityKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod draft;

use config::load_settings;
use draft::{
    load_draft, parse_media_arg, parse_removal_arg, prepare_for, read_media_file,
    resolve_category, resolve_removal, MediaArg, RemovalArg,
};

#[derive(Parser, Debug)]
#[command(about = "Create and edit studios and workshops with their media")]
struct Cli {
    /// Overrides the configured server URL.
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Studio,
    Workshop,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Studio => EntityKind::Studio,
            KindArg::Workshop => EntityKind::Workshop,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Checks a draft without contacting the backend.
    Validate {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        draft: PathBuf,
        /// Wizard step to check (1 or 2); the whole form when omitted.
        #[arg(long)]
        step: Option<u8>,
    },
    /// Creates a record, or updates it when --entity-id is given.
    Submit {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        draft: PathBuf,
        #[arg(long)]
        entity_id: Option<String>,
        /// CATEGORY=PATH, repeatable.
        #[arg(long = "media", value_parser = parse_media_arg)]
        media: Vec<MediaArg>,
        /// CATEGORY=FILENAME or CATEGORY=URL of stored media to delete,
        /// repeatable. Applied before --media.
        #[arg(long = "remove", value_parser = parse_removal_arg)]
        remove: Vec<RemovalArg>,
    },
    /// Lists the media stored for a record.
    Media {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        entity_id: String,
    },
    /// Lists studios a workshop can be held at.
    Locations {
        #[arg(long)]
        creator_email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { kind, draft, step } => validate(kind.into(), &draft, step),
        Command::Submit {
            kind,
            draft,
            entity_id,
            media,
            remove,
        } => {
            let gateway = connect(cli.server_url)?;
            submit(gateway, kind.into(), &draft, entity_id, media, remove).await
        }
        Command::Media { kind, entity_id } => {
            let gateway = connect(cli.server_url)?;
            show_media(gateway.as_ref(), kind.into(), EntityId::new(entity_id)).await
        }
        Command::Locations { creator_email } => {
            let gateway = connect(cli.server_url)?;
            let locations = list_locations(gateway.as_ref(), &creator_email).await?;
            for location in locations {
                println!(
                    "{}\t{}\t{}, {}, {}",
                    location.id,
                    location.studio_name,
                    location.building_name,
                    location.street,
                    location.city
                );
            }
            Ok(())
        }
    }
}

fn connect(cli_server_url: Option<String>) -> Result<Arc<dyn BackendGateway>> {
    let settings = load_settings(cli_server_url)?;
    info!(server_url = %settings.server_url, environment = ?settings.environment, "using backend");
    let gateway = HttpBackendGateway::new(&settings.server_url, settings.request_timeout())
        .context("failed to build http client")?;
    Ok(Arc::new(gateway))
}

fn validate(kind: EntityKind, path: &std::path::Path, step: Option<u8>) -> Result<()> {
    let model = load_draft(kind, path, None)?;
    let errors = match step {
        Some(number) => {
            let step = WizardStep::from_number(number)
                .with_context(|| format!("unknown step {number}, expected 1 or 2"))?;
            per_step(step, &model)
        }
        None => full(&model),
    };
    if errors.is_empty() {
        println!("{kind} draft is complete");
        return Ok(());
    }
    for error in errors.errors() {
        println!("{}: {}", error.field, error.message);
    }
    bail!("{kind} draft has {} problem(s)", errors.len())
}

async fn submit(
    gateway: Arc<dyn BackendGateway>,
    kind: EntityKind,
    path: &std::path::Path,
    entity_id: Option<String>,
    media: Vec<MediaArg>,
    remove: Vec<RemovalArg>,
) -> Result<()> {
    let mut model = load_draft(kind, path, entity_id.map(EntityId::new))?;
    if model.id.is_some() {
        model = load_for_edit(gateway.as_ref(), model).await;
    } else if !remove.is_empty() {
        bail!("--remove needs --entity-id of the stored {kind}");
    }
    if let Some(workshop) = model.workshop() {
        verify_creator(gateway.as_ref(), &workshop.creator_email).await?;
    }

    for arg in remove {
        let category = resolve_category(kind, &arg.category)?;
        let set = model
            .media_set(category)
            .with_context(|| format!("{category} is not part of a {kind}"))?;
        let url = resolve_removal(set, &arg.target)?;
        model = reduce(&model, FormAction::RemoveExistingMedia { category, url })
            .with_context(|| format!("cannot remove '{}'", arg.target))?;
    }

    for arg in media {
        let category = resolve_category(kind, &arg.category)?;
        let set = model
            .media_set(category)
            .with_context(|| format!("{category} is not part of a {kind}"))?;
        let file = prepare_for(set, read_media_file(&arg.path).await?)?;
        model = reduce(&model, FormAction::AddMedia {
            category,
            files: vec![file],
        })
        .with_context(|| format!("cannot add '{}'", arg.path.display()))?;
    }

    let mut session = FormSession::new(model, SubmissionOrchestrator::new(gateway));
    match session.submit().await {
        Ok(outcome) => {
            println!("{}", outcome.notification());
            if !outcome.all_ok() {
                warn!(id = %outcome.entity_id, "record saved, media incomplete");
            }
            Ok(())
        }
        Err(SubmitError::Validation(errors)) => {
            for error in errors.errors() {
                println!("{}: {}", error.field, error.message);
            }
            bail!("{kind} was not submitted: {} problem(s)", errors.len())
        }
        Err(err) => Err(err).context("submission failed"),
    }
}

async fn show_media(gateway: &dyn BackendGateway, kind: EntityKind, id: EntityId) -> Result<()> {
    for category in kind.media_categories() {
        match gateway.fetch_existing(*category, &id).await {
            Ok(existing) => {
                println!("{category} ({})", existing.len());
                for remote in existing {
                    println!("  {}\t{}", remote.filename(), remote.url);
                }
            }
            Err(err) => println!("{category}: failed to load ({err})"),
        }
    }
    Ok(())
}
