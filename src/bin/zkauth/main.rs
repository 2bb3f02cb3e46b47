//! zkauth CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use color_eyre::eyre::eyre;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zkauth::display::FieldKind;
use zkauth::workflow::{ListContent, UploadView, VerifyField};
use zkauth::{HttpRegistry, RegistryService, UploadFile, Workflow, WorkflowBuilder};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("zkauth v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.to_config()?;
    let workflow = WorkflowBuilder::new(config).build()?;

    match cli.command {
        Command::Upload { path, author } => upload(&workflow, &path, author).await,
        Command::Verify { hash, copy } => verify(&workflow, hash, copy.map(VerifyField::from)).await,
        Command::List { author, expand } => list(&workflow, author.as_deref(), expand).await,
        Command::Health => health(&workflow).await,
    }
}

async fn upload(
    workflow: &Workflow<HttpRegistry>,
    path: &Path,
    author: String,
) -> color_eyre::Result<()> {
    let file = UploadFile::from_path(path).await?;
    let view = upload_view(workflow, file, author).await;
    print!("{view}");
    view.error.map_or(Ok(()), |e| Err(eyre!(e)))
}

/// Fill the upload form and submit it unless the file was rejected.
async fn upload_view<S: RegistryService>(
    workflow: &Workflow<S>,
    file: UploadFile,
    author: String,
) -> UploadView {
    let screen = workflow.upload_screen();
    screen.set_author_address(author);
    if screen.select_file(file).is_ok() {
        screen.submit().await;
    }
    let view = screen.view();
    screen.teardown();
    view
}

async fn verify(
    workflow: &Workflow<HttpRegistry>,
    hash: String,
    copy: Option<VerifyField>,
) -> color_eyre::Result<()> {
    let screen = workflow.verify_screen();
    screen.set_query(hash);
    screen.submit().await;
    if let Some(field) = copy {
        if !screen.copy(field) {
            info!("Nothing to copy for {field}");
        }
    }

    let view = screen.view();
    print!("{view}");
    screen.teardown();
    view.error.map_or(Ok(()), |e| Err(eyre!(e)))
}

async fn list(
    workflow: &Workflow<HttpRegistry>,
    author: Option<&str>,
    expand: bool,
) -> color_eyre::Result<()> {
    let screen = match author {
        Some(address) => workflow.author_screen(address)?,
        None => workflow.list_screen(),
    };
    screen.activate().await;

    if expand {
        if let ListContent::Cards(cards) = screen.view().content {
            for card in cards {
                for kind in [FieldKind::Hash, FieldKind::Address, FieldKind::TxHash] {
                    screen.toggle(card.id, kind);
                }
            }
        }
    }

    let view = screen.view();
    print!("{view}");
    screen.teardown();
    match view.content {
        ListContent::Failed { message } => Err(eyre!(message)),
        _ => Ok(()),
    }
}

async fn health(workflow: &Workflow<HttpRegistry>) -> color_eyre::Result<()> {
    let status = workflow.service().health().await?;
    println!("{}: {}", status.service, status.status);
    if status.is_up() {
        Ok(())
    } else {
        Err(eyre!("service is {}", status.status))
    }
}
