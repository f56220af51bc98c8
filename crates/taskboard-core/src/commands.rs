use std::io::Write;

use anyhow::{Context, anyhow, bail};
use taskboard_sync::{HttpTaskApi, OpStatus, SubmitOutcome, TaskApi, TaskScreen, TaskStatus};
use tokio::io::AsyncBufRead;
use tracing::{debug, info, instrument};

use crate::cli::Command;
use crate::config::Config;
use crate::render::Renderer;
use crate::shell;

/// HTTP client for the configured endpoint, honouring `http.timeout`.
pub fn build_api(cfg: &Config) -> anyhow::Result<HttpTaskApi> {
    let url = cfg.backend_url()?;
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = cfg.http_timeout()? {
        debug!(?timeout, "using request timeout");
        builder = builder.timeout(timeout);
    }
    let client = builder
        .build()
        .context("failed building HTTP client for the task API")?;
    Ok(HttpTaskApi::with_client(client, url))
}

/// Attaches a fresh screen to `api` and runs `command` against it.
#[instrument(skip(api, renderer, input, out))]
pub async fn dispatch<A, R, W>(
    api: A,
    renderer: &Renderer,
    command: Command,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut screen = TaskScreen::new(api);
    screen.attach().await;
    info!(url = %screen.sync().api().resource_url(), "attached to task API");

    match command {
        Command::List { search } => cmd_list(&mut screen, renderer, &search.join(" "), out),
        Command::Add {
            title,
            description,
            status,
        } => cmd_add(&mut screen, renderer, title, description, status, out).await,
        Command::Edit {
            id,
            title,
            description,
            status,
        } => cmd_edit(&mut screen, renderer, &id, title, description, status, out).await,
        Command::Delete { id } => cmd_delete(&mut screen, renderer, &id, out).await,
        Command::Shell => shell::run_shell(&mut screen, renderer, input, out).await,
    }
}

/// One-shot commands surface the stored sync error as their own failure.
fn ensure_no_error<A: TaskApi>(screen: &TaskScreen<A>) -> anyhow::Result<()> {
    match screen.state().error() {
        Some(err) => Err(anyhow!("{err}")),
        None => Ok(()),
    }
}

fn cmd_list<A: TaskApi, W: Write>(
    screen: &mut TaskScreen<A>,
    renderer: &Renderer,
    search: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    ensure_no_error(screen)?;
    screen.set_search(search);
    renderer.write_screen(&mut *out, &screen.view())
}

async fn cmd_add<A: TaskApi, W: Write>(
    screen: &mut TaskScreen<A>,
    renderer: &Renderer,
    title: String,
    description: String,
    status: TaskStatus,
    out: &mut W,
) -> anyhow::Result<()> {
    ensure_no_error(screen)?;
    screen.set_title(title);
    screen.set_description(description);
    screen.set_status(status);

    match screen.submit().await {
        SubmitOutcome::Incomplete => bail!("a task needs both a title and a description"),
        outcome => {
            ensure_no_error(screen)?;
            if let Some(task) = outcome.task() {
                writeln!(out, "Created task {}.", task.id)?;
            }
        }
    }
    renderer.write_screen(&mut *out, &screen.view())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_edit<A: TaskApi, W: Write>(
    screen: &mut TaskScreen<A>,
    renderer: &Renderer,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    out: &mut W,
) -> anyhow::Result<()> {
    ensure_no_error(screen)?;
    if !screen.begin_edit_id(id) {
        bail!("no task with id {id}");
    }
    if let Some(title) = title {
        screen.set_title(title);
    }
    if let Some(description) = description {
        screen.set_description(description);
    }
    if let Some(status) = status {
        screen.set_status(status);
    }

    match screen.submit().await {
        SubmitOutcome::Incomplete => bail!("a task needs both a title and a description"),
        outcome => {
            ensure_no_error(screen)?;
            if let Some(task) = outcome.task() {
                writeln!(out, "Updated task {}.", task.id)?;
            }
        }
    }
    renderer.write_screen(&mut *out, &screen.view())
}

async fn cmd_delete<A: TaskApi, W: Write>(
    screen: &mut TaskScreen<A>,
    renderer: &Renderer,
    id: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    ensure_no_error(screen)?;
    let Some(op) = screen.delete(id).await else {
        bail!("no task with id {id}");
    };
    match op.status {
        OpStatus::Committed => writeln!(out, "Deleted task {id}.")?,
        OpStatus::RolledBack | OpStatus::Pending => ensure_no_error(screen)?,
    }
    renderer.write_screen(&mut *out, &screen.view())
}
