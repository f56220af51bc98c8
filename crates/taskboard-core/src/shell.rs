use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use taskboard_sync::{SubmitOutcome, TaskApi, TaskScreen, TaskStatus};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, instrument};

use crate::render::Renderer;

const HELP: &str = "\
commands:
  search TEXT     filter the list (empty TEXT clears it)
  title TEXT      set the form title
  desc TEXT       set the form description
  status STATUS   pending | in_progress | completed
  submit          add the task, or update the one being edited
  edit ID         load a task into the form
  cancel          stop editing
  delete ID       delete a task
  reload          fetch the list again
  show            print the page
  help            this text
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Search(String),
    Title(String),
    Description(String),
    Status(TaskStatus),
    Submit,
    Edit(String),
    Cancel,
    Delete(String),
    Reload,
    Show,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let required = |what: &str| -> anyhow::Result<String> {
            if rest.is_empty() {
                Err(anyhow!("`{word}` needs {what}"))
            } else {
                Ok(rest.to_string())
            }
        };

        let cmd = match word.to_ascii_lowercase().as_str() {
            "search" | "/" => ShellCommand::Search(rest.to_string()),
            "title" => ShellCommand::Title(rest.to_string()),
            "desc" | "description" => ShellCommand::Description(rest.to_string()),
            "status" => ShellCommand::Status(required("a status")?.parse()?),
            "submit" | "save" => ShellCommand::Submit,
            "edit" => ShellCommand::Edit(required("a task id")?),
            "cancel" => ShellCommand::Cancel,
            "delete" | "rm" => ShellCommand::Delete(required("a task id")?),
            "reload" => ShellCommand::Reload,
            "show" | "ls" => ShellCommand::Show,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(anyhow!("unknown command `{other}`; try `help`")),
        };
        Ok(cmd)
    }
}

/// Reads commands from `input` until `quit` or end of input, re-rendering
/// the page after every change.
#[instrument(skip_all)]
pub async fn run_shell<A, R, W>(
    screen: &mut TaskScreen<A>,
    renderer: &Renderer,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    renderer.write_screen(&mut *out, &screen.view())?;
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await.context("failed reading shell input")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let cmd = match line.parse::<ShellCommand>() {
            Ok(cmd) => cmd,
            Err(err) => {
                writeln!(out, "{err}")?;
                continue;
            }
        };
        debug!(?cmd, "shell command");

        match cmd {
            ShellCommand::Search(text) => screen.set_search(text),
            ShellCommand::Title(text) => screen.set_title(text),
            ShellCommand::Description(text) => screen.set_description(text),
            ShellCommand::Status(status) => screen.set_status(status),
            ShellCommand::Submit => {
                if screen.submit().await == SubmitOutcome::Incomplete {
                    writeln!(out, "Title and description are required.")?;
                    continue;
                }
            }
            ShellCommand::Edit(id) => {
                if !screen.begin_edit_id(&id) {
                    writeln!(out, "No task with id {id}.")?;
                    continue;
                }
            }
            ShellCommand::Cancel => screen.cancel_edit(),
            ShellCommand::Delete(id) => {
                if screen.delete(&id).await.is_none() {
                    writeln!(out, "No task with id {id}.")?;
                    continue;
                }
            }
            ShellCommand::Reload => screen.reload().await,
            ShellCommand::Show => {}
            ShellCommand::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            ShellCommand::Quit => break,
        }

        renderer.write_screen(&mut *out, &screen.view())?;
    }

    Ok(())
}
