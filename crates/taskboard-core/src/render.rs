use std::io::{self, IsTerminal, Write};

use taskboard_sync::{ReadyView, ScreenView, Task, TaskStatus};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true) && io::stdout().is_terminal();
        Ok(Self { color })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn write_screen<W: Write>(&self, mut out: W, view: &ScreenView<'_>) -> anyhow::Result<()> {
        match view {
            ScreenView::Loading => writeln!(out, "Loading...")?,
            ScreenView::Error(message) => {
                writeln!(out, "{}", self.paint(&format!("Error: {message}"), "31"))?
            }
            ScreenView::Ready(ready) => self.write_ready(&mut out, ready)?,
        }
        Ok(())
    }

    fn write_ready<W: Write>(&self, mut out: W, view: &ReadyView<'_>) -> anyhow::Result<()> {
        if !view.search.is_empty() {
            writeln!(out, "Search: {}", view.search)?;
        }
        if view.can_cancel || has_content(view) {
            writeln!(out, "{}", view.form_heading)?;
            writeln!(out, "  title        {}", view.draft.title)?;
            writeln!(out, "  description  {}", view.draft.description)?;
            writeln!(out, "  status       {}", view.draft.status.label())?;
            writeln!(out)?;
        }

        if view.tasks.is_empty() {
            writeln!(out, "No tasks.")?;
            return Ok(());
        }

        self.write_task_table(&mut out, &view.tasks)?;
        if view.deleting {
            writeln!(out, "Deleting...")?;
        }
        Ok(())
    }

    pub fn write_task_table<W: Write>(&self, out: W, tasks: &[&Task]) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "Title".to_string(),
            "Description".to_string(),
            "Status".to_string(),
        ];

        let rows = tasks
            .iter()
            .map(|task| {
                vec![
                    self.paint(&task.id, "33"),
                    task.title.clone(),
                    task.description.clone(),
                    self.paint(task.status.label(), status_color(task.status)),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn has_content(view: &ReadyView<'_>) -> bool {
    !view.draft.title.is_empty() || !view.draft.description.is_empty()
}

fn status_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "33",
        TaskStatus::InProgress => "36",
        TaskStatus::Completed => "32",
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|h| UnicodeWidthStr::width(h.as_str()))
        .collect();

    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visible_width(cell));
        }
    }

    for (header, &width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, &width) in row.iter().zip(&widths) {
            let padding = width.saturating_sub(visible_width(cell));
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn visible_width(s: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(s).as_str())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
