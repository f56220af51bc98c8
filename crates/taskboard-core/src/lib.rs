pub mod cli;
pub mod commands;
pub mod config;
pub mod render;
pub mod shell;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting taskboard CLI"
  );

  let mut cfg = config::Config::load(
    cli.rcfile.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
      .chain(cli.url.map(|url| {
        (
          config::BACKEND_URL_KEY
            .to_string(),
          url
        )
      }))
  );
  debug!(files = ?cfg.loaded_files, "configuration loaded");

  let api = commands::build_api(&cfg)
    .context(
      "failed to set up the task API \
       client"
    )?;
  let renderer =
    render::Renderer::new(&cfg)?;
  let command =
    cli.command.unwrap_or_default();

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;

  runtime.block_on(async {
    let input = tokio::io::BufReader::new(
      tokio::io::stdin()
    );
    let mut out = std::io::stdout();
    commands::dispatch(
      api,
      &renderer,
      command,
      input,
      &mut out
    )
    .await
  })?;

  info!("done");
  Ok(())
}
