use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

pub const BACKEND_URL_KEY: &str =
  "backend.url";
pub const BACKEND_URL_ENV: &str =
  "TASKBOARD_BACKEND_URL";
pub const RC_ENV: &str = "TASKBOARDRC";

#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    Self::load_with_env(
      rc_override,
      |key| std::env::var(key).ok()
    )
  }

  /// Defaults, then the rc file, then
  /// the environment.
  #[tracing::instrument(skip(
    rc_override,
    env
  ))]
  pub fn load_with_env<F>(
    rc_override: Option<&Path>,
    env: F
  ) -> anyhow::Result<Self>
  where
    F: Fn(&str) -> Option<String>
  {
    let mut cfg = Config {
      map:          HashMap::new(),
      loaded_files: vec![]
    };

    cfg.map.insert(
      "color".to_string(),
      "on".to_string()
    );

    let rc = resolve_rc_path(
      rc_override,
      &env
    )?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading taskboardrc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no taskboardrc found; using \
         defaults"
      );
    }

    if let Some(url) = env(BACKEND_URL_ENV)
      .filter(|v| !v.trim().is_empty())
    {
      debug!(url = %url, "backend url from environment");
      cfg.map.insert(
        BACKEND_URL_KEY.to_string(),
        url
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  /// `None` when unset; an error when set
  /// to something that is not a boolean.
  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    self
      .map
      .get(key)
      .map(|v| {
        parse_bool(v).ok_or_else(|| {
          anyhow!(
            "invalid boolean for {key}: {v}"
          )
        })
      })
      .transpose()
  }

  /// The task collection endpoint,
  /// without a trailing slash.
  pub fn backend_url(
    &self
  ) -> anyhow::Result<String> {
    let raw = self
      .get(BACKEND_URL_KEY)
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty())
      .ok_or_else(|| {
        anyhow!(
          "no backend URL configured; \
           set {BACKEND_URL_ENV}, \
           pass --url, or add \
           `{BACKEND_URL_KEY} = ...` to \
           ~/.taskboardrc"
        )
      })?;

    let url = reqwest::Url::parse(&raw)
      .with_context(|| {
        format!(
          "invalid backend URL: {raw}"
        )
      })?;
    if !matches!(
      url.scheme(),
      "http" | "https"
    ) {
      return Err(anyhow!(
        "backend URL must be http or \
         https: {raw}"
      ));
    }

    Ok(
      raw
        .trim_end_matches('/')
        .to_string()
    )
  }

  /// `http.timeout` in seconds; unset or
  /// zero means wait indefinitely.
  pub fn http_timeout(
    &self
  ) -> anyhow::Result<Option<Duration>> {
    let Some(raw) = self.get("http.timeout")
    else {
      return Ok(None);
    };
    let secs: u64 = raw
      .trim()
      .parse()
      .with_context(|| {
        format!(
          "invalid http.timeout: {raw}"
        )
      })?;
    Ok(
      (secs > 0)
        .then(|| Duration::from_secs(secs))
    )
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let line = match raw_line
        .split_once('#')
      {
        | Some((before, _)) => before,
        | None => raw_line
      }
      .trim();
      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        if include_path == path {
          warn!(include = %include_path.display(), "file includes itself; skipping");
          continue;
        }

        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

fn resolve_rc_path<F>(
  override_path: Option<&Path>,
  env: &F
) -> anyhow::Result<Option<PathBuf>>
where
  F: Fn(&str) -> Option<String>
{
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Some(rc_env) = env(RC_ENV) {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping \
       ~/.taskboardrc"
    );
    return Ok(None);
  };
  let candidate =
    home.join(".taskboardrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let expanded =
    expand_tilde(Path::new(include));
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> Option<bool> {
  match s.trim().to_ascii_lowercase().as_str()
  {
    | "1" | "y" | "yes" | "on" | "true" => {
      Some(true)
    }
    | "0" | "n" | "no" | "off" | "false" => {
      Some(false)
    }
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  fn no_env(_: &str) -> Option<String> {
    None
  }

  #[test]
  fn rc_file_with_include_and_comments()
  {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let extra = dir.path().join("extra.rc");
    fs::write(
      &extra,
      "http.timeout = 15\n"
    )
    .expect("write include");
    let rc = dir.path().join("main.rc");
    fs::write(
      &rc,
      "# taskboard\nbackend.url = \
       http://localhost:5000/api/tasks/ \
       # dev\ncolor=off\ninclude \
       extra.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load_with_env(
      Some(rc.as_path()),
      no_env
    )
    .expect("load config");

    assert_eq!(
      cfg.backend_url().expect("url"),
      "http://localhost:5000/api/tasks"
    );
    assert_eq!(
      cfg.get_bool("color").expect("bool"),
      Some(false)
    );
    assert_eq!(
      cfg.get_bool("missing").expect("bool"),
      None
    );
    assert_eq!(
      cfg.http_timeout().expect("timeout"),
      Some(Duration::from_secs(15))
    );
    assert_eq!(cfg.loaded_files.len(), 2);
  }

  #[test]
  fn environment_and_overrides_win() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let rc = dir.path().join("main.rc");
    fs::write(
      &rc,
      "backend.url = http://file/api\n"
    )
    .expect("write rc");

    let mut cfg = Config::load_with_env(
      Some(rc.as_path()),
      |key| {
        (key == BACKEND_URL_ENV).then(|| {
          "http://env/api".to_string()
        })
      }
    )
    .expect("load config");
    assert_eq!(
      cfg.backend_url().expect("url"),
      "http://env/api"
    );

    cfg.apply_overrides([(
      "rc.backend.url".to_string(),
      "https://override/api".to_string()
    )]);
    assert_eq!(
      cfg.backend_url().expect("url"),
      "https://override/api"
    );
  }

  #[test]
  fn missing_or_bad_url_is_an_error() {
    let mut cfg = Config::load_with_env(
      None,
      |key| {
        (key == RC_ENV)
          .then(|| "/dev/null".to_string())
      }
    )
    .expect("load config");
    assert!(cfg.loaded_files.is_empty());
    assert!(cfg.backend_url().is_err());
    assert_eq!(
      cfg.http_timeout().expect("timeout"),
      None
    );

    cfg.apply_overrides([(
      BACKEND_URL_KEY.to_string(),
      "ftp://host/tasks".to_string()
    )]);
    assert!(cfg.backend_url().is_err());

    cfg.apply_overrides([(
      "http.timeout".to_string(),
      "soon".to_string()
    )]);
    assert!(cfg.http_timeout().is_err());

    cfg.apply_overrides([(
      "color".to_string(),
      "sometimes".to_string()
    )]);
    assert!(cfg.get_bool("color").is_err());
  }

  #[test]
  fn bad_line_reports_location() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let rc = dir.path().join("main.rc");
    fs::write(&rc, "color = on\noops\n")
      .expect("write rc");

    let err = Config::load_with_env(
      Some(rc.as_path()),
      no_env
    )
    .expect_err("invalid line");
    assert!(
      err.to_string().contains(":2:")
    );
  }
}
