/// Used when the build did not set
/// `TASKBOARD_BACKEND_URL`.
const DEFAULT_BACKEND_URL: &str =
  "http://localhost:5000/api/tasks";

/// Task collection endpoint, fixed at
/// build time.
pub fn backend_url() -> &'static str {
  option_env!("TASKBOARD_BACKEND_URL")
    .filter(|url| !url.trim().is_empty())
    .unwrap_or(DEFAULT_BACKEND_URL)
}
