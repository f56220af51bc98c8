use reqwest::{
  Client,
  RequestBuilder
};
use serde::de::DeserializeOwned;
use tracing::{
  debug,
  instrument,
  warn
};

use crate::error::{
  Operation,
  SyncError
};
use crate::task::{
  Task,
  TaskDraft
};

/// The remote task collection.
///
/// One call per method, one request per call. Implementations never retry.
#[allow(async_fn_in_trait)]
pub trait TaskApi {
  /// Collection endpoint; item endpoints are `{resource_url}/{id}`.
  fn resource_url(&self) -> &str;

  async fn list(
    &self
  ) -> Result<Vec<Task>, SyncError>;

  async fn create(
    &self,
    draft: &TaskDraft
  ) -> Result<Task, SyncError>;

  async fn update(
    &self,
    id: &str,
    changes: &TaskDraft
  ) -> Result<Task, SyncError>;

  async fn delete(
    &self,
    id: &str
  ) -> Result<(), SyncError>;
}

/// [`TaskApi`] over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
  client:       Client,
  resource_url: String
}

impl HttpTaskApi {
  pub fn new(
    resource_url: impl Into<String>
  ) -> Self {
    Self::with_client(
      Client::new(),
      resource_url
    )
  }

  /// Use a preconfigured client
  /// (timeouts, proxies).
  pub fn with_client(
    client: Client,
    resource_url: impl Into<String>
  ) -> Self {
    let resource_url = resource_url
      .into()
      .trim_end_matches('/')
      .to_string();
    Self {
      client,
      resource_url
    }
  }

  pub fn item_url(
    &self,
    id: &str
  ) -> String {
    format!(
      "{}/{}",
      self.resource_url, id
    )
  }
}

impl TaskApi for HttpTaskApi {
  fn resource_url(&self) -> &str {
    &self.resource_url
  }

  #[instrument(skip(self), fields(url = %self.resource_url))]
  async fn list(
    &self
  ) -> Result<Vec<Task>, SyncError> {
    let request =
      self.client.get(&self.resource_url);
    send_json(request, Operation::Load)
      .await
  }

  #[instrument(skip(self, draft), fields(url = %self.resource_url))]
  async fn create(
    &self,
    draft: &TaskDraft
  ) -> Result<Task, SyncError> {
    let request = self
      .client
      .post(&self.resource_url)
      .json(draft);
    send_json(request, Operation::Create)
      .await
  }

  #[instrument(skip(self, changes), fields(url = %self.resource_url))]
  async fn update(
    &self,
    id: &str,
    changes: &TaskDraft
  ) -> Result<Task, SyncError> {
    let request = self
      .client
      .put(self.item_url(id))
      .json(changes);
    send_json(request, Operation::Update)
      .await
  }

  #[instrument(skip(self), fields(url = %self.resource_url))]
  async fn delete(
    &self,
    id: &str
  ) -> Result<(), SyncError> {
    let request =
      self.client.delete(self.item_url(id));
    send_checked(
      request,
      Operation::Delete
    )
    .await
    .map(|_| ())
  }
}

async fn send_checked(
  request: RequestBuilder,
  operation: Operation
) -> Result<reqwest::Response, SyncError>
{
  let response = request
    .send()
    .await
    .map_err(|err| {
      warn!(%operation, error = %err, "request failed before a response arrived");
      SyncError::network(err)
    })?;

  let status = response.status();
  debug!(%operation, status = status.as_u16(), "response received");
  if !status.is_success() {
    warn!(%operation, status = status.as_u16(), "server rejected request");
    return Err(SyncError::Status {
      operation,
      status: status.as_u16()
    });
  }

  Ok(response)
}

async fn send_json<T>(
  request: RequestBuilder,
  operation: Operation
) -> Result<T, SyncError>
where
  T: DeserializeOwned
{
  let response =
    send_checked(request, operation)
      .await?;
  response.json::<T>().await.map_err(
    |err| {
      warn!(%operation, error = %err, "response body did not decode");
      SyncError::Decode {
        operation,
        message: err.to_string()
      }
    }
  )
}
