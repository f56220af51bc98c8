#![allow(dead_code)]

use std::cell::{
  Cell,
  RefCell
};

use taskboard_sync::{
  Operation,
  SyncError,
  Task,
  TaskApi,
  TaskDraft,
  TaskStatus
};

/// In-memory server for the task API.
pub struct FakeApi {
  url:      String,
  server:   RefCell<Vec<Task>>,
  next_id:  Cell<u64>,
  failures: RefCell<Vec<(Operation, SyncError)>>,
  calls:    RefCell<Vec<String>>
}

impl FakeApi {
  pub fn new(url: &str) -> Self {
    Self {
      url:      url.to_string(),
      server:   RefCell::new(Vec::new()),
      next_id:  Cell::new(100),
      failures: RefCell::new(Vec::new()),
      calls:    RefCell::new(Vec::new())
    }
  }

  pub fn with_tasks(
    url: &str,
    tasks: Vec<Task>
  ) -> Self {
    let api = Self::new(url);
    *api.server.borrow_mut() = tasks;
    api
  }

  pub fn next_id(&self, id: u64) {
    self.next_id.set(id);
  }

  /// Every request of `operation` fails
  /// with `err` from now on.
  pub fn fail(
    &self,
    operation: Operation,
    err: SyncError
  ) {
    self
      .failures
      .borrow_mut()
      .push((operation, err));
  }

  pub fn heal(&self) {
    self.failures.borrow_mut().clear();
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }

  pub fn server_tasks(&self) -> Vec<Task> {
    self.server.borrow().clone()
  }

  fn record(
    &self,
    operation: Operation,
    call: String
  ) -> Result<(), SyncError> {
    self.calls.borrow_mut().push(call);
    match self
      .failures
      .borrow()
      .iter()
      .find(|(op, _)| *op == operation)
    {
      | Some((_, err)) => Err(err.clone()),
      | None => Ok(())
    }
  }
}

impl TaskApi for FakeApi {
  fn resource_url(&self) -> &str {
    &self.url
  }

  async fn list(
    &self
  ) -> Result<Vec<Task>, SyncError> {
    self.record(
      Operation::Load,
      format!("GET {}", self.url)
    )?;
    Ok(self.server_tasks())
  }

  async fn create(
    &self,
    draft: &TaskDraft
  ) -> Result<Task, SyncError> {
    self.record(
      Operation::Create,
      format!("POST {}", self.url)
    )?;
    let id = self.next_id.get();
    self.next_id.set(id + 1);
    let task = Task::new(
      id.to_string(),
      draft.title.clone(),
      draft.description.clone(),
      draft.status
    );
    self.server.borrow_mut().push(task.clone());
    Ok(task)
  }

  async fn update(
    &self,
    id: &str,
    changes: &TaskDraft
  ) -> Result<Task, SyncError> {
    self.record(
      Operation::Update,
      format!("PUT {}/{id}", self.url)
    )?;
    let mut server = self.server.borrow_mut();
    let task = server
      .iter_mut()
      .find(|t| t.id == id)
      .ok_or(SyncError::Status {
        operation: Operation::Update,
        status:    404
      })?;
    task.title = changes.title.clone();
    task.description =
      changes.description.clone();
    task.status = changes.status;
    Ok(task.clone())
  }

  async fn delete(
    &self,
    id: &str
  ) -> Result<(), SyncError> {
    self.record(
      Operation::Delete,
      format!("DELETE {}/{id}", self.url)
    )?;
    let mut server = self.server.borrow_mut();
    let before = server.len();
    server.retain(|t| t.id != id);
    if server.len() == before {
      return Err(SyncError::Status {
        operation: Operation::Delete,
        status:    404
      });
    }
    Ok(())
  }
}

pub fn task(
  id: &str,
  title: &str,
  description: &str
) -> Task {
  Task::new(
    id,
    title,
    description,
    TaskStatus::Pending
  )
}

pub fn seed() -> Vec<Task> {
  vec![
    task("1", "Buy milk", "2%"),
    task("2", "Write report", "quarterly numbers"),
    task("3", "Call plumber", "kitchen sink")
  ]
}
