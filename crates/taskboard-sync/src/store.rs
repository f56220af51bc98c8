//! Local mirror of the remote task collection.
//!
//! [`SyncState`] holds the transitions: every request is opened with a
//! `begin_*` call that returns a [`Ticket`] and closed with the matching
//! `finish_*`/`settle_delete` call once the response is in. Nothing is held
//! across the request itself, so front-ends that let requests overlap (the
//! browser page) and the serial [`SyncStore`] driver share the same rules.

use std::collections::{
  BTreeMap,
  VecDeque
};

use tracing::{
  debug,
  info,
  instrument,
  warn
};

use crate::api::TaskApi;
use crate::error::SyncError;
use crate::task::{
  Task,
  TaskDraft
};

pub type OpId = u64;

/// Settled deletes remembered for
/// [`SyncState::delete_status`].
pub const SETTLED_HISTORY: usize = 32;

/// Lifecycle of one optimistic delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpStatus {
  Pending,
  Committed,
  RolledBack
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOp {
  pub id:      OpId,
  pub task_id: String,
  pub status:  OpStatus
}

/// Handle for an outstanding request.
///
/// A ticket from an older epoch is stale: its response is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
  epoch: u64,
  op:    OpId
}

impl Ticket {
  pub fn op(&self) -> OpId {
    self.op
  }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
  task:     Task,
  /// Set while a delete for this entry
  /// is in flight; the entry is hidden.
  deleting: Option<OpId>
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncState {
  entries:   Vec<Entry>,
  loading:   bool,
  error:     Option<String>,
  in_flight: usize,
  epoch:     u64,
  next_op:   OpId,
  /// In flight only.
  deletes:   BTreeMap<OpId, DeleteOp>,
  settled:   VecDeque<DeleteOp>
}

impl Default for SyncState {
  fn default() -> Self {
    Self {
      entries:   Vec::new(),
      loading:   true,
      error:     None,
      in_flight: 0,
      epoch:     0,
      next_op:   1,
      deletes:   BTreeMap::new(),
      settled:   VecDeque::new()
    }
  }
}

impl SyncState {
  pub fn new() -> Self {
    Self::default()
  }

  /// The visible collection, in arrival
  /// order.
  pub fn tasks(
    &self
  ) -> impl Iterator<Item = &Task> {
    self
      .entries
      .iter()
      .filter(|e| e.deleting.is_none())
      .map(|e| &e.task)
  }

  pub fn snapshot(&self) -> Vec<Task> {
    self.tasks().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.tasks().count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn find(
    &self,
    id: &str
  ) -> Option<&Task> {
    self.tasks().find(|t| t.id == id)
  }

  pub fn loading(&self) -> bool {
    self.loading
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// A create, update or delete is
  /// outstanding.
  pub fn busy(&self) -> bool {
    self.in_flight > 0
  }

  /// Status of a pending delete or one of
  /// the last [`SETTLED_HISTORY`] settled
  /// ones.
  pub fn delete_status(
    &self,
    op: OpId
  ) -> Option<OpStatus> {
    self
      .deletes
      .get(&op)
      .or_else(|| {
        self
          .settled
          .iter()
          .rev()
          .find(|d| d.id == op)
      })
      .map(|d| d.status)
  }

  pub fn is_deleting(
    &self,
    task_id: &str
  ) -> bool {
    self.entries.iter().any(|e| {
      e.deleting.is_some()
        && e.task.id == task_id
    })
  }

  /// Drop everything and move to a new
  /// epoch; outstanding tickets go stale.
  pub fn reset(&mut self) {
    let epoch = self.epoch + 1;
    let next_op = self.next_op;
    *self = Self {
      epoch,
      next_op,
      ..Self::default()
    };
    debug!(epoch, "sync state reset");
  }

  /// Teardown: keep what is displayed but
  /// ignore every response still on its
  /// way.
  pub fn detach(&mut self) {
    self.epoch += 1;
    self.in_flight = 0;
    self.loading = false;
    for entry in &mut self.entries {
      entry.deleting = None;
    }
    for (_, mut op) in
      std::mem::take(&mut self.deletes)
    {
      op.status = OpStatus::RolledBack;
      self.record_settled(op);
    }
    debug!(epoch = self.epoch, "sync state detached");
  }

  fn record_settled(&mut self, op: DeleteOp) {
    self.settled.push_back(op);
    while self.settled.len() > SETTLED_HISTORY
    {
      self.settled.pop_front();
    }
  }

  fn ticket(&mut self) -> Ticket {
    let op = self.next_op;
    self.next_op += 1;
    Ticket {
      epoch: self.epoch,
      op
    }
  }

  fn is_stale(
    &self,
    ticket: Ticket
  ) -> bool {
    if ticket.epoch != self.epoch {
      debug!(
        op = ticket.op,
        ticket_epoch = ticket.epoch,
        epoch = self.epoch,
        "dropping response from a previous epoch"
      );
      true
    } else {
      false
    }
  }

  fn end_mutation(&mut self) {
    self.in_flight =
      self.in_flight.saturating_sub(1);
  }

  pub fn begin_load(&mut self) -> Ticket {
    self.loading = true;
    self.ticket()
  }

  /// Returns false when the response was
  /// stale and ignored.
  pub fn finish_load(
    &mut self,
    ticket: Ticket,
    result: Result<Vec<Task>, SyncError>
  ) -> bool {
    if self.is_stale(ticket) {
      return false;
    }
    self.loading = false;

    match result {
      | Ok(tasks) => {
        info!(count = tasks.len(), "task collection loaded");
        // Deletes still in flight keep
        // their rows hidden in the fresh
        // collection.
        let pending: Vec<(OpId, String)> =
          self
            .deletes
            .values()
            .map(|d| (d.id, d.task_id.clone()))
            .collect();
        self.entries = tasks
          .into_iter()
          .map(|task| {
            let deleting = pending
              .iter()
              .find(|(_, id)| *id == task.id)
              .map(|(op, _)| *op);
            Entry { task, deleting }
          })
          .collect();
        self.error = None;
      }
      | Err(err) => {
        warn!(error = %err, "task collection load failed");
        self.error = Some(err.to_string());
      }
    }
    true
  }

  pub fn begin_mutation(
    &mut self
  ) -> Ticket {
    self.in_flight += 1;
    self.ticket()
  }

  pub fn finish_create(
    &mut self,
    ticket: Ticket,
    result: Result<Task, SyncError>
  ) -> Option<Task> {
    if self.is_stale(ticket) {
      return None;
    }
    self.end_mutation();

    match result {
      | Ok(task) => {
        debug!(id = %task.id, "appending created task");
        self.entries.push(Entry {
          task:     task.clone(),
          deleting: None
        });
        Some(task)
      }
      | Err(err) => {
        warn!(error = %err, "create failed");
        self.error = Some(err.to_string());
        None
      }
    }
  }

  /// Replaces every entry carrying `id`,
  /// hidden ones included, so a rolled
  /// back delete reveals the newest
  /// version.
  pub fn finish_update(
    &mut self,
    ticket: Ticket,
    id: &str,
    result: Result<Task, SyncError>
  ) -> Option<Task> {
    if self.is_stale(ticket) {
      return None;
    }
    self.end_mutation();

    match result {
      | Ok(task) => {
        let mut replaced = 0usize;
        for entry in self
          .entries
          .iter_mut()
          .filter(|e| e.task.id == id)
        {
          entry.task = task.clone();
          replaced += 1;
        }
        debug!(id, replaced, "applied updated task");
        Some(task)
      }
      | Err(err) => {
        warn!(id, error = %err, "update failed");
        self.error = Some(err.to_string());
        None
      }
    }
  }

  /// Hides every visible entry with
  /// `task_id`. `None` means there is
  /// nothing to delete: the id is unknown
  /// or a delete for it is already in
  /// flight.
  pub fn begin_delete(
    &mut self,
    task_id: &str
  ) -> Option<Ticket> {
    let present = self.entries.iter().any(
      |e| {
        e.deleting.is_none()
          && e.task.id == task_id
      }
    );
    if !present {
      debug!(task_id, "delete skipped; task not visible");
      return None;
    }

    self.in_flight += 1;
    let ticket = self.ticket();
    for entry in self
      .entries
      .iter_mut()
      .filter(|e| e.task.id == task_id)
    {
      entry.deleting = Some(ticket.op);
    }
    self.deletes.insert(
      ticket.op,
      DeleteOp {
        id:      ticket.op,
        task_id: task_id.to_string(),
        status:  OpStatus::Pending
      }
    );
    Some(ticket)
  }

  /// Commits or rolls back the delete
  /// opened with `ticket`.
  pub fn settle_delete(
    &mut self,
    ticket: Ticket,
    result: Result<(), SyncError>
  ) -> Option<DeleteOp> {
    if self.is_stale(ticket) {
      return None;
    }
    let status = match &result {
      | Ok(()) => OpStatus::Committed,
      | Err(_) => OpStatus::RolledBack
    };
    let mut op =
      self.deletes.remove(&ticket.op)?;
    self.end_mutation();
    op.status = status;
    self.record_settled(op.clone());

    match result {
      | Ok(()) => {
        self.entries.retain(|e| {
          e.deleting != Some(ticket.op)
        });
        debug!(task_id = %op.task_id, "delete committed");
      }
      | Err(err) => {
        for entry in &mut self.entries {
          if entry.deleting == Some(ticket.op)
          {
            entry.deleting = None;
          }
        }
        warn!(task_id = %op.task_id, error = %err, "delete failed; restoring task");
        self.error = Some(err.to_string());
      }
    }
    Some(op)
  }
}

/// Owns a [`SyncState`] for one API
/// endpoint and drives requests through it
/// one at a time.
#[derive(Debug)]
pub struct SyncStore<A> {
  api:      A,
  state:    SyncState,
  attached: Option<String>
}

impl<A: TaskApi> SyncStore<A> {
  pub fn new(api: A) -> Self {
    Self {
      api,
      state: SyncState::new(),
      attached: None
    }
  }

  pub fn api(&self) -> &A {
    &self.api
  }

  pub fn state(&self) -> &SyncState {
    &self.state
  }

  /// Initial load. Runs once per distinct
  /// resource URL.
  #[instrument(skip(self), fields(url = %self.api.resource_url()))]
  pub async fn attach(&mut self) {
    if self.attached.as_deref()
      == Some(self.api.resource_url())
    {
      debug!("already attached; skipping load");
      return;
    }
    self.attached =
      Some(self.api.resource_url().to_string());
    self.load().await;
  }

  /// Full re-fetch regardless of what was
  /// loaded before.
  #[instrument(skip(self), fields(url = %self.api.resource_url()))]
  pub async fn reload(&mut self) {
    self.attached =
      Some(self.api.resource_url().to_string());
    self.load().await;
  }

  async fn load(&mut self) {
    let ticket = self.state.begin_load();
    let result = self.api.list().await;
    self.state.finish_load(ticket, result);
  }

  /// Point at another endpoint. The next
  /// [`attach`](Self::attach) loads it.
  pub fn retarget(&mut self, api: A) {
    info!(
      from = %self.api.resource_url(),
      to = %api.resource_url(),
      "retargeting task store"
    );
    self.api = api;
    self.state.reset();
    self.attached = None;
  }

  pub fn detach(&mut self) {
    self.state.detach();
    self.attached = None;
  }

  #[instrument(skip(self, draft))]
  pub async fn create(
    &mut self,
    draft: &TaskDraft
  ) -> Option<Task> {
    let ticket =
      self.state.begin_mutation();
    let result =
      self.api.create(draft).await;
    self.state.finish_create(ticket, result)
  }

  #[instrument(skip(self, changes))]
  pub async fn update(
    &mut self,
    id: &str,
    changes: &TaskDraft
  ) -> Option<Task> {
    let ticket =
      self.state.begin_mutation();
    let result =
      self.api.update(id, changes).await;
    self
      .state
      .finish_update(ticket, id, result)
  }

  /// `None` when the delete was skipped
  /// without a request.
  #[instrument(skip(self))]
  pub async fn delete(
    &mut self,
    id: &str
  ) -> Option<DeleteOp> {
    let ticket =
      self.state.begin_delete(id)?;
    let result = self.api.delete(id).await;
    self.state.settle_delete(ticket, result)
  }
}
