//! The task page as a controller: form draft, edit target, search box and
//! the delete-in-progress flag, layered over a [`SyncStore`].

use tracing::{
  debug,
  info,
  instrument
};

use crate::api::TaskApi;
use crate::filter::filter_tasks;
use crate::store::{
  DeleteOp,
  SyncState,
  SyncStore
};
use crate::task::{
  Task,
  TaskDraft,
  TaskStatus
};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
  /// Title or description blank; nothing
  /// was sent and the draft is kept.
  Incomplete,
  Created(Option<Task>),
  Updated(Option<Task>)
}

impl SubmitOutcome {
  pub fn task(&self) -> Option<&Task> {
    match self {
      | SubmitOutcome::Incomplete => None,
      | SubmitOutcome::Created(task)
      | SubmitOutcome::Updated(task) => {
        task.as_ref()
      }
    }
  }
}

/// What the page shows. Loading and error
/// each replace the whole page.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenView<'a> {
  Loading,
  Error(&'a str),
  Ready(ReadyView<'a>)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyView<'a> {
  pub form_heading: &'static str,
  pub submit_label: &'static str,
  pub can_cancel:   bool,
  pub draft:        &'a TaskDraft,
  pub search:       &'a str,
  pub tasks:        Vec<&'a Task>,
  pub deleting:     bool
}

pub fn form_heading(
  editing: bool
) -> &'static str {
  if editing {
    "Edit Task"
  } else {
    "Add a Task"
  }
}

pub fn submit_label(
  editing: bool
) -> &'static str {
  if editing {
    "Update Task"
  } else {
    "Add Task"
  }
}

pub fn view_of<'a>(
  state: &'a SyncState,
  draft: &'a TaskDraft,
  editing: bool,
  search: &'a str,
  deleting: bool
) -> ScreenView<'a> {
  if state.loading() {
    return ScreenView::Loading;
  }
  if let Some(err) = state.error() {
    return ScreenView::Error(err);
  }
  ScreenView::Ready(ReadyView {
    form_heading: form_heading(editing),
    submit_label: submit_label(editing),
    can_cancel: editing,
    draft,
    search,
    tasks: filter_tasks(
      state.tasks(),
      search
    ),
    deleting
  })
}

#[derive(Debug)]
pub struct TaskScreen<A> {
  sync:     SyncStore<A>,
  draft:    TaskDraft,
  editing:  Option<Task>,
  search:   String,
  deleting: bool
}

impl<A: TaskApi> TaskScreen<A> {
  pub fn new(api: A) -> Self {
    Self {
      sync:     SyncStore::new(api),
      draft:    TaskDraft::default(),
      editing:  None,
      search:   String::new(),
      deleting: false
    }
  }

  pub async fn attach(&mut self) {
    self.sync.attach().await;
  }

  pub async fn reload(&mut self) {
    self.sync.reload().await;
  }

  /// Tear down: drop late responses and
  /// forget the loaded URL.
  pub fn detach(&mut self) {
    self.sync.detach();
  }

  pub fn sync(&self) -> &SyncStore<A> {
    &self.sync
  }

  pub fn state(&self) -> &SyncState {
    self.sync.state()
  }

  pub fn draft(&self) -> &TaskDraft {
    &self.draft
  }

  pub fn editing(&self) -> Option<&Task> {
    self.editing.as_ref()
  }

  pub fn search(&self) -> &str {
    &self.search
  }

  pub fn is_deleting(&self) -> bool {
    self.deleting
  }

  pub fn set_search(
    &mut self,
    search: impl Into<String>
  ) {
    self.search = search.into();
  }

  pub fn set_title(
    &mut self,
    title: impl Into<String>
  ) {
    self.draft.title = title.into();
  }

  pub fn set_description(
    &mut self,
    description: impl Into<String>
  ) {
    self.draft.description =
      description.into();
  }

  pub fn set_status(
    &mut self,
    status: TaskStatus
  ) {
    self.draft.status = status;
  }

  pub fn filtered(&self) -> Vec<&Task> {
    filter_tasks(
      self.sync.state().tasks(),
      &self.search
    )
  }

  pub fn begin_edit(&mut self, task: &Task) {
    debug!(id = %task.id, "editing task");
    self.draft = TaskDraft::from(task);
    self.editing = Some(task.clone());
  }

  /// Starts editing the visible task with
  /// `id`; false when there is none.
  pub fn begin_edit_id(
    &mut self,
    id: &str
  ) -> bool {
    match self.sync.state().find(id).cloned()
    {
      | Some(task) => {
        self.begin_edit(&task);
        true
      }
      | None => false
    }
  }

  pub fn cancel_edit(&mut self) {
    self.editing = None;
  }

  #[instrument(skip(self))]
  pub async fn submit(
    &mut self
  ) -> SubmitOutcome {
    if !self.draft.is_complete() {
      debug!("draft incomplete; submit ignored");
      return SubmitOutcome::Incomplete;
    }

    let draft = std::mem::take(
      &mut self.draft
    );
    match self.editing.take() {
      | Some(target) => {
        info!(id = %target.id, "updating task");
        SubmitOutcome::Updated(
          self
            .sync
            .update(&target.id, &draft)
            .await
        )
      }
      | None => {
        info!(title = %draft.title, "creating task");
        SubmitOutcome::Created(
          self.sync.create(&draft).await
        )
      }
    }
  }

  #[instrument(skip(self))]
  pub async fn delete(
    &mut self,
    id: &str
  ) -> Option<DeleteOp> {
    self.deleting = true;
    let op = self.sync.delete(id).await;
    self.deleting = false;
    op
  }

  pub fn view(&self) -> ScreenView<'_> {
    view_of(
      self.sync.state(),
      &self.draft,
      self.editing.is_some(),
      &self.search,
      self.deleting
    )
  }
}
