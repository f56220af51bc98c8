//! Client-side synchronization for a remote task collection.
//!
//! [`api::TaskApi`] is the remote endpoint, [`store::SyncStore`] keeps the
//! local mirror in step with it (optimistic deletes included), and
//! [`screen::TaskScreen`] is the list/search/edit page built on top.

pub mod api;
pub mod error;
pub mod filter;
pub mod screen;
pub mod store;
pub mod task;

pub use api::{
  HttpTaskApi,
  TaskApi
};
pub use error::{
  Operation,
  SyncError
};
pub use screen::{
  ReadyView,
  ScreenView,
  SubmitOutcome,
  TaskScreen
};
pub use store::{
  DeleteOp,
  OpStatus,
  SyncState,
  SyncStore,
  Ticket
};
pub use task::{
  ParseStatusError,
  Task,
  TaskDraft,
  TaskId,
  TaskStatus
};
