use std::cell::RefCell;
use std::rc::Rc;

use taskboard_sync::screen::view_of;
use taskboard_sync::{
  HttpTaskApi,
  ScreenView,
  SyncState,
  Task,
  TaskApi,
  TaskDraft
};
use wasm_bindgen_futures::spawn_local;
use yew::{
  Callback,
  Html,
  MouseEvent,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_memo,
  use_mut_ref,
  use_state
};

use crate::components::{
  SearchBar,
  TaskForm,
  TaskList
};
use crate::config::backend_url;

type SharedState = Rc<RefCell<SyncState>>;

#[function_component(App)]
pub fn app() -> Html {
  let state: SharedState =
    use_mut_ref(SyncState::new);
  let refresh = use_force_update();
  let api = use_memo((), |_| {
    HttpTaskApi::new(backend_url())
  });

  let draft =
    use_state(TaskDraft::default);
  let editing =
    use_state(|| None::<Task>);
  let search = use_state(String::new);
  let deleting = use_state(|| false);

  {
    let state = state.clone();
    let api = api.clone();
    let refresh = refresh.clone();
    use_effect_with(
      api.resource_url().to_string(),
      move |url| {
        tracing::info!(url = %url, "loading tasks");
        let ticket =
          state.borrow_mut().begin_load();
        {
          let state = state.clone();
          spawn_local(async move {
            let result = api.list().await;
            state
              .borrow_mut()
              .finish_load(ticket, result);
            refresh.force_update();
          });
        }
        move || {
          state.borrow_mut().detach();
        }
      }
    );
  }

  let on_reload = {
    let state = state.clone();
    let api = api.clone();
    let refresh = refresh.clone();
    Callback::from(move |_: MouseEvent| {
      let ticket =
        state.borrow_mut().begin_load();
      refresh.force_update();

      let state = state.clone();
      let api = api.clone();
      let refresh = refresh.clone();
      spawn_local(async move {
        let result = api.list().await;
        state
          .borrow_mut()
          .finish_load(ticket, result);
        refresh.force_update();
      });
    })
  };

  let on_search = {
    let search = search.clone();
    Callback::from(move |value: String| {
      search.set(value);
    })
  };

  let on_draft = {
    let draft = draft.clone();
    Callback::from(
      move |next: TaskDraft| {
        draft.set(next);
      }
    )
  };

  let on_submit = {
    let state = state.clone();
    let api = api.clone();
    let refresh = refresh.clone();
    let draft = draft.clone();
    let editing = editing.clone();
    Callback::from(move |()| {
      let current = (*draft).clone();
      if !current.is_complete() {
        return;
      }
      let target = (*editing).clone();
      let ticket =
        state.borrow_mut().begin_mutation();

      let state = state.clone();
      let api = api.clone();
      let refresh = refresh.clone();
      let draft = draft.clone();
      let editing = editing.clone();
      spawn_local(async move {
        match target {
          | Some(task) => {
            let result = api
              .update(&task.id, &current)
              .await;
            state.borrow_mut().finish_update(
              ticket, &task.id, result
            );
            editing.set(None);
          }
          | None => {
            let result =
              api.create(&current).await;
            state
              .borrow_mut()
              .finish_create(ticket, result);
          }
        }
        draft.set(TaskDraft::default());
        refresh.force_update();
      });
    })
  };

  let on_cancel = {
    let editing = editing.clone();
    Callback::from(move |()| {
      editing.set(None);
    })
  };

  let on_edit = {
    let draft = draft.clone();
    let editing = editing.clone();
    Callback::from(move |task: Task| {
      draft.set(TaskDraft::from(&task));
      editing.set(Some(task));
    })
  };

  let on_delete = {
    let state = state.clone();
    let api = api.clone();
    let refresh = refresh.clone();
    let deleting = deleting.clone();
    Callback::from(move |id: String| {
      let ticket =
        state.borrow_mut().begin_delete(&id);
      let Some(ticket) = ticket else {
        return;
      };
      deleting.set(true);
      refresh.force_update();

      let state = state.clone();
      let api = api.clone();
      let refresh = refresh.clone();
      let deleting = deleting.clone();
      spawn_local(async move {
        let result = api.delete(&id).await;
        state
          .borrow_mut()
          .settle_delete(ticket, result);
        deleting.set(false);
        refresh.force_update();
      });
    })
  };

  let snapshot = state.borrow();
  let view = view_of(
    &snapshot,
    &draft,
    editing.is_some(),
    &search,
    *deleting
  );

  let body = match view {
    | ScreenView::Loading => html! {
      <p class="status">{ "Loading..." }</p>
    },
    | ScreenView::Error(message) => html! {
      <p class="status error">
        { format!("Error: {message}") }
      </p>
    },
    | ScreenView::Ready(ready) => html! {
      <>
        <SearchBar
          value={ready.search.to_string()}
          on_change={on_search}
        />
        <TaskForm
          draft={ready.draft.clone()}
          heading={ready.form_heading}
          submit={ready.submit_label}
          can_cancel={ready.can_cancel}
          on_change={on_draft}
          {on_submit}
          {on_cancel}
        />
        <TaskList
          tasks={
            ready
              .tasks
              .into_iter()
              .cloned()
              .collect::<Vec<_>>()
          }
          deleting={ready.deleting}
          {on_edit}
          {on_delete}
        />
      </>
    }
  };

  html! {
    <div class="container">
      <header>
        <h1>{ "Tasks" }</h1>
        <button
          class="refresh-button"
          onclick={on_reload}
        >
          { "Refresh" }
        </button>
      </header>
      { body }
    </div>
  }
}
