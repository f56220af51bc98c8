use taskboard_sync::Task;
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskListRowProps {
  pub task:      Task,
  pub deleting:  bool,
  pub on_edit:   Callback<Task>,
  pub on_delete: Callback<String>
}

#[function_component(TaskListRow)]
pub fn task_list_row(
  props: &TaskListRowProps
) -> Html {
  let on_edit = {
    let task = props.task.clone();
    let on_edit = props.on_edit.clone();
    Callback::from(move |_: MouseEvent| {
      on_edit.emit(task.clone());
    })
  };
  let on_delete = {
    let id = props.task.id.clone();
    let on_delete =
      props.on_delete.clone();
    Callback::from(move |_: MouseEvent| {
      on_delete.emit(id.clone());
    })
  };

  let delete_label = if props.deleting {
    "Deleting..."
  } else {
    "Delete"
  };

  html! {
    <li class={classes_for(&props.task)}>
      <h3>{ props.task.title.clone() }</h3>
      <p>{ props.task.description.clone() }</p>
      <p>{ format!("Status: {}", props.task.status.label()) }</p>
      <button class="edit-button" onclick={on_edit}>
        { "Edit" }
      </button>
      <button
        class="delete-button"
        onclick={on_delete}
        disabled={props.deleting}
      >
        { delete_label }
      </button>
    </li>
  }
}

fn classes_for(task: &Task) -> String {
  format!(
    "task {}",
    task.status.as_str().replace(' ', "-")
  )
}
