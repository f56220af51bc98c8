use taskboard_sync::Task;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::TaskListRow;

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  pub tasks:     Vec<Task>,
  pub deleting:  bool,
  pub on_edit:   Callback<Task>,
  pub on_delete: Callback<String>
}

#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  if props.tasks.is_empty() {
    return html! {
      <p class="empty">{ "No tasks." }</p>
    };
  }

  html! {
    <ul class="task-list">
      {
        for props.tasks.iter().map(|task| html! {
          <TaskListRow
            key={task.id.clone()}
            task={task.clone()}
            deleting={props.deleting}
            on_edit={props.on_edit.clone()}
            on_delete={props.on_delete.clone()}
          />
        })
      }
    </ul>
  }
}
