use taskboard_sync::{
  TaskDraft,
  TaskStatus
};
use web_sys::{
  Event,
  HtmlInputElement,
  HtmlSelectElement,
  InputEvent,
  SubmitEvent
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskFormProps {
  pub draft:      TaskDraft,
  pub heading:    &'static str,
  pub submit:     &'static str,
  pub can_cancel: bool,
  pub on_change:  Callback<TaskDraft>,
  pub on_submit:  Callback<()>,
  pub on_cancel:  Callback<()>
}

#[function_component(TaskForm)]
pub fn task_form(
  props: &TaskFormProps
) -> Html {
  let on_title = {
    let draft = props.draft.clone();
    let on_change =
      props.on_change.clone();
    Callback::from(move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      on_change.emit(TaskDraft {
        title: input.value(),
        ..draft.clone()
      });
    })
  };

  let on_description = {
    let draft = props.draft.clone();
    let on_change =
      props.on_change.clone();
    Callback::from(move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      on_change.emit(TaskDraft {
        description: input.value(),
        ..draft.clone()
      });
    })
  };

  let on_status = {
    let draft = props.draft.clone();
    let on_change =
      props.on_change.clone();
    Callback::from(move |e: Event| {
      let select: HtmlSelectElement =
        e.target_unchecked_into();
      let Ok(status) = select
        .value()
        .parse::<TaskStatus>()
      else {
        return;
      };
      on_change.emit(TaskDraft {
        status,
        ..draft.clone()
      });
    })
  };

  let onsubmit = {
    let on_submit =
      props.on_submit.clone();
    Callback::from(move |e: SubmitEvent| {
      e.prevent_default();
      on_submit.emit(());
    })
  };

  let on_cancel = {
    let on_cancel =
      props.on_cancel.clone();
    Callback::from(move |_: MouseEvent| {
      on_cancel.emit(());
    })
  };

  html! {
    <form {onsubmit}>
      <h2>{ props.heading }</h2>
      <input
        type="text"
        placeholder="Title"
        required=true
        value={props.draft.title.clone()}
        oninput={on_title}
      />
      <input
        type="text"
        placeholder="Description"
        required=true
        value={props.draft.description.clone()}
        oninput={on_description}
      />
      <select onchange={on_status}>
        {
          for TaskStatus::ALL.iter().map(|status| html! {
            <option
              value={status.as_str()}
              selected={*status == props.draft.status}
            >
              { status.label() }
            </option>
          })
        }
      </select>
      <button type="submit">{ props.submit }</button>
      if props.can_cancel {
        <button type="button" onclick={on_cancel}>
          { "Cancel" }
        </button>
      }
    </form>
  }
}
