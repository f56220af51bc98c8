use web_sys::{
  HtmlInputElement,
  InputEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct SearchBarProps {
  pub value:     String,
  pub on_change: Callback<String>
}

#[function_component(SearchBar)]
pub fn search_bar(
  props: &SearchBarProps
) -> Html {
  let on_change =
    props.on_change.clone();
  let oninput =
    Callback::from(move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      on_change.emit(input.value());
    });

  html! {
    <div class="search-bar">
      <input
        type="text"
        placeholder="Search tasks"
        value={props.value.clone()}
        {oninput}
      />
    </div>
  }
}
