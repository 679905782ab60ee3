use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// The search field. Focus and blur are reported so the keyboard layer knows
/// when keystrokes belong to the input.
#[component]
pub fn SearchField(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] placeholder: String,

    // Manual wiring; `bind:value` has changed shape across Leptos versions.
    #[prop(into)] bind_value: RwSignal<String>,

    #[prop(optional)] node_ref: NodeRef<html::Input>,
    #[prop(into)] on_focus: Callback<()>,
    #[prop(into)] on_blur: Callback<()>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "placeholder:text-muted-foreground selection:bg-primary selection:text-primary-foreground dark:bg-input/30 border-input flex h-9 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs outline-none md:text-sm",
        "focus-visible:border-ring focus-visible:ring-ring/50 focus-visible:ring-2",
        class
    );

    let on_input = move |ev: web_sys::Event| {
        if let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            bind_value.set(input.value());
        }
    };

    view! {
        <input
            data-name="SearchField"
            type="search"
            autocomplete="off"
            spellcheck="false"
            class=merged_class
            placeholder=placeholder
            prop:value=move || bind_value.get()
            on:input=on_input
            on:focus=move |_| on_focus.run(())
            on:blur=move |_| on_blur.run(())
            node_ref=node_ref
        />
    }
}
