use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin text-muted-foreground", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label="Searching" /> }
}
