use crate::models::NotificationKind;
use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::tw_merge;

mod components {
    use super::*;
    clx! {ToastStack, div, "pointer-events-none fixed bottom-4 right-4 z-50 flex w-80 flex-col gap-2"}
    clx! {AlertDescription, p, "text-sm leading-relaxed"}
}

pub use components::*;

/// A single toast. Error toasts use the destructive palette.
#[component]
pub fn Alert(
    kind: NotificationKind,
    children: Children,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let palette = match kind {
        NotificationKind::Info => "bg-background text-foreground",
        NotificationKind::Error => "border-destructive/50 bg-background text-destructive",
    };
    let merged_class = tw_merge!(
        "pointer-events-auto relative flex w-full items-start gap-2 rounded-lg border px-4 py-3 text-sm shadow-md",
        palette,
        class
    );

    view! {
        <div data-name="Alert" role="alert" class=merged_class>
            {children()}
        </div>
    }
}
