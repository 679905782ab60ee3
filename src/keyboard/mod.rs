//! Keydown dispatch.
//!
//! A key press is canonicalized (`Ctrl+Alt+Shift+Meta+key`), looked up in the
//! table for the current UI context and the mapped `"category.action"` is run
//! through the [`ActionRegistry`].

mod actions;
mod mappings;

pub(crate) use actions::ActionRegistry;
pub(crate) use mappings::{build_mapping, unknown_shortcut_names, UiContext, UiFlags};

use crate::dom::ContentElement;
use crate::focus::FocusTarget;
use crate::state::{ActionError, AppContext};
use leptos::logging::warn;

/// Opens settings from any context unless an overlay is already up.
pub(crate) const SETTINGS_COMBO: &str = "Meta+,";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn from_event(ev: &web_sys::KeyboardEvent) -> Self {
        Self {
            key: ev.key(),
            ctrl: ev.ctrl_key(),
            alt: ev.alt_key(),
            shift: ev.shift_key(),
            meta: ev.meta_key(),
        }
    }

    /// Modifiers always in the order Ctrl, Alt, Shift, Meta.
    pub fn combo(&self) -> String {
        let mut combo = String::new();
        for (on, prefix) in [
            (self.ctrl, "Ctrl+"),
            (self.alt, "Alt+"),
            (self.shift, "Shift+"),
            (self.meta, "Meta+"),
        ] {
            if on {
                combo.push_str(prefix);
            }
        }
        combo.push_str(&self.key);
        combo
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DispatchOutcome {
    /// An overlay is open; the event belongs to it.
    Suppressed,
    Settings,
    Unmapped,
    Handled(String),
    /// Mapped to a path with no action behind it.
    Unresolved(String),
}

impl DispatchOutcome {
    pub fn prevents_default(&self) -> bool {
        matches!(
            self,
            Self::Settings | Self::Handled(_) | Self::Unresolved(_)
        )
    }
}

pub(crate) struct KeyboardDispatcher<E> {
    ctx: AppContext<E>,
    registry: ActionRegistry<E>,
}

impl<E: ContentElement + 'static> KeyboardDispatcher<E> {
    pub fn new(ctx: AppContext<E>) -> Self {
        Self {
            ctx,
            registry: ActionRegistry::new(),
        }
    }

    pub fn ui_context(&self) -> Option<UiContext> {
        let focused = self.ctx.focus.borrow().focused();
        UiContext::resolve(UiFlags {
            search_focused: focused == FocusTarget::SearchInput,
            edit_mode: self.ctx.snapshot().edit_mode,
            content_focused: focused == FocusTarget::Content,
            has_results: self.ctx.search.result_count() > 0,
        })
    }

    /// Action errors are returned as is; the event handler decides what to do
    /// with them.
    pub fn dispatch(&self, key: &KeyPress) -> Result<DispatchOutcome, ActionError> {
        if self.ctx.overlay_open() {
            return Ok(DispatchOutcome::Suppressed);
        }

        let combo = key.combo();
        if combo == SETTINGS_COMBO {
            self.ctx.update_state(|s| s.settings_open = true)?;
            return Ok(DispatchOutcome::Settings);
        }

        let Some(context) = self.ui_context() else {
            return Ok(DispatchOutcome::Unmapped);
        };
        let mapping = build_mapping(context, &self.ctx.config.shortcuts());
        let Some(path) = mapping.get(&combo) else {
            return Ok(DispatchOutcome::Unmapped);
        };

        match self.registry.resolve(path) {
            Some(action) => {
                action(&self.ctx)?;
                Ok(DispatchOutcome::Handled(path.clone()))
            }
            None => {
                warn!("no action registered for {path} ({combo} in {context})");
                Ok(DispatchOutcome::Unresolved(path.clone()))
            }
        }
    }
}
