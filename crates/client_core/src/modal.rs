//! Dialog visibility plus the payload it would show.

use serde::Serialize;
use serde_json::{Map, Value};

pub type Props = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Visibility is driven only by [`toggle`](Self::toggle); content and props
/// are independent and survive hiding, so callers can preload them.
#[derive(Debug, Clone)]
pub struct ModalState<C> {
    active: bool,
    content: Option<C>,
    props: Option<Props>,
}

impl<C> Default for ModalState<C> {
    fn default() -> Self {
        Self {
            active: false,
            content: None,
            props: None,
        }
    }
}

/// Snapshot handed to the render layer.
#[derive(Debug, Serialize)]
pub struct ModalView<'a, C> {
    pub active: bool,
    pub content: Option<&'a C>,
    pub props: Option<&'a Props>,
}

impl<C> ModalState<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn visibility(&self) -> Visibility {
        if self.active {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }

    pub fn toggle(&mut self) -> Visibility {
        self.active = !self.active;
        self.visibility()
    }

    pub fn set_content(&mut self, content: Option<C>) {
        self.content = content;
    }

    pub fn set_props(&mut self, props: Option<Props>) {
        self.props = props;
    }

    pub fn content(&self) -> Option<&C> {
        self.content.as_ref()
    }

    pub fn props(&self) -> Option<&Props> {
        self.props.as_ref()
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.as_ref()?.get(key)
    }

    pub fn view(&self) -> ModalView<'_, C> {
        ModalView {
            active: self.active,
            content: self.content.as_ref(),
            props: self.props.as_ref(),
        }
    }

    /// Back to the initial hidden, empty state (consumer unmounted).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
