//! Attendee-side core of the webinar platform: registration submission,
//! dialog state, error toasts and debounced triggers.

pub mod action;
pub mod debounce;
pub mod error;
pub mod flow;
pub mod live;
pub mod modal;
pub mod notify;

pub use action::{HttpRegistrationAction, RegistrationAction};
pub use debounce::{debounce, Debounced, DEFAULT_DEBOUNCE_DELAY};
pub use error::ClientError;
pub use flow::{ModalContent, RegistrationFlow, SubmitOutcome};
pub use live::LiveValidator;
pub use modal::{ModalState, ModalView, Props, Visibility};
pub use notify::{
    NotificationBridge, Toast, ToastQueue, ToastSink, DEFAULT_TOAST_TTL, FALLBACK_ERROR_MESSAGE,
};
