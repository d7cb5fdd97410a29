//! Conversions between boundary types and engine-native types.
//!
//! Enumerations map explicitly in both directions. Native values the
//! boundary has no name for fall back to a named default.

mod kind;
mod message;
mod outcome;

pub use kind::{
    loader_from_native, loader_to_native, resolve_kind_from_native, resolve_kind_to_native,
    side_effects_from_native, side_effects_to_native,
};
pub use message::{message_from_native, message_to_native, messages_from_native, messages_to_native};
pub(crate) use outcome::{
    build_summary, end_result, load_args, load_result, resolve_args, resolve_result, start_result,
};
