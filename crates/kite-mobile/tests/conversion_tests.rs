//! Property tests for boundary/native value conversion.

use kite_mobile::conversion::{
    loader_from_native, loader_to_native, message_from_native, message_to_native,
    resolve_kind_from_native, resolve_kind_to_native, side_effects_from_native,
    side_effects_to_native,
};
use kite_mobile::{Loader, Message, ResolveKind, SideEffects};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_resolve_kind_survives_the_native_round_trip(raw in any::<u8>()) {
        let kind = ResolveKind::from_raw(raw);
        prop_assert_eq!(resolve_kind_from_native(resolve_kind_to_native(kind)), kind);
        if raw > 8 {
            prop_assert_eq!(kind, ResolveKind::None);
        } else {
            prop_assert_eq!(kind.as_raw(), raw);
        }
    }

    #[test]
    fn prop_unknown_loader_values_infer(raw in any::<i32>()) {
        let loader = Loader::from_raw(raw);
        if !(0..=11).contains(&raw) {
            prop_assert_eq!(loader, Loader::None);
        }
        // None and Default collapse to the native Default
        let back = loader_from_native(loader_to_native(loader));
        match loader {
            Loader::None | Loader::Default => prop_assert_eq!(back, Loader::Default),
            other => prop_assert_eq!(back, other),
        }
    }

    #[test]
    fn prop_located_messages_keep_their_fields(
        text in ".{0,40}",
        file in "[a-z/]{1,20}\\.js",
        line in 1u32..10_000,
        column in 0u32..500,
    ) {
        let message = Message::new(text.clone()).with_location(file.clone(), line, column, "x");
        let back = message_from_native(&message_to_native(&message));
        prop_assert_eq!(back, message);
    }
}

#[test]
fn test_side_effects_never_reach_the_engine_unset() {
    assert_eq!(side_effects_to_native(SideEffects::True), kite_engine::SideEffects::True);
    assert_eq!(
        side_effects_from_native(kite_engine::SideEffects::Unset),
        SideEffects::True
    );
    assert_eq!(SideEffects::from_raw(7), SideEffects::True);
}

#[test]
fn test_message_without_location_stays_unlocated() {
    let native = message_to_native(&Message::new("plain"));
    assert!(native.location.is_none());
    assert!(!message_from_native(&native).has_location());
}
