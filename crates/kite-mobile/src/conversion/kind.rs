use crate::types::{Loader, ResolveKind, SideEffects};
use kite_engine as native;

/// Native kinds the boundary does not know map to [`ResolveKind::None`].
pub fn resolve_kind_from_native(kind: native::ResolveKind) -> ResolveKind {
    match kind {
        native::ResolveKind::None => ResolveKind::None,
        native::ResolveKind::EntryPoint => ResolveKind::EntryPoint,
        native::ResolveKind::JsImportStatement => ResolveKind::JsImportStatement,
        native::ResolveKind::JsRequireCall => ResolveKind::JsRequireCall,
        native::ResolveKind::JsDynamicImport => ResolveKind::JsDynamicImport,
        native::ResolveKind::JsRequireResolve => ResolveKind::JsRequireResolve,
        native::ResolveKind::CssImportRule => ResolveKind::CssImportRule,
        native::ResolveKind::CssComposesFrom => ResolveKind::CssComposesFrom,
        native::ResolveKind::CssUrlToken => ResolveKind::CssUrlToken,
        _ => ResolveKind::None,
    }
}

pub fn resolve_kind_to_native(kind: ResolveKind) -> native::ResolveKind {
    match kind {
        ResolveKind::None => native::ResolveKind::None,
        ResolveKind::EntryPoint => native::ResolveKind::EntryPoint,
        ResolveKind::JsImportStatement => native::ResolveKind::JsImportStatement,
        ResolveKind::JsRequireCall => native::ResolveKind::JsRequireCall,
        ResolveKind::JsDynamicImport => native::ResolveKind::JsDynamicImport,
        ResolveKind::JsRequireResolve => native::ResolveKind::JsRequireResolve,
        ResolveKind::CssImportRule => native::ResolveKind::CssImportRule,
        ResolveKind::CssComposesFrom => native::ResolveKind::CssComposesFrom,
        ResolveKind::CssUrlToken => native::ResolveKind::CssUrlToken,
    }
}

/// Always an explicit `True`/`False`: the native `Unset` is never produced.
pub fn side_effects_to_native(side_effects: SideEffects) -> native::SideEffects {
    match side_effects {
        SideEffects::True => native::SideEffects::True,
        SideEffects::False => native::SideEffects::False,
    }
}

/// Native `Unset` (and anything unknown) maps to the boundary default `True`.
pub fn side_effects_from_native(side_effects: native::SideEffects) -> SideEffects {
    match side_effects {
        native::SideEffects::False => SideEffects::False,
        _ => SideEffects::True,
    }
}

/// `None` and `Default` both ask the engine to infer the loader.
pub fn loader_to_native(loader: Loader) -> native::Loader {
    match loader {
        Loader::None | Loader::Default => native::Loader::Default,
        Loader::Js => native::Loader::Js,
        Loader::Jsx => native::Loader::Jsx,
        Loader::Ts => native::Loader::Ts,
        Loader::Tsx => native::Loader::Tsx,
        Loader::Json => native::Loader::Json,
        Loader::Css => native::Loader::Css,
        Loader::Text => native::Loader::Text,
        Loader::Base64 => native::Loader::Base64,
        Loader::DataUrl => native::Loader::DataUrl,
        Loader::Empty => native::Loader::Empty,
    }
}

pub fn loader_from_native(loader: native::Loader) -> Loader {
    match loader {
        native::Loader::Default => Loader::Default,
        native::Loader::Js => Loader::Js,
        native::Loader::Jsx => Loader::Jsx,
        native::Loader::Ts => Loader::Ts,
        native::Loader::Tsx => Loader::Tsx,
        native::Loader::Json => Loader::Json,
        native::Loader::Css => Loader::Css,
        native::Loader::Text => Loader::Text,
        native::Loader::Base64 => Loader::Base64,
        native::Loader::DataUrl => Loader::DataUrl,
        native::Loader::Empty => Loader::Empty,
        _ => Loader::None,
    }
}
