use super::kind::{loader_to_native, resolve_kind_from_native, side_effects_to_native};
use super::message::{messages_from_native, messages_to_native};
use crate::builders::{BuildSummary, EndOutcome, LoadOutcome, ResolveOutcome, StartOutcome};
use crate::callbacks::{LoadArgs, ResolveArgs};
use kite_engine as native;

pub(crate) fn resolve_args(args: &native::OnResolveArgs) -> ResolveArgs {
    ResolveArgs {
        path: args.path.clone(),
        importer: args.importer.clone(),
        namespace: args.namespace.clone(),
        resolve_dir: args.resolve_dir.clone(),
        kind: resolve_kind_from_native(args.kind),
    }
}

pub(crate) fn load_args(args: &native::OnLoadArgs) -> LoadArgs {
    LoadArgs {
        path: args.path.clone(),
        namespace: args.namespace.clone(),
        suffix: args.suffix.clone(),
    }
}

pub(crate) fn resolve_result(outcome: ResolveOutcome) -> native::OnResolveResult {
    native::OnResolveResult {
        plugin_name: outcome.plugin_name,
        errors: messages_to_native(&outcome.errors),
        warnings: messages_to_native(&outcome.warnings),
        path: outcome.path,
        external: outcome.external,
        side_effects: side_effects_to_native(outcome.side_effects),
        namespace: outcome.namespace,
        suffix: outcome.suffix,
        watch_files: outcome.watch_files,
        watch_dirs: outcome.watch_dirs,
    }
}

pub(crate) fn load_result(outcome: LoadOutcome) -> native::OnLoadResult {
    native::OnLoadResult {
        plugin_name: outcome.plugin_name,
        errors: messages_to_native(&outcome.errors),
        warnings: messages_to_native(&outcome.warnings),
        contents: outcome.contents,
        resolve_dir: outcome.resolve_dir,
        loader: loader_to_native(outcome.loader),
        watch_files: outcome.watch_files,
        watch_dirs: outcome.watch_dirs,
    }
}

pub(crate) fn start_result(outcome: StartOutcome) -> native::OnStartResult {
    native::OnStartResult {
        errors: messages_to_native(&outcome.errors),
        warnings: messages_to_native(&outcome.warnings),
    }
}

pub(crate) fn end_result(outcome: EndOutcome) -> native::OnEndResult {
    native::OnEndResult {
        errors: messages_to_native(&outcome.errors),
        warnings: messages_to_native(&outcome.warnings),
    }
}

pub(crate) fn build_summary(result: &native::BuildResult) -> BuildSummary {
    BuildSummary {
        errors: messages_from_native(&result.errors),
        warnings: messages_from_native(&result.warnings),
    }
}
