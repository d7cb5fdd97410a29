//! Bridge adapter.
//!
//! [`bridge`] turns a boundary [`Plugin`] into a native
//! [`kite_engine::Plugin`]. The native setup registers one subscription per
//! rule, in the plugin's declared order, and each subscription converts the
//! native event, calls the host callback synchronously, and converts the
//! outcome back. Matching and first-match-wins arbitration stay in the
//! engine.

use crate::builders::{LoadOutcome, ResolveOutcome};
use crate::conversion::{
    build_summary, end_result, load_args, load_result, resolve_args, resolve_result, start_result,
};
use crate::plugin::Plugin;
use kite_engine::{
    FILE_NAMESPACE, Message as NativeMessage, OnLoadOptions, OnLoadResult, OnResolveOptions,
    OnResolveResult,
};
use std::sync::Arc;

/// What a resolve outcome asks the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveDisposition {
    /// No path and not external: try the next rule
    Continue,
    /// A path in the file namespace
    Resolved,
    /// Leave the import out of the bundle
    External,
    /// A path in a virtual namespace
    Redirect { namespace: String },
}

impl ResolveDisposition {
    /// Classify an outcome. Fails when `external` is combined with a
    /// namespace other than the file namespace.
    ///
    /// ```
    /// use kite_mobile::{ResolveDisposition, ResolveOutcome};
    ///
    /// assert_eq!(
    ///     ResolveDisposition::classify(&ResolveOutcome::external("react")),
    ///     Ok(ResolveDisposition::External)
    /// );
    /// assert!(ResolveDisposition::classify(&ResolveOutcome::resolved("x", true, "virtual")).is_err());
    /// ```
    pub fn classify(outcome: &ResolveOutcome) -> Result<Self, String> {
        let virtual_namespace =
            !outcome.namespace.is_empty() && outcome.namespace != FILE_NAMESPACE;
        match (outcome.external, virtual_namespace) {
            (true, true) => Err(format!(
                "an external module cannot also be placed in namespace \"{}\"",
                outcome.namespace
            )),
            (true, false) => Ok(ResolveDisposition::External),
            (false, _) if outcome.path.is_empty() => Ok(ResolveDisposition::Continue),
            (false, true) => Ok(ResolveDisposition::Redirect {
                namespace: outcome.namespace.clone(),
            }),
            (false, false) => Ok(ResolveDisposition::Resolved),
        }
    }
}

/// What a load outcome asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDisposition {
    /// No contents: try the next rule, then the file system
    Continue,
    /// Contents were supplied
    Provided,
}

impl LoadDisposition {
    pub fn classify(outcome: &LoadOutcome) -> Self {
        if outcome.contents.is_some() {
            LoadDisposition::Provided
        } else {
            LoadDisposition::Continue
        }
    }
}

/// Translate a plugin into the engine's native protocol.
///
/// The plugin is moved behind an `Arc`; host code cannot mutate it once a
/// build can see it. Rules with an empty pattern never match and are not
/// registered.
pub fn bridge(plugin: Plugin) -> kite_engine::Plugin {
    let plugin = Arc::new(plugin);
    let name = plugin.name().to_string();

    kite_engine::Plugin::new(name, move |build| {
        let plugin_name: Arc<str> = Arc::from(build.plugin_name());

        for rule in plugin.resolve_rules() {
            if !rule.filter.is_active() {
                tracing::debug!(plugin = %plugin_name, "skipping onResolve rule with an empty pattern");
                continue;
            }
            let callback = Arc::clone(&rule.callback);
            let plugin_name = Arc::clone(&plugin_name);
            let options = OnResolveOptions::new(rule.filter.pattern.as_str())
                .namespace(rule.filter.namespace.as_str());
            build.on_resolve(options, move |args| {
                let outcome = callback.call(&resolve_args(args));
                Ok(adapt_resolve(&plugin_name, &args.path, outcome))
            })?;
        }

        for rule in plugin.load_rules() {
            if !rule.filter.is_active() {
                tracing::debug!(plugin = %plugin_name, "skipping onLoad rule with an empty pattern");
                continue;
            }
            let callback = Arc::clone(&rule.callback);
            let options = OnLoadOptions::new(rule.filter.pattern.as_str())
                .namespace(rule.filter.namespace.as_str());
            build.on_load(options, move |args| {
                let outcome = callback.call(&load_args(args));
                Ok(adapt_load(outcome))
            })?;
        }

        if let Some(callback) = plugin.on_start() {
            let callback = Arc::clone(callback);
            build.on_start(move || Ok(start_result(callback.call())));
        }

        if let Some(callback) = plugin.on_end() {
            let callback = Arc::clone(callback);
            build.on_end(move |result| Ok(end_result(callback.call(&build_summary(result)))));
        }

        Ok(())
    })
}

/// Bridge several plugins, keeping their order. No rules are merged.
pub fn bridge_all(plugins: impl IntoIterator<Item = Plugin>) -> Vec<kite_engine::Plugin> {
    plugins.into_iter().map(bridge).collect()
}

fn adapt_resolve(
    plugin_name: &str,
    import_path: &str,
    outcome: ResolveOutcome,
) -> Option<OnResolveResult> {
    let has_diagnostics = !outcome.errors.is_empty() || !outcome.warnings.is_empty();
    match ResolveDisposition::classify(&outcome) {
        Ok(ResolveDisposition::Continue) if !has_diagnostics => None,
        Ok(_) => Some(resolve_result(outcome)),
        Err(reason) => {
            tracing::debug!(plugin = plugin_name, path = import_path, %reason, "rejecting resolve outcome");
            Some(OnResolveResult {
                plugin_name: plugin_name.to_string(),
                errors: vec![
                    NativeMessage::new(format!(
                        "Plugin \"{}\" returned an invalid result for \"{}\": {}",
                        plugin_name, import_path, reason
                    ))
                    .from_plugin(plugin_name),
                ],
                ..Default::default()
            })
        }
    }
}

fn adapt_load(outcome: LoadOutcome) -> Option<OnLoadResult> {
    let has_diagnostics = !outcome.errors.is_empty() || !outcome.warnings.is_empty();
    match LoadDisposition::classify(&outcome) {
        LoadDisposition::Continue if !has_diagnostics => None,
        _ => Some(load_result(outcome)),
    }
}
