//! Ready-made plugins for common setups.

use crate::builders::ResolveOutcome;
use crate::callbacks::{ResolveArgs, ResolveCallback, StaticLoad, StaticResolve};
use crate::error::Result;
use crate::filter::{LoadFilter, ResolveFilter, filters, namespaces};
use crate::plugin::Plugin;
use crate::types::{Loader, ResolveKind};
use std::sync::Arc;

/// Serve `contents` for every import matching `pattern`.
///
/// With a namespace, matching imports are redirected into it and every module
/// there loads `contents`, so the module never touches the file system. With
/// an empty namespace the rule applies to matching files on disk.
///
/// ```
/// use kite_mobile::{Loader, presets};
///
/// let plugin = presets::simple_transform("stub-css", r"\.css$", "", "", Loader::Empty).unwrap();
/// assert_eq!(plugin.resolve_rule_count(), 0);
/// assert_eq!(plugin.load_rule_count(), 1);
///
/// let plugin =
///     presets::simple_transform("t", "^virtual-mod$", "virtual", "module.exports = 5;", Loader::Js)
///         .unwrap();
/// assert_eq!(plugin.resolve_rule_count(), 1);
/// assert_eq!(plugin.load_rule(0).unwrap().filter.namespace, "virtual");
/// ```
pub fn simple_transform(
    name: impl Into<String>,
    pattern: impl Into<String>,
    namespace: impl Into<String>,
    contents: impl Into<String>,
    loader: Loader,
) -> Result<Plugin> {
    let (pattern, namespace) = (pattern.into(), namespace.into());
    let mut plugin = Plugin::new(name)?;
    let filter = if namespace.is_empty() {
        LoadFilter::path(pattern)
    } else {
        plugin.on_resolve(
            ResolveFilter::path(pattern),
            Some(Arc::new(StaticResolve::redirect(namespace.clone()))),
        )?;
        LoadFilter::namespace(namespace)
    };
    plugin.on_load(filter, Some(Arc::new(StaticLoad::new(contents, loader))))?;
    Ok(plugin)
}

/// Replace `import React from "react"` with the page's `global_name` global.
pub fn react_global(global_name: &str) -> Result<Plugin> {
    let mut plugin = Plugin::new("react-global")?;
    plugin.on_resolve(
        ResolveFilter::path("^react$"),
        Some(Arc::new(StaticResolve::redirect(namespaces::GLOBAL_EXTERNAL))),
    )?;
    plugin.on_load(
        LoadFilter::namespace(namespaces::GLOBAL_EXTERNAL),
        Some(Arc::new(StaticLoad::new(
            format!("module.exports = globalThis.{};", global_name),
            Loader::Js,
        ))),
    )?;
    Ok(plugin)
}

/// Mark every bare import (a package name) as external.
pub fn externalize_node_modules() -> Result<Plugin> {
    let mut plugin = Plugin::new("externalize-node-modules")?;
    plugin.on_resolve(
        ResolveFilter::path(filters::BARE_IMPORTS),
        Some(Arc::new(ExternalizeBare)),
    )?;
    Ok(plugin)
}

/// Entry points are never external, even when written without `./`.
struct ExternalizeBare;

impl ResolveCallback for ExternalizeBare {
    fn call(&self, args: &ResolveArgs) -> ResolveOutcome {
        if args.kind == ResolveKind::EntryPoint {
            return ResolveOutcome::new();
        }
        ResolveOutcome::external(args.path.clone())
    }
}
