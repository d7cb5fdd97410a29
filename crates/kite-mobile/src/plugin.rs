//! The Plugin aggregate: ordered rules plus optional lifecycle callbacks.

use crate::callbacks::{EndCallback, LoadCallback, ResolveCallback, StartCallback};
use crate::error::{BridgeError, Result};
use crate::filter::{LoadFilter, ResolveFilter};
use std::sync::Arc;

/// A resolve filter and the callback it guards.
#[derive(Clone)]
pub struct ResolveRule {
    pub filter: ResolveFilter,
    pub callback: Arc<dyn ResolveCallback>,
}

/// A load filter and the callback it guards.
#[derive(Clone)]
pub struct LoadRule {
    pub filter: LoadFilter,
    pub callback: Arc<dyn LoadCallback>,
}

impl std::fmt::Debug for ResolveRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveRule")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LoadRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadRule")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// A named set of hooks.
///
/// Rules fire in registration order. Once a plugin is attached to a build it
/// is moved behind an `Arc` and no longer mutable.
///
/// ```
/// use kite_mobile::{Plugin, ResolveFilter, StaticResolve};
/// use std::sync::Arc;
///
/// let mut plugin = Plugin::new("externals").unwrap();
/// plugin
///     .on_resolve(ResolveFilter::path("^left-pad$"), Some(Arc::new(StaticResolve::external())))
///     .unwrap();
/// assert_eq!(plugin.resolve_rule_count(), 1);
/// assert!(plugin.resolve_rule(1).is_none());
/// ```
#[derive(Clone)]
pub struct Plugin {
    name: String,
    resolve_rules: Vec<ResolveRule>,
    load_rules: Vec<LoadRule>,
    on_start: Option<Arc<dyn StartCallback>>,
    on_end: Option<Arc<dyn EndCallback>>,
}

impl Plugin {
    /// Create an empty plugin. Fails if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(BridgeError::EmptyPluginName);
        }
        Ok(Self {
            name,
            resolve_rules: Vec::new(),
            load_rules: Vec::new(),
            on_start: None,
            on_end: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(BridgeError::EmptyPluginName);
        }
        self.name = name;
        Ok(())
    }

    /// Append a resolve rule. Fails only when `callback` is `None`.
    pub fn on_resolve(
        &mut self,
        filter: ResolveFilter,
        callback: Option<Arc<dyn ResolveCallback>>,
    ) -> Result<&mut Self> {
        let Some(callback) = callback else {
            return Err(BridgeError::MissingCallback {
                plugin: self.name.clone(),
                hook: "onResolve",
                pattern: filter.pattern,
            });
        };
        self.resolve_rules.push(ResolveRule { filter, callback });
        Ok(self)
    }

    /// Append a load rule. Fails only when `callback` is `None`.
    pub fn on_load(
        &mut self,
        filter: LoadFilter,
        callback: Option<Arc<dyn LoadCallback>>,
    ) -> Result<&mut Self> {
        let Some(callback) = callback else {
            return Err(BridgeError::MissingCallback {
                plugin: self.name.clone(),
                hook: "onLoad",
                pattern: filter.pattern,
            });
        };
        self.load_rules.push(LoadRule { filter, callback });
        Ok(self)
    }

    /// Replace the start callback; `None` clears it.
    pub fn set_on_start(&mut self, callback: Option<Arc<dyn StartCallback>>) {
        self.on_start = callback;
    }

    /// Replace the end callback; `None` clears it.
    pub fn set_on_end(&mut self, callback: Option<Arc<dyn EndCallback>>) {
        self.on_end = callback;
    }

    pub fn resolve_rule_count(&self) -> usize {
        self.resolve_rules.len()
    }

    pub fn load_rule_count(&self) -> usize {
        self.load_rules.len()
    }

    /// The rule at `index`, or `None` when out of range.
    pub fn resolve_rule(&self, index: usize) -> Option<&ResolveRule> {
        self.resolve_rules.get(index)
    }

    pub fn load_rule(&self, index: usize) -> Option<&LoadRule> {
        self.load_rules.get(index)
    }

    pub fn resolve_rules(&self) -> &[ResolveRule] {
        &self.resolve_rules
    }

    pub fn load_rules(&self) -> &[LoadRule] {
        &self.load_rules
    }

    pub fn on_start(&self) -> Option<&Arc<dyn StartCallback>> {
        self.on_start.as_ref()
    }

    pub fn on_end(&self) -> Option<&Arc<dyn EndCallback>> {
        self.on_end.as_ref()
    }

    pub fn has_on_start(&self) -> bool {
        self.on_start.is_some()
    }

    pub fn has_on_end(&self) -> bool {
        self.on_end.is_some()
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("resolve_rules", &self.resolve_rules)
            .field("load_rules", &self.load_rules)
            .field("has_on_start", &self.has_on_start())
            .field("has_on_end", &self.has_on_end())
            .finish()
    }
}
