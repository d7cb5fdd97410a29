//! Native plugin protocol.
//!
//! A [`Plugin`] is a name plus a setup closure. When a build starts, the
//! engine calls every plugin's setup in order with a [`PluginBuild`]; the
//! setup registers closures for the events it wants to observe:
//!
//! - `on_start` / `on_end`: once per build
//! - `on_resolve`: turning an import path into a module location
//! - `on_load`: producing the contents of a resolved module
//!
//! Resolve and load subscriptions are scoped by a regex `filter` matched
//! against the path and a `namespace`. An empty namespace matches only the
//! default [`FILE_NAMESPACE`].
//!
//! ```
//! use kite_engine::{OnResolveOptions, OnResolveResult, Plugin};
//!
//! let plugin = Plugin::new("externals", |build| {
//!     build.on_resolve(OnResolveOptions::new("^left-pad$"), |args| {
//!         Ok(Some(OnResolveResult {
//!             path: args.path.clone(),
//!             external: true,
//!             ..Default::default()
//!         }))
//!     })?;
//!     Ok(())
//! });
//! assert_eq!(plugin.name(), "externals");
//! ```

use crate::diagnostics::Message;
use crate::loader::Loader;
use crate::options::BuildOptions;
use crate::{BuildResult, Error};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Namespace of modules that live on the file system.
pub const FILE_NAMESPACE: &str = "file";

/// Why a resolve event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ResolveKind {
    #[default]
    None,
    EntryPoint,
    JsImportStatement,
    JsRequireCall,
    JsDynamicImport,
    JsRequireResolve,
    CssImportRule,
    CssComposesFrom,
    CssUrlToken,
}

impl ResolveKind {
    /// Every kind the engine raises, in declaration order.
    pub const ALL: [ResolveKind; 9] = [
        ResolveKind::None,
        ResolveKind::EntryPoint,
        ResolveKind::JsImportStatement,
        ResolveKind::JsRequireCall,
        ResolveKind::JsDynamicImport,
        ResolveKind::JsRequireResolve,
        ResolveKind::CssImportRule,
        ResolveKind::CssComposesFrom,
        ResolveKind::CssUrlToken,
    ];
}

/// Whether a module may be dropped when none of its exports are used.
///
/// `Unset` leaves the decision to the engine, which assumes side effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SideEffects {
    #[default]
    Unset,
    True,
    False,
}

impl SideEffects {
    pub fn has_side_effects(self) -> bool {
        !matches!(self, SideEffects::False)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnResolveOptions {
    pub filter: String,
    pub namespace: String,
}

impl OnResolveOptions {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            namespace: String::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OnResolveArgs {
    /// Import path as written in the importer
    pub path: String,
    /// Resolved path of the importing module (empty for entry points)
    pub importer: String,
    /// Namespace of the importing module
    pub namespace: String,
    pub resolve_dir: String,
    pub kind: ResolveKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OnResolveResult {
    pub plugin_name: String,
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,

    pub path: String,
    pub external: bool,
    pub side_effects: SideEffects,
    /// Target namespace (empty keeps `file`)
    pub namespace: String,
    pub suffix: String,

    pub watch_files: Vec<String>,
    pub watch_dirs: Vec<String>,
}

impl OnResolveResult {
    /// A result that neither resolves nor marks external only carries
    /// diagnostics; resolution moves on to the next subscription.
    pub fn is_resolved(&self) -> bool {
        !self.path.is_empty() || self.external
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnLoadOptions {
    pub filter: String,
    pub namespace: String,
}

impl OnLoadOptions {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            namespace: String::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OnLoadArgs {
    pub path: String,
    pub namespace: String,
    pub suffix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OnLoadResult {
    pub plugin_name: String,
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,

    /// `None` defers to the next subscription or the default loader
    pub contents: Option<String>,
    /// Directory imports inside the loaded module resolve against
    pub resolve_dir: String,
    pub loader: Loader,

    pub watch_files: Vec<String>,
    pub watch_dirs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OnStartResult {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OnEndResult {
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
}

pub type StartCallback = Arc<dyn Fn() -> anyhow::Result<OnStartResult> + Send + Sync>;
pub type EndCallback = Arc<dyn Fn(&BuildResult) -> anyhow::Result<OnEndResult> + Send + Sync>;
pub type ResolveCallback =
    Arc<dyn Fn(&OnResolveArgs) -> anyhow::Result<Option<OnResolveResult>> + Send + Sync>;
pub type LoadCallback =
    Arc<dyn Fn(&OnLoadArgs) -> anyhow::Result<Option<OnLoadResult>> + Send + Sync>;

type SetupFn = Arc<dyn Fn(&mut PluginBuild<'_>) -> anyhow::Result<()> + Send + Sync>;

/// A named setup function.
#[derive(Clone)]
pub struct Plugin {
    name: String,
    setup: SetupFn,
}

impl Plugin {
    pub fn new<F>(name: impl Into<String>, setup: F) -> Self
    where
        F: Fn(&mut PluginBuild<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            setup: Arc::new(setup),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin").field("name", &self.name).finish()
    }
}

/// Handle passed to a plugin's setup function.
pub struct PluginBuild<'a> {
    plugin_name: Arc<str>,
    options: &'a BuildOptions,
    subscriptions: &'a mut Subscriptions,
}

impl PluginBuild<'_> {
    /// Name of the plugin being set up.
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Options of the build the plugin is attached to.
    pub fn initial_options(&self) -> &BuildOptions {
        self.options
    }

    pub fn on_start<F>(&mut self, callback: F)
    where
        F: Fn() -> anyhow::Result<OnStartResult> + Send + Sync + 'static,
    {
        self.subscriptions.start.push(Subscription {
            plugin_name: Arc::clone(&self.plugin_name),
            scope: None,
            callback: Arc::new(callback),
        });
    }

    pub fn on_end<F>(&mut self, callback: F)
    where
        F: Fn(&BuildResult) -> anyhow::Result<OnEndResult> + Send + Sync + 'static,
    {
        self.subscriptions.end.push(Subscription {
            plugin_name: Arc::clone(&self.plugin_name),
            scope: None,
            callback: Arc::new(callback),
        });
    }

    /// Subscribe to resolve events whose path matches `options.filter`.
    ///
    /// Fails if the filter is not a valid regular expression.
    pub fn on_resolve<F>(&mut self, options: OnResolveOptions, callback: F) -> anyhow::Result<()>
    where
        F: Fn(&OnResolveArgs) -> anyhow::Result<Option<OnResolveResult>> + Send + Sync + 'static,
    {
        let scope = Scope::compile(&options.filter, options.namespace, "onResolve")?;
        self.subscriptions.resolve.push(Subscription {
            plugin_name: Arc::clone(&self.plugin_name),
            scope: Some(scope),
            callback: Arc::new(callback),
        });
        Ok(())
    }

    /// Subscribe to load events whose path matches `options.filter`.
    pub fn on_load<F>(&mut self, options: OnLoadOptions, callback: F) -> anyhow::Result<()>
    where
        F: Fn(&OnLoadArgs) -> anyhow::Result<Option<OnLoadResult>> + Send + Sync + 'static,
    {
        let scope = Scope::compile(&options.filter, options.namespace, "onLoad")?;
        self.subscriptions.load.push(Subscription {
            plugin_name: Arc::clone(&self.plugin_name),
            scope: Some(scope),
            callback: Arc::new(callback),
        });
        Ok(())
    }
}

/// Filter and namespace a subscription is restricted to.
#[derive(Debug)]
pub(crate) struct Scope {
    filter: Regex,
    namespace: String,
}

impl Scope {
    fn compile(filter: &str, namespace: String, hook: &str) -> anyhow::Result<Self> {
        let filter = Regex::new(filter)
            .map_err(|e| anyhow::anyhow!("Invalid {} filter {:?}: {}", hook, filter, e))?;
        Ok(Self { filter, namespace })
    }

    pub fn matches(&self, path: &str, namespace: &str) -> bool {
        let namespace_matches = if self.namespace.is_empty() {
            namespace == FILE_NAMESPACE
        } else {
            self.namespace == namespace
        };
        namespace_matches && self.filter.is_match(path)
    }
}

pub(crate) struct Subscription<C> {
    pub plugin_name: Arc<str>,
    pub scope: Option<Scope>,
    pub callback: C,
}

impl<C> Subscription<C> {
    pub fn matches(&self, path: &str, namespace: &str) -> bool {
        self.scope
            .as_ref()
            .is_none_or(|scope| scope.matches(path, namespace))
    }
}

/// Every callback registered by the plugins of one build, in registration
/// order.
#[derive(Default)]
pub(crate) struct Subscriptions {
    pub start: Vec<Subscription<StartCallback>>,
    pub end: Vec<Subscription<EndCallback>>,
    pub resolve: Vec<Subscription<ResolveCallback>>,
    pub load: Vec<Subscription<LoadCallback>>,
}

impl Subscriptions {
    /// Run each plugin's setup in order.
    ///
    /// A failing setup is reported as an error attributed to its plugin;
    /// the remaining plugins are still set up so every problem is reported
    /// at once.
    pub fn setup(plugins: &[Plugin], options: &BuildOptions) -> (Self, Vec<Message>) {
        let mut subscriptions = Subscriptions::default();
        let mut errors = Vec::new();

        for plugin in plugins {
            let mut build = PluginBuild {
                plugin_name: Arc::from(plugin.name.as_str()),
                options,
                subscriptions: &mut subscriptions,
            };
            if let Err(err) = (plugin.setup)(&mut build) {
                errors.push(Message::new(format!("{:#}", err)).from_plugin(plugin.name.clone()));
            }
            tracing::debug!(plugin = %plugin.name, "plugin setup complete");
        }

        (subscriptions, errors)
    }

    pub fn summary(&self) -> SubscriptionSummary {
        SubscriptionSummary {
            on_start: self.start.len(),
            on_end: self.end.len(),
            on_resolve: self.resolve.len(),
            on_load: self.load.len(),
        }
    }
}

/// Number of native subscriptions registered by a set of plugins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubscriptionSummary {
    pub on_start: usize,
    pub on_end: usize,
    pub on_resolve: usize,
    pub on_load: usize,
}

impl SubscriptionSummary {
    pub fn total(&self) -> usize {
        self.on_start + self.on_end + self.on_resolve + self.on_load
    }
}

/// Run plugin setup without building and report what was registered.
pub fn inspect_subscriptions(
    plugins: &[Plugin],
    options: &BuildOptions,
) -> Result<SubscriptionSummary, Error> {
    let (subscriptions, errors) = Subscriptions::setup(plugins, options);
    if let Some(first) = errors.into_iter().next() {
        return Err(Error::PluginSetup {
            plugin: first.plugin_name,
            message: first.text,
        });
    }
    Ok(subscriptions.summary())
}
