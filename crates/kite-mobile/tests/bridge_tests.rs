//! End-to-end tests: boundary plugins driving real engine builds.

mod helpers;

use helpers::{CountingFileSystem, RecordingLoad, RecordingResolve, code, project_options};
use kite_mobile::{
    BridgeError, BuildOptions, BuildSummary, Builder, EndCallback, EndOutcome, Format, LoadFilter,
    LoadOutcome, Loader, Plugin, ResolveArgs, ResolveCallback, ResolveFilter, ResolveKind,
    ResolveOutcome, StartCallback, StartOutcome, StaticLoad, StaticResolve, bridge_all, presets,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct FailingEnd;

impl EndCallback for FailingEnd {
    fn call(&self, _summary: &BuildSummary) -> EndOutcome {
        EndOutcome::new().with_error("post-build check failed")
    }
}

/// Records the error count the build reported when it finished.
#[derive(Default)]
struct SeenErrors(AtomicUsize);

impl EndCallback for SeenErrors {
    fn call(&self, summary: &BuildSummary) -> EndOutcome {
        self.0.store(summary.error_count(), Ordering::SeqCst);
        EndOutcome::new()
    }
}

struct FailingStart;

impl StartCallback for FailingStart {
    fn call(&self) -> StartOutcome {
        StartOutcome::new().with_error("license server unreachable")
    }
}

/// Returns `external` together with a virtual namespace.
struct Contradiction;

impl ResolveCallback for Contradiction {
    fn call(&self, args: &ResolveArgs) -> ResolveOutcome {
        ResolveOutcome::resolved(args.path.clone(), true, "env")
    }
}

fn cjs_options() -> BuildOptions {
    let mut options = BuildOptions::new();
    options.format = Format::Cjs;
    options
}

#[test]
fn test_first_matching_rule_wins() {
    let first = RecordingResolve::returning(ResolveOutcome::redirect("dep", "first"));
    let second = RecordingResolve::returning(ResolveOutcome::redirect("dep", "second"));

    let mut a = Plugin::new("a").unwrap();
    a.on_resolve(ResolveFilter::path("^dep$"), Some(first.clone()))
        .unwrap();
    a.on_load(
        LoadFilter::namespace("first"),
        Some(Arc::new(StaticLoad::new("module.exports = 'from a';", Loader::Js))),
    )
    .unwrap();
    let mut b = Plugin::new("b").unwrap();
    b.on_resolve(ResolveFilter::path("^dep$"), Some(second.clone()))
        .unwrap();
    b.on_load(
        LoadFilter::namespace("second"),
        Some(Arc::new(StaticLoad::new("module.exports = 'from b';", Loader::Js))),
    )
    .unwrap();

    let mut options = cjs_options();
    options.add_plugin(a);
    options.add_plugin(b);
    let report = Builder::new(options).build_report("module.exports = require('dep');");

    let out = code(&report);
    assert!(out.contains("from a"));
    assert!(!out.contains("from b"));
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 0);
}

#[test]
fn test_deferring_rule_falls_through_to_the_next() {
    let defer = RecordingResolve::returning(ResolveOutcome::new());
    let mut plugin = Plugin::new("chain").unwrap();
    plugin
        .on_resolve(ResolveFilter::path("^dep$"), Some(defer.clone()))
        .unwrap()
        .on_resolve(
            ResolveFilter::path("^dep$"),
            Some(Arc::new(StaticResolve::redirect("virtual"))),
        )
        .unwrap();
    plugin
        .on_load(
            LoadFilter::namespace("virtual"),
            Some(Arc::new(StaticLoad::new("module.exports = 'second rule';", Loader::Js))),
        )
        .unwrap();

    let mut options = cjs_options();
    options.add_plugin(plugin);
    let report = Builder::new(options).build_report("require('dep');");

    assert!(code(&report).contains("second rule"));
    assert_eq!(defer.calls(), 1);
}

#[test]
fn test_resolve_events_carry_import_details() {
    let spy = RecordingResolve::returning(ResolveOutcome::new());
    let mut plugin = Plugin::new("spy").unwrap();
    plugin
        .on_resolve(ResolveFilter::path(".*"), Some(spy.clone()))
        .unwrap();

    let mut options = project_options(&[
        ("src/index.js", "import { one } from './dep.js';\nconsole.log(one);\n"),
        ("src/dep.js", "export const one = 1;\n"),
    ]);
    options.entry_points = vec!["./src/index.js".into()];
    options.add_plugin(plugin);
    let report = Builder::new(options).run().unwrap();
    assert!(report.code.contains("console.log(one)"));

    let seen = spy.seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].path, "./src/index.js");
    assert_eq!(seen[0].kind, ResolveKind::EntryPoint);
    assert_eq!(seen[0].importer, "");
    assert_eq!(seen[1].path, "./dep.js");
    assert_eq!(seen[1].importer, "/app/src/index.js");
    assert_eq!(seen[1].resolve_dir, "/app/src");
    assert_eq!(seen[1].namespace, "file");
    assert_eq!(seen[1].kind, ResolveKind::JsImportStatement);
}

#[test]
fn test_virtual_namespace_skips_the_file_system() {
    let counting = Arc::new(CountingFileSystem::default());
    let loads = RecordingLoad::returning(LoadOutcome::js("export default 'virtual-one';"));

    let mut plugin = Plugin::new("virtual").unwrap();
    plugin
        .on_resolve(
            ResolveFilter::path("^virtual:one$"),
            Some(Arc::new(StaticResolve::redirect("virtual"))),
        )
        .unwrap();
    plugin
        .on_load(LoadFilter::namespace("virtual"), Some(loads.clone()))
        .unwrap();

    let mut options = BuildOptions::new();
    options.working_dir = "/app".into();
    options.format = Format::Esm;
    options.set_file_system(counting.clone());
    options.add_plugin(plugin);
    let report = Builder::new(options)
        .build_report("import value from 'virtual:one';\nconsole.log(value);\n");

    let out = code(&report);
    assert!(out.contains("virtual-one"));
    assert_eq!(counting.reads(), 0);

    let seen = loads.seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "virtual:one");
    assert_eq!(seen[0].namespace, "virtual");
}

#[test]
fn test_external_rule_keeps_package_out_of_the_bundle() {
    let mut plugin = Plugin::new("externals").unwrap();
    plugin
        .on_resolve(
            ResolveFilter::path("^left-pad$"),
            Some(Arc::new(StaticResolve::external())),
        )
        .unwrap();

    let mut options = cjs_options();
    options.add_plugin(plugin);
    let out = Builder::new(options)
        .build("const pad = require('left-pad');\nmodule.exports = pad('x', 3);\n")
        .unwrap();

    assert!(out.contains("require(\"left-pad\")"));
    assert_eq!(out.matches("left-pad").count(), 1);
}

#[test]
fn test_on_end_error_adds_exactly_one() {
    let seen = Arc::new(SeenErrors::default());
    let mut observer = Plugin::new("observer").unwrap();
    observer.set_on_end(Some(seen.clone()));
    let mut checker = Plugin::new("checker").unwrap();
    checker.set_on_end(Some(Arc::new(FailingEnd)));

    let mut options = BuildOptions::new();
    options.add_plugin(observer);
    options.add_plugin(checker);
    let builder = Builder::new(options);

    let report = builder.build_report("console.log('ok');");
    assert_eq!(seen.0.load(Ordering::SeqCst), 0);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.errors[0].text, "post-build check failed");
    assert_eq!(report.errors[0].plugin_name, "checker");

    let report = builder.build_report("import './missing.js';");
    let before = seen.0.load(Ordering::SeqCst);
    assert_eq!(before, 1);
    assert_eq!(report.error_count(), before + 1);
}

#[test]
fn test_on_start_error_fails_the_build() {
    let mut plugin = Plugin::new("gate").unwrap();
    plugin.set_on_start(Some(Arc::new(FailingStart)));
    let mut options = BuildOptions::new();
    options.add_plugin(plugin);

    let err = Builder::new(options).build("console.log(1);").unwrap_err();
    match err {
        BridgeError::BuildFailed { summary, errors } => {
            assert_eq!(summary, "license server unreachable");
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].plugin_name, "gate");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_contradictory_outcome_is_one_error() {
    let mut plugin = Plugin::new("confused").unwrap();
    plugin
        .on_resolve(ResolveFilter::path("^cfg$"), Some(Arc::new(Contradiction)))
        .unwrap();
    let mut options = BuildOptions::new();
    options.add_plugin(plugin);

    let report = Builder::new(options).build_report("import 'cfg';");
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.errors[0].plugin_name, "confused");
    assert!(
        report.errors[0]
            .text
            .contains("returned an invalid result for \"cfg\""),
        "{}",
        report.errors[0].text
    );
}

#[test]
fn test_callback_diagnostics_are_attributed() {
    let mut plugin = Plugin::new("strict").unwrap();
    plugin
        .on_load(
            LoadFilter::path(r"\.js$"),
            Some(RecordingLoad::returning(
                LoadOutcome::new().with_warning("deprecated module"),
            )),
        )
        .unwrap();

    let mut options = project_options(&[("index.js", "export const x = 1;\n")]);
    options.entry_points = vec!["./index.js".into()];
    options.format = Format::Esm;
    options.add_plugin(plugin);
    let report = Builder::new(options).run().unwrap();

    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.warnings[0].text, "deprecated module");
    assert_eq!(report.warnings[0].plugin_name, "strict");
    assert!(report.code.contains("x = 1"));
    assert!(report.code.contains("export"));
}

#[test]
fn test_watch_files_reach_the_report() {
    let mut plugin = Plugin::new("watcher").unwrap();
    plugin
        .on_resolve(
            ResolveFilter::path("^cfg$"),
            Some(RecordingResolve::returning(
                ResolveOutcome::redirect("cfg", "cfg-ns").with_watch_file("/app/cfg.toml"),
            )),
        )
        .unwrap();
    plugin
        .on_load(
            LoadFilter::namespace("cfg-ns"),
            Some(RecordingLoad::returning(
                LoadOutcome::json("{\"port\": 8080}").with_watch_dir("/app/conf.d"),
            )),
        )
        .unwrap();

    let mut options = cjs_options();
    options.add_plugin(plugin);
    let report = Builder::new(options).build_report("module.exports = require('cfg').port;");

    assert!(code(&report).contains("8080"));
    assert!(report.watch_files.contains(&"/app/cfg.toml".to_string()));
    assert!(report.watch_dirs.contains(&"/app/conf.d".to_string()));
}

#[test]
fn test_invalid_filter_is_a_setup_error() {
    let mut plugin = Plugin::new("broken").unwrap();
    plugin
        .on_resolve(ResolveFilter::path("("), Some(Arc::new(StaticResolve::external())))
        .unwrap();
    let mut options = BuildOptions::new();
    options.add_plugin(plugin);

    let report = Builder::new(options).build_report("1;");
    assert!(!report.is_success());
    assert_eq!(report.errors[0].plugin_name, "broken");
    assert!(report.errors[0].text.contains("Invalid onResolve filter"));
}

#[test]
fn test_subscription_counts() {
    let empty = Plugin::new("empty").unwrap();
    let mut full = Plugin::new("full").unwrap();
    full.on_resolve(ResolveFilter::path(".*"), Some(Arc::new(StaticResolve::external())))
        .unwrap()
        .on_resolve(ResolveFilter::path(""), Some(Arc::new(StaticResolve::external())))
        .unwrap();
    full.on_load(
        LoadFilter::path(".*"),
        Some(Arc::new(StaticLoad::new("", Loader::Empty))),
    )
    .unwrap();
    full.set_on_start(Some(Arc::new(FailingStart)));
    full.set_on_end(Some(Arc::new(FailingEnd)));

    let native = kite_engine::BuildOptions::default();
    let summary = kite_engine::inspect_subscriptions(&bridge_all([empty]), &native).unwrap();
    assert_eq!(summary.total(), 0);

    // The empty-pattern rule is never registered
    let summary = kite_engine::inspect_subscriptions(&bridge_all([full]), &native).unwrap();
    assert_eq!(summary.on_resolve, 1);
    assert_eq!(summary.on_load, 1);
    assert_eq!(summary.on_start, 1);
    assert_eq!(summary.on_end, 1);
}

#[test]
fn test_react_global_preset() {
    let mut options = cjs_options();
    options.add_plugin(presets::react_global("React").unwrap());
    let out = Builder::new(options)
        .build("import React from 'react';\nmodule.exports = React.createElement;\n")
        .unwrap();

    assert!(out.contains("globalThis.React"));
    assert!(!out.contains("require(\"react\")"));
}

#[test]
fn test_externalize_node_modules_preset() {
    let mut options = project_options(&[(
        "index.js",
        "const _ = require('lodash');\nconst local = require('./local.js');\nmodule.exports = _.merge(local);\n",
    ), ("local.js", "module.exports = {};\n")]);
    options.entry_points = vec!["./index.js".into()];
    options.format = Format::Cjs;
    options.add_plugin(presets::externalize_node_modules().unwrap());
    let report = Builder::new(options).run().unwrap();

    assert!(report.code.contains("require(\"lodash\")"));
    assert!(report.code.contains("module.exports = {}"));
}

#[test]
fn test_simple_transform_preset() {
    let mut options = project_options(&[
        ("index.js", "import './theme.css';\nexport const ready = true;\n"),
        ("theme.css", "body { color: red; }\n"),
    ]);
    options.entry_points = vec!["./index.js".into()];
    options.format = Format::Esm;
    options.add_plugin(
        presets::simple_transform("no-css", r"\.css$", "", "", Loader::Empty).unwrap(),
    );
    let report = Builder::new(options).run().unwrap();

    assert!(!report.code.contains("color: red"));
    assert!(report.output_files.iter().all(|f| !f.path.ends_with(".css")));
}

#[test]
fn test_simple_transform_serves_a_virtual_module() {
    let counting = Arc::new(CountingFileSystem::default());
    let mut options = cjs_options();
    options.working_dir = "/app".into();
    options.set_file_system(counting.clone());
    options.add_plugin(
        presets::simple_transform("t", "^virtual-mod$", "virtual", "module.exports = 5;", Loader::Js)
            .unwrap(),
    );
    let out = Builder::new(options)
        .build("module.exports = require('virtual-mod') + 1;")
        .unwrap();

    assert!(out.contains("module.exports = 5"));
    assert!(!out.contains("require(\"virtual-mod\")"));
    assert_eq!(counting.reads(), 0);
}

#[test]
fn test_concurrent_builds_use_independent_plugins() {
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                scope.spawn(move || {
                    let mut plugin = Plugin::new(format!("worker-{i}")).unwrap();
                    plugin
                        .on_resolve(
                            ResolveFilter::path("^value$"),
                            Some(Arc::new(StaticResolve::redirect("value"))),
                        )
                        .unwrap();
                    plugin
                        .on_load(
                            LoadFilter::namespace("value"),
                            Some(Arc::new(StaticLoad::new(
                                format!("module.exports = {};", i * 100),
                                Loader::Js,
                            ))),
                        )
                        .unwrap();
                    let mut options = cjs_options();
                    options.add_plugin(plugin);
                    Builder::new(options).build("module.exports = require('value');")
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let out = handle.join().unwrap().unwrap();
            assert!(out.contains(&format!("module.exports = {};", i * 100)));
        }
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Within one plugin, only the first of several matching rules runs.
    #[test]
    fn test_only_the_first_matching_rule_runs(n in 2usize..6) {
        let rules: Vec<_> = (0..n)
            .map(|i| RecordingResolve::returning(ResolveOutcome::redirect("dep", format!("ns{i}"))))
            .collect();
        let mut plugin = Plugin::new("many").unwrap();
        for rule in &rules {
            plugin.on_resolve(ResolveFilter::path("^dep$"), Some(rule.clone())).unwrap();
        }
        for i in 0..n {
            plugin
                .on_load(
                    LoadFilter::namespace(format!("ns{i}")),
                    Some(Arc::new(StaticLoad::new(
                        format!("module.exports = 'rule-{i}';"),
                        Loader::Js,
                    ))),
                )
                .unwrap();
        }

        let mut options = cjs_options();
        options.add_plugin(plugin);
        let report = Builder::new(options).build_report("module.exports = require('dep');");

        let out = code(&report);
        prop_assert!(out.contains("rule-0"));
        prop_assert_eq!(rules[0].calls(), 1);
        for (i, rule) in rules.iter().enumerate().skip(1) {
            let marker = format!("rule-{i}");
            prop_assert!(!out.contains(&marker));
            prop_assert_eq!(rule.calls(), 0);
        }
    }
}
