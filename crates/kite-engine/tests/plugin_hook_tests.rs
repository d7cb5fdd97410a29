//! Plugin hook ordering and result handling

mod helpers;

use helpers::{CountingFileSystem, js, memory_project, project_options};
use kite_engine::{
    BuildOptions, Format, Message, OnEndResult, OnLoadOptions, OnLoadResult, OnResolveOptions,
    OnResolveResult, OnStartResult, Plugin, ResolveKind, SideEffects, build,
    inspect_subscriptions,
};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

fn resolve_to(name: &'static str, filter: &'static str, path: &'static str) -> Plugin {
    Plugin::new(name, move |build| {
        build.on_resolve(OnResolveOptions::new(filter), move |_| {
            Ok(Some(OnResolveResult {
                path: path.to_string(),
                ..Default::default()
            }))
        })
    })
}

#[test]
fn test_first_plugin_to_resolve_wins() {
    let fs = memory_project(&[
        ("index.js", "import './target';\n"),
        ("first.js", "console.log('from-first');\n"),
        ("second.js", "console.log('from-second');\n"),
    ]);
    let result = build(
        &project_options("./index.js", fs)
            .plugin(resolve_to("first", "^\\./target$", "/app/first.js"))
            .plugin(resolve_to("second", "^\\./target$", "/app/second.js")),
    );
    let out = js(&result);

    assert!(out.contains("from-first"));
    assert!(!out.contains("from-second"));
}

#[test]
fn test_empty_result_falls_through_and_keeps_warnings() {
    let fs = memory_project(&[
        ("index.js", "import './dep.js';\n"),
        ("dep.js", "console.log('dep-loaded');\n"),
    ]);
    let plugin = Plugin::new("observer", |build| {
        build.on_resolve(OnResolveOptions::new("dep"), |_| {
            Ok(Some(OnResolveResult {
                warnings: vec![Message::new("saw dep")],
                ..Default::default()
            }))
        })
    });
    let result = build(&project_options("./index.js", fs).plugin(plugin));

    assert!(result.is_success(), "{:?}", result.errors);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].text, "saw dep");
    assert_eq!(result.warnings[0].plugin_name, "observer");
    assert!(js(&result).contains("dep-loaded"));
}

#[test]
fn test_resolve_args_describe_the_import() {
    let fs = memory_project(&[
        ("src/index.js", "const d = require('./dep');\nimport('./lazy.js');\n"),
        ("src/dep.js", "module.exports = 1;\n"),
        ("src/lazy.js", "export default 2;\n"),
    ]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    let plugin = Plugin::new("spy", move |build| {
        let record = Arc::clone(&record);
        build.on_resolve(OnResolveOptions::new(".*"), move |args| {
            record.lock().push((
                args.path.clone(),
                args.importer.clone(),
                args.resolve_dir.clone(),
                args.kind,
            ));
            Ok(None)
        })
    });
    let result = build(
        &project_options("./src/index.js", fs)
            .format(Format::Esm)
            .outdir("dist")
            .plugin(plugin),
    );
    assert!(result.is_success(), "{:?}", result.errors);

    let mut seen = seen.lock().clone();
    seen.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        seen,
        vec![
            (
                "./dep".to_string(),
                "/app/src/index.js".to_string(),
                "/app/src".to_string(),
                ResolveKind::JsRequireCall
            ),
            (
                "./lazy.js".to_string(),
                "/app/src/index.js".to_string(),
                "/app/src".to_string(),
                ResolveKind::JsDynamicImport
            ),
            ("./src/index.js".to_string(), String::new(), "/app".to_string(), ResolveKind::EntryPoint),
        ]
    );
}

#[test]
fn test_virtual_namespace_never_touches_the_file_system() {
    let counting = Arc::new(CountingFileSystem::default());
    let plugin = Plugin::new("virtual", |build| {
        build.on_resolve(OnResolveOptions::new("^virtual:"), |args| {
            Ok(Some(OnResolveResult {
                path: args.path.trim_start_matches("virtual:").to_string(),
                namespace: "virtual".to_string(),
                ..Default::default()
            }))
        })?;
        build.on_load(OnLoadOptions::new(".*").namespace("virtual"), |args| {
            Ok(Some(OnLoadResult {
                contents: Some(format!("export default {:?};", args.path)),
                ..Default::default()
            }))
        })
    });
    let options = BuildOptions::new("virtual:entry")
        .working_dir("/app")
        .format(Format::Esm)
        .fs(counting.clone())
        .plugin(plugin);
    let result = build(&options);
    let out = js(&result);

    assert!(out.contains("\"entry\""), "output: {}", out);
    assert_eq!(counting.reads(), 0);
    assert!(result.watch_files.is_empty());
}

#[test]
fn test_unhandled_namespace_cannot_be_loaded() {
    let fs = memory_project(&[("index.js", "import 'env';\n")]);
    let plugin = Plugin::new("env", |build| {
        build.on_resolve(OnResolveOptions::new("^env$"), |args| {
            Ok(Some(OnResolveResult {
                path: args.path.clone(),
                namespace: "env-ns".to_string(),
                ..Default::default()
            }))
        })
    });
    let result = build(&project_options("./index.js", fs).plugin(plugin));

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].text, "Do not know how to load path: env-ns:env");
}

#[test]
fn test_non_absolute_file_path_is_rejected() {
    let fs = memory_project(&[("index.js", "import 'thing';\n")]);
    let result = build(&project_options("./index.js", fs).plugin(resolve_to(
        "relative",
        "^thing$",
        "thing.js",
    )));

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].text.contains("non-absolute path: thing.js"));
    assert_eq!(result.errors[0].plugin_name, "relative");
}

#[test]
fn test_plugin_external_keeps_import() {
    let fs = memory_project(&[("index.js", "import pad from 'left-pad';\npad();\n")]);
    let plugin = Plugin::new("externals", |build| {
        build.on_resolve(OnResolveOptions::new("^left-pad$"), |_| {
            Ok(Some(OnResolveResult {
                external: true,
                ..Default::default()
            }))
        })
    });
    let result = build(
        &project_options("./index.js", fs)
            .format(Format::Esm)
            .plugin(plugin),
    );
    let out = js(&result);

    assert!(out.contains("from \"left-pad\""), "output: {}", out);
}

#[test]
fn test_side_effects_hint_is_accepted() {
    let fs = memory_project(&[
        ("index.js", "import './pure.js';\n"),
        ("pure.js", "console.log('pure');\n"),
    ]);
    let plugin = Plugin::new("pure", |build| {
        build.on_resolve(OnResolveOptions::new("pure"), |_| {
            Ok(Some(OnResolveResult {
                path: "/app/pure.js".to_string(),
                side_effects: SideEffects::False,
                ..Default::default()
            }))
        })
    });
    let result = build(&project_options("./index.js", fs).plugin(plugin));

    // Whether the module is dropped is up to rolldown's tree shaking
    assert!(result.is_success(), "{:?}", result.errors);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_load_result_sets_loader_and_watch_files() {
    let fs = memory_project(&[("index.js", "import data from './data.yaml';\nconsole.log(data);\n")]);
    let plugin = Plugin::new("yaml", |build| {
        build.on_load(OnLoadOptions::new("\\.yaml$"), |args| {
            Ok(Some(OnLoadResult {
                contents: Some("{\"parsed\": true}".to_string()),
                loader: kite_engine::Loader::Json,
                watch_files: vec![args.path.clone()],
                ..Default::default()
            }))
        })
    });
    fs.add_file("/app/data.yaml", "parsed: true\n");
    let result = build(&project_options("./index.js", fs).plugin(plugin));
    let out = js(&result);

    assert!(out.contains("parsed"));
    assert!(result.watch_files.contains(&"/app/data.yaml".to_string()));
}

#[test]
fn test_resolve_error_stops_resolution() {
    let fs = memory_project(&[("index.js", "import 'forbidden';\n")]);
    let plugin = Plugin::new("guard", |build| {
        build.on_resolve(OnResolveOptions::new("^forbidden$"), |_| {
            Ok(Some(OnResolveResult {
                errors: vec![Message::new("not allowed")],
                ..Default::default()
            }))
        })
    });
    let result = build(&project_options("./index.js", fs).plugin(plugin));

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].text, "not allowed");
    assert_eq!(result.errors[0].plugin_name, "guard");
}

#[test]
fn test_callback_error_is_reported_against_plugin() {
    let fs = memory_project(&[("index.js", "import 'x';\n")]);
    let plugin = Plugin::new("broken", |build| {
        build.on_resolve(OnResolveOptions::new("^x$"), |_| {
            anyhow::bail!("callback exploded")
        })
    });
    let result = build(&project_options("./index.js", fs).plugin(plugin));

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].text, "callback exploded");
    assert_eq!(result.errors[0].plugin_name, "broken");
}

#[test]
fn test_on_start_error_skips_the_build() {
    let fs = memory_project(&[("index.js", "1;\n")]);
    let ended = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&ended);
    let plugin = Plugin::new("gate", move |build| {
        build.on_start(|| {
            Ok(OnStartResult {
                errors: vec![Message::new("not today")],
                ..Default::default()
            })
        });
        let flag = Arc::clone(&flag);
        build.on_end(move |_| {
            *flag.lock() = true;
            Ok(OnEndResult::default())
        });
        Ok(())
    });
    let result = build(&project_options("./index.js", fs).plugin(plugin));

    assert_eq!(result.errors.len(), 1);
    assert!(result.output_files.is_empty());
    assert!(*ended.lock(), "on_end runs even when the build fails");
}

#[test]
fn test_on_end_sees_result_and_can_add_errors() {
    let fs = memory_project(&[("index.js", "1;\n")]);
    let plugin = Plugin::new("audit", |build| {
        build.on_end(|result| {
            let errors = if result.output_files.len() == 1 {
                vec![Message::new("audit failed")]
            } else {
                Vec::new()
            };
            Ok(OnEndResult {
                errors,
                ..Default::default()
            })
        });
        Ok(())
    });
    let result = build(&project_options("./index.js", fs).plugin(plugin));

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].text, "audit failed");
    assert_eq!(result.errors[0].plugin_name, "audit");
}

#[test]
fn test_invalid_filter_fails_setup() {
    let plugin = Plugin::new("bad-filter", |build| {
        build.on_resolve(OnResolveOptions::new("("), |_| Ok(None))
    });
    let options = BuildOptions::new("./index.js").plugin(plugin);

    let result = build(&options);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].plugin_name, "bad-filter");

    let err = inspect_subscriptions(&options.plugins, &options).unwrap_err();
    assert!(err.to_string().contains("bad-filter"));
}

#[test]
fn test_zero_subscriptions() {
    let options = BuildOptions::new("./index.js").plugin(Plugin::new("noop", |_| Ok(())));
    let summary = inspect_subscriptions(&options.plugins, &options).unwrap();
    assert_eq!(summary.total(), 0);
}

#[test]
fn test_setup_sees_initial_options() {
    let seen = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen);
    let plugin = Plugin::new("inspect", move |build| {
        *record.lock() = Some((build.plugin_name().to_string(), build.initial_options().format));
        Ok(())
    });
    let options = BuildOptions::new("./index.js")
        .format(Format::Cjs)
        .plugin(plugin);
    inspect_subscriptions(&options.plugins, &options).unwrap();

    assert_eq!(*seen.lock(), Some(("inspect".to_string(), Format::Cjs)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_filter_scopes_resolve_calls(name in "[a-z]{1,8}") {
        let calls = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&calls);
        let plugin = Plugin::new("scoped", move |build| {
            let counter = Arc::clone(&counter);
            build.on_resolve(OnResolveOptions::new("^pkg-"), move |_| {
                *counter.lock() += 1;
                Ok(None)
            })
        });
        let source = format!("import 'pkg-{0}';\nimport '{0}';\n", name);
        let fs = memory_project(&[("index.js", source.as_str())]);
        let result = build(
            &project_options("./index.js", fs)
                .external([format!("pkg-{}", name), name.clone()])
                .plugin(plugin),
        );
        prop_assert!(result.is_success());
        prop_assert_eq!(*calls.lock(), 1);
    }
}
