//! 플러그인 시스템 통합 테스트 - 레지스트리 + 이벤트 버스 + 컨텍스트
//!
//! `cargo test -p hub-core --test plugin_system`

use hub_core::event::contracts::{
    CourseCreated, CoursePayload, NotificationLevel, NotificationPayload, NotificationShow,
};
use hub_core::{
    component_fn, Error, EventBus, EventContract, HubConfig, HubContext, PluginDescriptor,
    PluginRegistry, PluginState, Props, Result,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn plugin(id: &str) -> PluginDescriptor {
    PluginDescriptor::new(id, id).with_component(component_fn(|ctx| Ok(ctx.plugin_id.to_string())))
}

#[test]
fn test_reregistration_returns_second_descriptor() {
    let registry = PluginRegistry::new();
    registry.register(plugin("classroom").with_icon("first")).unwrap();
    registry.register(plugin("classroom").with_icon("second")).unwrap();

    assert_eq!(registry.get("classroom").unwrap().icon, "second");
    assert_eq!(registry.all_plugins().len(), 1);
}

#[test]
fn test_plugins_sorted_by_order() {
    let registry = PluginRegistry::new();
    for (id, order) in [("c", 3), ("a", 1), ("b", 2)] {
        registry.register(plugin(id).with_order(order)).unwrap();
    }

    let orders: Vec<i32> = registry.all_plugins().iter().map(|d| d.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[test]
fn test_missing_dependency_blocks_install() {
    let registry = PluginRegistry::new();
    registry
        .register(plugin("classroom").with_dependency("course-builder"))
        .unwrap();

    let err = registry.install("classroom").unwrap_err();

    match &err {
        Error::MissingDependency { dependency, .. } => assert_eq!(dependency, "course-builder"),
        other => panic!("unexpected: {:?}", other),
    }
    assert!(err.is_user_facing());
    assert!(!registry.is_installed("classroom"));
}

#[test]
fn test_dependency_installed_implicitly() {
    let registry = PluginRegistry::new();
    registry.register(plugin("course-builder")).unwrap();
    registry
        .register(plugin("classroom").with_dependency("course-builder"))
        .unwrap();

    registry.install("classroom").unwrap();

    assert!(registry.is_installed("course-builder"));
    assert!(registry.is_installed("classroom"));
    assert_eq!(
        registry.installation_order(),
        vec!["course-builder", "classroom"]
    );
}

#[test]
fn test_explicit_preinstall_is_harmless() {
    let registry = PluginRegistry::new();
    registry.register(plugin("course-builder")).unwrap();
    registry
        .register(plugin("classroom").with_dependency("course-builder"))
        .unwrap();

    registry.install("course-builder").unwrap();
    assert_eq!(registry.install("classroom").unwrap(), vec!["classroom"]);
}

#[test]
fn test_history_keeps_latest_hundred() {
    let bus = EventBus::new();
    for i in 0..105 {
        bus.emit(format!("test:event-{}", i), json!({ "n": i }));
    }

    let history = bus.history();
    assert_eq!(history.len(), 100);
    for i in 0..5 {
        let name = format!("test:event-{}", i);
        assert!(history.iter().all(|e| e.name != name));
    }
}

#[test]
fn test_throwing_listener_isolated() {
    let bus = EventBus::new();
    let second = Arc::new(AtomicUsize::new(0));

    bus.on("x", |_| Err(Error::Internal("first listener fails".into())));
    let s = second.clone();
    bus.on("x", move |_| {
        s.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    bus.emit("x", Value::Null);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unsubscribe_precision() {
    let bus = EventBus::new();
    let fired = Arc::new(Mutex::new(Vec::new()));

    let f = fired.clone();
    let l1 = bus.on("x", move |_| {
        f.lock().push("L1");
        Ok(())
    });
    let f = fired.clone();
    let _l2 = bus.on("x", move |_| {
        f.lock().push("L2");
        Ok(())
    });

    l1.unsubscribe();
    bus.emit("x", Value::Null);

    assert_eq!(*fired.lock(), vec!["L2"]);
}

#[test]
fn test_unknown_install_leaves_state() {
    let registry = PluginRegistry::new();
    registry.register(plugin("feed")).unwrap();
    registry.install("feed").unwrap();

    assert!(matches!(
        registry.install("does-not-exist"),
        Err(Error::UnknownPlugin(_))
    ));
    assert_eq!(registry.installation_order(), vec!["feed"]);
    assert_eq!(registry.state("does-not-exist"), PluginState::Unregistered);
}

#[test]
fn test_install_many_continues_after_failure() {
    let registry = PluginRegistry::new();
    registry.register(plugin("feed")).unwrap();
    registry
        .register(plugin("classroom").with_dependency("course-builder"))
        .unwrap();
    registry.register(plugin("calendar")).unwrap();

    let report = registry.install_many(["feed", "classroom", "calendar"]);

    assert_eq!(report.installed, vec!["feed", "calendar"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "classroom");
    assert!(!registry.is_installed("classroom"));
}

#[test]
fn test_cross_plugin_notification_flow() -> Result<()> {
    let ctx = HubContext::new(HubConfig::default());
    let toasts: Arc<Mutex<Vec<NotificationPayload>>> = Arc::new(Mutex::new(Vec::new()));
    let timeline: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    // 알림 플러그인: course:created -> notification:show
    let bus = Arc::downgrade(ctx.bus());
    ctx.bus().on_typed::<CourseCreated, _>(move |course, _| {
        if let Some(bus) = bus.upgrade() {
            bus.emit_typed::<NotificationShow>(
                &NotificationPayload::new(
                    format!("New course: {}", course.title),
                    NotificationLevel::Success,
                ),
                Some("notifications"),
            )?;
        }
        Ok(())
    });

    let t = toasts.clone();
    ctx.bus().on_typed::<NotificationShow, _>(move |toast, _| {
        t.lock().push(toast.clone());
        Ok(())
    });

    // 인스펙터: 와일드카드 채널
    let tl = timeline.clone();
    ctx.bus().on_any(move |event| {
        tl.lock().push(event.name.clone());
        Ok(())
    });

    ctx.bus().emit_typed::<CourseCreated>(
        &CoursePayload {
            course_id: "c-1".into(),
            title: "Rust 101".into(),
            author_id: Some("u-1".into()),
        },
        Some("course-builder"),
    )?;

    let toasts = toasts.lock();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "New course: Rust 101");

    // 중첩 emit은 부모 emit의 와일드카드 알림보다 먼저 끝남
    assert_eq!(
        *timeline.lock(),
        vec![NotificationShow::NAME, CourseCreated::NAME]
    );
    let history: Vec<String> = ctx.bus().history().into_iter().map(|e| e.name).collect();
    assert_eq!(history, vec![CourseCreated::NAME, NotificationShow::NAME]);
    Ok(())
}

#[test]
fn test_failed_install_does_not_affect_other_tabs() -> Result<()> {
    let ctx = HubContext::default();
    ctx.register(plugin("feed").with_order(1))?;
    ctx.register(plugin("broken").with_order(2).with_dependency("nowhere"))?;
    ctx.register(plugin("calendar").with_order(3))?;

    let report = ctx.install_configured();
    assert_eq!(report.failed.len(), 1);

    let nav: Vec<String> = ctx
        .registry()
        .installed_plugins()
        .iter()
        .map(|d| d.id.clone())
        .collect();
    assert_eq!(nav, vec!["feed", "calendar"]);

    let tab = ctx.themed_plugin("calendar")?.expect("calendar installed");
    assert_eq!(tab.render(&Props::new())?, "calendar");
    assert!(ctx.themed_plugin("broken")?.is_none());
    Ok(())
}

// ============================================================================
// 동시성
// ============================================================================

/// base ← lesson ← classroom, base ← calendar ← classroom, base ← merch ← billing
fn register_chains(ctx: &HubContext) -> Result<()> {
    ctx.register(plugin("base"))?;
    ctx.register(plugin("lesson").with_dependency("base"))?;
    ctx.register(plugin("calendar").with_dependency("base"))?;
    ctx.register(
        plugin("classroom")
            .with_dependency("lesson")
            .with_dependency("calendar"),
    )?;
    ctx.register(plugin("merch").with_dependency("base"))?;
    ctx.register(plugin("billing").with_dependency("merch"))?;
    Ok(())
}

#[test]
fn test_parallel_installs_of_overlapping_chains() -> Result<()> {
    let ctx = HubContext::default();
    register_chains(&ctx)?;

    let announced = Arc::new(Mutex::new(Vec::new()));
    let sink = announced.clone();
    let _sub = ctx.bus().on("plugin:installed", move |event| {
        sink.lock().push(event.data["pluginId"].as_str().unwrap_or("").to_string());
        Ok(())
    });

    let targets = ["classroom", "billing", "lesson", "calendar", "merch", "base"];
    std::thread::scope(|s| {
        for round in 0..4 {
            let ctx = &ctx;
            s.spawn(move || {
                for i in 0..targets.len() {
                    let id = targets[(i + round) % targets.len()];
                    ctx.install(id).unwrap();
                }
            });
        }
    });

    let order = ctx.registry().installation_order();
    assert_eq!(order.len(), 6);
    let position = |id: &str| order.iter().position(|o| o == id).unwrap();
    for plugin in ctx.registry().all_plugins() {
        for dep in &plugin.dependencies {
            assert!(position(dep) < position(&plugin.id), "{} before {}", dep, plugin.id);
        }
    }

    let mut announced = announced.lock().clone();
    announced.sort();
    let mut expected = order.clone();
    expected.sort();
    assert_eq!(announced, expected);
    Ok(())
}
