//! Demo plugins - 데모 셸이 등록하는 기능 모듈과 스크립트 세션
//!
//! 각 기능의 실제 화면/비즈니스 로직은 범위 밖이므로 텍스트 한 덩어리만 렌더링합니다.
//! 서로를 직접 참조하지 않고 이벤트 버스로만 통신합니다.

use chrono::{Duration, Utc};
use hub_core::event::contracts::{
    CalendarEventCreated, CalendarEventPayload, CourseCreated, CoursePayload, LessonCompleted,
    LessonPayload, MerchPurchased, NotificationLevel, NotificationPayload, NotificationShow,
    PostCreated, PostPayload, PurchasePayload, SubscriptionChanged, SubscriptionPayload,
};
use hub_core::{
    component_fn, EventBus, HubContext, PluginComponent, PluginDescriptor, RenderContext, Result,
    Subscription,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

// ============================================================================
// 공통
// ============================================================================

/// 설치 중 만든 구독을 보관했다가 제거 시 해제
#[derive(Default)]
struct Subscriptions(Mutex<Vec<Subscription>>);

impl Subscriptions {
    fn keep(&self, sub: Subscription) {
        self.0.lock().push(sub);
    }

    fn release(&self) {
        for sub in self.0.lock().drain(..) {
            sub.unsubscribe();
        }
    }
}

fn heading(ctx: &RenderContext<'_>, title: &str) -> String {
    format!(
        "┌ {} [theme: {}, primary: {}]",
        title,
        ctx.theme.name,
        ctx.theme.token("primary").unwrap_or("-")
    )
}

fn static_tab(title: &'static str, body: &'static str) -> impl PluginComponent {
    component_fn(move |ctx| Ok(format!("{}\n│ {}", heading(ctx, title), body)))
}

// ============================================================================
// Analytics - 모든 이벤트를 도메인별로 집계
// ============================================================================

#[derive(Default)]
struct AnalyticsComponent {
    counts: Arc<Mutex<BTreeMap<String, usize>>>,
    subs: Subscriptions,
}

impl PluginComponent for AnalyticsComponent {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let mut out = heading(ctx, "Analytics");
        for (domain, count) in self.counts.lock().iter() {
            out.push_str(&format!("\n│ {:<14} {}", domain, count));
        }
        Ok(out)
    }

    fn on_install(&self, ctx: &HubContext) -> Result<()> {
        let counts = self.counts.clone();
        self.subs.keep(ctx.bus().on_any(move |event| {
            *counts
                .lock()
                .entry(event.parsed_name().domain.to_string())
                .or_default() += 1;
            Ok(())
        }));
        Ok(())
    }

    fn on_uninstall(&self, _ctx: &HubContext) -> Result<()> {
        self.subs.release();
        Ok(())
    }
}

// ============================================================================
// Notifications - 다른 플러그인의 이벤트를 토스트로 변환
// ============================================================================

#[derive(Default)]
struct NotificationsComponent {
    toasts: Arc<Mutex<Vec<NotificationPayload>>>,
    subs: Subscriptions,
}

impl NotificationsComponent {
    const ID: &'static str = "notifications";

    fn toast(bus: &Weak<EventBus>, message: String, level: NotificationLevel) -> Result<()> {
        if let Some(bus) = bus.upgrade() {
            bus.emit_typed::<NotificationShow>(
                &NotificationPayload::new(message, level),
                Some(Self::ID),
            )?;
        }
        Ok(())
    }
}

impl PluginComponent for NotificationsComponent {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let mut out = heading(ctx, "Notifications");
        for toast in self.toasts.lock().iter() {
            out.push_str(&format!("\n│ ({:?}) {}", toast.level, toast.message));
        }
        Ok(out)
    }

    fn on_install(&self, ctx: &HubContext) -> Result<()> {
        let bus = ctx.bus();

        let weak = Arc::downgrade(bus);
        self.subs.keep(bus.on_typed_from::<CourseCreated, _>(Self::ID, move |course, _| {
            Self::toast(
                &weak,
                format!("New course published: {}", course.title),
                NotificationLevel::Success,
            )
        }));

        let weak = Arc::downgrade(bus);
        self.subs.keep(bus.on_typed_from::<MerchPurchased, _>(Self::ID, move |order, _| {
            Self::toast(
                &weak,
                format!("Order received: {} x {}", order.quantity, order.product_id),
                NotificationLevel::Info,
            )
        }));

        let toasts = self.toasts.clone();
        self.subs.keep(bus.on_typed_from::<NotificationShow, _>(Self::ID, move |toast, _| {
            toasts.lock().push(toast.clone());
            Ok(())
        }));
        Ok(())
    }

    fn on_uninstall(&self, _ctx: &HubContext) -> Result<()> {
        self.subs.release();
        Ok(())
    }
}

// ============================================================================
// Inspector - 이벤트 타임라인
// ============================================================================

#[derive(Default)]
struct InspectorComponent {
    bus: Mutex<Option<Weak<EventBus>>>,
    seen: Arc<AtomicUsize>,
    subs: Subscriptions,
}

impl PluginComponent for InspectorComponent {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let limit = ctx
            .props
            .get("limit")
            .and_then(|v| v.as_u64())
            .unwrap_or(20) as usize;

        let mut out = heading(ctx, "Event Inspector");
        out.push_str(&format!(
            "\n│ {} events observed since install",
            self.seen.load(Ordering::SeqCst)
        ));

        if let Some(bus) = self.bus.lock().as_ref().and_then(Weak::upgrade) {
            let history = bus.history();
            let skip = history.len().saturating_sub(limit);
            for event in history.iter().skip(skip) {
                out.push_str(&format!("\n│ {}", event.summary()));
            }
        }
        Ok(out)
    }

    fn on_install(&self, ctx: &HubContext) -> Result<()> {
        *self.bus.lock() = Some(Arc::downgrade(ctx.bus()));

        let seen = self.seen.clone();
        self.subs.keep(ctx.bus().on_any(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        Ok(())
    }

    fn on_uninstall(&self, _ctx: &HubContext) -> Result<()> {
        self.subs.release();
        *self.bus.lock() = None;
        Ok(())
    }
}

// ============================================================================
// 등록
// ============================================================================

/// 데모 플러그인 디스크립터
pub fn demo_plugins() -> Vec<PluginDescriptor> {
    vec![
        PluginDescriptor::new("community", "Community")
            .with_icon("💬")
            .with_order(1)
            .with_component(component_fn(|ctx| {
                Ok(format!(
                    "{}\n│ Welcome back, {}! 3 new posts since your last visit.",
                    heading(ctx, "Community"),
                    ctx.prop_str("user").unwrap_or("guest")
                ))
            })),
        PluginDescriptor::new("classroom", "Classroom")
            .with_icon("🎓")
            .with_order(2)
            .with_dependencies(["course-builder", "calendar"])
            .with_theme_token("primary", "#0ea5e9")
            .with_component(static_tab("Classroom", "Continue where you left off.")),
        PluginDescriptor::new("course-builder", "Course Builder")
            .with_icon("🛠")
            .with_order(3)
            .with_component(static_tab("Course Builder", "Draft modules and lessons.")),
        PluginDescriptor::new("calendar", "Calendar")
            .with_icon("📅")
            .with_order(4)
            .with_component(static_tab("Calendar", "Upcoming community events.")),
        PluginDescriptor::new("merch", "Merchandise")
            .with_icon("🛍")
            .with_order(5)
            .with_dependency("billing")
            .with_theme_token("primary", "#f59e0b")
            .with_component(static_tab("Merchandise", "Hoodies, stickers, mugs.")),
        PluginDescriptor::new("analytics", "Analytics")
            .with_icon("📈")
            .with_order(6)
            .with_component(AnalyticsComponent::default()),
        PluginDescriptor::new("billing", "Billing")
            .with_icon("💳")
            .with_order(7)
            .with_component(static_tab("Billing", "Plans, invoices, payment methods.")),
        PluginDescriptor::new(NotificationsComponent::ID, "Notifications")
            .with_icon("🔔")
            .with_order(8)
            .with_component(NotificationsComponent::default()),
        PluginDescriptor::new("inspector", "Event Inspector")
            .with_icon("🔍")
            .with_order(99)
            .with_description("Diagnostics timeline of recent bus events")
            .with_component(InspectorComponent::default()),
    ]
}

/// 데모 플러그인 전체 등록
pub fn register_all(ctx: &HubContext) -> Result<()> {
    for descriptor in demo_plugins() {
        ctx.register(descriptor)?;
    }
    Ok(())
}

// ============================================================================
// 스크립트 세션
// ============================================================================

/// 짧은 사용자 세션을 흉내내어 이벤트 발행
///
/// 설치되지 않은 플러그인의 이벤트는 건너뜁니다.
pub fn run_script(ctx: &HubContext) -> Result<usize> {
    let bus = ctx.bus();
    let registry = ctx.registry();
    let before = bus.emission_count();

    if registry.is_installed("course-builder") {
        bus.emit_typed::<CourseCreated>(
            &CoursePayload {
                course_id: "course-42".into(),
                title: "Intro to Community Building".into(),
                author_id: Some("user-ada".into()),
            },
            Some("course-builder"),
        )?;
    }

    if registry.is_installed("classroom") {
        bus.emit_typed::<LessonCompleted>(
            &LessonPayload {
                course_id: "course-42".into(),
                lesson_id: "lesson-1".into(),
                user_id: "user-grace".into(),
            },
            Some("classroom"),
        )?;
    }

    if registry.is_installed("community") {
        bus.emit_typed::<PostCreated>(
            &PostPayload {
                post_id: "post-7".into(),
                author_id: "user-grace".into(),
                parent_id: None,
            },
            Some("community"),
        )?;
        // 계약이 없는 자유 형식 이벤트
        bus.emit_from(
            "community:reaction-added",
            json!({ "postId": "post-7", "emoji": "🎉" }),
            "community",
        );
    }

    if registry.is_installed("calendar") {
        bus.emit_typed::<CalendarEventCreated>(
            &CalendarEventPayload {
                event_id: "event-3".into(),
                title: "Monthly AMA".into(),
                starts_at: Utc::now() + Duration::days(2),
            },
            Some("calendar"),
        )?;
    }

    if registry.is_installed("merch") {
        bus.emit_typed::<MerchPurchased>(
            &PurchasePayload {
                product_id: "hoodie".into(),
                user_id: "user-ada".into(),
                quantity: 2,
                amount_cents: 9800,
            },
            Some("merch"),
        )?;
    }

    if registry.is_installed("billing") {
        bus.emit_typed::<SubscriptionChanged>(
            &SubscriptionPayload {
                user_id: "user-ada".into(),
                previous_plan: Some("free".into()),
                plan: "pro".into(),
            },
            Some("billing"),
        )?;
    }

    // 리스너가 버스를 clear 했을 수 있음
    Ok(bus.emission_count().saturating_sub(before) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_core::{HubConfig, Props};

    fn session() -> HubContext {
        let ctx = HubContext::new(HubConfig::default());
        register_all(&ctx).unwrap();
        ctx
    }

    #[test]
    fn test_all_demo_plugins_install() {
        let ctx = session();
        let report = ctx.install_configured();

        assert!(report.is_success());
        assert_eq!(ctx.registry().installed_plugins().len(), demo_plugins().len());
        // 의존성이 먼저 설치됨
        let order = ctx.registry().installation_order();
        let pos = |id: &str| order.iter().position(|p| p == id).unwrap();
        assert!(pos("course-builder") < pos("classroom"));
        assert!(pos("calendar") < pos("classroom"));
        assert!(pos("billing") < pos("merch"));
    }

    #[test]
    fn test_course_created_produces_toast() {
        let ctx = session();
        ctx.install_configured();
        run_script(&ctx).unwrap();

        let tab = ctx.themed_plugin("notifications").unwrap().unwrap();
        let rendered = tab.render(&Props::new()).unwrap();
        assert!(rendered.contains("New course published: Intro to Community Building"));
        assert!(rendered.contains("Order received: 2 x hoodie"));
    }

    #[test]
    fn test_script_skips_uninstalled_plugins() {
        let ctx = HubContext::new(HubConfig::new().auto_install(["community"]));
        register_all(&ctx).unwrap();
        ctx.install_configured();

        // post:created + 자유 형식 reaction
        assert_eq!(run_script(&ctx).unwrap(), 2);
    }

    #[test]
    fn test_analytics_counts_by_domain() {
        let ctx = session();
        ctx.install_configured();
        run_script(&ctx).unwrap();

        let tab = ctx.themed_plugin("analytics").unwrap().unwrap();
        let rendered = tab.render(&Props::new()).unwrap();
        assert!(rendered.contains("notification"));
        assert!(rendered.contains("course"));
    }

    #[test]
    fn test_uninstall_releases_subscriptions() {
        let ctx = session();
        ctx.install_configured();
        let before = ctx.bus().listener_count(None);

        assert!(ctx.uninstall("inspector").unwrap());
        assert_eq!(ctx.bus().listener_count(None), before - 1);
    }

    #[test]
    fn test_reregistered_notifications_keep_working() {
        let ctx = session();
        ctx.install_configured();
        assert_eq!(ctx.bus().owned_listener_count("notifications"), 3);

        let fresh = demo_plugins()
            .into_iter()
            .find(|d| d.id == "notifications")
            .unwrap();
        ctx.register(fresh).unwrap();
        assert_eq!(ctx.bus().owned_listener_count("notifications"), 3);

        run_script(&ctx).unwrap();
        let tab = ctx.themed_plugin("notifications").unwrap().unwrap();
        let rendered = tab.render(&Props::new()).unwrap();
        assert!(rendered.contains("New course published"));

        assert!(ctx.uninstall("notifications").unwrap());
        assert_eq!(ctx.bus().owned_listener_count("notifications"), 0);
    }

    #[test]
    fn test_script_survives_bus_clear() {
        let ctx = session();
        ctx.install_configured();
        let bus = Arc::downgrade(ctx.bus());
        ctx.bus().on("merch:purchased", move |_| {
            if let Some(bus) = bus.upgrade() {
                bus.clear();
            }
            Ok(())
        });

        assert!(run_script(&ctx).is_ok());
    }

    #[test]
    fn test_classroom_theme_override() {
        let ctx = session();
        ctx.install("classroom").unwrap();

        let tab = ctx.themed_plugin("classroom").unwrap().unwrap();
        assert!(tab.render(&Props::new()).unwrap().contains("#0ea5e9"));
    }
}
