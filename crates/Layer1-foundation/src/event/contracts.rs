//! Event Contracts - 잘 알려진 이벤트의 이름과 페이로드 형태
//!
//! 버스 자체는 `serde_json::Value`만 다루지만, 플러그인들이 공유하는 이벤트는
//! 여기서 타입으로 정의하고 `emit_typed` / `on_typed`로 주고받습니다.
//! 여기 없는 이벤트는 `emit` / `on`으로 자유 형식 페이로드를 사용합니다.

use super::bus::{EventBus, Subscription};
use super::types::HubEvent;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// 이벤트 이름과 페이로드 타입의 계약
pub trait EventContract {
    /// 이벤트 이름 (`domain:verb`)
    const NAME: &'static str;

    /// 페이로드 타입
    type Payload: Serialize + DeserializeOwned;
}

impl EventBus {
    /// 계약 타입으로 이벤트 발행
    ///
    /// 직렬화 실패만 에러로 반환합니다. 리스너 실패는 버스 안에서 처리됩니다.
    pub fn emit_typed<C: EventContract>(
        &self,
        payload: &C::Payload,
        plugin_id: Option<&str>,
    ) -> Result<()> {
        let data = serde_json::to_value(payload)?;
        let mut event = HubEvent::new(C::NAME, data);
        if let Some(id) = plugin_id {
            event = event.with_plugin(id);
        }
        self.publish(event);
        Ok(())
    }

    /// 계약 타입으로 리스너 등록
    ///
    /// 페이로드 디코딩 실패는 리스너 실패로 취급되어 로그만 남습니다.
    pub fn on_typed<C, F>(&self, listener: F) -> Subscription
    where
        C: EventContract,
        C::Payload: 'static,
        F: Fn(&C::Payload, &HubEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.on(C::NAME, decode_with::<C, F>(listener))
    }

    /// 소유 플러그인을 명시하여 계약 타입 리스너 등록
    pub fn on_typed_from<C, F>(&self, plugin_id: &str, listener: F) -> Subscription
    where
        C: EventContract,
        C::Payload: 'static,
        F: Fn(&C::Payload, &HubEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.on_from(C::NAME, plugin_id, decode_with::<C, F>(listener))
    }
}

fn decode_with<C, F>(listener: F) -> impl Fn(&HubEvent) -> Result<()> + Send + Sync + 'static
where
    C: EventContract,
    C::Payload: 'static,
    F: Fn(&C::Payload, &HubEvent) -> Result<()> + Send + Sync + 'static,
{
    move |event| {
        let payload: C::Payload = serde_json::from_value(event.data.clone())?;
        listener(&payload, event)
    }
}

macro_rules! contract {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $payload:ty) => {
        $(#[$doc])*
        pub struct $ty;

        impl EventContract for $ty {
            const NAME: &'static str = $name;
            type Payload = $payload;
        }
    };
}

// ============================================================================
// 페이로드
// ============================================================================

/// 강의 관련 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    pub course_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

/// 레슨 완료 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPayload {
    pub course_id: String,
    pub lesson_id: String,
    pub user_id: String,
}

/// 게시글/댓글 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub post_id: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// 캘린더 일정 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventPayload {
    pub event_id: String,
    pub title: String,
    pub starts_at: chrono::DateTime<chrono::Utc>,
}

/// 상품 구매 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePayload {
    pub product_id: String,
    pub user_id: String,
    pub quantity: u32,
    pub amount_cents: u64,
}

/// 구독 플랜 변경 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPayload {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_plan: Option<String>,
    pub plan: String,
}

/// 알림 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// 토스트 알림 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub message: String,
    #[serde(default)]
    pub level: NotificationLevel,
}

impl NotificationPayload {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

/// 플러그인 설치 상태 변경 페이로드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginLifecyclePayload {
    pub plugin_id: String,
}

// ============================================================================
// 계약
// ============================================================================

contract!(
    /// 새 강의 생성 (`course:created`)
    CourseCreated, "course:created", CoursePayload
);
contract!(
    /// 강의 수료 (`course:completed`)
    CourseCompleted, "course:completed", CoursePayload
);
contract!(
    /// 레슨 완료 (`lesson:completed`)
    LessonCompleted, "lesson:completed", LessonPayload
);
contract!(
    /// 커뮤니티 게시글 작성 (`post:created`)
    PostCreated, "post:created", PostPayload
);
contract!(
    /// 댓글 작성 (`comment:created`)
    CommentCreated, "comment:created", PostPayload
);
contract!(
    /// 캘린더 일정 생성 (`calendar:event-created`)
    CalendarEventCreated, "calendar:event-created", CalendarEventPayload
);
contract!(
    /// 굿즈 구매 (`merch:purchased`)
    MerchPurchased, "merch:purchased", PurchasePayload
);
contract!(
    /// 구독 플랜 변경 (`subscription:changed`)
    SubscriptionChanged, "subscription:changed", SubscriptionPayload
);
contract!(
    /// 토스트 알림 요청 (`notification:show`)
    NotificationShow, "notification:show", NotificationPayload
);
contract!(
    /// 플러그인 설치됨 (`plugin:installed`)
    PluginInstalled, "plugin:installed", PluginLifecyclePayload
);
contract!(
    /// 플러그인 제거됨 (`plugin:uninstalled`)
    PluginUninstalled, "plugin:uninstalled", PluginLifecyclePayload
);

/// 잘 알려진 이벤트 이름 목록 (인스펙터 필터용)
pub const WELL_KNOWN_EVENTS: &[&str] = &[
    CourseCreated::NAME,
    CourseCompleted::NAME,
    LessonCompleted::NAME,
    PostCreated::NAME,
    CommentCreated::NAME,
    CalendarEventCreated::NAME,
    MerchPurchased::NAME,
    SubscriptionChanged::NAME,
    NotificationShow::NAME,
    PluginInstalled::NAME,
    PluginUninstalled::NAME,
];
