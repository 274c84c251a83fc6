//! Event Types - 이벤트 버스가 다루는 레코드 정의
//!
//! 이벤트 이름은 `"domain:verb"` 관례를 따르지만 강제하지는 않습니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 모든 이벤트를 수신하는 와일드카드 채널 이름
pub const ANY_EVENT: &str = "*";

// ============================================================================
// Event ID
// ============================================================================

/// 이벤트 고유 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// 새 이벤트 ID 생성
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// EventName - "domain:verb" 관례
// ============================================================================

/// 이벤트 이름 분해 결과
///
/// `"course:created"` → domain `course`, verb `created`.
/// 콜론이 없는 이름은 domain만 가집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventName<'a> {
    pub domain: &'a str,
    pub verb: Option<&'a str>,
}

impl<'a> EventName<'a> {
    pub fn parse(name: &'a str) -> Self {
        match name.split_once(':') {
            Some((domain, verb)) => Self {
                domain,
                verb: Some(verb),
            },
            None => Self { domain: name, verb: None },
        }
    }

    /// `domain:verb` 형식인지 확인
    pub fn is_conventional(&self) -> bool {
        !self.domain.is_empty() && self.verb.is_some_and(|v| !v.is_empty())
    }
}

// ============================================================================
// HubEvent - 발행된 이벤트 레코드
// ============================================================================

/// 한 번의 emit으로 생성된 이벤트 레코드
///
/// 생성 후 변경되지 않으며, 리스너와 히스토리가 같은 레코드를 봅니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubEvent {
    /// 이벤트 ID
    pub id: EventId,

    /// 이벤트 이름 (예: "course:created")
    #[serde(rename = "event")]
    pub name: String,

    /// 이벤트 데이터 (버스는 내용을 해석하지 않음)
    pub data: Value,

    /// 발생 시간
    pub timestamp: DateTime<Utc>,

    /// 발행한 플러그인 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
}

impl HubEvent {
    /// 새 이벤트 생성
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            data,
            timestamp: Utc::now(),
            plugin_id: None,
        }
    }

    /// 발행 플러그인 설정
    pub fn with_plugin(mut self, plugin_id: impl Into<String>) -> Self {
        self.plugin_id = Some(plugin_id.into());
        self
    }

    /// 이벤트 이름 분해
    pub fn parsed_name(&self) -> EventName<'_> {
        EventName::parse(&self.name)
    }

    /// 타임라인 한 줄 요약 (인스펙터용)
    pub fn summary(&self) -> String {
        let origin = self.plugin_id.as_deref().unwrap_or("-");
        format!(
            "{} [{}] {} {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            origin,
            self.name,
            self.data
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id() {
        let id1 = EventId::new();
        let id2 = EventId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_event_name_parse() {
        let name = EventName::parse("course:created");
        assert_eq!(name.domain, "course");
        assert_eq!(name.verb, Some("created"));
        assert!(name.is_conventional());

        let bare = EventName::parse("tick");
        assert_eq!(bare.domain, "tick");
        assert_eq!(bare.verb, None);
        assert!(!bare.is_conventional());
    }

    #[test]
    fn test_hub_event_serializes_with_event_key() {
        let event = HubEvent::new("post:created", serde_json::json!({"id": 7}))
            .with_plugin("community");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "post:created");
        assert_eq!(json["pluginId"], "community");
        assert_eq!(json["data"]["id"], 7);
    }

    #[test]
    fn test_summary_without_origin() {
        let event = HubEvent::new("tick", Value::Null);
        assert!(event.summary().contains("[-] tick"));
    }
}
