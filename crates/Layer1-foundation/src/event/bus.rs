//! Event Bus - 플러그인 간 이벤트 발행/구독 시스템
//!
//! 동기식 발행/구독과 최근 N개 이벤트 히스토리를 제공합니다.
//! 리스너는 emit 호출 스레드에서 등록 순서대로 실행됩니다.

use super::types::{HubEvent, ANY_EVENT};
use crate::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

// ============================================================================
// Listener
// ============================================================================

/// 이벤트 리스너 ID
///
/// 버스 수명 동안 재사용되지 않습니다 (`clear` 이후에도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// 리스너 콜백
///
/// `Err`를 반환하거나 panic 하면 로그만 남기고 다음 리스너로 진행합니다.
pub type ListenerFn = dyn Fn(&HubEvent) -> Result<()> + Send + Sync;

/// 등록된 리스너 정보
#[derive(Clone)]
struct RegisteredListener {
    id: ListenerId,
    owner: Option<String>,
    callback: Arc<ListenerFn>,
    /// 핸들과 공유 (어느 경로로 제거되든 false)
    active: Arc<AtomicBool>,
}

// ============================================================================
// Subscription
// ============================================================================

/// 구독 핸들
///
/// `unsubscribe`는 이 핸들이 만든 등록 하나만 제거합니다.
/// 버스를 약한 참조로 들고 있으므로 버스 수명을 늘리지 않습니다.
pub struct Subscription {
    id: ListenerId,
    event: String,
    state: Weak<Mutex<BusState>>,
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    /// 등록이 아직 버스에 남아 있는지 확인
    ///
    /// `EventBus::unsubscribe(id)`나 `clear`로 제거된 경우에도 `false`.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// 구독 해제
    ///
    /// 실제로 등록을 제거했을 때만 `true`. 두 번째 호출부터는 아무 일도 하지 않습니다.
    pub fn unsubscribe(&self) -> bool {
        if !self.active.swap(false, Ordering::SeqCst) {
            return false;
        }

        let Some(state) = self.state.upgrade() else {
            return false;
        };

        let removed = state.lock().remove(&self.event, self.id);
        if removed {
            debug!(listener_id = %self.id, event = %self.event, "Unregistered event listener");
        }
        removed
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("active", &self.is_active())
            .finish()
    }
}

// ============================================================================
// EventBus
// ============================================================================

/// 이벤트 버스 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBusConfig {
    /// 이벤트 히스토리 보관 개수 (0이면 보관하지 않음)
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// 모든 emit을 trace 로그로 남김
    #[serde(default)]
    pub trace_emissions: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            trace_emissions: false,
        }
    }
}

fn default_history_size() -> usize {
    100
}

/// 락으로 보호되는 버스 상태
#[derive(Default)]
struct BusState {
    /// 이벤트 이름 -> 등록 순서대로의 리스너
    listeners: HashMap<String, Vec<RegisteredListener>>,

    /// 최근 이벤트 (오래된 것이 앞)
    history: VecDeque<HubEvent>,

    /// 발행된 이벤트 수
    emission_count: u64,
}

impl BusState {
    fn remove(&mut self, event: &str, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(event) else {
            return false;
        };
        let Some(pos) = list.iter().position(|l| l.id == id) else {
            return false;
        };
        list.remove(pos).active.store(false, Ordering::SeqCst);
        if list.is_empty() {
            self.listeners.remove(event);
        }
        true
    }

    fn record(&mut self, event: &HubEvent, capacity: usize) {
        self.emission_count += 1;
        if capacity == 0 {
            return;
        }
        self.history.push_back(event.clone());
        while self.history.len() > capacity {
            self.history.pop_front();
        }
    }

    /// emit 시점의 리스너 스냅샷 (이름별 리스너 다음에 와일드카드)
    fn snapshot(&self, event: &str) -> Vec<RegisteredListener> {
        let mut snapshot: Vec<RegisteredListener> =
            self.listeners.get(event).cloned().unwrap_or_default();
        if event != ANY_EVENT {
            if let Some(any) = self.listeners.get(ANY_EVENT) {
                snapshot.extend(any.iter().cloned());
            }
        }
        snapshot
    }
}

/// 이벤트 버스
///
/// 세션당 하나를 만들어 `Arc`로 공유합니다.
///
/// ## 사용법
///
/// ```ignore
/// use hub_foundation::event::EventBus;
///
/// let bus = EventBus::new();
///
/// let sub = bus.on("course:created", |event| {
///     println!("new course: {}", event.data["title"]);
///     Ok(())
/// });
///
/// bus.emit_from("course:created", json!({"title": "Rust 101"}), "course-builder");
///
/// sub.unsubscribe();
/// ```
pub struct EventBus {
    /// 설정
    config: EventBusConfig,

    /// 리스너 + 히스토리
    state: Arc<Mutex<BusState>>,

    /// 리스너 ID 카운터
    listener_counter: AtomicU64,
}

impl EventBus {
    /// 기본 설정으로 이벤트 버스 생성
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// 커스텀 설정으로 이벤트 버스 생성
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(BusState::default())),
            listener_counter: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    // ========================================================================
    // 구독
    // ========================================================================

    /// 리스너 등록
    ///
    /// 같은 함수를 여러 번 등록하면 등록마다 한 번씩 호출됩니다.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> Subscription
    where
        F: Fn(&HubEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.register(event.into(), None, Arc::new(listener))
    }

    /// 소유 플러그인을 명시하여 리스너 등록
    pub fn on_from<F>(
        &self,
        event: impl Into<String>,
        plugin_id: impl Into<String>,
        listener: F,
    ) -> Subscription
    where
        F: Fn(&HubEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.register(event.into(), Some(plugin_id.into()), Arc::new(listener))
    }

    /// 모든 이벤트를 받는 리스너 등록 (인스펙터 등)
    pub fn on_any<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&HubEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.register(ANY_EVENT.to_string(), None, Arc::new(listener))
    }

    fn register(
        &self,
        event: String,
        owner: Option<String>,
        callback: Arc<ListenerFn>,
    ) -> Subscription {
        let id = ListenerId(self.listener_counter.fetch_add(1, Ordering::SeqCst));
        let active = Arc::new(AtomicBool::new(true));

        debug!(
            listener_id = %id,
            event = %event,
            owner = owner.as_deref().unwrap_or("-"),
            "Registering event listener"
        );

        self.state
            .lock()
            .listeners
            .entry(event.clone())
            .or_default()
            .push(RegisteredListener {
                id,
                owner,
                callback,
                active: active.clone(),
            });

        Subscription {
            id,
            event,
            state: Arc::downgrade(&self.state),
            active,
        }
    }

    /// ID로 리스너 해제
    ///
    /// `Subscription`을 잃어버린 경우를 위한 경로. 핸들은 이후 비활성 no-op이 됩니다.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut state = self.state.lock();
        let event = state
            .listeners
            .iter()
            .find(|(_, list)| list.iter().any(|l| l.id == id))
            .map(|(name, _)| name.clone());

        match event {
            Some(event) => {
                state.remove(&event, id);
                debug!(listener_id = %id, event = %event, "Unregistered event listener");
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // 발행
    // ========================================================================

    /// 이벤트 발행
    pub fn emit(&self, event: impl Into<String>, data: Value) {
        self.publish(HubEvent::new(event, data));
    }

    /// 발행 플러그인을 명시하여 이벤트 발행
    pub fn emit_from(&self, event: impl Into<String>, data: Value, plugin_id: impl Into<String>) {
        self.publish(HubEvent::new(event, data).with_plugin(plugin_id));
    }

    /// 이미 만들어진 이벤트 레코드 발행
    ///
    /// 히스토리에 먼저 추가한 뒤, emit 시점의 리스너 스냅샷을 순서대로 호출합니다.
    /// 락은 리스너 실행 중에 잡고 있지 않으므로 리스너 안에서 emit/on/unsubscribe가 가능합니다.
    pub fn publish(&self, event: HubEvent) {
        let (snapshot, count) = {
            let mut state = self.state.lock();
            state.record(&event, self.config.history_size);
            (state.snapshot(&event.name), state.emission_count)
        };

        if self.config.trace_emissions {
            trace!(
                event_id = %event.id,
                event = %event.name,
                plugin_id = event.plugin_id.as_deref().unwrap_or("-"),
                listeners = snapshot.len(),
                "Publishing event #{}", count
            );
        }

        for registered in &snapshot {
            Self::deliver(&event, registered);
        }
    }

    /// 리스너 하나 호출 (실패 격리)
    fn deliver(event: &HubEvent, registered: &RegisteredListener) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (registered.callback)(event)));

        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("listener panicked: {}", panic_message(payload.as_ref())),
        };

        let err = Error::listener(&event.name, failure);
        warn!(
            listener_id = %registered.id,
            owner = registered.owner.as_deref().unwrap_or("-"),
            event = %event.name,
            error = %err,
            "Event listener failed"
        );
    }

    // ========================================================================
    // 히스토리
    // ========================================================================

    /// 이벤트 히스토리 (오래된 순) 복사본
    pub fn history(&self) -> Vec<HubEvent> {
        self.state.lock().history.iter().cloned().collect()
    }

    /// 최근 이벤트 (최신 순)
    pub fn recent(&self, limit: usize) -> Vec<HubEvent> {
        self.state
            .lock()
            .history
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// 특정 이름의 이벤트 히스토리
    pub fn history_for(&self, event: &str) -> Vec<HubEvent> {
        self.state
            .lock()
            .history
            .iter()
            .filter(|e| e.name == event)
            .cloned()
            .collect()
    }

    // ========================================================================
    // 진단
    // ========================================================================

    /// 리스너 수 (이름을 주면 해당 이벤트만, 아니면 전체 합)
    pub fn listener_count(&self, event: Option<&str>) -> usize {
        let state = self.state.lock();
        match event {
            Some(name) => state.listeners.get(name).map_or(0, Vec::len),
            None => state.listeners.values().map(Vec::len).sum(),
        }
    }

    /// 특정 플러그인이 소유한 리스너 수 (`on_from`으로 등록된 것)
    pub fn owned_listener_count(&self, plugin_id: &str) -> usize {
        self.state
            .lock()
            .listeners
            .values()
            .flatten()
            .filter(|l| l.owner.as_deref() == Some(plugin_id))
            .count()
    }

    /// 총 발행된 이벤트 수
    pub fn emission_count(&self) -> u64 {
        self.state.lock().emission_count
    }

    /// 리스너와 히스토리 모두 초기화
    pub fn clear(&self) {
        let mut state = self.state.lock();
        for listener in state.listeners.values().flatten() {
            listener.active.store(false, Ordering::SeqCst);
        }
        state.listeners.clear();
        state.history.clear();
        state.emission_count = 0;
        debug!("Event bus cleared");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// ============================================================================
// 테스트
// ============================================================================
