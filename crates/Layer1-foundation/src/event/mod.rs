//! Event System - 플러그인 간 이벤트 발행/구독 시스템
//!
//! 서로를 직접 참조하지 않는 플러그인들이 이름 붙은 이벤트로 통신합니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        EventBus                              │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │  emit("course:created") ──► history (최근 100개)     │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! │         │  (emit 시점 스냅샷, 등록 순서)                     │
//! │         ▼                                                   │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
//! │  │ "course:*"   │  │ "course:*"   │  │  "*" (any)   │      │
//! │  │ (Toast)      │  │ (Analytics)  │  │ (Inspector)  │      │
//! │  └──────────────┘  └──────────────┘  └──────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! use hub_foundation::event::{EventBus, contracts::{CourseCreated, CoursePayload}};
//!
//! let bus = EventBus::new();
//!
//! // 1. 자유 형식 구독
//! let sub = bus.on("post:created", |event| {
//!     println!("post: {}", event.data);
//!     Ok(())
//! });
//!
//! // 2. 계약 타입 구독
//! bus.on_typed::<CourseCreated, _>(|course, _| {
//!     println!("course: {}", course.title);
//!     Ok(())
//! });
//!
//! // 3. 발행
//! bus.emit_from("post:created", json!({"postId": "p-1"}), "community");
//!
//! // 4. 해제
//! sub.unsubscribe();
//! ```

pub mod bus;
pub mod contracts;
pub mod types;

// Re-exports
pub use bus::{EventBus, EventBusConfig, ListenerFn, ListenerId, Subscription};
pub use contracts::EventContract;
pub use types::{EventId, EventName, HubEvent, ANY_EVENT};
