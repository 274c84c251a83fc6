//! # Plugin System
//!
//! 독립적으로 작성된 기능 모듈(커뮤니티 피드, 클래스룸, 캘린더, 굿즈 등)을
//! 선언하고, 검증하고, 의존성 순서대로 설치하고, 테마를 입혀 뷰 레이어에 넘깁니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PluginRegistry                          │
//! │  ┌───────────────────────────────────────────────────────┐ │
//! │  │ registered: id -> PluginDescriptor (등록 순서 유지)     │ │
//! │  │ installed:  id 집합 + 설치 완료 순서                    │ │
//! │  └───────────────────────────────────────────────────────┘ │
//! │         │ install(id)                                       │
//! │         ▼                                                   │
//! │  ┌──────────────────┐    ┌──────────────────────────────┐  │
//! │  │ resolver         │    │ themed_plugin(id)            │  │
//! │  │ (cycle/missing)  │    │ global Theme + plugin tokens │  │
//! │  └──────────────────┘    └──────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! let registry = PluginRegistry::new();
//!
//! registry.register(
//!     PluginDescriptor::new("course-builder", "Course Builder")
//!         .with_component(component_fn(|_| Ok("builder".into()))),
//! )?;
//! registry.register(
//!     PluginDescriptor::new("classroom", "Classroom")
//!         .with_order(2)
//!         .with_dependency("course-builder")
//!         .with_component(component_fn(|ctx| Ok(format!("classroom ({})", ctx.theme.name)))),
//! )?;
//!
//! // course-builder가 먼저 설치됨
//! registry.install("classroom")?;
//!
//! let tab = registry.themed_plugin("classroom")?.expect("installed");
//! println!("{}", tab.render(&Props::new())?);
//! ```

mod descriptor;
mod registry;
mod resolver;
mod theme;
mod traits;

pub use descriptor::PluginDescriptor;
pub use registry::{InstallReport, PluginRegistry, PluginState, Registration, ThemedPlugin};
pub use theme::Theme;
pub use traits::{component_fn, FnComponent, PluginComponent, Props, RenderContext, SharedComponent};
