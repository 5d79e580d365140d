//! 基础设施层
//!
//! 持有共享状态和外部绘制能力，只暴露能力，不含业务判断

pub mod event_bus;
pub mod map_surface;
pub mod problem_store;

pub use event_bus::{BusEvent, Channel, EventBus, Subscription};
pub use map_surface::{MapSurface, TracingSurface};
pub use problem_store::{ProblemSnapshot, ProblemStore};
