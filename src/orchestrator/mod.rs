//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责求解流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `solver_orchestrator` - 单个求解器的编排
//! - 读取问题存储，构造请求
//! - 预置算例短路（仅 OR）
//! - 调用后端、解析输出、维护面板状态
//! - 通过事件总线发布路线
//! - 代数计数丢弃过期响应
//!
//! ### `presets` - 预置算例表
//!
//! ### `dashboard` - 应用驱动
//! - 管理应用生命周期（初始化、运行）
//! - 并发运行两个求解器，同时驱动进度条
//! - 输出运行报告和统计
//!
//! ## 层次关系
//!
//! ```text
//! dashboard (App)
//!     ↓
//! solver_orchestrator (OR / Quantum)
//!     ↓
//! services (能力层：parse / generate / render / progress)
//!     ↓
//! infrastructure (基础设施：ProblemStore / EventBus / MapSurface)
//! ```

pub mod dashboard;
pub mod presets;
pub mod solver_orchestrator;

// 重新导出主要类型
pub use dashboard::{App, RunReport, SharedBackend};
pub use presets::{Preset, PresetTable};
pub use solver_orchestrator::{format_total, PanelState, RunOutcome, RunState, SolverKind, SolverOrchestrator};
