//! # Fleet Planner
//!
//! 车队路线规划看板的核心：问题状态、求解结果解析、路线几何和运行编排
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有共享状态，只暴露能力
//! - `ProblemStore` - 当前问题（参数、城市、需求），读写都是副本
//! - `EventBus` - 同步发布订阅（`layout:changed` / `routes:set` / `route:toggle`）
//! - `MapSurface` - 外部绘制原语
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - 求解器后端的 HTTP 调用
//!
//! ### ③ 业务能力层（Services）
//! - `result_parser` - OR / 量子两套输出文法
//! - `geometry` - 方位角、插值、包围盒
//! - `map_renderer` - 路线折线、方向箭头、城市着色
//! - `problem_generator` - 生成问题（城市 + 需求）
//! - `progress` - 展示用的分阶段进度条
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/solver_orchestrator` - 单个求解器的一次运行
//! - `orchestrator/dashboard` - 应用生命周期
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{SolverBackend, SolverClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{EventBus, ProblemStore};
pub use models::{City, CityId, Route};
pub use orchestrator::{App, RunReport, SolverKind, SolverOrchestrator};
pub use utils::logging as logger;
