use crate::clients::{SolverBackend, SolverClient};
use crate::config::Config;
use crate::infrastructure::{BusEvent, EventBus, ProblemStore, TracingSurface};
use crate::models::CityCatalog;
use crate::orchestrator::presets::PresetTable;
use crate::orchestrator::solver_orchestrator::{PanelState, RunOutcome, RunState, SolverKind, SolverOrchestrator};
use crate::services::map_renderer::{MapFrame, MapRenderer};
use crate::services::problem_generator::generate_problem;
use crate::services::progress::{drive, ProgressPhase, ProgressSimulator};
use crate::utils::logging::{append_log, init_log_file, log_run_complete, log_startup, print_final_stats};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 共享的求解器后端
pub type SharedBackend = Arc<dyn SolverBackend>;

/// 一次完整运行的结果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub or: PanelState,
    pub quantum: PanelState,
    pub frame: MapFrame,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        [&self.or, &self.quantum]
            .iter()
            .filter(|p| p.state == RunState::Success)
            .count()
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    store: Arc<ProblemStore>,
    bus: Arc<EventBus>,
    catalog: CityCatalog,
    renderer: MapRenderer,
    or_solver: SolverOrchestrator<SharedBackend>,
    quantum_solver: SolverOrchestrator<SharedBackend>,
}

impl App {
    /// 初始化应用，使用 HTTP 求解器后端
    pub async fn initialize(config: Config) -> Result<Self> {
        let client = SolverClient::new(&config).context("创建求解器客户端失败")?;
        Self::with_backend(config, Arc::new(client)).await
    }

    /// 初始化应用，注入任意后端
    pub async fn with_backend(config: Config, backend: SharedBackend) -> Result<Self> {
        config.validate()?;

        // 初始化报告文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config.solver_api_base, &config.cities_file);

        let store = Arc::new(ProblemStore::new());
        let bus = Arc::new(EventBus::new());
        let renderer = MapRenderer::attach(Arc::clone(&store), &bus);

        let mut or_solver = SolverOrchestrator::new(SolverKind::Or, Arc::clone(&store), Arc::clone(&bus), Arc::clone(&backend));
        if config.enable_presets {
            or_solver = or_solver.with_presets(PresetTable::standard(), config.preset_delay());
        }
        let quantum_solver = SolverOrchestrator::new(SolverKind::Quantum, Arc::clone(&store), Arc::clone(&bus), backend);

        Ok(Self {
            catalog: CityCatalog::new(&config.cities_file),
            config,
            store,
            bus,
            renderer,
            or_solver,
            quantum_solver,
        })
    }

    pub fn store(&self) -> &Arc<ProblemStore> {
        &self.store
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn renderer(&self) -> &MapRenderer {
        &self.renderer
    }

    pub fn or_solver(&self) -> &SolverOrchestrator<SharedBackend> {
        &self.or_solver
    }

    pub fn quantum_solver(&self) -> &SolverOrchestrator<SharedBackend> {
        &self.quantum_solver
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunReport> {
        // 加载城市并生成问题
        info!("\n📁 正在加载城市列表...");
        let all_cities = self.catalog.cities().await.context("加载城市列表失败")?;
        let problem = generate_problem(
            &all_cities,
            self.config.depot_count,
            self.config.vehicle_capacity,
            self.config.fleet_size,
        )?;
        problem.apply(&self.store);

        self.renderer.show_problem(None);
        self.bus.emit(BusEvent::LayoutChanged);

        // 进度条只是展示，与求解结果无关
        let frame_interval = self.config.progress_frame();
        let ticker = tokio::spawn(async move {
            let mut sim = ProgressSimulator::default();
            let mut last_phase = ProgressPhase::Idle;
            drive(&mut sim, frame_interval, |sim, snapshot| {
                if snapshot.phase != last_phase {
                    last_phase = snapshot.phase;
                    if let Some(stage) = sim.current_stage() {
                        debug!("⏳ {} ({:.0}%)", stage.label, snapshot.fraction() * 100.0);
                    }
                }
            })
            .await
        });

        let (or_outcome, quantum_outcome) = tokio::join!(self.or_solver.run(), self.quantum_solver.run());
        ticker.abort();

        for (kind, outcome) in [(SolverKind::Or, or_outcome), (SolverKind::Quantum, quantum_outcome)] {
            if outcome == RunOutcome::Superseded {
                warn!("[{}] 本次运行被新的请求取代", kind);
            }
        }

        let mut surface = TracingSurface::default();
        let frame = self.renderer.render(&mut surface);

        let report = RunReport {
            or: self.or_solver.panel(),
            quantum: self.quantum_solver.panel(),
            frame,
        };

        for (kind, panel) in [(SolverKind::Or, &report.or), (SolverKind::Quantum, &report.quantum)] {
            log_run_complete(kind.display_name(), &panel.state.to_string(), panel.routes.len(), &panel.message);
            append_log(&self.config.output_log_file, &render_panel(kind, panel))?;
        }

        let succeeded = report.succeeded();
        print_final_stats(succeeded, 2 - succeeded, 2, &self.config.output_log_file);

        Ok(report)
    }
}

/// 报告文件中单个求解器的段落
fn render_panel(kind: SolverKind, panel: &PanelState) -> String {
    let mut lines = vec![
        format!("[{}] {}", kind, panel.state),
        format!("  Total Distance: {}", panel.distance_text()),
        format!("  Total Time: {}", panel.time_text()),
    ];
    if !panel.message.is_empty() {
        lines.push(format!("  Message: {}", panel.message));
    }
    for (key, value) in &panel.summary {
        lines.push(format!("  {}: {}", key, value));
    }
    for route in &panel.routes {
        lines.push(format!("  {}: {}", route.label, route.path_text));
    }
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Route;

    #[test]
    fn test_render_panel_lists_routes_and_summary() {
        let panel = PanelState {
            state: RunState::Success,
            message: "Solver complete.".to_string(),
            summary: [("Status".to_string(), "FEASIBLE".to_string())].into(),
            routes: vec![Route::new(1, "Route 1", vec![1, 2, 1], "#ff6b6b")],
            distance: Some(1234.5),
            time_sec: None,
        };
        let text = render_panel(SolverKind::Or, &panel);

        assert!(text.starts_with("[OR] Success"));
        assert!(text.contains("Total Distance: 1,234.50"));
        assert!(text.contains("Total Time: —"));
        assert!(text.contains("Status: FEASIBLE"));
        assert!(text.contains("Route 1: 1 → 2 → 1"));
    }
}
