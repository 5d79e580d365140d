//! 求解器运行编排
//!
//! 每个后端（OR / 量子）一个编排器，各自持有面板状态。
//! 一次运行：读取问题 → 预置算例短路 → 请求后端 → 解析 → 发布路线。

use crate::clients::{decode_response, SolverBackend, SolverRequest, SolverResponse};
use crate::infrastructure::{BusEvent, EventBus, ProblemSnapshot, ProblemStore};
use crate::models::{City, DemandMap, ProblemParams, Route, SolverResult, SolverTotals};
use crate::orchestrator::presets::PresetTable;
use crate::services::result_parser::{parse_or_output, parse_quantum_output, summary_totals};
use crate::utils::logging::{truncate_text, OUTPUT_PREVIEW_CHARS};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const MSG_GENERATE_FIRST: &str = "Please click the gear button → Generate Problem first.";
pub const MSG_COMPLETE: &str = "Solver complete.";
pub const MSG_NO_OUTPUT: &str = "Solver failed or returned no output.";
pub const MSG_UNREACHABLE: &str = "Failed to reach the solver API.";

/// 求解器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    Or,
    Quantum,
}

impl SolverKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            SolverKind::Or => "/run_or_solver",
            SolverKind::Quantum => "/run_quantum_solver",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SolverKind::Or => "OR",
            SolverKind::Quantum => "Quantum",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 面板运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "Idle",
            RunState::Loading => "Loading",
            RunState::Success => "Success",
            RunState::Error => "Error",
        };
        f.write_str(name)
    }
}

/// 面板状态快照
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    pub state: RunState,
    pub message: String,
    pub summary: BTreeMap<String, String>,
    pub routes: Vec<Route>,
    pub distance: Option<f64>,
    pub time_sec: Option<f64>,
}

impl PanelState {
    pub fn is_error(&self) -> bool {
        self.state == RunState::Error
    }

    pub fn distance_text(&self) -> String {
        format_total(self.distance)
    }

    pub fn time_text(&self) -> String {
        format_total(self.time_sec)
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunState),
    /// 期间有更新的运行或重置，本次响应被丢弃
    Superseded,
}

/// 两位小数、千位分隔；缺失或非有限数显示 `—`
pub fn format_total(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return "—".to_string();
    };

    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// 取前 `depot_count` 个城市，需求只保留被选中城市的条目
pub fn build_request(params: &ProblemParams, cities: &[City], demands: &DemandMap) -> SolverRequest {
    let selected: Vec<City> = cities.iter().take(params.depot_count as usize).cloned().collect();
    let ids: HashSet<String> = selected.iter().map(|c| c.id.to_string()).collect();
    let demands = demands
        .iter()
        .filter(|(id, _)| ids.contains(*id))
        .map(|(id, d)| (id.clone(), *d))
        .collect();

    SolverRequest {
        depots: params.depot_count,
        capacity: params.capacity,
        fleet: params.fleet_size,
        cities: selected,
        demands,
    }
}

/// 单个求解器的编排器
pub struct SolverOrchestrator<B: SolverBackend> {
    kind: SolverKind,
    store: Arc<ProblemStore>,
    bus: Arc<EventBus>,
    backend: B,
    presets: PresetTable,
    preset_delay: Duration,
    generation: AtomicU64,
    panel: Mutex<PanelState>,
}

impl<B: SolverBackend> SolverOrchestrator<B> {
    pub fn new(kind: SolverKind, store: Arc<ProblemStore>, bus: Arc<EventBus>, backend: B) -> Self {
        Self {
            kind,
            store,
            bus,
            backend,
            presets: PresetTable::empty(),
            preset_delay: Duration::ZERO,
            generation: AtomicU64::new(0),
            panel: Mutex::new(PanelState::default()),
        }
    }

    /// 启用预置算例，只对 OR 求解器生效
    pub fn with_presets(mut self, presets: PresetTable, delay: Duration) -> Self {
        if self.kind == SolverKind::Or {
            self.presets = presets;
            self.preset_delay = delay;
        } else {
            warn!("[{}] 预置算例只适用于 OR 求解器，已忽略", self.kind);
        }
        self
    }

    pub fn kind(&self) -> SolverKind {
        self.kind
    }

    pub fn panel(&self) -> PanelState {
        self.lock_panel().clone()
    }

    pub fn state(&self) -> RunState {
        self.lock_panel().state
    }

    /// 回到空闲状态，进行中的响应会被丢弃
    pub fn reset(&self) {
        let mut panel = self.lock_panel();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *panel = PanelState::default();
    }

    /// 切换路线可见性并广播；没有该 id 的路线时返回 `None`
    ///
    /// 同 id 的路线一起切换
    pub fn toggle_route(&self, id: u32) -> Option<bool> {
        let visible = {
            let mut panel = self.lock_panel();
            let current = panel.routes.iter().find(|r| r.id == id)?.visible;
            let target = !current;
            for route in panel.routes.iter_mut().filter(|r| r.id == id) {
                route.set_visible(target);
            }
            panel.routes.iter().find(|r| r.id == id).map(|r| r.visible)?
        };

        self.bus.emit(BusEvent::RouteToggle { id, visible });
        Some(visible)
    }

    /// 执行一次求解
    ///
    /// 上一次的总距离和总耗时保留到新结果给出对应值为止
    pub async fn run(&self) -> RunOutcome {
        let generation = {
            let mut panel = self.lock_panel();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *panel = PanelState {
                state: RunState::Loading,
                distance: panel.distance,
                time_sec: panel.time_sec,
                ..Default::default()
            };
            generation
        };

        // 参数、城市、需求取自同一时刻
        let ProblemSnapshot { params, cities, demands } = self.store.snapshot();
        info!(
            "[{}] ▶ 开始求解: 容量 {}, 车队 {}, 城市 {}",
            self.kind, params.capacity, params.fleet_size, params.depot_count
        );

        if let Some(preset) = self.presets.lookup(params.triple()).cloned() {
            info!("[{}] 命中预置算例 {:?}，模拟计算 {:?}", self.kind, params.triple(), self.preset_delay);
            tokio::time::sleep(self.preset_delay).await;
            return self.finish_success(
                generation,
                SolverResult {
                    summary: preset.summary,
                    routes: preset.routes,
                    totals: preset.totals,
                },
                preset.message,
            );
        }

        if cities.is_empty() {
            warn!("[{}] ⚠️ 尚未生成问题", self.kind);
            return self.finish_error(generation, MSG_GENERATE_FIRST);
        }

        let request = build_request(&params, &cities, &demands);
        let raw = match self.backend.post(self.kind.endpoint(), &request).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("[{}] ❌ 请求 {} 失败: {}", self.kind, self.kind.endpoint(), e);
                return self.finish_error(generation, MSG_UNREACHABLE);
            }
        };

        let response = decode_response(&raw);
        if let Some(stdout) = response.solver_stdout.as_deref().filter(|s| !s.is_empty()) {
            debug!("[{}] solverStdout: {}", self.kind, truncate_text(stdout, OUTPUT_PREVIEW_CHARS));
        }
        if let Some(stderr) = response.solver_stderr.as_deref().filter(|s| !s.is_empty()) {
            debug!("[{}] solverStderr: {}", self.kind, truncate_text(stderr, OUTPUT_PREVIEW_CHARS));
        }

        let result = self.parse(&response);
        if result.routes.is_empty() {
            let message = response.message().unwrap_or(MSG_NO_OUTPUT).to_string();
            return self.finish_error(generation, &message);
        }

        let message = response.message().unwrap_or(MSG_COMPLETE).to_string();
        self.finish_success(generation, result, message)
    }

    fn parse(&self, response: &SolverResponse) -> SolverResult {
        match self.kind {
            SolverKind::Or => {
                let stdout = response
                    .solver_stdout
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .or(response.message.as_deref())
                    .unwrap_or("");
                let mut result = parse_or_output(stdout);
                if result.summary.is_empty() {
                    result.summary = response.summary.clone();
                }
                result
            }
            SolverKind::Quantum => {
                let stdout = response.solver_stdout.as_deref().unwrap_or("");
                let mut result = parse_quantum_output(&response.paths, stdout);
                result.summary = response.summary.clone();
                result.totals = summary_totals(&result.summary);
                result
            }
        }
    }

    fn finish_success(&self, generation: u64, result: SolverResult, message: String) -> RunOutcome {
        let routes = {
            let mut panel = self.lock_panel();
            if self.is_stale(generation) {
                debug!("[{}] 响应已过期，丢弃", self.kind);
                return RunOutcome::Superseded;
            }
            let SolverTotals { distance, time_sec } = result.totals;
            if distance.is_some() {
                panel.distance = distance;
            }
            if time_sec.is_some() {
                panel.time_sec = time_sec;
            }
            panel.state = RunState::Success;
            panel.summary = result.summary;
            panel.routes = result.routes.clone();
            panel.message = message;
            result.routes
        };

        info!("[{}] ✓ 求解完成: {} 条路线", self.kind, routes.len());
        self.bus.emit(BusEvent::RoutesSet(routes));
        RunOutcome::Completed(RunState::Success)
    }

    fn finish_error(&self, generation: u64, message: &str) -> RunOutcome {
        let mut panel = self.lock_panel();
        if self.is_stale(generation) {
            debug!("[{}] 响应已过期，丢弃", self.kind);
            return RunOutcome::Superseded;
        }
        panel.state = RunState::Error;
        panel.message = message.to_string();
        warn!("[{}] ✗ {}", self.kind, message);
        RunOutcome::Completed(RunState::Error)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn lock_panel(&self) -> MutexGuard<'_, PanelState> {
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::RawResponse;
    use crate::error::{AppError, AppResult};
    use crate::infrastructure::Channel;
    use crate::models::ProblemParamsPatch;
    use futures::future::BoxFuture;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    enum Reply {
        Body(Duration, RawResponse),
        Fail,
    }

    #[derive(Default)]
    struct FakeBackend {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
        requests: Mutex<Vec<(String, SolverRequest)>>,
    }

    impl FakeBackend {
        fn with(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SolverBackend for FakeBackend {
        fn post<'a>(&'a self, endpoint: &'a str, request: &'a SolverRequest) -> BoxFuture<'a, AppResult<RawResponse>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push((endpoint.to_string(), request.clone()));
            let reply = self.replies.lock().unwrap().pop_front();
            Box::pin(async move {
                match reply {
                    Some(Reply::Body(delay, raw)) => {
                        tokio::time::sleep(delay).await;
                        Ok(raw)
                    }
                    Some(Reply::Fail) | None => Err(AppError::Other("connection refused".to_string())),
                }
            })
        }
    }

    const OR_STDOUT: &str = "Status: FEASIBLE\nRoute 1: [0, 2, 3, 0] - Distance: 10.5\nRoute 2: [0, 4, 0] - Distance: 4.0\nTotal distance: 14.5\nTotal runtime: 1.25 seconds\n";

    fn store_with_cities(n: i64) -> Arc<ProblemStore> {
        let store = Arc::new(ProblemStore::new());
        let cities: Vec<City> = (1..=n)
            .map(|i| City::new(i, format!("City {}", i), 39.0 + i as f64 * 0.1, -94.0))
            .collect();
        let demands: DemandMap = cities.iter().map(|c| (c.id.to_string(), 10)).collect();
        store.set_cities(&cities);
        store.set_demands(&demands);
        store
    }

    fn json_body(value: serde_json::Value) -> RawResponse {
        RawResponse::ok(value.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_preset_short_circuit() {
        let store = Arc::new(ProblemStore::new());
        store.set_params(ProblemParamsPatch {
            depot_count: Some(22),
            capacity: Some(6000),
            fleet_size: Some(4),
        });
        let bus = Arc::new(EventBus::new());
        let published = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&published);
        let _sub = bus.on(Channel::RoutesSet, move |event| {
            if let BusEvent::RoutesSet(routes) = event {
                counter.store(routes.len(), Ordering::SeqCst);
            }
        });

        let backend = FakeBackend::with(Vec::new());
        let orch = SolverOrchestrator::new(SolverKind::Or, store, bus, Arc::clone(&backend))
            .with_presets(PresetTable::standard(), Duration::from_secs(20));

        let outcome = orch.run().await;
        let panel = orch.panel();

        assert_eq!(outcome, RunOutcome::Completed(RunState::Success));
        assert_eq!(panel.distance, Some(26530.04));
        assert_eq!(panel.distance_text(), "26,530.04");
        assert_eq!(panel.routes.len(), 4);
        assert_eq!(panel.message, "Saved E-n22-k4.txt and ran classical OR solver.");
        assert_eq!(published.load(Ordering::SeqCst), 4);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_quantum_ignores_presets() {
        let store = Arc::new(ProblemStore::new());
        store.set_params(ProblemParamsPatch {
            depot_count: Some(22),
            capacity: Some(6000),
            fleet_size: Some(4),
        });
        let backend = FakeBackend::with(Vec::new());
        let orch = SolverOrchestrator::new(SolverKind::Quantum, store, Arc::new(EventBus::new()), Arc::clone(&backend))
            .with_presets(PresetTable::standard(), Duration::from_secs(20));

        assert_eq!(orch.run().await, RunOutcome::Completed(RunState::Error));
        assert_eq!(orch.panel().message, MSG_GENERATE_FIRST);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_problem_is_an_error() {
        let backend = FakeBackend::with(Vec::new());
        let orch = SolverOrchestrator::new(
            SolverKind::Or,
            Arc::new(ProblemStore::new()),
            Arc::new(EventBus::new()),
            Arc::clone(&backend),
        );

        assert_eq!(orch.run().await, RunOutcome::Completed(RunState::Error));
        assert!(orch.panel().is_error());
        assert_eq!(orch.panel().message, MSG_GENERATE_FIRST);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_or_success_from_json() {
        let store = store_with_cities(30);
        store.set_params(ProblemParamsPatch {
            depot_count: Some(5),
            ..Default::default()
        });
        let backend = FakeBackend::with(vec![Reply::Body(
            Duration::ZERO,
            json_body(serde_json::json!({"ok": true, "message": "", "solverStdout": OR_STDOUT})),
        )]);
        let orch = SolverOrchestrator::new(SolverKind::Or, store, Arc::new(EventBus::new()), Arc::clone(&backend));

        assert_eq!(orch.run().await, RunOutcome::Completed(RunState::Success));
        let panel = orch.panel();
        assert_eq!(panel.routes.len(), 2);
        assert_eq!(panel.routes[0].node_sequence, vec![1, 2, 3, 1]);
        assert_eq!(panel.distance, Some(14.5));
        assert_eq!(panel.time_sec, Some(1.25));
        assert_eq!(panel.summary["Status"], "FEASIBLE");
        assert_eq!(panel.message, MSG_COMPLETE);

        let requests = backend.requests.lock().unwrap();
        let (endpoint, request) = &requests[0];
        assert_eq!(endpoint, "/run_or_solver");
        assert_eq!(request.depots, 5);
        assert_eq!(request.cities.len(), 5);
        assert_eq!(request.demands.len(), 5);
        assert!(request.demands.contains_key("5"));
        assert!(!request.demands.contains_key("6"));
    }

    #[tokio::test]
    async fn test_or_plain_text_body() {
        let backend = FakeBackend::with(vec![Reply::Body(Duration::ZERO, RawResponse::ok(OR_STDOUT))]);
        let orch = SolverOrchestrator::new(SolverKind::Or, store_with_cities(5), Arc::new(EventBus::new()), backend);

        assert_eq!(orch.run().await, RunOutcome::Completed(RunState::Success));
        // 纯文本同时作为 message
        assert_eq!(orch.panel().message, OR_STDOUT);
    }

    #[tokio::test]
    async fn test_or_falls_back_to_backend_summary() {
        let body = serde_json::json!({
            "message": "Route 1: [0, 2, 0] - Distance: 3.0",
            "summary": {"Solver": "ortools"}
        });
        let backend = FakeBackend::with(vec![Reply::Body(Duration::ZERO, json_body(body))]);
        let orch = SolverOrchestrator::new(SolverKind::Or, store_with_cities(5), Arc::new(EventBus::new()), backend);

        orch.run().await;
        let panel = orch.panel();
        assert_eq!(panel.routes.len(), 1);
        assert_eq!(panel.summary["Solver"], "ortools");
        assert_eq!(panel.distance, None);
        assert_eq!(panel.distance_text(), "—");
    }

    #[tokio::test]
    async fn test_quantum_success_uses_summary_totals() {
        let body = serde_json::json!({
            "ok": true,
            "message": "Quantum run finished",
            "paths": ["Truck #1: 3 → 1 → 2", "Truck #2: 1 → 4 → 5"],
            "summary": {"total_distance": "123.456", "total_runtime": 9.5}
        });
        let backend = FakeBackend::with(vec![Reply::Body(Duration::ZERO, json_body(body))]);
        let orch = SolverOrchestrator::new(SolverKind::Quantum, store_with_cities(6), Arc::new(EventBus::new()), Arc::clone(&backend));

        assert_eq!(orch.run().await, RunOutcome::Completed(RunState::Success));
        let panel = orch.panel();
        assert_eq!(panel.routes[0].node_sequence, vec![1, 2, 3, 1]);
        assert_eq!(panel.routes[1].node_sequence, vec![1, 4, 5, 1]);
        assert_eq!(panel.distance_text(), "123.46");
        assert_eq!(panel.time_sec, Some(9.5));
        assert_eq!(panel.message, "Quantum run finished");
        assert_eq!(backend.requests.lock().unwrap()[0].0, "/run_quantum_solver");
    }

    #[tokio::test]
    async fn test_no_routes_is_an_error_even_when_ok() {
        let body = serde_json::json!({"ok": true, "solverStdout": "nothing useful"});
        let bus = Arc::new(EventBus::new());
        let published = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&published);
        let _sub = bus.on(Channel::RoutesSet, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let backend = FakeBackend::with(vec![Reply::Body(Duration::ZERO, json_body(body))]);
        let orch = SolverOrchestrator::new(SolverKind::Or, store_with_cities(5), bus, backend);

        assert_eq!(orch.run().await, RunOutcome::Completed(RunState::Error));
        assert_eq!(orch.panel().message, MSG_NO_OUTPUT);
        assert_eq!(published.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_request_matches_store_snapshot() {
        let store = store_with_cities(8);
        store.set_params(ProblemParamsPatch {
            depot_count: Some(3),
            capacity: Some(250),
            fleet_size: Some(2),
        });
        let backend = FakeBackend::with(vec![Reply::Body(Duration::ZERO, RawResponse::ok(OR_STDOUT))]);
        let orch = SolverOrchestrator::new(SolverKind::Or, Arc::clone(&store), Arc::new(EventBus::new()), Arc::clone(&backend));
        orch.run().await;

        let snapshot = store.snapshot();
        let expected = build_request(&snapshot.params, &snapshot.cities, &snapshot.demands);
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].1, expected);
        assert_eq!((requests[0].1.capacity, requests[0].1.fleet), (250, 2));
    }

    #[tokio::test]
    async fn test_totals_survive_runs_without_totals() {
        let backend = FakeBackend::with(vec![
            Reply::Body(Duration::ZERO, RawResponse::ok(OR_STDOUT)),
            Reply::Body(Duration::ZERO, RawResponse::ok("Route 1: [0, 2, 0] - Distance: 3.0")),
            Reply::Fail,
        ]);
        let orch = SolverOrchestrator::new(SolverKind::Or, store_with_cities(5), Arc::new(EventBus::new()), backend);

        orch.run().await;
        assert_eq!(orch.panel().distance, Some(14.5));

        assert_eq!(orch.run().await, RunOutcome::Completed(RunState::Success));
        let panel = orch.panel();
        assert_eq!(panel.routes.len(), 1);
        assert_eq!(panel.distance, Some(14.5));
        assert_eq!(panel.time_sec, Some(1.25));

        assert_eq!(orch.run().await, RunOutcome::Completed(RunState::Error));
        assert_eq!(orch.panel().distance_text(), "14.50");

        orch.reset();
        assert_eq!(orch.panel().distance, None);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let backend = FakeBackend::with(vec![Reply::Fail]);
        let orch = SolverOrchestrator::new(SolverKind::Or, store_with_cities(5), Arc::new(EventBus::new()), backend);

        assert_eq!(orch.run().await, RunOutcome::Completed(RunState::Error));
        assert_eq!(orch.panel().message, MSG_UNREACHABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_in_flight_response() {
        let backend = FakeBackend::with(vec![Reply::Body(Duration::from_secs(5), RawResponse::ok(OR_STDOUT))]);
        let orch = SolverOrchestrator::new(SolverKind::Or, store_with_cities(5), Arc::new(EventBus::new()), backend);

        let (outcome, _) = tokio::join!(orch.run(), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(orch.state(), RunState::Loading);
            orch.reset();
        });

        assert_eq!(outcome, RunOutcome::Superseded);
        assert_eq!(orch.state(), RunState::Idle);
        assert!(orch.panel().routes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_run_wins() {
        let slow = RawResponse::ok("Route 1: [0, 2, 0] - Distance: 1.0");
        let fast = RawResponse::ok("Route 1: [0, 3, 0] - Distance: 1.0\nRoute 2: [0, 4, 0] - Distance: 1.0");
        let backend = FakeBackend::with(vec![
            Reply::Body(Duration::from_secs(5), slow),
            Reply::Body(Duration::from_secs(1), fast),
        ]);
        let orch = SolverOrchestrator::new(SolverKind::Or, store_with_cities(5), Arc::new(EventBus::new()), backend);

        let (first, second) = tokio::join!(orch.run(), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            orch.run().await
        });

        assert_eq!(first, RunOutcome::Superseded);
        assert_eq!(second, RunOutcome::Completed(RunState::Success));
        assert_eq!(orch.panel().routes.len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_route_emits_event() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = bus.on(Channel::RouteToggle, move |event| {
            if let BusEvent::RouteToggle { id, visible } = event {
                sink.lock().unwrap().push((*id, *visible));
            }
        });
        let backend = FakeBackend::with(vec![Reply::Body(Duration::ZERO, RawResponse::ok(OR_STDOUT))]);
        let orch = SolverOrchestrator::new(SolverKind::Or, store_with_cities(5), Arc::clone(&bus), backend);
        orch.run().await;

        assert_eq!(orch.toggle_route(2), Some(false));
        assert_eq!(orch.toggle_route(2), Some(true));
        assert_eq!(orch.toggle_route(99), None);
        assert_eq!(*seen.lock().unwrap(), vec![(2, false), (2, true)]);
    }

    #[test]
    fn test_format_total() {
        assert_eq!(format_total(None), "—");
        assert_eq!(format_total(Some(f64::NAN)), "—");
        assert_eq!(format_total(Some(0.0)), "0.00");
        assert_eq!(format_total(Some(999.999)), "1,000.00");
        assert_eq!(format_total(Some(73170.29)), "73,170.29");
        assert_eq!(format_total(Some(1234567.5)), "1,234,567.50");
        assert_eq!(format_total(Some(-1234.5)), "-1,234.50");
        assert_eq!(format_total(Some(-0.001)), "0.00");
    }

    #[test]
    fn test_build_request_with_short_list() {
        let params = ProblemParams {
            depot_count: 10,
            capacity: 100,
            fleet_size: 2,
        };
        let cities = vec![City::new(1, "A", 0.0, 0.0), City::new("x", "B", 1.0, 1.0)];
        let demands = DemandMap::from([("1".to_string(), 0), ("x".to_string(), 7), ("zz".to_string(), 3)]);
        let request = build_request(&params, &cities, &demands);

        assert_eq!(request.depots, 10);
        assert_eq!(request.cities.len(), 2);
        assert_eq!(request.demands.len(), 2);
        assert_eq!(request.demands["x"], 7);
    }
}
