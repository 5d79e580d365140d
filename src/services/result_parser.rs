//! 求解结果解析 - 业务能力层
//!
//! 两套互相独立的宽松文法：
//! - OR 求解器：从标准输出里提取 `Route n: [...] ... Distance: x` 行和若干汇总字段
//! - 量子求解器：解析 `Truck #n: a → b → …` 行，缺省时从 `Path: [...]` 行合成
//!
//! 任何输入都不会报错，匹配不到就返回空结构。

use crate::models::route::{join_path, palette_color, Route, SolverResult, SolverTotals};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

static OR_ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*Route\s+(\d+):\s*\[([^\]]+)\][^\n]*?Distance:\s*([\d.]+)")
        .expect("OR route pattern")
});
static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Status:\s*([A-Z_]+)").expect("status pattern"));
static OBJECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Objective value:\s*([\d.]+)").expect("objective pattern"));
static USED_EDGES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Used edges:\s*([0-9]+)").expect("used edges pattern"));
static TOTAL_DISTANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Total distance:\s*([0-9]+\.[0-9]+|[0-9]+)").expect("distance pattern")
});
static ACTUAL_RUNTIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Actual Runtime:\s*([\d.]+)").expect("runtime pattern"));
static TOTAL_RUNTIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Total runtime:\s*([\d.]+)").expect("runtime pattern"));

static PATH_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Path:\s*\[([^\]]+)\]").expect("path pattern"));
static TRUCK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Truck\s*#(\d+):\s*(.+)$").expect("truck pattern"));

pub const SUMMARY_STATUS: &str = "Status";
pub const SUMMARY_OBJECTIVE: &str = "Objective value";
pub const SUMMARY_USED_EDGES: &str = "Used edges";
pub const SUMMARY_TOTAL_DISTANCE: &str = "Total distance";
pub const SUMMARY_TOTAL_RUNTIME: &str = "Total runtime";

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// OR 求解器的节点号从 0 开始，`0` 重映射为仓库节点 `1`
fn remap_or_token(token: &str) -> String {
    match token.parse::<u32>() {
        Ok(0) => "1".to_string(),
        Ok(n) => n.to_string(),
        Err(_) => token.to_string(),
    }
}

/// 解析 OR 求解器的标准输出
pub fn parse_or_output(stdout: &str) -> SolverResult {
    let mut routes = Vec::new();

    for (index, caps) in OR_ROUTE_RE.captures_iter(stdout).enumerate() {
        let Ok(id) = caps[1].parse::<u32>() else {
            continue;
        };

        let tokens: Vec<String> = caps[2]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(remap_or_token)
            .collect();
        let nodes: Vec<u32> = tokens.iter().filter_map(|t| t.parse().ok()).collect();
        let distance = caps[3].parse::<f64>().ok();

        let mut route = Route::new(id, format!("Route {}", id), nodes, palette_color(index))
            .with_path_text(join_path(&tokens))
            .with_distance(distance);
        route.set_visible(true);
        routes.push(route);
    }

    let mut summary = BTreeMap::new();
    if let Some(status) = capture(&STATUS_RE, stdout) {
        summary.insert(SUMMARY_STATUS.to_string(), status);
    }
    if let Some(objective) = capture(&OBJECTIVE_RE, stdout) {
        summary.insert(SUMMARY_OBJECTIVE.to_string(), objective);
    }
    if let Some(edges) = capture(&USED_EDGES_RE, stdout) {
        summary.insert(SUMMARY_USED_EDGES.to_string(), edges);
    }

    let distance = capture(&TOTAL_DISTANCE_RE, stdout);
    let runtime = capture(&ACTUAL_RUNTIME_RE, stdout).or_else(|| capture(&TOTAL_RUNTIME_RE, stdout));

    let totals = SolverTotals {
        distance: distance.as_deref().and_then(|v| v.parse().ok()),
        time_sec: runtime.as_deref().and_then(|v| v.parse().ok()),
    };
    if let Some(distance) = distance {
        summary.insert(SUMMARY_TOTAL_DISTANCE.to_string(), distance);
    }
    if let Some(runtime) = runtime {
        summary.insert(SUMMARY_TOTAL_RUNTIME.to_string(), runtime);
    }

    debug!("OR 输出解析完成: {} 条路线, {} 个汇总字段", routes.len(), summary.len());

    SolverResult {
        summary,
        routes,
        totals,
    }
}

/// 把节点序列旋转到以第一个 `1` 开头，并保证以 `1` 结尾
///
/// 序列里没有 `1` 时在两端补 `1`。对已规整的序列再次调用结果不变。
pub fn normalize_loop(nodes: &[u32]) -> Vec<u32> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let mut out = match nodes.iter().position(|&n| n == 1) {
        Some(i) => {
            let mut rotated = nodes[i..].to_vec();
            rotated.extend_from_slice(&nodes[..i]);
            rotated
        }
        None => {
            let mut closed = Vec::with_capacity(nodes.len() + 2);
            closed.push(1);
            closed.extend_from_slice(nodes);
            closed
        }
    };

    if out.last() != Some(&1) {
        out.push(1);
    }
    out
}

/// 从 `Path: [...]` 行合成 `Truck #i: …` 行（i 从 1 开始）
pub fn synthesize_truck_lines(stdout: &str) -> Vec<String> {
    PATH_LINE_RE
        .captures_iter(stdout)
        .enumerate()
        .map(|(i, caps)| {
            let seq = caps[1]
                .split(',')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(" → ");
            format!("Truck #{}: {}", i + 1, seq)
        })
        .collect()
}

/// 解析单行 `Truck #n: a → b → …`
pub fn parse_truck_line(line: &str) -> Option<(u32, Vec<u32>)> {
    let caps = TRUCK_LINE_RE.captures(line.trim())?;
    let id = caps[1].parse::<u32>().unwrap_or(0);
    let nodes = caps[2]
        .split('→')
        .filter_map(|s| s.trim().parse::<u32>().ok())
        .collect();
    Some((id, nodes))
}

/// 解析量子求解器的输出
///
/// `paths` 非空时直接使用，否则从 `stdout` 中的 `Path:` 行合成。
pub fn parse_quantum_output(paths: &[String], stdout: &str) -> SolverResult {
    let lines: Vec<String> = if paths.is_empty() {
        synthesize_truck_lines(stdout)
    } else {
        paths.to_vec()
    };

    let routes: Vec<Route> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            let (parsed_id, nodes) = parse_truck_line(line)?;
            let id = if parsed_id == 0 { i as u32 + 1 } else { parsed_id };
            let nodes = normalize_loop(&nodes);
            Some(Route::new(id, format!("Truck #{}", id), nodes, palette_color(i)))
        })
        .collect();

    debug!("量子求解器输出解析完成: {} 条路线", routes.len());

    SolverResult {
        summary: BTreeMap::new(),
        routes,
        totals: SolverTotals::default(),
    }
}

/// 从后端返回的 summary 里读取总距离和总耗时
pub fn summary_totals(summary: &BTreeMap<String, String>) -> SolverTotals {
    let lookup = |primary: &str, fallback: &str| {
        summary
            .get(primary)
            .or_else(|| summary.get(fallback))
            .and_then(|v| v.trim().parse::<f64>().ok())
    };

    SolverTotals {
        distance: lookup(SUMMARY_TOTAL_DISTANCE, "total_distance"),
        time_sec: lookup(SUMMARY_TOTAL_RUNTIME, "total_runtime"),
    }
}
