use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 路线配色，按序号循环取用
pub const ROUTE_PALETTE: [&str; 8] = [
    "#ff6b6b", "#34d399", "#60a5fa", "#fbbf24", "#c084fc", "#f472b6", "#f59e0b", "#10b981",
];

/// 路线展示文本的分隔符
pub const PATH_SEPARATOR: &str = " → ";

/// 按序号取调色板颜色
pub fn palette_color(index: usize) -> &'static str {
    ROUTE_PALETTE[index % ROUTE_PALETTE.len()]
}

/// 单辆车的路线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: u32,
    pub label: String,
    /// 访问的节点序列（节点号从 1 开始）
    pub node_sequence: Vec<u32>,
    /// 展示用的路径文本，如 `1 → 5 → 13 → 1`
    pub path_text: String,
    pub color: String,
    pub visible: bool,
    /// 求解器输出中该路线自身的距离（如果有）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Route {
    /// 创建路线
    ///
    /// 少于 2 个节点的路线无法绘制，强制 `visible = false`
    pub fn new(id: u32, label: impl Into<String>, node_sequence: Vec<u32>, color: impl Into<String>) -> Self {
        let path_text = join_path(&node_sequence);
        let visible = node_sequence.len() >= 2;
        Self {
            id,
            label: label.into(),
            node_sequence,
            path_text,
            color: color.into(),
            visible,
            distance: None,
        }
    }

    pub fn with_path_text(mut self, path_text: impl Into<String>) -> Self {
        self.path_text = path_text.into();
        self
    }

    pub fn with_distance(mut self, distance: Option<f64>) -> Self {
        self.distance = distance;
        self
    }

    /// 设置可见性，节点不足 2 个时保持不可见
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible && self.node_sequence.len() >= 2;
    }
}

/// 用箭头连接节点序列
pub fn join_path<T: ToString>(nodes: &[T]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

/// 汇总指标
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverTotals {
    pub distance: Option<f64>,
    pub time_sec: Option<f64>,
}

/// 一次求解的结构化结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub summary: BTreeMap<String, String>,
    pub routes: Vec<Route>,
    pub totals: SolverTotals,
}

impl SolverResult {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.summary.is_empty()
    }
}
