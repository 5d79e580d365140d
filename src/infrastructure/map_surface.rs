//! 地图绘制面 - 基础设施层
//!
//! 底图瓦片和真正的绘制由外部负责，这里只定义绘制原语

use crate::services::geometry::{Bounds, LatLng};
use tracing::{debug, info};

/// 城市标记
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub label: String,
    pub fill_color: String,
    pub demand: Option<u32>,
}

/// 路线折线
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub route_id: u32,
    pub points: Vec<LatLng>,
    pub color: String,
}

/// 方向箭头
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub position: LatLng,
    /// 旋转角度（该段路线的方位角，度）
    pub rotation: f64,
}

/// 外部绘制原语
pub trait MapSurface {
    /// 容器尺寸变化后重新计算地图大小
    fn invalidate_size(&mut self);
    fn fit_bounds(&mut self, bounds: Bounds);
    fn draw_marker(&mut self, marker: &Marker);
    fn draw_polyline(&mut self, line: &Polyline);
    fn draw_arrow(&mut self, arrow: &Arrow, color: &str);
}

/// 把绘制调用写到日志里的绘制面
#[derive(Debug, Default)]
pub struct TracingSurface {
    pub markers: usize,
    pub polylines: usize,
    pub arrows: usize,
}

impl MapSurface for TracingSurface {
    fn invalidate_size(&mut self) {
        debug!("地图尺寸重算");
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        info!(
            "🗺️ 镜头范围: 南 {:.4} 西 {:.4} 北 {:.4} 东 {:.4}",
            bounds.south, bounds.west, bounds.north, bounds.east
        );
    }

    fn draw_marker(&mut self, marker: &Marker) {
        self.markers += 1;
        debug!("标记 {} @ ({:.4}, {:.4}) {}", marker.label, marker.position.lat, marker.position.lng, marker.fill_color);
    }

    fn draw_polyline(&mut self, line: &Polyline) {
        self.polylines += 1;
        info!("路线 #{}: {} 个点, 颜色 {}", line.route_id, line.points.len(), line.color);
    }

    fn draw_arrow(&mut self, _arrow: &Arrow, _color: &str) {
        self.arrows += 1;
    }
}
