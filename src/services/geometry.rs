//! 几何计算 - 纯函数
//!
//! 方位角、线性插值、包围盒，地图绘制路线箭头和取景时使用

use serde::{Deserialize, Serialize};

/// 箭头在每段路线上的位置（占该段的比例）
pub const ARROW_FRACTIONS: [f64; 2] = [0.6, 0.85];

/// 经纬度坐标（角度制）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// 从 `a` 到 `b` 的初始方位角，单位度，范围 `[0, 360)`
///
/// 球面三角公式，正北为 0，顺时针增加。
pub fn bearing(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    let deg = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid 对极小的负数可能得到 360.0
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

/// 经纬度平面上的线性插值（不是大圆插值）
///
/// `t == 0` 和 `t == 1` 时原样返回端点。
pub fn interpolate(a: LatLng, b: LatLng, t: f64) -> LatLng {
    if t == 0.0 {
        return a;
    }
    if t == 1.0 {
        return b;
    }
    LatLng {
        lat: a.lat + (b.lat - a.lat) * t,
        lng: a.lng + (b.lng - a.lng) * t,
    }
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south: p.lat,
            west: p.lng,
            north: p.lat,
            east: p.lng,
        }
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south = self.south.min(p.lat);
        self.north = self.north.max(p.lat);
        self.west = self.west.min(p.lng);
        self.east = self.east.max(p.lng);
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }
}

/// 覆盖所有点的最小包围盒；没有点时返回 `None`，调用方保持镜头不动
pub fn fit_bounds<I>(points: I) -> Option<Bounds>
where
    I: IntoIterator<Item = LatLng>,
{
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let mut bounds = Bounds::from_point(first);
    for p in iter {
        bounds.extend(p);
    }
    Some(bounds)
}
