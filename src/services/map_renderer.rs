//! 地图渲染 - 业务能力层
//!
//! 订阅事件总线上的路线事件，结合问题存储里的城市坐标，计算折线、箭头和镜头范围

use crate::infrastructure::event_bus::{BusEvent, Channel, EventBus, Subscription};
use crate::infrastructure::map_surface::{Arrow, MapSurface, Marker, Polyline};
use crate::infrastructure::ProblemStore;
use crate::models::{City, Route};
use crate::services::geometry::{bearing, fit_bounds, interpolate, Bounds, LatLng, ARROW_FRACTIONS};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// 没有路线经过时城市标记的颜色
pub const DEFAULT_MARKER_COLOR: &str = "#ffcc00";

/// 已计算好坐标的路线
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRoute {
    pub route: Route,
    pub path: Vec<LatLng>,
    pub arrows: Vec<Arrow>,
}

impl RenderedRoute {
    pub fn is_drawable(&self) -> bool {
        self.route.visible && self.path.len() > 1
    }
}

/// 一帧绘制内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapFrame {
    pub markers: Vec<Marker>,
    pub polylines: Vec<Polyline>,
    /// (箭头, 颜色)
    pub arrows: Vec<(Arrow, String)>,
    pub camera: Option<Bounds>,
    pub needs_resize: bool,
}

#[derive(Debug, Default)]
struct MapState {
    depots: Vec<City>,
    routes: Vec<RenderedRoute>,
    camera: Option<Bounds>,
    needs_resize: bool,
}

/// 节点号从 1 开始，对应城市列表中的位置；找不到的节点跳过
fn resolve_path(route: &Route, cities: &[City]) -> Vec<LatLng> {
    route
        .node_sequence
        .iter()
        .filter_map(|&idx| (idx as usize).checked_sub(1).and_then(|i| cities.get(i)))
        .map(|c| LatLng::new(c.lat, c.lon))
        .collect()
}

/// 每段路线在固定比例处放置箭头，方向为该段的方位角
pub fn place_arrows(path: &[LatLng]) -> Vec<Arrow> {
    path.windows(2)
        .flat_map(|seg| {
            let (a, b) = (seg[0], seg[1]);
            let rotation = bearing(a, b);
            ARROW_FRACTIONS.into_iter().map(move |t| Arrow {
                position: interpolate(a, b, t),
                rotation,
            })
        })
        .collect()
}

pub fn build_routes(routes: &[Route], cities: &[City]) -> Vec<RenderedRoute> {
    routes
        .iter()
        .map(|route| {
            let path = resolve_path(route, cities);
            let arrows = place_arrows(&path);
            RenderedRoute {
                route: route.clone(),
                path,
                arrows,
            }
        })
        .collect()
}

/// 地图渲染器
///
/// 职责：
/// - `routes:set` 替换全部路线，`route:toggle` 切换单条路线可见性
/// - `layout:changed` 标记下一帧需要重算尺寸
/// - 生成帧时计算城市着色和镜头范围
pub struct MapRenderer {
    store: Arc<ProblemStore>,
    state: Arc<Mutex<MapState>>,
    subscriptions: Vec<Subscription>,
}

impl MapRenderer {
    /// 创建渲染器并订阅总线
    pub fn attach(store: Arc<ProblemStore>, bus: &EventBus) -> Self {
        let state = Arc::new(Mutex::new(MapState {
            needs_resize: true,
            ..Default::default()
        }));

        let mut subscriptions = Vec::with_capacity(3);

        let set_state = Arc::clone(&state);
        let set_store = Arc::clone(&store);
        subscriptions.push(bus.on(Channel::RoutesSet, move |event| {
            if let BusEvent::RoutesSet(routes) = event {
                let rendered = build_routes(routes, &set_store.cities());
                debug!("地图收到 {} 条路线", rendered.len());
                lock(&set_state).routes = rendered;
            }
        }));

        let toggle_state = Arc::clone(&state);
        subscriptions.push(bus.on(Channel::RouteToggle, move |event| {
            if let BusEvent::RouteToggle { id, visible } = event {
                for rendered in lock(&toggle_state).routes.iter_mut().filter(|r| r.route.id == *id) {
                    rendered.route.set_visible(*visible);
                }
            }
        }));

        let layout_state = Arc::clone(&state);
        subscriptions.push(bus.on(Channel::LayoutChanged, move |_| {
            lock(&layout_state).needs_resize = true;
        }));

        Self {
            store,
            state,
            subscriptions,
        }
    }

    /// 退订所有频道
    pub fn detach(self) {
        for sub in self.subscriptions {
            sub.unsubscribe();
        }
    }

    /// 显示城市标记，优先使用传入的列表，否则读问题存储
    pub fn show_problem(&self, cities: Option<Vec<City>>) {
        let cities = cities.unwrap_or_else(|| self.store.cities());
        lock(&self.state).depots = cities;
    }

    pub fn routes(&self) -> Vec<RenderedRoute> {
        lock(&self.state).routes.clone()
    }

    /// 生成一帧
    ///
    /// 没有任何点时沿用上一次的镜头范围；尺寸重算标记读取后清除。
    pub fn frame(&self) -> MapFrame {
        let mut state = lock(&self.state);

        let mut city_colors: HashMap<String, &str> = HashMap::new();
        for rendered in state.routes.iter().filter(|r| r.route.visible) {
            for node in &rendered.route.node_sequence {
                city_colors.insert(node.to_string(), &rendered.route.color);
            }
        }

        let markers: Vec<Marker> = state
            .depots
            .iter()
            .map(|city| Marker {
                position: LatLng::new(city.lat, city.lon),
                label: format!("#{} {}", city.id, city.name),
                fill_color: city_colors
                    .get(&city.id.to_string())
                    .copied()
                    .unwrap_or(DEFAULT_MARKER_COLOR)
                    .to_string(),
                demand: Some(city.demand),
            })
            .collect();

        let drawable: Vec<&RenderedRoute> = state.routes.iter().filter(|r| r.is_drawable()).collect();
        let polylines: Vec<Polyline> = drawable
            .iter()
            .map(|r| Polyline {
                route_id: r.route.id,
                points: r.path.clone(),
                color: r.route.color.clone(),
            })
            .collect();
        let arrows: Vec<(Arrow, String)> = drawable
            .iter()
            .flat_map(|r| r.arrows.iter().map(|a| (*a, r.route.color.clone())))
            .collect();

        let points = state
            .depots
            .iter()
            .map(|c| LatLng::new(c.lat, c.lon))
            .chain(state.routes.iter().flat_map(|r| r.path.iter().copied()));
        let camera = fit_bounds(points).or(state.camera);

        drop(city_colors);
        state.camera = camera;
        let needs_resize = std::mem::take(&mut state.needs_resize);

        MapFrame {
            markers,
            polylines,
            arrows,
            camera,
            needs_resize,
        }
    }

    /// 把一帧画到外部绘制面上
    pub fn render<S: MapSurface>(&self, surface: &mut S) -> MapFrame {
        let frame = self.frame();

        if frame.needs_resize {
            surface.invalidate_size();
        }
        for marker in &frame.markers {
            surface.draw_marker(marker);
        }
        for line in &frame.polylines {
            surface.draw_polyline(line);
        }
        for (arrow, color) in &frame.arrows {
            surface.draw_arrow(arrow, color);
        }
        if let Some(bounds) = frame.camera {
            surface.fit_bounds(bounds);
        }

        frame
    }
}

fn lock(state: &Mutex<MapState>) -> MutexGuard<'_, MapState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
