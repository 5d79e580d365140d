//! 事件总线 - 基础设施层
//!
//! 同步发布/订阅，用来解耦求解面板和地图

use crate::models::Route;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::debug;

/// 频道，名称是稳定约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    LayoutChanged,
    RoutesSet,
    RouteToggle,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::LayoutChanged => "layout:changed",
            Channel::RoutesSet => "routes:set",
            Channel::RouteToggle => "route:toggle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "layout:changed" => Some(Channel::LayoutChanged),
            "routes:set" => Some(Channel::RoutesSet),
            "route:toggle" => Some(Channel::RouteToggle),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 总线上的事件
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// 布局变化，地图需要重新计算尺寸
    LayoutChanged,
    /// 替换地图上的全部路线
    RoutesSet(Vec<Route>),
    /// 切换单条路线的可见性
    RouteToggle { id: u32, visible: bool },
}

impl BusEvent {
    pub fn channel(&self) -> Channel {
        match self {
            BusEvent::LayoutChanged => Channel::LayoutChanged,
            BusEvent::RoutesSet(_) => Channel::RoutesSet,
            BusEvent::RouteToggle { .. } => Channel::RouteToggle,
        }
    }
}

type Handler = Arc<dyn Fn(&BusEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    by_channel: HashMap<Channel, Vec<(u64, Handler)>>,
}

/// 事件总线
///
/// - `emit` 同步调用该频道当前所有监听者（按注册顺序），全部返回后才返回
/// - 不缓存、不重放：晚于某次 emit 注册的监听者收不到那次事件
/// - 派发前先复制监听者列表，监听者里可以再订阅、退订或 emit
#[derive(Default)]
pub struct EventBus {
    listeners: Arc<Mutex<Listeners>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册监听者，返回退订句柄
    pub fn on<F>(&self, channel: Channel, handler: F) -> Subscription
    where
        F: Fn(&BusEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_channel
            .entry(channel)
            .or_default()
            .push((id, Arc::new(handler)));

        debug!("订阅 {} (listener #{})", channel, id);

        Subscription {
            channel,
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// 同步派发事件
    pub fn emit(&self, event: BusEvent) {
        let channel = event.channel();
        let handlers: Vec<Handler> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_channel
            .get(&channel)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        debug!("派发 {} -> {} 个监听者", channel, handlers.len());

        for handler in handlers {
            handler(&event);
        }
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_channel
            .get(&channel)
            .map_or(0, Vec::len)
    }
}

/// 退订句柄
///
/// 丢弃句柄不会退订，需要显式调用 `unsubscribe`
#[must_use = "不保存句柄就无法退订"]
pub struct Subscription {
    channel: Channel,
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn unsubscribe(self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let mut guard = listeners.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = guard.by_channel.get_mut(&self.channel) {
            list.retain(|(id, _)| *id != self.id);
        }
        debug!("退订 {} (listener #{})", self.channel, self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::palette_color;

    fn routes() -> Vec<Route> {
        vec![Route::new(1, "Truck #1", vec![1, 4, 1], palette_color(0))]
    }

    fn counter(bus: &EventBus, channel: Channel) -> (Arc<Mutex<Vec<BusEvent>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = bus.on(channel, move |e| sink.lock().unwrap().push(e.clone()));
        (seen, sub)
    }

    #[test]
    fn test_late_listener_gets_no_replay() {
        let bus = EventBus::new();
        bus.emit(BusEvent::RoutesSet(routes()));

        let (seen, _sub) = counter(&bus, Channel::RoutesSet);
        assert!(seen.lock().unwrap().is_empty());

        bus.emit(BusEvent::RoutesSet(routes()));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_delivered_exactly_once_per_emit() {
        let bus = EventBus::new();
        let (seen, _sub) = counter(&bus, Channel::RoutesSet);

        bus.emit(BusEvent::RoutesSet(routes()));
        bus.emit(BusEvent::RoutesSet(Vec::new()));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], BusEvent::RoutesSet(Vec::new()));
    }

    #[test]
    fn test_registration_order_and_channel_isolation() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let a = Arc::clone(&order);
        let _s1 = bus.on(Channel::LayoutChanged, move |_| a.lock().unwrap().push("first"));
        let b = Arc::clone(&order);
        let _s2 = bus.on(Channel::LayoutChanged, move |_| b.lock().unwrap().push("second"));
        let c = Arc::clone(&order);
        let _s3 = bus.on(Channel::RouteToggle, move |_| c.lock().unwrap().push("toggle"));

        bus.emit(BusEvent::LayoutChanged);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_listener() {
        let bus = EventBus::new();
        let (seen_a, sub_a) = counter(&bus, Channel::RouteToggle);
        let (seen_b, _sub_b) = counter(&bus, Channel::RouteToggle);

        sub_a.unsubscribe();
        bus.emit(BusEvent::RouteToggle { id: 1, visible: false });

        assert!(seen_a.lock().unwrap().is_empty());
        assert_eq!(seen_b.lock().unwrap().len(), 1);
        assert_eq!(bus.listener_count(Channel::RouteToggle), 1);
    }

    #[test]
    fn test_handler_may_emit_reentrantly() {
        let bus = Arc::new(EventBus::new());
        let (seen, _sub) = counter(&bus, Channel::LayoutChanged);

        let inner = Arc::clone(&bus);
        let _relay = bus.on(Channel::RoutesSet, move |_| inner.emit(BusEvent::LayoutChanged));

        bus.emit(BusEvent::RoutesSet(routes()));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_channel_names_are_stable() {
        for channel in [Channel::LayoutChanged, Channel::RoutesSet, Channel::RouteToggle] {
            assert_eq!(Channel::from_name(channel.as_str()), Some(channel));
        }
        assert_eq!(Channel::RoutesSet.to_string(), "routes:set");
    }
}
