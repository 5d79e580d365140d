use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 城市 ID -> 需求量
///
/// key 为 `CityId` 的字符串形式，与后端 `demands` 字段保持一致
pub type DemandMap = BTreeMap<String, u32>;

/// 问题参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemParams {
    /// 参与求解的城市（站点）数量
    pub depot_count: u32,
    /// 单车容量
    pub capacity: u32,
    /// 车队规模
    pub fleet_size: u32,
}

impl Default for ProblemParams {
    fn default() -> Self {
        Self {
            depot_count: 22,
            capacity: 500,
            fleet_size: 4,
        }
    }
}

impl ProblemParams {
    /// 浅合并：只覆盖 patch 中给出的字段
    pub fn merge(&mut self, patch: ProblemParamsPatch) {
        if let Some(depot_count) = patch.depot_count {
            self.depot_count = depot_count;
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = capacity;
        }
        if let Some(fleet_size) = patch.fleet_size {
            self.fleet_size = fleet_size;
        }
    }

    /// `(capacity, fleet_size, depot_count)` 三元组，用于匹配预置算例
    pub fn triple(&self) -> (u32, u32, u32) {
        (self.capacity, self.fleet_size, self.depot_count)
    }
}

/// 参数的部分更新
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProblemParamsPatch {
    pub depot_count: Option<u32>,
    pub capacity: Option<u32>,
    pub fleet_size: Option<u32>,
}

impl From<ProblemParams> for ProblemParamsPatch {
    fn from(params: ProblemParams) -> Self {
        Self {
            depot_count: Some(params.depot_count),
            capacity: Some(params.capacity),
            fleet_size: Some(params.fleet_size),
        }
    }
}

/// 城市 ID，数据源里既可能是整数也可能是字符串
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CityId {
    Int(i64),
    Text(String),
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CityId::Int(id) => write!(f, "{}", id),
            CityId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for CityId {
    fn from(id: i64) -> Self {
        CityId::Int(id)
    }
}

impl From<&str> for CityId {
    fn from(id: &str) -> Self {
        CityId::Text(id.to_string())
    }
}

/// 城市
///
/// 发往后端时经纬度字段名为 `lat` / `lng`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub lat: f64,
    #[serde(rename = "lng", alias = "lon")]
    pub lon: f64,
    #[serde(default)]
    pub demand: u32,
}

impl City {
    pub fn new(id: impl Into<CityId>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lon,
            demand: 0,
        }
    }

    pub fn with_demand(mut self, demand: u32) -> Self {
        self.demand = demand;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_only_overwrites_given_fields() {
        let mut params = ProblemParams::default();
        params.merge(ProblemParamsPatch {
            capacity: Some(6000),
            ..Default::default()
        });

        assert_eq!(params.capacity, 6000);
        assert_eq!(params.depot_count, 22);
        assert_eq!(params.fleet_size, 4);
    }

    #[test]
    fn test_city_wire_format_uses_lng() {
        let city = City::new(3, "Denver", 39.74, -104.99).with_demand(700);
        let json = serde_json::to_value(&city).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["lng"], -104.99);
        assert!(json.get("lon").is_none());
    }

    #[test]
    fn test_city_id_accepts_int_or_text() {
        let a: CityId = serde_json::from_str("12").unwrap();
        let b: CityId = serde_json::from_str("\"A-7\"").unwrap();

        assert_eq!(a.to_string(), "12");
        assert_eq!(b.to_string(), "A-7");
    }
}
