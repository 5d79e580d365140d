//! 问题状态存储 - 基础设施层
//!
//! 持有"当前问题定义"这一共享状态，只暴露读写能力

use crate::models::{City, CityId, DemandMap, ProblemParams, ProblemParamsPatch};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// 一次性读出的完整问题快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemSnapshot {
    pub params: ProblemParams,
    pub cities: Vec<City>,
    pub demands: DemandMap,
}

/// 问题状态存储
///
/// 职责：
/// - 保存参数、已选城市和需求量
/// - 写入时复制入参，读取时返回副本，外部修改不会影响内部状态
/// - 参数是合并写入，城市和需求是整体替换
///
/// 多个写者之间是"最后一次写入生效"。
pub struct ProblemStore {
    inner: RwLock<ProblemSnapshot>,
}

impl ProblemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ProblemSnapshot::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ProblemSnapshot> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProblemSnapshot> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_params(&self, patch: ProblemParamsPatch) {
        let mut inner = self.write();
        inner.params.merge(patch);
        debug!("更新问题参数: {:?}", inner.params);
    }

    pub fn params(&self) -> ProblemParams {
        self.read().params
    }

    pub fn set_cities(&self, cities: &[City]) {
        self.write().cities = cities.to_vec();
    }

    pub fn cities(&self) -> Vec<City> {
        self.read().cities.clone()
    }

    pub fn set_demands(&self, demands: &DemandMap) {
        self.write().demands = demands.clone();
    }

    pub fn demands(&self) -> DemandMap {
        self.read().demands.clone()
    }

    /// 在同一把锁下读出全部状态
    pub fn snapshot(&self) -> ProblemSnapshot {
        self.read().clone()
    }

    /// 查询需求量，未知城市返回 0
    pub fn demand_of(&self, id: &CityId) -> u32 {
        self.read()
            .demands
            .get(&id.to_string())
            .copied()
            .unwrap_or(0)
    }
}

impl Default for ProblemStore {
    fn default() -> Self {
        Self::new()
    }
}
