//! 问题生成 - 业务能力层
//!
//! 对应面板上的 "Generate Problem"：取前 n 个城市，挂上需求量，写入问题存储

use crate::error::{AppResult, BusinessError};
use crate::infrastructure::ProblemStore;
use crate::models::{City, DemandMap, ProblemParams};
use rand::Rng;
use tracing::{info, warn};

/// E-n22-k4 算例的需求量（按城市顺序）
const DEMANDS_22: [u32; 22] = [
    0, 1100, 700, 800, 1400, 2100, 400, 800, 100, 500, 600, 1200, 1300, 1300, 300, 900, 2100,
    1000, 900, 2500, 1800, 700,
];

/// E-n33-k4 算例的需求量
const DEMANDS_33: [u32; 33] = [
    0, 700, 400, 400, 1200, 40, 80, 2000, 900, 600, 750, 1500, 150, 250, 1600, 450, 700, 550, 650,
    200, 400, 300, 1300, 700, 750, 1400, 4000, 600, 1000, 500, 2500, 1700, 1100,
];

/// E-n76 算例的需求量
const DEMANDS_76: [u32; 76] = [
    0, 18, 26, 11, 30, 21, 19, 15, 16, 29, 26, 37, 16, 12, 31, 8, 19, 20, 13, 15, 22, 28, 12, 6,
    27, 14, 18, 17, 29, 13, 22, 25, 28, 27, 19, 10, 12, 14, 24, 16, 33, 15, 11, 18, 17, 21, 27,
    19, 20, 5, 22, 12, 19, 22, 16, 7, 26, 14, 21, 24, 13, 15, 18, 11, 28, 9, 37, 30, 10, 8, 11, 3,
    1, 6, 10, 20,
];

/// 随机需求量的上限（含）
const RANDOM_DEMAND_MAX: u32 = 500;

/// 已知算例的需求表
pub fn benchmark_demands(depot_count: u32) -> Option<&'static [u32]> {
    match depot_count {
        22 => Some(&DEMANDS_22),
        33 => Some(&DEMANDS_33),
        76 => Some(&DEMANDS_76),
        _ => None,
    }
}

/// 生成的问题
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedProblem {
    pub params: ProblemParams,
    pub cities: Vec<City>,
    pub demands: DemandMap,
}

impl GeneratedProblem {
    /// 写入问题存储：参数合并，城市和需求整体替换
    pub fn apply(&self, store: &ProblemStore) {
        store.set_params(self.params.into());
        store.set_cities(&self.cities);
        store.set_demands(&self.demands);
    }
}

/// 生成问题
///
/// 取 `all_cities` 的前 `depot_count` 个城市（不足时全部取用）。已知算例（22/33/76）使用固定需求表，
/// 表中缺失的位置取 0；其他规模随机生成 `1..=500` 的需求量。
pub fn generate_problem(
    all_cities: &[City],
    depot_count: u32,
    capacity: u32,
    fleet_size: u32,
) -> AppResult<GeneratedProblem> {
    generate_problem_with_rng(all_cities, depot_count, capacity, fleet_size, &mut rand::thread_rng())
}

pub fn generate_problem_with_rng<R: Rng>(
    all_cities: &[City],
    depot_count: u32,
    capacity: u32,
    fleet_size: u32,
    rng: &mut R,
) -> AppResult<GeneratedProblem> {
    if all_cities.is_empty() {
        return Err(BusinessError::NoCities.into());
    }

    let requested = depot_count as usize;
    if requested > all_cities.len() {
        warn!(
            "⚠️ 需要 {} 个城市，但只加载了 {} 个，按实际数量生成",
            requested,
            all_cities.len()
        );
    }

    let table = benchmark_demands(depot_count);
    let cities: Vec<City> = all_cities[..requested.min(all_cities.len())]
        .iter()
        .enumerate()
        .map(|(idx, city)| {
            let demand = match table {
                Some(table) => table.get(idx).copied().unwrap_or(0),
                None => rng.gen_range(1..=RANDOM_DEMAND_MAX),
            };
            city.clone().with_demand(demand)
        })
        .collect();

    let demands: DemandMap = cities
        .iter()
        .map(|c| (c.id.to_string(), c.demand))
        .collect();

    info!(
        "✓ 已生成问题: {} 个城市, 容量 {}, 车队 {}{}",
        cities.len(),
        capacity,
        fleet_size,
        if table.is_some() { " (标准算例需求)" } else { " (随机需求)" }
    );

    Ok(GeneratedProblem {
        params: ProblemParams {
            depot_count,
            capacity,
            fleet_size,
        },
        cities,
        demands,
    })
}

/// 解析数字输入框：去掉所有非数字字符，空串时取默认值
pub fn parse_numeric_field(input: &str, default: u32) -> u32 {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return default;
    }
    digits.parse().unwrap_or(default)
}
