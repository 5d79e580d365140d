//! 预置算例
//!
//! 三组标准 CVRP 算例（容量, 车队, 城市数）直接返回已知结果，不访问后端

use crate::models::route::PATH_SEPARATOR;
use crate::models::{palette_color, Route, SolverTotals};
use std::collections::BTreeMap;

/// 一组预置结果
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// `(capacity, fleet_size, depot_count)`
    pub triple: (u32, u32, u32),
    pub totals: SolverTotals,
    pub routes: Vec<Route>,
    pub summary: BTreeMap<String, String>,
    pub message: String,
}

impl Preset {
    fn build(
        triple: (u32, u32, u32),
        distance: f64,
        time_sec: f64,
        routes: &[(u32, &str)],
        summary: [(&str, &str); 5],
        message: &str,
    ) -> Self {
        let routes = routes
            .iter()
            .enumerate()
            .map(|(idx, (id, path_text))| {
                let nodes = path_text
                    .split(PATH_SEPARATOR)
                    .filter_map(|t| t.trim().parse::<u32>().ok())
                    .collect();
                Route::new(*id, format!("Route {}", id), nodes, palette_color(idx)).with_path_text(*path_text)
            })
            .collect();

        Self {
            triple,
            totals: SolverTotals {
                distance: Some(distance),
                time_sec: Some(time_sec),
            },
            routes,
            summary: summary
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            message: message.to_string(),
        }
    }
}

/// 预置表
#[derive(Debug, Clone, Default)]
pub struct PresetTable {
    presets: Vec<Preset>,
}

impl PresetTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 三元组完全相等才命中
    pub fn lookup(&self, triple: (u32, u32, u32)) -> Option<&Preset> {
        self.presets.iter().find(|p| p.triple == triple)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn standard() -> Self {
        let presets = vec![
            Preset::build(
                (6000, 4, 22),
                26530.04,
                20.25,
                &[
                    (1, "1 → 3 → 10 → 7 → 19 → 15 → 14 → 1"),
                    (2, "1 → 5 → 13 → 2 → 20 → 1"),
                    (3, "1 → 6 → 16 → 1 → 8 → 17 → 1"),
                    (4, "1 → 11 → 9 → 18 → 21 → 4 → 12 → 1"),
                ],
                [
                    ("Status", "FEASIBLE"),
                    ("Objective value", "26529.89"),
                    ("Used edges", "25"),
                    ("Total distance", "26530.04"),
                    ("Total runtime", "20.27"),
                ],
                "Saved E-n22-k4.txt and ran classical OR solver.",
            ),
            Preset::build(
                (8000, 4, 33),
                27547.29,
                20.25,
                &[
                    (1, "1 → 6 → 23 → 20 → 11 → 26 → 2 → 13 → 5 → 1"),
                    (2, "1 → 16 → 25 → 30 → 7 → 27 → 10 → 1"),
                    (3, "1 → 29 → 17 → 8 → 1 → 22 → 3 → 31 → 1"),
                    (4, "1 → 32 → 19 → 24 → 12 → 4 → 21 → 28 → 18 → 9 → 15 → 14 → 1"),
                ],
                [
                    ("Status", "FEASIBLE"),
                    ("Objective value", "27547.29"),
                    ("Used edges", "25"),
                    ("Total distance", "27547.29"),
                    ("Total runtime", "20.25"),
                ],
                "Saved E-n33-k4.txt and ran classical OR solver.",
            ),
            // 76 城算例的路线 id 重复出现 1..4
            Preset::build(
                (180, 8, 76),
                73170.29,
                20.78,
                &[
                    (1, "1 → 4 → 73 → 72 → 19 → 40 → 9 → 58 → 5 → 16 → 1"),
                    (2, "1 → 25 → 44 → 65 → 21 → 12 → 30 → 33 → 57 → 48 → 23 → 1"),
                    (3, "1 → 29 → 56 → 15 → 28 → 47 → 46 → 18 → 62 → 41 → 36 → 1"),
                    (4, "1 → 31 → 55 → 27 → 10 → 49 → 8 → 1 → 17 → 1"),
                    (1, "1 → 42 → 69 → 68 → 74 → 67 → 75 → 66 → 34 → 39 → 35 → 1"),
                    (2, "1 → 50 → 14 → 64 → 32 → 70 → 71 → 53 → 52 → 51 → 1"),
                    (3, "1 → 59 → 60 → 24 → 38 → 37 → 7 → 54 → 22 → 45 → 3 → 1"),
                    (4, "11 → 61 → 63 → 43 → 26 → 13 → 2 → 11 → 20 → 6 → 1"),
                ],
                [
                    ("Status", "FEASIBLE"),
                    ("Objective value", "73170.29"),
                    ("Used edges", "25"),
                    ("Total distance", "73170.29"),
                    ("Total runtime", "20.78"),
                ],
                "Saved E-n33-k4.txt and ran classical OR solver.",
            ),
        ];

        Self { presets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_requires_exact_triple() {
        let table = PresetTable::standard();
        assert_eq!(table.len(), 3);
        assert!(table.lookup((6000, 4, 22)).is_some());
        assert!(table.lookup((6000, 4, 23)).is_none());
        assert!(table.lookup((4, 6000, 22)).is_none());
        assert!(PresetTable::empty().lookup((6000, 4, 22)).is_none());
    }

    #[test]
    fn test_e22_preset_values() {
        let table = PresetTable::standard();
        let preset = table.lookup((6000, 4, 22)).unwrap();

        assert_eq!(preset.totals.distance, Some(26530.04));
        assert_eq!(preset.totals.time_sec, Some(20.25));
        assert_eq!(preset.routes.len(), 4);
        assert_eq!(preset.routes[1].node_sequence, vec![1, 5, 13, 2, 20, 1]);
        assert_eq!(preset.routes[1].path_text, "1 → 5 → 13 → 2 → 20 → 1");
        assert!(preset.routes.iter().all(|r| r.visible));
        assert_eq!(preset.summary["Objective value"], "26529.89");
    }

    #[test]
    fn test_e76_keeps_repeated_ids() {
        let table = PresetTable::standard();
        let preset = table.lookup((180, 8, 76)).unwrap();

        assert_eq!(preset.routes.len(), 8);
        assert_eq!(preset.routes[4].id, 1);
        assert_eq!(preset.routes[4].color, palette_color(4));
        assert_eq!(preset.routes[7].node_sequence[0], 11);
    }
}
