use crate::error::{AppError, AppResult};
use crate::services::problem_generator::parse_numeric_field;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 求解器后端地址
    pub solver_api_base: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 城市列表文件
    pub cities_file: String,
    /// 生成问题时的城市数量
    pub depot_count: u32,
    /// 单车容量
    pub vehicle_capacity: u32,
    /// 车队规模
    pub fleet_size: u32,
    /// 是否启用预置算例（仅 OR 求解器）
    pub enable_presets: bool,
    /// 预置算例的模拟耗时（毫秒）
    pub preset_delay_ms: u64,
    /// 进度条刷新间隔（毫秒）
    pub progress_frame_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行报告文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solver_api_base: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 120,
            cities_file: "data/cities.toml".to_string(),
            depot_count: 22,
            vehicle_capacity: 500,
            fleet_size: 4,
            enable_presets: true,
            preset_delay_ms: 20_000,
            progress_frame_ms: 50,
            verbose_logging: false,
            output_log_file: "run_report.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            solver_api_base: std::env::var("SOLVER_API_BASE").unwrap_or(default.solver_api_base),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            cities_file: std::env::var("CITIES_FILE").unwrap_or(default.cities_file),
            depot_count: numeric_var(std::env::var("DEPOT_COUNT").ok(), default.depot_count),
            vehicle_capacity: numeric_var(std::env::var("VEHICLE_CAPACITY").ok(), default.vehicle_capacity),
            fleet_size: numeric_var(std::env::var("FLEET_SIZE").ok(), default.fleet_size),
            enable_presets: std::env::var("ENABLE_PRESETS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.enable_presets),
            preset_delay_ms: std::env::var("PRESET_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.preset_delay_ms),
            progress_frame_ms: std::env::var("PROGRESS_FRAME_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.progress_frame_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.solver_api_base.trim().is_empty() {
            return Err(AppError::invalid_config("SOLVER_API_BASE", &self.solver_api_base, "不能为空"));
        }
        if self.depot_count == 0 {
            return Err(AppError::invalid_config("DEPOT_COUNT", "0", "至少需要 1 个城市"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn preset_delay(&self) -> Duration {
        Duration::from_millis(self.preset_delay_ms)
    }

    pub fn progress_frame(&self) -> Duration {
        Duration::from_millis(self.progress_frame_ms.max(1))
    }
}

/// 问题参数按输入框的规则读取，`6,000` 与 `6000` 等价
fn numeric_var(value: Option<String>, default: u32) -> u32 {
    value.map_or(default, |v| parse_numeric_field(&v, default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_vars_accept_grouped_digits() {
        assert_eq!(numeric_var(Some("6,000".to_string()), 500), 6000);
        assert_eq!(numeric_var(Some(" 4 trucks".to_string()), 1), 4);
        assert_eq!(numeric_var(Some("none".to_string()), 22), 22);
        assert_eq!(numeric_var(None, 22), 22);
    }

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.preset_delay(), Duration::from_secs(20));
    }

    #[test]
    fn test_validate_rejects_empty_base() {
        let config = Config {
            solver_api_base: "  ".to_string(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SOLVER_API_BASE"));
    }

    #[test]
    fn test_validate_rejects_zero_depots() {
        let config = Config {
            depot_count: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_progress_frame_never_zero() {
        let config = Config {
            progress_frame_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.progress_frame(), Duration::from_millis(1));
    }
}
