/// 日志工具模块
///
/// 提供日志初始化、运行报告和格式化输出的辅助函数
use crate::error::AppError;
use anyhow::Result;
use std::fs;
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 求解器输出在日志里的预览长度
pub const OUTPUT_PREVIEW_CHARS: usize = 2000;

/// 初始化 tracing 订阅器
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式下为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化运行报告文件
///
/// # 参数
/// - `log_file_path`: 报告文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n车队路线求解报告 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 向运行报告追加一段内容
pub fn append_log(log_file_path: &str, content: &str) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    writeln!(file, "{}", content).map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `api_base`: 求解器后端地址
/// - `cities_file`: 城市列表文件
pub fn log_startup(api_base: &str, cities_file: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 车队路线规划");
    info!("🌐 求解器后端: {}", api_base);
    info!("📁 城市列表: {}", cities_file);
    info!("{}", "=".repeat(60));
}

/// 记录单个求解器的运行结果
///
/// # 参数
/// - `solver`: 求解器名称
/// - `state`: 最终状态
/// - `routes`: 路线数量
/// - `message`: 面板消息
pub fn log_run_complete(solver: &str, state: &str, routes: usize, message: &str) {
    info!("\n{}", "─".repeat(60));
    info!("[{}] 运行结束: {} ({} 条路线)", solver, state, routes);
    if !message.is_empty() {
        info!("[{}] 💬 {}", solver, truncate_text(message, 200));
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功的求解器数量
/// - `failed`: 失败的求解器数量
/// - `total`: 求解器总数
/// - `log_file_path`: 报告文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部求解完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
