pub mod cli;
pub mod errors;
pub mod loader;

pub use cli::CliOptions;

use floorplan_config::AppConfig;
use errors::FrontendError;

/// 启动命令行前端：加载文档、执行脚本、打印概览，并按需保存。
pub fn run_cli(config: &AppConfig, options: &CliOptions) -> Result<(), FrontendError> {
    cli::log_startup(config, options);
    cli::run(config, options)
}
