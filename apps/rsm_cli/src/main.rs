// apps/rsm_cli/src/main.rs

//! RSM 命令行界面
//!
//! 提供 Reynolds 应力闭合的配置校验、常数查看与均匀剪切演示。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**，只通过 `RsmConfig` 与
//! `ReynoldsStressEquation` 使用物理层。库内经 `log` 输出的记录
//! 由 tracing 订阅器一并接收。

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

/// Reynolds 应力闭合命令行工具
#[derive(Parser)]
#[command(name = "rsm_cli")]
#[command(author = "RSM Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reynolds-stress transport closure engine", long_about = None)]
struct Cli {
    /// 日志级别
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 运行均匀剪切演示
    Run(commands::run::RunArgs),
    /// 显示闭合常数与默认配置
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .finish()
        .try_init()?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
