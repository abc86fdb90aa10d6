// apps/rsm_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 解析配置文件并给出错误与可疑设置。

use anyhow::{bail, Result};
use clap::Args;
use rsm_config::{ConfigError, RsmConfig};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== RSM 配置验证 ===");

    let mut result = ValidationResult::default();
    if let Some(config) = load_config(&args.config, &mut result) {
        check_settings(&config, &mut result);
        println!(
            "  闭合: {}, 模式: {:?}, 扩散: {:?}",
            config.turbulence_model, config.solve_mode, config.diffusion.model
        );
    }

    print_validation_result(&result, args.strict)
}

fn load_config(path: &Path, result: &mut ValidationResult) -> Option<RsmConfig> {
    println!("\n检查配置文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("配置文件不存在: {}", path.display()));
        return None;
    }

    match RsmConfig::from_file(path) {
        Ok(config) => {
            println!("  ✓ 配置文件格式有效");
            Some(config)
        }
        Err(ConfigError::UnknownModel(name)) => {
            result.add_error(format!("未知的湍流闭合 '{name}'，可选: Rij-epsilon, Rij-SSG, Rij-EBRSM"));
            None
        }
        Err(e) => {
            result.add_error(e.to_string());
            None
        }
    }
}

fn check_settings(config: &RsmConfig, result: &mut ValidationResult) {
    if config.wall_echo && !config.wall_echo_active() {
        result.add_warning("wall_echo 只在逐分量 LRR 下生效，当前设置会被忽略");
    }
    if config.rotation.enabled && config.rotation.omega.iter().all(|w| *w == 0.0) {
        result.add_warning("rotation 已启用但角速度为零");
    }
    if config.buoyancy.enabled && config.buoyancy.gravity.iter().all(|g| *g == 0.0) {
        result.add_warning("buoyancy 已启用但重力为零");
    }
    if config.time_scheme.extrapolate && config.time_scheme.istat == 0.0 {
        result.add_warning("定常计算 (istat = 0) 下开启了源项外推");
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    if result.is_ok(strict) {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
