// crates/rsm_config/src/lib.rs

//! RSM Config Layer (Layer 2)
//!
//! 配置层，提供闭合模型选择、闭合常数表和数值选项。
//! 所有配置在启动时读取并校验，之后只读。
//!
//! # 模块概览
//!
//! - [`model`]: 湍流闭合类型与求解模式
//! - [`constants`]: 各闭合模型的常数表
//! - [`rsm_config`]: `RsmConfig` 总配置（时间格式、浮力、旋转、扩散、裁剪、线性求解）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: rsm_cli        ─> uses RsmConfig
//! Layer 3: rsm_physics    ─> 读取 RsmConfig 构建闭合与裁剪
//! Layer 2: rsm_config     ─> (本层)
//! Layer 1: rsm_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;
pub mod model;
pub mod rsm_config;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use constants::{ClosureConstants, CommonConstants, EbrsmConstants, LrrConstants, SsgConstants};
pub use error::ConfigError;
pub use model::{RotationFormulation, SolveMode, TurbulenceModelKind};
pub use rsm_config::{
    BuoyancyConfig, ClippingConfig, DiffusionConfig, DiffusionModel, DissipationClipMode,
    FaceMean, LinearSolverConfig, RotationConfig, RsmConfig, ScalarDiffusivityForm,
    TimeSchemeConfig,
};
