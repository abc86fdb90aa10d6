// crates/rsm_config/src/rsm_config.rs

//! RsmConfig - Reynolds 应力方程配置
//!
//! 启动时读取 JSON，经 [`RsmConfig::validate`] 校验后交给物理层。
//! 所有字段都有默认值，配置文件只需写出与默认不同的部分。

use serde::{Deserialize, Serialize};
use std::path::Path;

use rsm_foundation::{EPZERO, EPZERO_SQ};

use crate::constants::ClosureConstants;
use crate::error::ConfigError;
use crate::model::{RotationFormulation, SolveMode, TurbulenceModelKind};

/// Reynolds 应力方程总配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RsmConfig {
    /// 压力-应变闭合
    #[serde(default)]
    pub turbulence_model: TurbulenceModelKind,

    /// 求解模式
    #[serde(default)]
    pub solve_mode: SolveMode,

    /// 时间格式
    #[serde(default)]
    pub time_scheme: TimeSchemeConfig,

    /// 浮力
    #[serde(default)]
    pub buoyancy: BuoyancyConfig,

    /// 系统旋转
    #[serde(default)]
    pub rotation: RotationConfig,

    /// 壁面回声（仅逐分量 LRR 生效）
    #[serde(default)]
    pub wall_echo: bool,

    /// 扩散系数
    #[serde(default)]
    pub diffusion: DiffusionConfig,

    /// 可实现性裁剪
    #[serde(default)]
    pub clipping: ClippingConfig,

    /// 参考线性求解器
    #[serde(default)]
    pub linear_solver: LinearSolverConfig,

    /// 闭合常数
    #[serde(default)]
    pub constants: ClosureConstants,
}

/// 源项时间外推配置（θ 格式）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSchemeConfig {
    /// 是否外推显式源项
    #[serde(default)]
    pub extrapolate: bool,
    /// 显式源项外推系数 θ_s
    #[serde(default = "default_theta")]
    pub theta_s: f64,
    /// 隐式源项系数 θ_v
    #[serde(default = "default_theta")]
    pub theta_v: f64,
    /// 非定常项开关 θ_stat（0 为定常）
    #[serde(default = "default_istat")]
    pub istat: f64,
}

fn default_theta() -> f64 { 0.5 }
fn default_istat() -> f64 { 1.0 }

impl Default for TimeSchemeConfig {
    fn default() -> Self {
        Self {
            extrapolate: false,
            theta_s: default_theta(),
            theta_v: default_theta(),
            istat: default_istat(),
        }
    }
}

/// 浮力配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuoyancyConfig {
    /// 是否启用
    #[serde(default)]
    pub enabled: bool,
    /// 重力加速度矢量 [m/s²]
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],
    /// 湍流 Schmidt 数 σ_t
    #[serde(default = "default_turbulent_schmidt")]
    pub turbulent_schmidt: f64,
}

fn default_gravity() -> [f64; 3] { [0.0, 0.0, -9.81] }
fn default_turbulent_schmidt() -> f64 { 1.0 }

impl Default for BuoyancyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gravity: default_gravity(),
            turbulent_schmidt: default_turbulent_schmidt(),
        }
    }
}

/// 系统旋转配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RotationConfig {
    /// 是否启用
    #[serde(default)]
    pub enabled: bool,
    /// 速度表述
    #[serde(default)]
    pub formulation: RotationFormulation,
    /// 均匀旋转角速度 [rad/s]（未提供单元级生成器时使用）
    #[serde(default)]
    pub omega: [f64; 3],
}

/// 扩散模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiffusionModel {
    /// 各向同性标量扩散
    #[default]
    Isotropic,
    /// GGDH / Daly-Harlow 张量扩散
    Ggdh,
}

/// 标量扩散率形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScalarDiffusivityForm {
    /// μ + C_s·μ_t/Cμ
    #[default]
    EddyViscosity,
    /// μ + C_s·ρ·k²/ε
    TurbulentScales,
}

/// 面值插值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FaceMean {
    /// 算术平均
    #[default]
    Arithmetic,
    /// 调和平均
    Harmonic,
}

/// 扩散系数配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DiffusionConfig {
    /// 扩散模型
    #[serde(default)]
    pub model: DiffusionModel,
    /// 标量形式
    #[serde(default)]
    pub scalar_form: ScalarDiffusivityForm,
    /// 面值插值
    #[serde(default)]
    pub face_mean: FaceMean,
}

/// 耗散率裁剪方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DissipationClipMode {
    /// 直接取下限
    #[default]
    Floor,
    /// 负值取绝对值并限制增长
    Reflect,
}

/// 可实现性裁剪配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClippingConfig {
    /// 最小特征值容差
    #[serde(default = "default_eigen_tolerance")]
    pub eigen_tolerance: f64,
    /// 对角分量与耗散率下限
    #[serde(default = "default_floor")]
    pub floor: f64,
    /// 近奇异判定系数 ε
    #[serde(default = "default_near_singular_eps")]
    pub near_singular_eps: f64,
    /// 逐分量模式下的耗散率裁剪方式
    #[serde(default)]
    pub dissipation: DissipationClipMode,
    /// 耗散率相对上一时间步的增长上限
    #[serde(default = "default_dissipation_growth")]
    pub dissipation_growth: f64,
}

fn default_eigen_tolerance() -> f64 { 1e-4 }
fn default_floor() -> f64 { EPZERO_SQ }
fn default_near_singular_eps() -> f64 { EPZERO }
fn default_dissipation_growth() -> f64 { 1.1 }

impl Default for ClippingConfig {
    fn default() -> Self {
        Self {
            eigen_tolerance: default_eigen_tolerance(),
            floor: default_floor(),
            near_singular_eps: default_near_singular_eps(),
            dissipation: DissipationClipMode::default(),
            dissipation_growth: default_dissipation_growth(),
        }
    }
}

/// 参考线性求解器配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSolverConfig {
    /// 相对收敛容差
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    /// 绝对收敛容差
    #[serde(default = "default_atol")]
    pub atol: f64,
    /// 最大迭代次数
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
}

fn default_rtol() -> f64 { 1e-10 }
fn default_atol() -> f64 { 1e-14 }
fn default_max_iter() -> usize { 500 }

impl Default for LinearSolverConfig {
    fn default() -> Self {
        Self {
            rtol: default_rtol(),
            atol: default_atol(),
            max_iter: default_max_iter(),
        }
    }
}

impl RsmConfig {
    /// 以指定闭合和求解模式创建默认配置
    pub fn new(model: TurbulenceModelKind, mode: SolveMode) -> Self {
        Self {
            turbulence_model: model,
            solve_mode: mode,
            ..Default::default()
        }
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析并校验
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: RsmConfig = serde_json::from_str(content).map_err(|e| {
            // serde 对未知枚举名给出的信息不够直接，这里单独识别
            let msg = e.to_string();
            if msg.contains("unknown variant") && msg.contains("Rij-") {
                ConfigError::UnknownModel(extract_variant(&msg))
            } else {
                ConfigError::Parse(msg)
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 是否有效启用壁面回声
    pub fn wall_echo_active(&self) -> bool {
        self.wall_echo
            && self.turbulence_model == TurbulenceModelKind::Lrr
            && self.solve_mode == SolveMode::Segregated
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ts = &self.time_scheme;
        if !(0.0..=1.0).contains(&ts.theta_s) {
            return Err(ConfigError::invalid("time_scheme.theta_s", ts.theta_s, "必须在 [0, 1] 范围内"));
        }
        if !(0.0..=1.0).contains(&ts.theta_v) {
            return Err(ConfigError::invalid("time_scheme.theta_v", ts.theta_v, "必须在 [0, 1] 范围内"));
        }
        if ts.istat != 0.0 && ts.istat != 1.0 {
            return Err(ConfigError::invalid("time_scheme.istat", ts.istat, "只能为 0 或 1"));
        }

        if self.buoyancy.enabled && self.buoyancy.turbulent_schmidt <= 0.0 {
            return Err(ConfigError::invalid(
                "buoyancy.turbulent_schmidt",
                self.buoyancy.turbulent_schmidt,
                "湍流 Schmidt 数必须为正",
            ));
        }

        let clip = &self.clipping;
        if !(clip.eigen_tolerance > 0.0 && clip.eigen_tolerance < 1.0 / 3.0) {
            return Err(ConfigError::invalid("clipping.eigen_tolerance", clip.eigen_tolerance, "必须在 (0, 1/3) 范围内"));
        }
        if clip.floor <= 0.0 {
            return Err(ConfigError::invalid("clipping.floor", clip.floor, "下限必须为正"));
        }
        if clip.near_singular_eps <= 0.0 {
            return Err(ConfigError::invalid("clipping.near_singular_eps", clip.near_singular_eps, "必须为正"));
        }
        if clip.dissipation_growth < 1.0 {
            return Err(ConfigError::invalid("clipping.dissipation_growth", clip.dissipation_growth, "不能小于 1"));
        }

        if self.linear_solver.max_iter == 0 {
            return Err(ConfigError::invalid("linear_solver.max_iter", 0, "至少迭代一次"));
        }

        if self.wall_echo && !self.wall_echo_active() {
            log::warn!(
                "壁面回声仅在逐分量 LRR 路径生效，当前 {} / {:?} 下将被忽略",
                self.turbulence_model,
                self.solve_mode
            );
        }

        self.constants.validate()
    }
}

fn extract_variant(msg: &str) -> String {
    msg.split('`')
        .nth(1)
        .map(str::to_string)
        .unwrap_or_else(|| msg.to_string())
}
