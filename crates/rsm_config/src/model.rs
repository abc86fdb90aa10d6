// crates/rsm_config/src/model.rs

//! 湍流闭合类型与求解模式
//!
//! 闭合名称沿用边界条件界面的命名（`Rij-epsilon`、`Rij-SSG`、`Rij-EBRSM`），
//! 便于直接读取既有算例的配置。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// 压力-应变闭合类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TurbulenceModelKind {
    /// 线性 Rotta 型（LRR）
    #[default]
    #[serde(rename = "Rij-epsilon")]
    Lrr,
    /// 二次型（SSG）
    #[serde(rename = "Rij-SSG")]
    Ssg,
    /// 椭圆混合（EBRSM）
    #[serde(rename = "Rij-EBRSM")]
    Ebrsm,
}

impl TurbulenceModelKind {
    /// 全部闭合类型
    pub const ALL: [Self; 3] = [Self::Lrr, Self::Ssg, Self::Ebrsm];

    /// 配置文件中的名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lrr => "Rij-epsilon",
            Self::Ssg => "Rij-SSG",
            Self::Ebrsm => "Rij-EBRSM",
        }
    }

    /// 是否需要椭圆混合场 α
    pub fn needs_elliptic_blending(&self) -> bool {
        matches!(self, Self::Ebrsm)
    }

    /// 是否为二次型压力-应变（SSG 与 EBRSM 的均匀部分）
    pub fn is_quadratic(&self) -> bool {
        !matches!(self, Self::Lrr)
    }
}

impl fmt::Display for TurbulenceModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TurbulenceModelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Rij-epsilon" | "rij-epsilon" | "LRR" | "lrr" => Ok(Self::Lrr),
            "Rij-SSG" | "rij-ssg" | "SSG" | "ssg" => Ok(Self::Ssg),
            "Rij-EBRSM" | "rij-ebrsm" | "EBRSM" | "ebrsm" => Ok(Self::Ebrsm),
            other => Err(ConfigError::UnknownModel(other.to_string())),
        }
    }
}

/// 张量方程求解模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SolveMode {
    /// 逐分量求解（每个分量一个标量对角）
    Segregated,
    /// 张量耦合求解（每单元 6×6 块）
    #[default]
    Coupled,
}

impl SolveMode {
    /// 是否耦合
    pub fn is_coupled(&self) -> bool {
        matches!(self, Self::Coupled)
    }
}

impl FromStr for SolveMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "segregated" => Ok(Self::Segregated),
            "coupled" => Ok(Self::Coupled),
            other => Err(ConfigError::invalid("solve_mode", other, "应为 segregated 或 coupled")),
        }
    }
}

/// 旋转坐标系下的速度表述
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationFormulation {
    /// 相对速度表述（科氏系数 2）
    #[default]
    Relative,
    /// 混合表述（科氏系数 1）
    Mixed,
}

impl RotationFormulation {
    /// 科氏项系数
    pub fn coriolis_coefficient(&self) -> f64 {
        match self {
            Self::Relative => 2.0,
            Self::Mixed => 1.0,
        }
    }
}
