// crates/rsm_config/src/constants.rs

//! 闭合常数表
//!
//! 各常数针对各向异性张量 `a_ij = R_ij/k − 2/3·δ_ij`（`k = tr(R)/2`）标定。
//!
//! | 模型 | 常数 |
//! |------|------|
//! | 公共 | Cμ 0.09, C_s 0.22, κ 0.42, C3 0.55 |
//! | LRR | C1 1.8, C2 0.6, C1' 0.5, C2' 0.3 |
//! | SSG | Cs1 1.7, Cs2 −1.05, Cr1 0.9, Cr2 0.8, Cr3 0.65, Cr4 0.625, Cr5 0.2 |
//! | EBRSM | Cebms1 1.7, Cebms2 0, Cebmr1..5 同 SSG，壁面系数 5 |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 公共常数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommonConstants {
    /// Cμ
    pub cmu: f64,
    /// 湍流扩散系数 C_s（Daly-Harlow）
    pub csrij: f64,
    /// von Karman 常数
    pub kappa: f64,
    /// 浮力项再分配系数 C3
    pub crij3: f64,
}

impl Default for CommonConstants {
    fn default() -> Self {
        Self {
            cmu: 0.09,
            csrij: 0.22,
            kappa: 0.42,
            crij3: 0.55,
        }
    }
}

/// LRR 常数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LrrConstants {
    /// 慢项 C1（回归各向同性）
    pub crij1: f64,
    /// 快项 C2（产生项各向同性化）
    pub crij2: f64,
    /// 壁面回声 C1'
    pub crijp1: f64,
    /// 壁面回声 C2'
    pub crijp2: f64,
}

impl Default for LrrConstants {
    fn default() -> Self {
        Self {
            crij1: 1.8,
            crij2: 0.6,
            crijp1: 0.5,
            crijp2: 0.3,
        }
    }
}

/// SSG 常数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SsgConstants {
    /// Cs1
    pub cssgs1: f64,
    /// Cs2
    pub cssgs2: f64,
    /// Cr1
    pub cssgr1: f64,
    /// Cr2
    pub cssgr2: f64,
    /// Cr3
    pub cssgr3: f64,
    /// Cr4
    pub cssgr4: f64,
    /// Cr5
    pub cssgr5: f64,
}

impl Default for SsgConstants {
    fn default() -> Self {
        Self {
            cssgs1: 1.7,
            cssgs2: -1.05,
            cssgr1: 0.9,
            cssgr2: 0.8,
            cssgr3: 0.65,
            cssgr4: 0.625,
            cssgr5: 0.2,
        }
    }
}

/// EBRSM 常数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EbrsmConstants {
    /// Cebms1
    pub cebms1: f64,
    /// Cebms2
    pub cebms2: f64,
    /// Cebmr1
    pub cebmr1: f64,
    /// Cebmr2
    pub cebmr2: f64,
    /// Cebmr3
    pub cebmr3: f64,
    /// Cebmr4
    pub cebmr4: f64,
    /// Cebmr5
    pub cebmr5: f64,
    /// 近壁再分配系数（φ_w 前的 −C·ε/k）
    pub wall_coef: f64,
}

impl Default for EbrsmConstants {
    fn default() -> Self {
        Self {
            cebms1: 1.7,
            cebms2: 0.0,
            cebmr1: 0.9,
            cebmr2: 0.8,
            cebmr3: 0.65,
            cebmr4: 0.625,
            cebmr5: 0.2,
            wall_coef: 5.0,
        }
    }
}

/// 闭合常数总表
///
/// 配置期确定，之后只读。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ClosureConstants {
    /// 公共常数
    #[serde(default)]
    pub common: CommonConstants,
    /// LRR
    #[serde(default)]
    pub lrr: LrrConstants,
    /// SSG
    #[serde(default)]
    pub ssg: SsgConstants,
    /// EBRSM
    #[serde(default)]
    pub ebrsm: EbrsmConstants,
}

impl ClosureConstants {
    /// 校验常数
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("constants.common.cmu", self.common.cmu),
            ("constants.common.csrij", self.common.csrij),
            ("constants.common.kappa", self.common.kappa),
            ("constants.lrr.crij1", self.lrr.crij1),
            ("constants.ssg.cssgs1", self.ssg.cssgs1),
            ("constants.ebrsm.cebms1", self.ebrsm.cebms1),
            ("constants.ebrsm.wall_coef", self.ebrsm.wall_coef),
        ];
        for (key, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::invalid(key, value, "必须为正的有限值"));
            }
        }

        // (1 - C2) 与 (1 - C3) 作为产生项与浮力项的保留份额
        if !(0.0..=1.0).contains(&self.lrr.crij2) {
            return Err(ConfigError::invalid("constants.lrr.crij2", self.lrr.crij2, "必须在 [0, 1] 范围内"));
        }
        if !(0.0..=1.0).contains(&self.common.crij3) {
            return Err(ConfigError::invalid("constants.common.crij3", self.common.crij3, "必须在 [0, 1] 范围内"));
        }
        Ok(())
    }
}
