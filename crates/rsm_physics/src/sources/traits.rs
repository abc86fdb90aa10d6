// crates/rsm_physics/src/sources/traits.rs

//! 源项 Trait 定义
//!
//! 每个源项对单个单元返回一份 [`RijContribution`]，
//! 由装配器按时间格式合并进右端项与隐式矩阵。源项本身不写任何共享缓冲区。

use rsm_config::{ClosureConstants, SolveMode};

use crate::algebra::{shear_production, ClosureInvariants};
use crate::fields::RsmInputs;
use crate::sources::rotation::coriolis_production;
use crate::tensor::{linear_jacobian, Block6, Mat3, SymTensor};

/// 单元源项贡献
///
/// - `explicit`: 在上一时刻值处求得的显式源项，开启外推时进入 `c_st_prv`
/// - `immediate`: 直接进入右端项、不参与外推的部分
/// - `implicit`: 稳定化 Jacobian 近似，开启外推时乘 θ_v
///
/// 三者均已乘单元体积（及需要时的密度）。
#[derive(Debug, Clone, Copy)]
pub struct RijContribution {
    /// 显式部分
    pub explicit: SymTensor,
    /// 不外推的显式部分
    pub immediate: SymTensor,
    /// 隐式块
    pub implicit: Block6,
}

impl Default for RijContribution {
    fn default() -> Self {
        Self::zero()
    }
}

impl RijContribution {
    /// 零贡献
    #[inline]
    pub fn zero() -> Self {
        Self {
            explicit: SymTensor::ZERO,
            immediate: SymTensor::ZERO,
            implicit: Block6::zeros(),
        }
    }

    /// 仅显式贡献
    #[inline]
    pub fn explicit(explicit: SymTensor) -> Self {
        Self { explicit, ..Self::zero() }
    }

    /// 显式加对角隐式
    #[inline]
    pub fn with_diagonal(explicit: SymTensor, implicit_diag: SymTensor) -> Self {
        Self {
            explicit,
            immediate: SymTensor::ZERO,
            implicit: Block6::from_diagonal(&implicit_diag.to_vector()),
        }
    }

    /// 隐式对角
    pub fn implicit_diagonal(&self) -> SymTensor {
        SymTensor::from_vector(self.implicit.diagonal())
    }

    /// 原地加法
    #[inline]
    pub fn add_assign(&mut self, other: &Self) {
        self.explicit += other.explicit;
        self.immediate += other.immediate;
        self.implicit += other.implicit;
    }

    /// 缩放
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            explicit: self.explicit * factor,
            immediate: self.immediate * factor,
            implicit: self.implicit * factor,
        }
    }

    /// 检查是否有效（所有分量都是有限数）
    pub fn is_valid(&self) -> bool {
        self.explicit.is_finite()
            && self.immediate.is_finite()
            && self.implicit.iter().all(|v| v.is_finite())
    }
}

impl std::ops::AddAssign for RijContribution {
    fn add_assign(&mut self, rhs: Self) {
        RijContribution::add_assign(self, &rhs);
    }
}

/// 单元状态
///
/// 由装配器逐单元构建一次，所有源项共享。
#[derive(Debug, Clone, Copy)]
pub struct CellState {
    /// 上一时刻 Reynolds 应力
    pub rij: SymTensor,
    /// 耗散率（已取下限）
    pub epsilon: f64,
    /// 密度
    pub density: f64,
    /// 单元体积
    pub volume: f64,
    /// 速度梯度
    pub velocity_gradient: Mat3,
    /// 产生项（含科氏修正）
    pub production: SymTensor,
    /// 闭合不变量（旋转率含科氏修正）
    pub invariants: ClosureInvariants,
    /// 科氏系数与系统旋转矩阵
    pub coriolis: Option<(f64, Mat3)>,
}

impl CellState {
    /// 湍动能
    #[inline]
    pub fn k(&self) -> f64 {
        self.invariants.k
    }

    /// `ρ·V`
    #[inline]
    pub fn rho_vol(&self) -> f64 {
        self.density * self.volume
    }

    /// 湍动能产生率 `P_kk/2`
    #[inline]
    pub fn production_k(&self) -> f64 {
        0.5 * self.production.trace()
    }

    /// 产生项（含科氏项）对 R 的 Jacobian
    pub fn production_jacobian(&self) -> Block6 {
        let grad = self.velocity_gradient;
        let coriolis = self.coriolis;
        linear_jacobian(|r| {
            let mut p = shear_production(r, &grad);
            if let Some((coef, omega)) = coriolis {
                p += coriolis_production(r, &omega, coef);
            }
            p
        })
    }
}

/// 源项计算上下文
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    /// 外部输入
    pub inputs: &'a RsmInputs<'a>,
    /// 闭合常数
    pub constants: &'a ClosureConstants,
    /// 当前装配模式
    pub mode: SolveMode,
}

/// Reynolds 应力源项 Trait
pub trait RijSource: Send + Sync {
    /// 获取源项名称
    fn name(&self) -> &'static str;

    /// 是否启用
    fn is_enabled(&self) -> bool {
        true
    }

    /// 计算单个单元的贡献
    fn compute_cell(&self, cell: usize, state: &CellState, ctx: &SourceContext<'_>) -> RijContribution;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_add_and_scale() {
        let a = RijContribution::with_diagonal(SymTensor::isotropic(1.0), SymTensor::isotropic(2.0));
        let mut b = RijContribution::explicit(SymTensor::new(0.0, 0.0, 0.0, 1.0, 0.0, 0.0));
        b += a;
        assert!((b.explicit[0] - 1.0).abs() < 1e-14);
        assert!((b.explicit[3] - 1.0).abs() < 1e-14);
        assert!((b.implicit[(1, 1)] - 2.0).abs() < 1e-14);
        let s = b.scale(0.5);
        assert!((s.implicit[(1, 1)] - 1.0).abs() < 1e-14);
        assert!(s.is_valid());
        assert!((s.implicit_diagonal()[2] - 1.0).abs() < 1e-14);
    }
}
