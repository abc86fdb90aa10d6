// crates/rsm_physics/src/sources/buoyancy.rs

//! 浮力产生项
//!
//! 广义梯度扩散假设下的浮力产生：
//!
//! ```text
//! G_ij = −3/2·Cμ/σ_t·(k/ε)·(r_i·g_j + r_j·g_i),   r = R·∇ρ
//! ```
//!
//! LRR 同时加入浮力对压力-应变的修正 `(1−C3)·G + C3·δ·G_kk/3`，
//! 二次型闭合直接加入 `G`。该项完全显式。

use glam::DVec3;

use rsm_config::{BuoyancyConfig, CommonConstants};

use crate::sources::traits::{CellState, RijContribution, RijSource, SourceContext};
use crate::tensor::{SymTensor, COMPONENTS, KRONECKER};

/// 浮力产生张量 G（单位体积）
pub fn buoyancy_production(
    rij: &SymTensor,
    k: f64,
    epsilon: f64,
    density_gradient: DVec3,
    gravity: DVec3,
    cmu: f64,
    turbulent_schmidt: f64,
) -> SymTensor {
    let r = rij.mul_vec(density_gradient.to_array());
    let g = gravity.to_array();
    let coef = -1.5 * cmu / turbulent_schmidt * k / epsilon;

    let mut out = SymTensor::ZERO;
    for (m, &(i, j)) in COMPONENTS.iter().enumerate() {
        out[m] = coef * (r[i] * g[j] + r[j] * g[i]);
    }
    out
}

/// 浮力源项
#[derive(Debug, Clone, Copy)]
pub struct BuoyancySource {
    gravity: DVec3,
    turbulent_schmidt: f64,
    /// LRR 的浮力重分配系数 C3；二次型闭合为 `None`
    crij3: Option<f64>,
    cmu: f64,
}

impl BuoyancySource {
    /// 创建
    pub fn new(config: &BuoyancyConfig, common: &CommonConstants, linear_closure: bool) -> Self {
        Self {
            gravity: DVec3::from_array(config.gravity),
            turbulent_schmidt: config.turbulent_schmidt,
            crij3: linear_closure.then_some(common.crij3),
            cmu: common.cmu,
        }
    }
}

impl RijSource for BuoyancySource {
    fn name(&self) -> &'static str {
        "buoyancy"
    }

    fn compute_cell(&self, cell: usize, state: &CellState, ctx: &SourceContext<'_>) -> RijContribution {
        let Some(grad_rho) = ctx.inputs.density_gradient else {
            return RijContribution::zero();
        };
        let g = buoyancy_production(
            &state.rij,
            state.k(),
            state.epsilon,
            grad_rho[cell],
            self.gravity,
            self.cmu,
            self.turbulent_schmidt,
        );

        let term = match self.crij3 {
            Some(c3) => {
                let iso = c3 * g.trace() / 3.0;
                let mut t = g * (1.0 - c3);
                for m in 0..6 {
                    t[m] += KRONECKER[m] * iso;
                }
                t
            }
            None => g,
        };
        RijContribution::explicit(term * state.volume)
    }
}
