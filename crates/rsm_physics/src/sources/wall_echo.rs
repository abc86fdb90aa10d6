// crates/rsm_physics/src/sources/wall_echo.rs

//! 壁面回声修正（Gibson-Launder）
//!
//! 仅用于逐分量求解的 LRR 路径：
//!
//! ```text
//! φ_echo = f·[C1'·ε/k·E(R) + C2'·E(φ2)]
//! E(T)_ij = T_km·n_k·n_m·δ_ij − 3/2·(T_ik·n_k·n_j + T_jk·n_k·n_i)
//! φ2 = −C2·(P − δ·P_kk/3)
//! f = min(Cμ^0.75·k^1.5/(κ·ε·y), 1)
//! ```

use glam::DVec3;

use rsm_config::{CommonConstants, LrrConstants};
use rsm_foundation::EPZERO;

use crate::sources::traits::{CellState, RijContribution, RijSource, SourceContext};
use crate::tensor::{SymTensor, COMPONENTS, KRONECKER};

/// 回声投影 E(T)
pub fn echo_projection(t: &SymTensor, n: DVec3) -> SymTensor {
    let n = n.to_array();
    let tn = t.mul_vec(n);
    let tnn = t.quadratic_form(n);
    let mut out = SymTensor::ZERO;
    for (m, &(i, j)) in COMPONENTS.iter().enumerate() {
        out[m] = tnn * KRONECKER[m] - 1.5 * (tn[i] * n[j] + tn[j] * n[i]);
    }
    out
}

/// 壁面阻尼函数 f
#[inline]
pub fn wall_damping(k: f64, epsilon: f64, distance: f64, cmu: f64, kappa: f64) -> f64 {
    let y = distance.max(EPZERO);
    (cmu.powf(0.75) * k.powf(1.5) / (kappa * epsilon * y)).min(1.0)
}

/// 壁面回声源项
#[derive(Debug, Clone, Copy)]
pub struct WallEchoSource {
    lrr: LrrConstants,
    cmu: f64,
    kappa: f64,
}

impl WallEchoSource {
    /// 创建
    pub fn new(lrr: &LrrConstants, common: &CommonConstants) -> Self {
        Self { lrr: *lrr, cmu: common.cmu, kappa: common.kappa }
    }

    /// 单位 `ρ·V` 的回声项
    pub fn echo_term(&self, state: &CellState, distance: f64, normal: DVec3) -> SymTensor {
        let k = state.k();
        let eps = state.epsilon;
        let trp = state.production.trace() / 3.0;

        let mut phi2 = SymTensor::ZERO;
        for m in 0..6 {
            phi2[m] = -self.lrr.crij2 * (state.production[m] - KRONECKER[m] * trp);
        }

        let f = wall_damping(k, eps, distance, self.cmu, self.kappa);
        let e1 = echo_projection(&state.rij, normal) * (self.lrr.crijp1 * eps / k);
        let e2 = echo_projection(&phi2, normal) * self.lrr.crijp2;
        (e1 + e2) * f
    }
}

impl RijSource for WallEchoSource {
    fn name(&self) -> &'static str {
        "wall_echo"
    }

    fn compute_cell(&self, cell: usize, state: &CellState, ctx: &SourceContext<'_>) -> RijContribution {
        if ctx.mode.is_coupled() {
            return RijContribution::zero();
        }
        let (Some(dist), Some(normal)) = (ctx.inputs.wall_distance, ctx.inputs.wall_normal) else {
            return RijContribution::zero();
        };
        let term = self.echo_term(state, dist[cell], normal[cell]);
        RijContribution::explicit(term * state.rho_vol())
    }
}
