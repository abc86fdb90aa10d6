// crates/rsm_physics/src/sources/pressure_strain.rs

//! 压力-应变闭合
//!
//! 三种闭合在配置时选定一次：
//!
//! - **LRR**: Rotta 线性回归各向同性 + 产生项等向化
//! - **SSG**: 二次型，含 `a·S`、`a·W`、`a·a` 关联项
//! - **EBRSM**: 以 α³ 混合近壁重分配与 SSG 型均匀项
//!
//! 显式部分是在上一时刻 R 处求得的完整源项（产生 + 重分配 − 耗散），
//! 隐式部分是非负的对角稳定化系数。两者均为单位 `ρ·V`。

use glam::DVec3;

use rsm_config::{ClosureConstants, EbrsmConstants, LrrConstants, SsgConstants, TurbulenceModelKind};

use crate::sources::traits::{CellState, RijContribution, RijSource, SourceContext};
use crate::tensor::{SymTensor, COMPONENTS, KRONECKER};

/// 二次型压力-应变系数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticCoefficients {
    /// 慢项线性系数
    pub s1: f64,
    /// 慢项二次系数
    pub s2: f64,
    /// 快项系数 r1..r5
    pub r: [f64; 5],
}

impl From<&SsgConstants> for QuadraticCoefficients {
    fn from(c: &SsgConstants) -> Self {
        Self {
            s1: c.cssgs1,
            s2: c.cssgs2,
            r: [c.cssgr1, c.cssgr2, c.cssgr3, c.cssgr4, c.cssgr5],
        }
    }
}

impl From<&EbrsmConstants> for QuadraticCoefficients {
    fn from(c: &EbrsmConstants) -> Self {
        Self {
            s1: c.cebms1,
            s2: c.cebms2,
            r: [c.cebmr1, c.cebmr2, c.cebmr3, c.cebmr4, c.cebmr5],
        }
    }
}

/// 椭圆混合输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticBlending {
    /// α ∈ [0, 1]
    pub alpha: f64,
    /// ∇α
    pub gradient: DVec3,
}

/// 单元闭合结果（单位 `ρ·V`）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosureTerms {
    /// 显式源项
    pub explicit: SymTensor,
    /// 隐式对角
    pub implicit: SymTensor,
}

/// 压力-应变闭合
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressureStrainModel {
    /// 线性 Rotta 型
    Lrr(LrrConstants),
    /// 二次型
    Ssg(QuadraticCoefficients),
    /// 椭圆混合
    Ebrsm {
        /// 均匀部分系数
        homogeneous: QuadraticCoefficients,
        /// 近壁项系数（参考值 5）
        wall_coef: f64,
    },
}

impl PressureStrainModel {
    /// 按闭合类型选定
    pub fn new(kind: TurbulenceModelKind, constants: &ClosureConstants) -> Self {
        match kind {
            TurbulenceModelKind::Lrr => Self::Lrr(constants.lrr),
            TurbulenceModelKind::Ssg => Self::Ssg((&constants.ssg).into()),
            TurbulenceModelKind::Ebrsm => Self::Ebrsm {
                homogeneous: (&constants.ebrsm).into(),
                wall_coef: constants.ebrsm.wall_coef,
            },
        }
    }

    /// 闭合类型
    pub fn kind(&self) -> TurbulenceModelKind {
        match self {
            Self::Lrr(_) => TurbulenceModelKind::Lrr,
            Self::Ssg(_) => TurbulenceModelKind::Ssg,
            Self::Ebrsm { .. } => TurbulenceModelKind::Ebrsm,
        }
    }

    /// 产生项 Jacobian 在隐式块中的系数
    pub fn production_weight(&self) -> f64 {
        match self {
            Self::Lrr(c) => 1.0 - c.crij2,
            _ => 1.0,
        }
    }

    /// 计算单元闭合项
    ///
    /// EBRSM 需要 `blending`，其余闭合忽略该参数；
    /// 缺失时按 α = 1（均匀湍流）处理。
    pub fn evaluate(&self, state: &CellState, blending: Option<EllipticBlending>) -> ClosureTerms {
        match self {
            Self::Lrr(c) => lrr_terms(c, state),
            Self::Ssg(c) => {
                let (redistribution, implicit) = quadratic_terms(c, state);
                let eps = state.epsilon;
                let mut explicit = state.production + redistribution;
                for m in 0..3 {
                    explicit[m] -= 2.0 / 3.0 * eps;
                }
                ClosureTerms { explicit, implicit: SymTensor::uniform(implicit) }
            }
            Self::Ebrsm { homogeneous, wall_coef } => {
                let blend = blending.unwrap_or(EllipticBlending { alpha: 1.0, gradient: DVec3::ZERO });
                ebrsm_terms(homogeneous, *wall_coef, state, blend)
            }
        }
    }
}

/// LRR
///
/// 显式 `2/3·δ·(C2·P_kk/2 + (C1−1)·ε) + (1−C2)·P − C1·ε/k·R`，隐式 `C1·ε/k`。
fn lrr_terms(c: &LrrConstants, state: &CellState) -> ClosureTerms {
    let k = state.k();
    let eps = state.epsilon;
    let trprod = state.production_k();
    let iso = 2.0 / 3.0 * (c.crij2 * trprod + (c.crij1 - 1.0) * eps);

    let mut explicit = SymTensor::ZERO;
    for m in 0..6 {
        explicit[m] = KRONECKER[m] * iso + (1.0 - c.crij2) * state.production[m]
            - c.crij1 * eps / k * state.rij[m];
    }
    ClosureTerms {
        explicit,
        implicit: SymTensor::uniform(c.crij1 * eps / k),
    }
}

/// 二次型重分配 `φ1 + φ2` 与隐式系数
fn quadratic_terms(c: &QuadraticCoefficients, state: &CellState) -> (SymTensor, f64) {
    let inv = &state.invariants;
    let k = inv.k;
    let eps = state.epsilon;
    let trprod = state.production_k();
    let [r1, r2, r3, r4, r5] = c.r;
    let sqrt_aii = inv.a_ii.max(0.0).sqrt();

    let mut phi = SymTensor::ZERO;
    for m in 0..6 {
        let d = KRONECKER[m];
        let a = inv.anisotropy[m];
        let phi1 = -eps * (c.s1 * a + c.s2 * (inv.aa[m] - d * inv.a_ii / 3.0));
        let phi2 = -r1 * trprod * a
            + k * inv.strain[m] * (r2 - r3 * sqrt_aii)
            + r4 * k * (inv.as_corr[m] - 2.0 / 3.0 * d * inv.akl_skl)
            + r5 * k * inv.aw_corr[m];
        phi[m] = phi1 + phi2;
    }

    let implicit = (c.s1 * eps + r1 * trprod.max(0.0)) / k;
    (phi, implicit)
}

/// 近壁重分配 `φw` 及其对角 Jacobian
fn wall_redistribution(rij: &SymTensor, n: DVec3, coef: f64) -> (SymTensor, SymTensor) {
    let n = n.to_array();
    let rn = rij.mul_vec(n);
    let rnn = rij.quadratic_form(n);

    let mut phi = SymTensor::ZERO;
    let mut jac = SymTensor::ZERO;
    for (m, &(i, j)) in COMPONENTS.iter().enumerate() {
        let d = KRONECKER[m];
        phi[m] = -coef * (rn[i] * n[j] + rn[j] * n[i] - 0.5 * rnn * (n[i] * n[j] + d));
        let (ni2, nj2) = (n[i] * n[i], n[j] * n[j]);
        jac[m] = if i == j {
            -coef * (2.0 * ni2 - 0.5 * ni2 * (ni2 + 1.0))
        } else {
            -coef * (ni2 + nj2 - ni2 * nj2)
        };
    }
    (phi, jac)
}

/// EBRSM
fn ebrsm_terms(
    c: &QuadraticCoefficients,
    wall_coef: f64,
    state: &CellState,
    blend: EllipticBlending,
) -> ClosureTerms {
    let k = state.k();
    let eps = state.epsilon;
    let alpha3 = blend.alpha.clamp(0.0, 1.0).powi(3);

    // |∇α| 为零时方向取零矢量
    let norm = blend.gradient.length();
    let n = if norm > 0.0 { blend.gradient / norm } else { DVec3::ZERO };

    let (phi_h, implicit_h) = quadratic_terms(c, state);
    let (phi_w, jac_w) = wall_redistribution(&state.rij, n, wall_coef * eps / k);

    let mut explicit = SymTensor::ZERO;
    let mut implicit = SymTensor::ZERO;
    for m in 0..6 {
        let eps_ij = (1.0 - alpha3) * eps / k * state.rij[m] + alpha3 * 2.0 / 3.0 * eps * KRONECKER[m];
        explicit[m] =
            state.production[m] + (1.0 - alpha3) * phi_w[m] + alpha3 * phi_h[m] - eps_ij;
        implicit[m] = alpha3 * implicit_h
            + (1.0 - alpha3) * eps / k
            + (1.0 - alpha3) * (-jac_w[m]).max(0.0);
    }
    ClosureTerms { explicit, implicit }
}

/// 压力-应变闭合源项
///
/// 耦合模式下额外把产生项 Jacobian 写入隐式块：
/// 对角取 `max(·, 0)`，非对角保留。
#[derive(Debug, Clone, Copy)]
pub struct ClosureSource {
    model: PressureStrainModel,
}

impl ClosureSource {
    /// 创建
    pub fn new(model: PressureStrainModel) -> Self {
        Self { model }
    }

    /// 闭合模型
    pub fn model(&self) -> &PressureStrainModel {
        &self.model
    }
}

impl RijSource for ClosureSource {
    fn name(&self) -> &'static str {
        "pressure_strain"
    }

    fn compute_cell(&self, cell: usize, state: &CellState, ctx: &SourceContext<'_>) -> RijContribution {
        let blending = match (ctx.inputs.alpha, ctx.inputs.alpha_gradient) {
            (Some(alpha), Some(grad)) => Some(EllipticBlending { alpha: alpha[cell], gradient: grad[cell] }),
            _ => None,
        };
        let terms = self.model.evaluate(state, blending);
        let mut contrib = RijContribution::with_diagonal(terms.explicit, terms.implicit).scale(state.rho_vol());

        if ctx.mode.is_coupled() {
            let weight = self.model.production_weight() * state.rho_vol();
            let jac = state.production_jacobian();
            for r in 0..6 {
                for m in 0..6 {
                    let v = -weight * jac[(r, m)];
                    if r == m {
                        contrib.implicit[(r, m)] += v.max(0.0);
                    } else {
                        contrib.implicit[(r, m)] += v;
                    }
                }
            }
        }
        contrib
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{compute_closure_invariants, shear_production};
    use crate::tensor::{Mat3, MAT3_ZERO};

    fn state(rij: SymTensor, grad: Mat3, eps: f64) -> CellState {
        CellState {
            rij,
            epsilon: eps,
            density: 1.0,
            volume: 1.0,
            velocity_gradient: grad,
            production: shear_production(&rij, &grad),
            invariants: compute_closure_invariants(&rij, &grad, 1e-12),
            coriolis: None,
        }
    }

    #[test]
    fn test_lrr_isotropic_decay() {
        // 无剪切、各向同性：只剩 −2/3·ε·δ
        let model = PressureStrainModel::new(TurbulenceModelKind::Lrr, &ClosureConstants::default());
        let terms = model.evaluate(&state(SymTensor::isotropic(1.0), MAT3_ZERO, 1.0), None);
        for m in 0..3 {
            assert!((terms.explicit[m] + 2.0 / 3.0).abs() < 1e-12);
        }
        for m in 3..6 {
            assert!(terms.explicit[m].abs() < 1e-12);
        }
        // C1·ε/k = 1.8/1.5，切应力分量同样隐式
        for m in 0..6 {
            assert!((terms.implicit[m] - 1.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ssg_isotropic_decay() {
        let model = PressureStrainModel::new(TurbulenceModelKind::Ssg, &ClosureConstants::default());
        let terms = model.evaluate(&state(SymTensor::isotropic(1.0), MAT3_ZERO, 0.5), None);
        for m in 0..3 {
            assert!((terms.explicit[m] + 1.0 / 3.0).abs() < 1e-12);
        }
        // Cs1·ε/k = 1.7·0.5/1.5
        assert!((terms.implicit[0] - 1.7 * 0.5 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_ebrsm_bulk_equals_ssg_form() {
        // α = 1 时 EBRSM 退化为均匀二次型（系数表相同）
        let constants = ClosureConstants::default();
        let mut grad = MAT3_ZERO;
        grad[0][1] = 1.0;
        let s = state(SymTensor::new(1.1, 0.8, 0.6, -0.2, 0.0, 0.05), grad, 0.7);
        let ebrsm = PressureStrainModel::new(TurbulenceModelKind::Ebrsm, &constants)
            .evaluate(&s, Some(EllipticBlending { alpha: 1.0, gradient: DVec3::Y }));
        let ssg = PressureStrainModel::Ssg((&constants.ebrsm).into()).evaluate(&s, None);
        for m in 0..6 {
            assert!((ebrsm.explicit[m] - ssg.explicit[m]).abs() < 1e-12);
            assert!((ebrsm.implicit[m] - ssg.implicit[m]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ebrsm_zero_gradient_direction() {
        let s = state(SymTensor::isotropic(1.0), MAT3_ZERO, 1.0);
        let model = PressureStrainModel::new(TurbulenceModelKind::Ebrsm, &ClosureConstants::default());
        let terms = model.evaluate(&s, Some(EllipticBlending { alpha: 0.0, gradient: DVec3::ZERO }));
        assert!(terms.explicit.is_finite());
        // α = 0, n = 0：φw = 0，ε_ij = ε/k·R
        for m in 0..3 {
            assert!((terms.explicit[m] + 1.0 / 1.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_wall_jacobian_matches_finite_difference() {
        let n = DVec3::new(0.3, 0.8, -0.5).normalize();
        let r = SymTensor::new(1.0, 0.7, 0.4, 0.1, -0.2, 0.05);
        let (phi, jac) = wall_redistribution(&r, n, 2.0);
        for m in 0..6 {
            let mut rp = r;
            rp[m] += 1e-6;
            let (phi_p, _) = wall_redistribution(&rp, n, 2.0);
            let fd = (phi_p[m] - phi[m]) / 1e-6;
            assert!((fd - jac[m]).abs() < 1e-6, "分量 {m}: {fd} vs {}", jac[m]);
        }
    }

    #[test]
    fn test_implicit_is_non_negative() {
        let mut grad = MAT3_ZERO;
        grad[0][1] = 3.0;
        grad[2][1] = -1.0;
        let s = state(SymTensor::new(0.9, 0.5, 0.4, -0.3, 0.1, 0.0), grad, 0.3);
        for kind in TurbulenceModelKind::ALL {
            let model = PressureStrainModel::new(kind, &ClosureConstants::default());
            let terms = model.evaluate(&s, Some(EllipticBlending { alpha: 0.4, gradient: DVec3::Z }));
            for m in 0..6 {
                assert!(terms.implicit[m] >= 0.0, "{kind}: {m}");
            }
        }
    }
}
