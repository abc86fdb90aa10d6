// crates/rsm_physics/src/algebra.rs

//! 各向异性与应变代数
//!
//! 每单元的纯张量运算：归一化各向异性张量、速度梯度的应变/旋转分解，
//! 以及各闭合模型共用的标量不变量与关联项。
//!
//! # 约定
//!
//! - `k = tr(R)/2`，`a_ij = R_ij/k − 2/3·δ_ij`（无迹）
//! - `grad_u[i][j] = ∂u_i/∂x_j`
//! - `S_ij = ½(∂u_i/∂x_j + ∂u_j/∂x_i)`，`W_ij = ½(∂u_i/∂x_j − ∂u_j/∂x_i)`
//!
//! 调用方需保证 `k` 远离零；这里用 `k_floor` 兜底，不做除零判断以外的处理。

use crate::tensor::{Mat3, SymTensor, COMPONENTS, KRONECKER, MAT3_ZERO};

/// 闭合模型所需的单元不变量
#[derive(Debug, Clone, Copy)]
pub struct ClosureInvariants {
    /// 湍动能（已取下限）
    pub k: f64,
    /// 各向异性张量 a
    pub anisotropy: SymTensor,
    /// 应变率张量 S
    pub strain: SymTensor,
    /// 旋转率张量 W（反对称）
    pub rotation: Mat3,
    /// `a_kl·a_kl`
    pub a_ii: f64,
    /// `a_kl·S_kl`
    pub akl_skl: f64,
    /// `a_ik·S_jk + a_jk·S_ik`
    pub as_corr: SymTensor,
    /// `a_ik·W_jk + a_jk·W_ik`
    pub aw_corr: SymTensor,
    /// `a_ik·a_kj`
    pub aa: SymTensor,
}

impl ClosureInvariants {
    /// 由 R、应变与旋转张量计算
    pub fn compute(rij: &SymTensor, strain: &SymTensor, rotation: &Mat3, k_floor: f64) -> Self {
        let k = (0.5 * rij.trace()).max(k_floor);
        let mut a = SymTensor::ZERO;
        for m in 0..6 {
            a[m] = rij[m] / k - 2.0 / 3.0 * KRONECKER[m];
        }

        let mut as_corr = SymTensor::ZERO;
        let mut aw_corr = SymTensor::ZERO;
        let mut aa = SymTensor::ZERO;
        for (m, &(i, j)) in COMPONENTS.iter().enumerate() {
            for kk in 0..3 {
                as_corr[m] += a.get(i, kk) * strain.get(j, kk) + a.get(j, kk) * strain.get(i, kk);
                aw_corr[m] += a.get(i, kk) * rotation[j][kk] + a.get(j, kk) * rotation[i][kk];
                aa[m] += a.get(i, kk) * a.get(kk, j);
            }
        }

        Self {
            k,
            anisotropy: a,
            strain: *strain,
            rotation: *rotation,
            a_ii: a.ddot(&a),
            akl_skl: a.ddot(strain),
            as_corr,
            aw_corr,
            aa,
        }
    }
}

/// 速度梯度分解为应变率与旋转率
pub fn decompose_velocity_gradient(grad_u: &Mat3) -> (SymTensor, Mat3) {
    let strain = SymTensor::from_mat_sym(grad_u);
    let mut rotation = MAT3_ZERO;
    for i in 0..3 {
        for j in 0..3 {
            rotation[i][j] = 0.5 * (grad_u[i][j] - grad_u[j][i]);
        }
    }
    (strain, rotation)
}

/// 计算闭合不变量
///
/// 纯函数，无副作用，每单元 O(1)。
pub fn compute_closure_invariants(rij: &SymTensor, grad_u: &Mat3, k_floor: f64) -> ClosureInvariants {
    let (strain, rotation) = decompose_velocity_gradient(grad_u);
    ClosureInvariants::compute(rij, &strain, &rotation, k_floor)
}

/// 平均剪切产生项 `P_ij = −(R_ik·∂u_j/∂x_k + R_jk·∂u_i/∂x_k)`
pub fn shear_production(rij: &SymTensor, grad_u: &Mat3) -> SymTensor {
    let mut p = SymTensor::ZERO;
    for (m, &(i, j)) in COMPONENTS.iter().enumerate() {
        for kk in 0..3 {
            p[m] -= rij.get(i, kk) * grad_u[j][kk] + rij.get(j, kk) * grad_u[i][kk];
        }
    }
    p
}
