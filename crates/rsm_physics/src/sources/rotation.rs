// crates/rsm_physics/src/sources/rotation.rs

//! 系统旋转（科氏）修正
//!
//! 在旋转坐标系中求解时，Reynolds 应力方程多出
//! `C_ij = −c·(Ω_im·R_mj + Ω_jm·R_mi)`，
//! c 由速度表述决定（相对速度 2.0，混合表述 1.0）。
//!
//! 科氏项不是独立的源项：它修改闭合看到的产生项 `P + C`
//! 与旋转率 `W + (c/2)·Ω`，因此在构建单元状态时施加。

use glam::DVec3;

use rsm_config::RotationConfig;

use crate::tensor::{mat3_axpy, skew, Mat3, SymTensor, COMPONENTS};

/// 旋转矩阵生成器，按单元编号给出反对称矩阵 Ω（`Ω·v = ω × v`）
pub trait RotationGenerator: Send + Sync {
    /// 单元的旋转矩阵
    fn rotation_matrix(&self, cell: usize) -> Mat3;
}

/// 均匀旋转
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformRotation {
    /// 角速度 [rad/s]
    pub omega: DVec3,
}

impl UniformRotation {
    /// 创建
    pub fn new(omega: DVec3) -> Self {
        Self { omega }
    }
}

impl RotationGenerator for UniformRotation {
    fn rotation_matrix(&self, _cell: usize) -> Mat3 {
        skew(self.omega.to_array())
    }
}

/// 科氏产生项 `C_ij = −c·(Ω_im·R_mj + Ω_jm·R_mi)`
pub fn coriolis_production(rij: &SymTensor, omega: &Mat3, coefficient: f64) -> SymTensor {
    let mut c = SymTensor::ZERO;
    for (m, &(i, j)) in COMPONENTS.iter().enumerate() {
        let mut s = 0.0;
        for k in 0..3 {
            s += omega[i][k] * rij.get(k, j) + omega[j][k] * rij.get(k, i);
        }
        c[m] = -coefficient * s;
    }
    c
}

/// 系统旋转
pub struct SystemRotation {
    coefficient: f64,
    generator: Box<dyn RotationGenerator>,
}

impl std::fmt::Debug for SystemRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemRotation")
            .field("coefficient", &self.coefficient)
            .finish_non_exhaustive()
    }
}

impl SystemRotation {
    /// 使用指定生成器
    pub fn new(coefficient: f64, generator: Box<dyn RotationGenerator>) -> Self {
        Self { coefficient, generator }
    }

    /// 按配置创建均匀旋转；未启用时返回 `None`
    pub fn from_config(config: &RotationConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let omega = DVec3::from_array(config.omega);
        Some(Self::new(
            config.formulation.coriolis_coefficient(),
            Box::new(UniformRotation::new(omega)),
        ))
    }

    /// 表述系数 c
    #[inline]
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// 单元旋转矩阵
    #[inline]
    pub fn matrix(&self, cell: usize) -> Mat3 {
        self.generator.rotation_matrix(cell)
    }

    /// 修正产生项与旋转率，返回 `(P + C, W + (c/2)·Ω, Ω)`
    pub fn apply(
        &self,
        cell: usize,
        rij: &SymTensor,
        production: &SymTensor,
        rotation: &Mat3,
    ) -> (SymTensor, Mat3, Mat3) {
        let omega = self.matrix(cell);
        let p = *production + coriolis_production(rij, &omega, self.coefficient);
        let w = mat3_axpy(rotation, 0.5 * self.coefficient, &omega);
        (p, w, omega)
    }
}
