// crates/rsm_physics/src/diffusion.rs

//! 扩散系数构建
//!
//! 两种模式：
//!
//! - **各向同性**: `K = μ + C_s·μ_t/Cμ`，或以湍流尺度表示 `K = μ + C_s·ρ·k²/ε`
//! - **GGDH**: `K = μ·δ + visten`，`visten` 为外部给出的湍流黏度张量
//!   （可用 [`daly_harlow_tensor`] 由 R 构造）
//!
//! 面系数为 `(n·K_f·n)·|S|/d`，`K_f` 由两侧单元的投影扩散率取算术或调和平均。

use rayon::prelude::*;

use rsm_config::{DiffusionConfig, DiffusionModel, FaceMean, ScalarDiffusivityForm};
use rsm_foundation::{ensure_len, safe_div, RsmError, RsmResult};

use crate::fields::RsmInputs;
use crate::mesh::FaceTopology;
use crate::tensor::SymTensor;

/// 面扩散系数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceDiffusion {
    /// 内部面
    pub internal: Vec<f64>,
    /// 边界面
    pub boundary: Vec<f64>,
}

/// 单元扩散率
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellDiffusivity {
    /// 标量
    Scalar(f64),
    /// 张量
    Tensor(SymTensor),
}

impl CellDiffusivity {
    /// 沿单位方向的投影 `n·K·n`
    #[inline]
    pub fn project(&self, n: [f64; 3]) -> f64 {
        match self {
            Self::Scalar(k) => *k,
            Self::Tensor(t) => t.quadratic_form(n),
        }
    }
}

/// Daly-Harlow 湍流黏度张量 `C_s·ρ·(k/ε)·R`
pub fn daly_harlow_tensor(rij: &SymTensor, density: f64, epsilon: f64, csrij: f64, eps_floor: f64) -> SymTensor {
    let k = 0.5 * rij.trace();
    *rij * (csrij * density * k / epsilon.max(eps_floor))
}

/// 扩散系数构建器
#[derive(Debug, Clone, Copy)]
pub struct DiffusionBuilder {
    config: DiffusionConfig,
    csrij: f64,
    cmu: f64,
    eps_floor: f64,
}

impl DiffusionBuilder {
    /// 创建
    pub fn new(config: DiffusionConfig, csrij: f64, cmu: f64, eps_floor: f64) -> Self {
        Self { config, csrij, cmu, eps_floor }
    }

    /// 扩散模型
    pub fn model(&self) -> DiffusionModel {
        self.config.model
    }

    /// 单元扩散率
    pub fn cell_diffusivities(
        &self,
        inputs: &RsmInputs<'_>,
        rij: &[SymTensor],
        epsilon: &[f64],
    ) -> RsmResult<Vec<CellDiffusivity>> {
        let n = inputs.n_cells();
        ensure_len!(rij, n, "rij");
        ensure_len!(epsilon, n, "epsilon");

        let out = match self.config.model {
            DiffusionModel::Isotropic => (0..n)
                .into_par_iter()
                .map(|c| {
                    let turb = match self.config.scalar_form {
                        ScalarDiffusivityForm::EddyViscosity => {
                            self.csrij * inputs.turbulent_viscosity[c] / self.cmu
                        }
                        ScalarDiffusivityForm::TurbulentScales => {
                            let k = 0.5 * rij[c].trace();
                            self.csrij * inputs.density[c] * k * k / epsilon[c].max(self.eps_floor)
                        }
                    };
                    CellDiffusivity::Scalar(inputs.viscosity[c] + turb)
                })
                .collect(),
            DiffusionModel::Ggdh => {
                let visten = inputs.viscosity_tensor.ok_or_else(|| RsmError::missing("viscosity_tensor"))?;
                ensure_len!(visten, n, "viscosity_tensor");
                (0..n)
                    .into_par_iter()
                    .map(|c| CellDiffusivity::Tensor(SymTensor::isotropic(inputs.viscosity[c]) + visten[c]))
                    .collect()
            }
        };
        Ok(out)
    }

    /// 面扩散系数
    pub fn build(
        &self,
        topology: &FaceTopology,
        inputs: &RsmInputs<'_>,
        rij: &[SymTensor],
        epsilon: &[f64],
    ) -> RsmResult<FaceDiffusion> {
        if topology.n_cells() != inputs.n_cells() {
            return Err(RsmError::size_mismatch("cells", topology.n_cells(), inputs.n_cells()));
        }
        let cells = self.cell_diffusivities(inputs, rij, epsilon)?;
        let mean = self.config.face_mean;

        let internal = topology
            .internal_faces()
            .par_iter()
            .map(|face| {
                let area = face.surface.length();
                let n = safe_unit(face.surface.to_array(), area);
                let (i, j) = face.cells;
                let ki = cells[i].project(n);
                let kj = cells[j].project(n);
                face_mean(mean, ki, kj) * area / face.distance
            })
            .collect();

        let boundary = topology
            .boundary_faces()
            .par_iter()
            .map(|face| {
                let area = face.surface.length();
                let n = safe_unit(face.surface.to_array(), area);
                cells[face.cell].project(n) * area / face.distance
            })
            .collect();

        Ok(FaceDiffusion { internal, boundary })
    }
}

fn safe_unit(s: [f64; 3], norm: f64) -> [f64; 3] {
    [safe_div(s[0], norm, 0.0), safe_div(s[1], norm, 0.0), safe_div(s[2], norm, 0.0)]
}

fn face_mean(mean: FaceMean, a: f64, b: f64) -> f64 {
    match mean {
        FaceMean::Arithmetic => 0.5 * (a + b),
        FaceMean::Harmonic => safe_div(2.0 * a * b, a + b, 0.0),
    }
}
