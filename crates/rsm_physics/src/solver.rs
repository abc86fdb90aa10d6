// crates/rsm_physics/src/solver.rs

//! 方程求解接口
//!
//! 外部通用求解器给定每单元右端项、隐式矩阵（逐分量对角或 6×6 块）
//! 以及面扩散/对流系数，返回满足
//!
//! ```text
//! (D − div(Γ·grad))·x = rhs
//! ```
//!
//! 的新场。求解器不关心六个分量的物理含义。
//!
//! [`BlockJacobiSolver`] 是内置的参考实现：逐单元直接求解对角/块，
//! 单元间用 Jacobi 迭代。任何实现 [`EquationSolver`] 的求解器都可替换它。

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use rsm_config::LinearSolverConfig;
use rsm_foundation::{RsmError, RsmResult};

use crate::diffusion::FaceDiffusion;
use crate::mesh::FaceTopology;
use crate::tensor::{block_apply, Block6, SymTensor};

// ============================================================================
// 线性系统
// ============================================================================

/// 逐分量系统：每个分量一个标量对角
#[derive(Debug, Clone, Default)]
pub struct SegregatedSystem {
    /// 右端项
    pub rhs: Vec<SymTensor>,
    /// 各分量的对角系数
    pub diagonal: Vec<SymTensor>,
}

/// 耦合系统：每单元 6×6 块
#[derive(Debug, Clone, Default)]
pub struct CoupledSystem {
    /// 右端项
    pub rhs: Vec<SymTensor>,
    /// 隐式块
    pub block: Vec<Block6>,
}

/// 面算子输入
#[derive(Debug, Clone, Copy)]
pub struct FaceOperator<'a> {
    /// 面拓扑
    pub topology: &'a FaceTopology,
    /// 面扩散系数
    pub diffusion: &'a FaceDiffusion,
    /// 内部面质量通量（owner → neighbor 为正）
    pub mass_flux: Option<&'a [f64]>,
    /// 边界 Dirichlet 值；缺省为零梯度
    pub boundary_values: Option<&'a [SymTensor]>,
}

/// 组装好的单元间耦合
#[derive(Debug, Clone)]
struct NeighborCoupling {
    /// 面项对对角的贡献
    diag: Vec<f64>,
    /// (邻居, 系数)，方程中为 `−coef·x_j`
    neighbors: Vec<Vec<(usize, f64)>>,
    /// 边界项对右端的贡献
    boundary_rhs: Vec<SymTensor>,
}

impl<'a> FaceOperator<'a> {
    /// 校验面场尺寸
    pub fn validate(&self) -> RsmResult<()> {
        let ni = self.topology.internal_faces().len();
        let nb = self.topology.boundary_faces().len();
        if self.diffusion.internal.len() != ni {
            return Err(RsmError::size_mismatch("diffusion.internal", ni, self.diffusion.internal.len()));
        }
        if self.diffusion.boundary.len() != nb {
            return Err(RsmError::size_mismatch("diffusion.boundary", nb, self.diffusion.boundary.len()));
        }
        if let Some(flux) = self.mass_flux {
            if flux.len() != ni {
                return Err(RsmError::size_mismatch("mass_flux", ni, flux.len()));
            }
        }
        if let Some(values) = self.boundary_values {
            if values.len() != nb {
                return Err(RsmError::size_mismatch("boundary_values", nb, values.len()));
            }
        }
        Ok(())
    }

    /// 组装扩散与迎风对流
    fn couple(&self) -> NeighborCoupling {
        let topo = self.topology;
        let n = topo.n_cells();

        let per_cell: Vec<(f64, Vec<(usize, f64)>, SymTensor)> = (0..n)
            .into_par_iter()
            .map(|c| {
                let mut diag = 0.0;
                let mut nbs = Vec::with_capacity(topo.cell_faces(c).len());
                for cf in topo.cell_faces(c) {
                    let gamma = self.diffusion.internal[cf.face];
                    let m = self.mass_flux.map_or(0.0, |f| f[cf.face]);
                    let out_flux = if cf.is_owner { m } else { -m };
                    diag += gamma + out_flux.max(0.0);
                    nbs.push((cf.neighbor, gamma + (-out_flux).max(0.0)));
                }

                let mut brhs = SymTensor::ZERO;
                if let Some(values) = self.boundary_values {
                    for &b in topo.cell_boundary_faces(c) {
                        let gamma = self.diffusion.boundary[b];
                        diag += gamma;
                        brhs += values[b] * gamma;
                    }
                }
                (diag, nbs, brhs)
            })
            .collect();

        let mut coupling = NeighborCoupling {
            diag: Vec::with_capacity(n),
            neighbors: Vec::with_capacity(n),
            boundary_rhs: Vec::with_capacity(n),
        };
        for (d, nbs, b) in per_cell {
            coupling.diag.push(d);
            coupling.neighbors.push(nbs);
            coupling.boundary_rhs.push(b);
        }
        coupling
    }
}

// ============================================================================
// 求解报告
// ============================================================================

/// 求解状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    /// 收敛
    Converged,
    /// 达到最大迭代次数
    MaxIterationsReached,
    /// 残差发散
    Diverged,
}

/// 求解报告
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// 求解状态
    pub status: SolverStatus,
    /// 迭代次数
    pub iterations: usize,
    /// 最终残差范数
    pub residual_norm: f64,
    /// 初始残差范数
    pub initial_residual_norm: f64,
}

impl SolveReport {
    /// 是否收敛
    pub fn is_converged(&self) -> bool {
        self.status == SolverStatus::Converged
    }

    /// 相对残差
    pub fn relative_residual(&self) -> f64 {
        if self.initial_residual_norm > 0.0 {
            self.residual_norm / self.initial_residual_norm
        } else {
            0.0
        }
    }
}

// ============================================================================
// 求解器接口
// ============================================================================

/// 通用方程求解器
///
/// `x` 输入为上一时刻值（用作初值），输出为新场。
pub trait EquationSolver: Send + Sync {
    /// 求解器名称
    fn name(&self) -> &'static str;

    /// 逐分量求解，返回六个分量各自的报告
    fn solve_segregated(
        &self,
        system: &SegregatedSystem,
        operator: &FaceOperator<'_>,
        x: &mut [SymTensor],
    ) -> RsmResult<Vec<SolveReport>>;

    /// 耦合求解
    fn solve_coupled(
        &self,
        system: &CoupledSystem,
        operator: &FaceOperator<'_>,
        x: &mut [SymTensor],
    ) -> RsmResult<SolveReport>;
}

/// 块 Jacobi 参考求解器
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockJacobiSolver {
    config: LinearSolverConfig,
}

impl BlockJacobiSolver {
    /// 创建
    pub fn new(config: LinearSolverConfig) -> Self {
        Self { config }
    }

    /// 求解配置
    pub fn config(&self) -> &LinearSolverConfig {
        &self.config
    }

    /// 通用 Jacobi 迭代
    ///
    /// `update(i, x_old) -> (x_new_i, residual_i²)`
    fn iterate<T, F>(&self, x: &mut [T], label: &str, update: F) -> RsmResult<SolveReport>
    where
        T: Copy + Send + Sync,
        F: Fn(usize, &[T]) -> (T, f64) + Sync,
    {
        let residual = |x: &[T]| -> f64 {
            (0..x.len()).into_par_iter().map(|i| update(i, x).1).sum::<f64>().sqrt()
        };

        let initial = residual(&*x);
        if !initial.is_finite() {
            return Err(RsmError::solver(format!("{label}: 初始残差非有限")));
        }
        let target = (self.config.rtol * initial).max(self.config.atol);
        if initial <= self.config.atol {
            return Ok(SolveReport {
                status: SolverStatus::Converged,
                iterations: 0,
                residual_norm: initial,
                initial_residual_norm: initial,
            });
        }

        let mut next: Vec<T> = x.to_vec();
        let mut res = initial;
        for iter in 0..self.config.max_iter {
            {
                let old: &[T] = &*x;
                next.par_iter_mut()
                    .enumerate()
                    .for_each(|(i, xi)| *xi = update(i, old).0);
            }
            x.copy_from_slice(&next);

            res = residual(&*x);
            log::trace!("{label} iter {}: residual = {:.6e}", iter + 1, res);

            if !res.is_finite() || res > 1e10 * initial {
                return Ok(SolveReport {
                    status: SolverStatus::Diverged,
                    iterations: iter + 1,
                    residual_norm: res,
                    initial_residual_norm: initial,
                });
            }
            if res <= target {
                return Ok(SolveReport {
                    status: SolverStatus::Converged,
                    iterations: iter + 1,
                    residual_norm: res,
                    initial_residual_norm: initial,
                });
            }
        }

        Ok(SolveReport {
            status: SolverStatus::MaxIterationsReached,
            iterations: self.config.max_iter,
            residual_norm: res,
            initial_residual_norm: initial,
        })
    }
}

fn check_len(name: &'static str, expected: usize, actual: usize) -> RsmResult<()> {
    if expected != actual {
        return Err(RsmError::size_mismatch(name, expected, actual));
    }
    Ok(())
}

impl EquationSolver for BlockJacobiSolver {
    fn name(&self) -> &'static str {
        "block_jacobi"
    }

    fn solve_segregated(
        &self,
        system: &SegregatedSystem,
        operator: &FaceOperator<'_>,
        x: &mut [SymTensor],
    ) -> RsmResult<Vec<SolveReport>> {
        operator.validate()?;
        let n = operator.topology.n_cells();
        check_len("rhs", n, system.rhs.len())?;
        check_len("diagonal", n, system.diagonal.len())?;
        check_len("x", n, x.len())?;

        let coupling = operator.couple();
        let mut reports = Vec::with_capacity(6);
        for comp in 0..6 {
            let diag: Vec<f64> = (0..n).map(|i| system.diagonal[i][comp] + coupling.diag[i]).collect();
            if let Some(i) = diag.iter().position(|&d| !(d > 0.0)) {
                return Err(RsmError::solver(format!("分量 {comp} 单元 {i} 的对角非正: {}", diag[i])));
            }

            let mut xc: Vec<f64> = x.iter().map(|t| t[comp]).collect();
            let report = self.iterate(&mut xc, "segregated", |i, xs| {
                let mut b = system.rhs[i][comp] + coupling.boundary_rhs[i][comp];
                for &(j, coef) in &coupling.neighbors[i] {
                    b += coef * xs[j];
                }
                let r = b - diag[i] * xs[i];
                (b / diag[i], r * r)
            })?;
            for (t, v) in x.iter_mut().zip(&xc) {
                t[comp] = *v;
            }
            reports.push(report);
        }
        Ok(reports)
    }

    fn solve_coupled(
        &self,
        system: &CoupledSystem,
        operator: &FaceOperator<'_>,
        x: &mut [SymTensor],
    ) -> RsmResult<SolveReport> {
        operator.validate()?;
        let n = operator.topology.n_cells();
        check_len("rhs", n, system.rhs.len())?;
        check_len("block", n, system.block.len())?;
        check_len("x", n, x.len())?;

        let coupling = operator.couple();
        let blocks: Vec<Block6> = system
            .block
            .iter()
            .zip(&coupling.diag)
            .map(|(b, &d)| b + Block6::from_diagonal_element(d))
            .collect();
        let inverses = blocks
            .par_iter()
            .enumerate()
            .map(|(i, a)| a.try_inverse().ok_or_else(|| RsmError::solver(format!("单元 {i} 的 6×6 块奇异"))))
            .collect::<RsmResult<Vec<Block6>>>()?;

        self.iterate(x, "coupled", |i, xs| {
            let mut b = system.rhs[i] + coupling.boundary_rhs[i];
            for &(j, coef) in &coupling.neighbors[i] {
                b += xs[j] * coef;
            }
            let r = b - block_apply(&blocks[i], &xs[i]);
            (block_apply(&inverses[i], &b), r.ddot(&r))
        })
    }
}
