// crates/rsm_physics/src/equation.rs

//! Reynolds 应力方程单步驱动
//!
//! 一次 [`ReynoldsStressEquation::step`] 依次完成：
//!
//! 1. 校验输入并装配源项（逐分量或耦合）
//! 2. 由上一时刻场构建面扩散系数
//! 3. 调用 [`EquationSolver`] 求解新场
//! 4. 可实现性裁剪并输出统计
//!
//! 求解器与全局归约都可替换，默认使用 [`BlockJacobiSolver`] 与 [`LocalReduce`]。

use serde::{Deserialize, Serialize};

use rsm_config::{RsmConfig, SolveMode};
use rsm_foundation::RsmResult;

use crate::clipping::{ClipSummary, ClippingLog, GlobalReduce, LocalReduce, RealizabilityClipper};
use crate::diffusion::DiffusionBuilder;
use crate::fields::RsmInputs;
use crate::mesh::FaceTopology;
use crate::solver::{BlockJacobiSolver, EquationSolver, FaceOperator, SolveReport};
use crate::sources::{RotationGenerator, SourceAssembler};
use crate::tensor::SymTensor;

/// 单步报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// 求解模式
    pub mode: SolveMode,
    /// 求解报告（逐分量 6 条，耦合 1 条）
    pub solver: Vec<SolveReport>,
    /// 裁剪汇总
    pub clipping: ClipSummary,
}

impl StepReport {
    /// 所有线性求解都已收敛
    pub fn converged(&self) -> bool {
        self.solver.iter().all(SolveReport::is_converged)
    }

    /// 最大迭代次数
    pub fn max_iterations(&self) -> usize {
        self.solver.iter().map(|r| r.iterations).max().unwrap_or(0)
    }
}

/// Reynolds 应力方程
pub struct ReynoldsStressEquation {
    config: RsmConfig,
    assembler: SourceAssembler,
    diffusion: DiffusionBuilder,
    clipper: RealizabilityClipper,
    solver: Box<dyn EquationSolver>,
    reducer: Box<dyn GlobalReduce>,
}

impl std::fmt::Debug for ReynoldsStressEquation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReynoldsStressEquation")
            .field("model", &self.config.turbulence_model)
            .field("mode", &self.config.solve_mode)
            .field("assembler", &self.assembler)
            .field("solver", &self.solver.name())
            .finish()
    }
}

impl ReynoldsStressEquation {
    /// 按配置创建
    pub fn new(config: RsmConfig) -> RsmResult<Self> {
        let assembler = SourceAssembler::from_config(&config)?;
        let common = &config.constants.common;
        let diffusion = DiffusionBuilder::new(config.diffusion, common.csrij, common.cmu, config.clipping.floor);
        let clipper = RealizabilityClipper::new(config.clipping, config.solve_mode);
        let solver = Box::new(BlockJacobiSolver::new(config.linear_solver));

        log::info!(
            "RSM 方程: 闭合 {}, 模式 {:?}, 扩散 {:?}",
            config.turbulence_model,
            config.solve_mode,
            config.diffusion.model
        );

        Ok(Self {
            config,
            assembler,
            diffusion,
            clipper,
            solver,
            reducer: Box::new(LocalReduce),
        })
    }

    /// 替换线性求解器
    pub fn with_solver(mut self, solver: Box<dyn EquationSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// 替换全局归约
    pub fn with_reducer(mut self, reducer: Box<dyn GlobalReduce>) -> Self {
        self.reducer = reducer;
        self
    }

    /// 使用自定义旋转矩阵生成器
    pub fn with_rotation_generator(mut self, generator: Box<dyn RotationGenerator>) -> Self {
        self.assembler = self.assembler.with_rotation_generator(generator);
        self
    }

    /// 配置
    pub fn config(&self) -> &RsmConfig {
        &self.config
    }

    /// 源项装配器
    pub fn assembler(&self) -> &SourceAssembler {
        &self.assembler
    }

    /// 裁剪器
    pub fn clipper(&self) -> &RealizabilityClipper {
        &self.clipper
    }

    /// 推进一个时间步
    ///
    /// `rij` 与 `epsilon` 输入为上一时刻值，输出为裁剪后的新值。
    /// 开启外推时必须提供 `previous`。
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &self,
        topology: &FaceTopology,
        inputs: &RsmInputs<'_>,
        rij: &mut [SymTensor],
        epsilon: &mut [f64],
        epsilon_prev: &[f64],
        dt: f64,
        previous: Option<&mut [SymTensor]>,
        sink: &mut dyn ClippingLog,
    ) -> RsmResult<StepReport> {
        let mode = self.config.solve_mode;

        // 装配先于扩散，输入校验在这里完成
        let solver = match mode {
            SolveMode::Segregated => {
                let system = self.assembler.assemble_segregated(topology, inputs, rij, epsilon, dt, previous)?;
                let diffusion = self.diffusion.build(topology, inputs, rij, epsilon)?;
                let operator = self.face_operator(topology, inputs, &diffusion)?;
                self.solver.solve_segregated(&system, &operator, rij)?
            }
            SolveMode::Coupled => {
                let system = self.assembler.assemble_coupled(topology, inputs, rij, epsilon, dt, previous)?;
                let diffusion = self.diffusion.build(topology, inputs, rij, epsilon)?;
                let operator = self.face_operator(topology, inputs, &diffusion)?;
                vec![self.solver.solve_coupled(&system, &operator, rij)?]
            }
        };

        for (i, report) in solver.iter().enumerate() {
            if !report.is_converged() {
                log::warn!(
                    "{} 未收敛 ({}): {:?}, {} 次迭代, 残差 {:.3e}",
                    self.solver.name(),
                    i,
                    report.status,
                    report.iterations,
                    report.residual_norm
                );
            }
        }

        let clipping = self
            .clipper
            .clip(rij, epsilon, epsilon_prev, self.reducer.as_ref(), sink)?;

        let report = StepReport { mode, solver, clipping };
        log::debug!(
            "RSM 步完成: 最多 {} 次迭代, 裁剪 R {} / ε {}",
            report.max_iterations(),
            clipping.rij_clips,
            clipping.epsilon_clips
        );
        Ok(report)
    }

    fn face_operator<'a>(
        &self,
        topology: &'a FaceTopology,
        inputs: &RsmInputs<'a>,
        diffusion: &'a crate::diffusion::FaceDiffusion,
    ) -> RsmResult<FaceOperator<'a>> {
        let operator = FaceOperator {
            topology,
            diffusion,
            mass_flux: inputs.mass_flux,
            boundary_values: inputs.boundary_values,
        };
        operator.validate()?;
        Ok(operator)
    }
}
