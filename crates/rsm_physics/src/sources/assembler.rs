// crates/rsm_physics/src/sources/assembler.rs

//! 源项装配器
//!
//! 逐单元构建 [`CellState`]，合并各源项的 [`RijContribution`]，
//! 再按时间外推策略写出右端项与隐式矩阵。
//!
//! # 增量形式
//!
//! 外部求解器求解 `(D − div(Γ·grad))·x = rhs`。装配器最后把 `D·x_prev`
//! 加进右端项，因此源项只需给出在上一时刻值处的完整显式源和非负的
//! Jacobian 近似。
//!
//! # 时间外推
//!
//! 开启外推时：
//!
//! ```text
//! stored  = c_st_prv
//! c_st_prv = user_explicit + Σ explicit
//! rhs     = user_implicit·x_prev − θ_s·stored + Σ immediate + (1+θ_s)·c_st_prv
//! D       = −θ_v·user_implicit + θ_v·Σ implicit
//! ```
//!
//! 未开启时：
//!
//! ```text
//! rhs = user_implicit·x_prev + user_explicit + Σ explicit + Σ immediate
//! D   = max(−user_implicit, 0) + Σ implicit
//! ```
//!
//! 最后 `D += θ_stat·ρ·V/Δt`。

use rayon::prelude::*;

use rsm_config::{ClosureConstants, RsmConfig, SolveMode, TimeSchemeConfig, TurbulenceModelKind};
use rsm_foundation::{ensure_len, RsmError, RsmResult};

use crate::algebra::{decompose_velocity_gradient, ClosureInvariants};
use crate::fields::RsmInputs;
use crate::mesh::FaceTopology;
use crate::solver::{CoupledSystem, SegregatedSystem};
use crate::sources::buoyancy::BuoyancySource;
use crate::sources::external::{LagrangianSource, MassInjectionSource};
use crate::sources::pressure_strain::{ClosureSource, PressureStrainModel};
use crate::sources::rotation::{RotationGenerator, SystemRotation};
use crate::sources::traits::{CellState, RijContribution, RijSource, SourceContext};
use crate::sources::wall_echo::WallEchoSource;
use crate::tensor::{block_apply, Block6, SymTensor};

/// 源项装配器
pub struct SourceAssembler {
    config: RsmConfig,
    model: PressureStrainModel,
    sources: Vec<Box<dyn RijSource>>,
    rotation: Option<SystemRotation>,
}

impl std::fmt::Debug for SourceAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceAssembler")
            .field("model", &self.model.kind())
            .field("sources", &self.source_names())
            .field("rotation", &self.rotation)
            .finish()
    }
}

impl SourceAssembler {
    /// 按配置创建，闭合类型在此选定一次
    pub fn from_config(config: &RsmConfig) -> RsmResult<Self> {
        config.validate()?;
        let constants = &config.constants;
        let model = PressureStrainModel::new(config.turbulence_model, constants);

        let mut assembler = Self {
            config: config.clone(),
            model,
            sources: Vec::new(),
            rotation: SystemRotation::from_config(&config.rotation),
        };

        assembler.register(ClosureSource::new(model));
        if config.buoyancy.enabled {
            let linear = config.turbulence_model == TurbulenceModelKind::Lrr;
            assembler.register(BuoyancySource::new(&config.buoyancy, &constants.common, linear));
        }
        if config.wall_echo_active() {
            assembler.register(WallEchoSource::new(&constants.lrr, &constants.common));
        }
        assembler.register(MassInjectionSource);
        assembler.register(LagrangianSource);

        log::debug!(
            "源项装配器: 闭合 {}, 源项 {:?}, 旋转 {}",
            config.turbulence_model,
            assembler.source_names(),
            assembler.rotation.is_some()
        );
        Ok(assembler)
    }

    /// 使用自定义旋转矩阵生成器（按配置的速度表述取系数）
    pub fn with_rotation_generator(mut self, generator: Box<dyn RotationGenerator>) -> Self {
        let coef = self.config.rotation.formulation.coriolis_coefficient();
        self.rotation = Some(SystemRotation::new(coef, generator));
        self
    }

    /// 注册源项
    pub fn register<S: RijSource + 'static>(&mut self, source: S) {
        self.sources.push(Box::new(source));
    }

    /// 已注册源项名称
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// 压力-应变闭合
    pub fn model(&self) -> &PressureStrainModel {
        &self.model
    }

    /// 闭合常数
    pub fn constants(&self) -> &ClosureConstants {
        &self.config.constants
    }

    /// 时间格式
    pub fn time_scheme(&self) -> &TimeSchemeConfig {
        &self.config.time_scheme
    }

    /// 构建单元状态
    pub fn cell_state(
        &self,
        cell: usize,
        inputs: &RsmInputs<'_>,
        volume: f64,
        rij: &SymTensor,
        epsilon: f64,
    ) -> CellState {
        let floor = self.config.clipping.floor;
        let grad = inputs.velocity_gradient[cell];
        let (strain, rotation) = decompose_velocity_gradient(&grad);
        let (production, rotation, coriolis) = match &self.rotation {
            Some(rot) => {
                let (p, w, omega) = rot.apply(cell, rij, &inputs.production[cell], &rotation);
                (p, w, Some((rot.coefficient(), omega)))
            }
            None => (inputs.production[cell], rotation, None),
        };

        CellState {
            rij: *rij,
            epsilon: epsilon.max(floor),
            density: inputs.density[cell],
            volume,
            velocity_gradient: grad,
            production,
            invariants: ClosureInvariants::compute(rij, &strain, &rotation, floor),
            coriolis,
        }
    }

    /// 单元内所有源项之和
    pub fn cell_contribution(&self, cell: usize, state: &CellState, ctx: &SourceContext<'_>) -> RijContribution {
        let mut total = RijContribution::zero();
        for source in self.sources.iter().filter(|s| s.is_enabled()) {
            total += source.compute_cell(cell, state, ctx);
        }
        total
    }

    /// 逐分量装配
    pub fn assemble_segregated(
        &self,
        topology: &FaceTopology,
        inputs: &RsmInputs<'_>,
        rij: &[SymTensor],
        epsilon: &[f64],
        dt: f64,
        previous: Option<&mut [SymTensor]>,
    ) -> RsmResult<SegregatedSystem> {
        let cells = self.assemble(SolveMode::Segregated, topology, inputs, rij, epsilon, dt, previous)?;
        let (rhs, diagonal) = cells
            .into_par_iter()
            .zip(rij.par_iter())
            .map(|((mut rhs, block), x)| {
                let d = SymTensor::from_vector(block.diagonal());
                for m in 0..6 {
                    rhs[m] += d[m] * x[m];
                }
                (rhs, d)
            })
            .unzip();
        Ok(SegregatedSystem { rhs, diagonal })
    }

    /// 耦合装配
    pub fn assemble_coupled(
        &self,
        topology: &FaceTopology,
        inputs: &RsmInputs<'_>,
        rij: &[SymTensor],
        epsilon: &[f64],
        dt: f64,
        previous: Option<&mut [SymTensor]>,
    ) -> RsmResult<CoupledSystem> {
        let cells = self.assemble(SolveMode::Coupled, topology, inputs, rij, epsilon, dt, previous)?;
        let (rhs, block) = cells
            .into_par_iter()
            .zip(rij.par_iter())
            .map(|((rhs, block), x)| (rhs + block_apply(&block, x), block))
            .unzip();
        Ok(CoupledSystem { rhs, block })
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        mode: SolveMode,
        topology: &FaceTopology,
        inputs: &RsmInputs<'_>,
        rij: &[SymTensor],
        epsilon: &[f64],
        dt: f64,
        previous: Option<&mut [SymTensor]>,
    ) -> RsmResult<Vec<(SymTensor, Block6)>> {
        let n = inputs.n_cells();
        inputs.validate(
            &self.config,
            topology.internal_faces().len(),
            topology.boundary_faces().len(),
        )?;
        if topology.n_cells() != n {
            return Err(RsmError::size_mismatch("cells", n, topology.n_cells()));
        }
        ensure_len!(rij, n, "rij");
        ensure_len!(epsilon, n, "epsilon");
        if dt <= 0.0 || !dt.is_finite() {
            return Err(RsmError::invalid_input(format!("时间步长必须为正: {dt}")));
        }

        let ts = self.config.time_scheme;
        let previous = if ts.extrapolate {
            let prev = previous.ok_or_else(|| RsmError::missing("previous_step_store"))?;
            ensure_len!(prev, n, "previous_step_store");
            Some(prev)
        } else {
            None
        };

        log::debug!("装配 {n} 个单元: {mode:?}, 外推 {}", ts.extrapolate);

        let ctx = SourceContext { inputs, constants: &self.config.constants, mode };
        let volumes = topology.volumes();
        let cell = |c: usize, prev: Option<&mut SymTensor>| -> (SymTensor, Block6) {
            let state = self.cell_state(c, inputs, volumes[c], &rij[c], epsilon[c]);
            let contrib = self.cell_contribution(c, &state, &ctx);
            let (user_exp, user_imp) = inputs
                .user
                .map_or((SymTensor::ZERO, SymTensor::ZERO), |u| (u.explicit[c], u.implicit[c]));
            let mut user_rhs = SymTensor::ZERO;
            for m in 0..6 {
                user_rhs[m] = user_imp[m] * rij[c][m];
            }

            let (rhs, mut block) = match prev {
                Some(p) => {
                    let stored = *p;
                    *p = user_exp + contrib.explicit;
                    let mut block = contrib.implicit * ts.theta_v;
                    for m in 0..6 {
                        block[(m, m)] -= ts.theta_v * user_imp[m];
                    }
                    (user_rhs - stored * ts.theta_s + contrib.immediate + *p * (1.0 + ts.theta_s), block)
                }
                None => {
                    let mut block = contrib.implicit;
                    for m in 0..6 {
                        block[(m, m)] += (-user_imp[m]).max(0.0);
                    }
                    (user_rhs + user_exp + contrib.explicit + contrib.immediate, block)
                }
            };

            let unsteady = ts.istat * state.rho_vol() / dt;
            for m in 0..6 {
                block[(m, m)] += unsteady;
            }
            (rhs, block)
        };

        let out: Vec<(SymTensor, Block6)> = match previous {
            Some(prev) => prev.par_iter_mut().enumerate().map(|(c, p)| cell(c, Some(p))).collect(),
            None => (0..n).into_par_iter().map(|c| cell(c, None)).collect(),
        };
        Ok(out)
    }
}
