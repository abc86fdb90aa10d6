// crates/rsm_physics/src/lib.rs

//! Reynolds 应力输运闭合
//!
//! 为二阶矩湍流模型提供每个时间步的物理部分，包括：
//! - 张量代数 (tensor, algebra) - 对称张量存储、各向异性与应变分解
//! - 源项装配 (sources) - LRR / SSG / EBRSM 闭合、浮力、旋转、壁面回声、外部源项
//! - 扩散系数 (diffusion) - 各向同性与 GGDH 面系数
//! - 可实现性裁剪 (clipping) - 逐分量与张量两种策略及统计
//! - 方程驱动 (equation) - 装配、求解、裁剪的单步流程
//!
//! # 数据流
//!
//! ```text
//! RsmInputs ──► SourceAssembler ──► Segregated/CoupledSystem ─┐
//!      │                                                      ├─► EquationSolver ──► RealizabilityClipper
//!      └──────► DiffusionBuilder ──► FaceDiffusion ───────────┘
//! ```
//!
//! 线性求解器通过 [`EquationSolver`] 接入，[`BlockJacobiSolver`] 是自带的参考实现。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algebra;
pub mod clipping;
pub mod diffusion;
pub mod equation;
pub mod fields;
pub mod mesh;
pub mod solver;
pub mod sources;
pub mod tensor;

// 重导出常用类型
pub use algebra::{compute_closure_invariants, decompose_velocity_gradient, shear_production, ClosureInvariants};
pub use clipping::{
    ClipSummary, ClippingLog, ClippingStatistics, GlobalReduce, LocalReduce, LogClippingSink,
    RealizabilityClipper, RecordingClippingSink,
};
pub use diffusion::{daly_harlow_tensor, CellDiffusivity, DiffusionBuilder, FaceDiffusion};
pub use equation::{ReynoldsStressEquation, StepReport};
pub use fields::{LagrangianSources, MassInjection, MassSourceKind, RsmInputs, UserSources};
pub use mesh::{BoundaryFace, FaceTopology, InternalFace};
pub use solver::{
    BlockJacobiSolver, CoupledSystem, EquationSolver, FaceOperator, SegregatedSystem, SolveReport,
    SolverStatus,
};
pub use sources::{
    PressureStrainModel, RijContribution, RijSource, RotationGenerator, SourceAssembler,
    UniformRotation,
};
pub use tensor::{Block6, Mat3, SymTensor};
