// crates/rsm_physics/src/sources/mod.rs

//! 源项模块
//!
//! 提供 Reynolds 应力方程的各项物理源项：
//! - 压力-应变闭合 (LRR, SSG, EBRSM)
//! - 系统旋转（科氏项）
//! - 浮力产生
//! - 壁面回声（仅逐分量 LRR）
//! - 质量注入与拉格朗日两相耦合
//!
//! # 设计
//!
//! 所有源项实现 [`RijSource`] trait，对单个单元返回 [`RijContribution`]。
//! [`SourceAssembler`] 负责合并、时间外推与非定常项，并写出线性系统。
//!
//! # 使用示例
//!
//! ```ignore
//! use rsm_physics::sources::SourceAssembler;
//!
//! let assembler = SourceAssembler::from_config(&config)?;
//! let system = assembler.assemble_coupled(&topology, &inputs, &rij, &eps, dt, None)?;
//! ```

pub mod assembler;
pub mod buoyancy;
pub mod external;
pub mod pressure_strain;
pub mod rotation;
pub mod traits;
pub mod wall_echo;

// 核心 trait 导出
pub use traits::{CellState, RijContribution, RijSource, SourceContext};

pub use assembler::SourceAssembler;
pub use buoyancy::{buoyancy_production, BuoyancySource};
pub use external::{LagrangianSource, MassInjectionSource};
pub use pressure_strain::{
    ClosureSource, ClosureTerms, EllipticBlending, PressureStrainModel, QuadraticCoefficients,
};
pub use rotation::{coriolis_production, RotationGenerator, SystemRotation, UniformRotation};
pub use wall_echo::{echo_projection, wall_damping, WallEchoSource};
