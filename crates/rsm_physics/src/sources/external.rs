// crates/rsm_physics/src/sources/external.rs

//! 外部注入源项：质量注入与拉格朗日两相耦合
//!
//! 用户源项需要与 `c_st_prv` 交换，由装配器直接处理，不在此列。

use crate::fields::MassSourceKind;
use crate::sources::traits::{CellState, RijContribution, RijSource, SourceContext};
use crate::tensor::{Block6, SymTensor};

/// 质量注入源项
///
/// `γ > 0` 且类型为 `Imposed` 时加入 `V·γ·(R_inj − R)`，
/// 其中 `V·γ·R_inj` 随外推策略，`−V·γ·R` 直接进入右端项，
/// 隐式对角加 `V·γ`。
#[derive(Debug, Clone, Copy, Default)]
pub struct MassInjectionSource;

impl RijSource for MassInjectionSource {
    fn name(&self) -> &'static str {
        "mass_injection"
    }

    fn compute_cell(&self, cell: usize, state: &CellState, ctx: &SourceContext<'_>) -> RijContribution {
        let Some(inj) = ctx.inputs.mass_injection else {
            return RijContribution::zero();
        };
        let gamma = inj.gamma[cell];
        if gamma <= 0.0 || inj.kind[cell] != MassSourceKind::Imposed {
            return RijContribution::zero();
        }
        let vg = state.volume * gamma;
        RijContribution {
            explicit: inj.value[cell] * vg,
            immediate: state.rij * (-vg),
            implicit: Block6::from_diagonal_element(vg),
        }
    }
}

/// 拉格朗日两相耦合源项
///
/// 显式张量随外推策略；隐式标量 `tslagi` 在每个对角元加 `max(−V·tslagi, 0)`。
#[derive(Debug, Clone, Copy, Default)]
pub struct LagrangianSource;

impl RijSource for LagrangianSource {
    fn name(&self) -> &'static str {
        "lagrangian"
    }

    fn compute_cell(&self, cell: usize, state: &CellState, ctx: &SourceContext<'_>) -> RijContribution {
        let Some(lag) = ctx.inputs.lagrangian else {
            return RijContribution::zero();
        };
        let diag = (-state.volume * lag.implicit[cell]).max(0.0);
        RijContribution {
            explicit: lag.explicit[cell],
            immediate: SymTensor::ZERO,
            implicit: Block6::from_diagonal_element(diag),
        }
    }
}
