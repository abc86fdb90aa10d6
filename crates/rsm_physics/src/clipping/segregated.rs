// crates/rsm_physics/src/clipping/segregated.rs

//! 逐分量裁剪
//!
//! - 对角分量取下限 `floor`（默认 ε²_machine），永不为零
//! - 非对角分量满足 Cauchy-Schwarz：`|R_ij| ≤ sqrt(R_ii·R_jj)`，保号缩小
//! - 耗散率取下限或反射

use rayon::prelude::*;

use rsm_config::{ClippingConfig, DissipationClipMode};
use rsm_foundation::DBL_EPSILON;

use super::stats::ClippingStatistics;
use crate::tensor::{SymTensor, COMPONENTS};

/// 对角分量取下限，返回是否修改
pub(crate) fn floor_diagonal(r: &mut SymTensor, floor: f64, counts: &mut [u64]) -> bool {
    let mut changed = false;
    for m in 0..3 {
        if r[m] < floor {
            r[m] = floor;
            counts[m] += 1;
            changed = true;
        }
    }
    changed
}

/// Cauchy-Schwarz 约束，返回是否修改
///
/// 超界时取 `sign(R_ij)·sqrt(R_ii·R_jj)/(1+ε)`。
pub(crate) fn enforce_cauchy_schwarz(r: &mut SymTensor, counts: &mut [u64]) -> bool {
    let mut changed = false;
    for m in 3..6 {
        let (i, j) = COMPONENTS[m];
        let bound = (r[i] * r[j]).max(0.0).sqrt();
        if r[m].abs() > bound {
            r[m] = r[m].signum() * bound / (1.0 + DBL_EPSILON);
            counts[m] += 1;
            changed = true;
        }
    }
    changed
}

/// 逐分量裁剪 R
pub fn clip_segregated(rij: &mut [SymTensor], config: &ClippingConfig) -> ClippingStatistics {
    let floor = config.floor;
    rij.par_iter_mut()
        .fold(
            || ClippingStatistics::new("rij", 6),
            |mut stats, r| {
                for m in 0..6 {
                    stats.observe(m, r[m]);
                }
                let d = floor_diagonal(r, floor, &mut stats.clip_count);
                let o = enforce_cauchy_schwarz(r, &mut stats.clip_count);
                if d || o {
                    stats.total_clips += 1;
                }
                stats
            },
        )
        .reduce(|| ClippingStatistics::new("rij", 6), ClippingStatistics::merge)
}

/// 单元耗散率裁剪
///
/// `Reflect`: 负值取 `min(|ε|, growth·ε_prev)` 再取下限。
#[inline]
pub fn clip_dissipation_value(
    eps: f64,
    eps_prev: f64,
    mode: DissipationClipMode,
    floor: f64,
    growth: f64,
) -> Option<f64> {
    match mode {
        DissipationClipMode::Floor => (eps < floor).then_some(floor),
        DissipationClipMode::Reflect => {
            if eps < 0.0 {
                Some(eps.abs().min(growth * eps_prev).max(floor))
            } else if eps < floor {
                Some(floor)
            } else {
                None
            }
        }
    }
}

/// 耗散率裁剪
pub fn clip_dissipation(
    epsilon: &mut [f64],
    epsilon_prev: &[f64],
    mode: DissipationClipMode,
    config: &ClippingConfig,
) -> ClippingStatistics {
    epsilon
        .par_iter_mut()
        .zip(epsilon_prev.par_iter())
        .fold(
            || ClippingStatistics::new("epsilon", 1),
            |mut stats, (e, &prev)| {
                stats.observe(0, *e);
                if let Some(v) = clip_dissipation_value(*e, prev, mode, config.floor, config.dissipation_growth) {
                    *e = v;
                    stats.clip_count[0] += 1;
                    stats.total_clips += 1;
                }
                stats
            },
        )
        .reduce(|| ClippingStatistics::new("epsilon", 1), ClippingStatistics::merge)
}
