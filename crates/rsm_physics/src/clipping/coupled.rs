// crates/rsm_physics/src/clipping/coupled.rs

//! 张量裁剪
//!
//! 1. 全局参考迹 `trace_ref = max(Σ_i max_cells R_ii / 3, EPZERO)`
//! 2. `tr(R) < 3·ε·trace_ref` 的近奇异单元置为各向同性下限 `ε·trace_ref·δ`；
//!    已处于各向同性下限状态的单元不再重置（第二遍的 trace_ref 可能略大）
//! 3. 其余单元按迹归一化求特征值，最小特征值低于 `tol` 时向各向同性混合：
//!    `offset = min(−λ/(1/3 − λ) + 0.1, 1)`，
//!    `R ← (1−offset)·R + tr·(offset + tol)/3·δ`
//! 4. 再施加 Cauchy-Schwarz 约束与对角下限
//!
//! 单次确定性遍历，不迭代。

use rayon::prelude::*;

use rsm_config::ClippingConfig;
use rsm_foundation::EPZERO;

use super::reduce::GlobalReduce;
use super::segregated::{enforce_cauchy_schwarz, floor_diagonal};
use super::stats::ClippingStatistics;
use crate::tensor::SymTensor;

/// 全局参考迹尺度
pub fn reference_trace(rij: &[SymTensor], reducer: &dyn GlobalReduce) -> f64 {
    let mut maxima = rij
        .par_iter()
        .fold(
            || [f64::NEG_INFINITY; 3],
            |mut acc, r| {
                for (a, m) in acc.iter_mut().zip(0..3) {
                    *a = a.max(r[m]);
                }
                acc
            },
        )
        .reduce(
            || [f64::NEG_INFINITY; 3],
            |a, b| [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        );
    reducer.max_in_place(&mut maxima);
    let sum: f64 = maxima.iter().filter(|v| v.is_finite()).sum();
    (sum / 3.0).max(EPZERO)
}

/// 特征值修正；无需修正时返回 `None`
///
/// 返回张量的迹为原迹的 `(1 + tol)` 倍。迹非正的张量由近奇异分支处理，这里不修正。
pub fn eigen_correction(r: &SymTensor, tol: f64) -> Option<SymTensor> {
    let tr = r.trace();
    if !(tr > 0.0) {
        return None;
    }
    let lambda = r.scale(1.0 / tr).min_eigenvalue();
    if lambda >= tol {
        return None;
    }
    let offset = (-lambda / (1.0 / 3.0 - lambda) + 0.1).min(1.0);
    let mut out = r.scale(1.0 - offset);
    let iso = tr * (offset + tol) / 3.0;
    for m in 0..3 {
        out[m] += iso;
    }
    Some(out)
}

/// 是否已处于各向同性下限状态：非对角为零、三个对角相等且不低于 `floor`
#[inline]
fn is_isotropic_floor(r: &SymTensor, floor: f64) -> bool {
    r[3] == 0.0 && r[4] == 0.0 && r[5] == 0.0 && r[0] == r[1] && r[1] == r[2] && r[0] >= floor
}

/// 张量裁剪 R
pub fn clip_coupled(rij: &mut [SymTensor], config: &ClippingConfig, trace_ref: f64) -> ClippingStatistics {
    let d_floor = config.near_singular_eps * trace_ref;
    let threshold = 3.0 * d_floor;
    let tol = config.eigen_tolerance;
    let floor = config.floor;

    rij.par_iter_mut()
        .fold(
            || ClippingStatistics::new("rij", 6),
            |mut stats, r| {
                for m in 0..6 {
                    stats.observe(m, r[m]);
                }
                let mut changed = false;

                if r.trace() < threshold && !is_isotropic_floor(r, floor) {
                    for m in 0..3 {
                        r[m] = d_floor;
                        stats.clip_count[m] += 1;
                    }
                    for m in 3..6 {
                        if r[m] != 0.0 {
                            r[m] = 0.0;
                            stats.clip_count[m] += 1;
                        }
                    }
                    changed = true;
                } else if let Some(corrected) = eigen_correction(r, tol) {
                    *r = corrected;
                    for m in 0..3 {
                        stats.clip_count[m] += 1;
                    }
                    changed = true;
                }

                changed |= enforce_cauchy_schwarz(r, &mut stats.clip_count);
                changed |= floor_diagonal(r, floor, &mut stats.clip_count);
                if changed {
                    stats.total_clips += 1;
                }
                stats
            },
        )
        .reduce(|| ClippingStatistics::new("rij", 6), ClippingStatistics::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipping::reduce::LocalReduce;

    #[test]
    fn test_reference_trace() {
        let r = vec![SymTensor::diagonal(3.0, 0.0, 1.0), SymTensor::diagonal(1.0, 6.0, 0.0)];
        assert!((reference_trace(&r, &LocalReduce) - 10.0 / 3.0).abs() < 1e-14);
        assert_eq!(reference_trace(&[], &LocalReduce), EPZERO);
    }

    #[test]
    fn test_floor_state_survives_larger_reference_trace() {
        let config = ClippingConfig::default();
        let mut rij = vec![SymTensor::diagonal(1.0, 1.0, -0.5), SymTensor::diagonal(0.5, 0.5, -1.0)];

        let t1 = reference_trace(&rij, &LocalReduce);
        let first = clip_coupled(&mut rij, &config, t1);
        assert_eq!(first.total_clips, 2);
        assert_eq!(rij[1], SymTensor::isotropic(config.near_singular_eps * t1));

        // 特征值修正抬高了方向最大值，参考迹随之变大
        let t2 = reference_trace(&rij, &LocalReduce);
        assert!(t2 > t1);
        assert!(rij[1].trace() < 3.0 * config.near_singular_eps * t2);

        let snapshot = rij.clone();
        let second = clip_coupled(&mut rij, &config, t2);
        assert_eq!(second.total_clips, 0);
        assert_eq!(rij, snapshot);
    }

    #[test]
    fn test_realizable_untouched() {
        let r = SymTensor::new(1.0, 0.8, 0.6, 0.2, 0.1, -0.1);
        assert!(eigen_correction(&r, 1e-4).is_none());
    }

    #[test]
    fn test_eigen_correction_removes_negative_curvature() {
        let r = SymTensor::new(0.5, 0.5, 0.0, 0.6, 0.0, 0.0);
        let c = eigen_correction(&r, 1e-4).unwrap();
        assert!(c.scale(1.0 / c.trace()).min_eigenvalue() > 1e-4);
        assert!((c.trace() - r.trace() * (1.0 + 1e-4)).abs() < 1e-12);
    }
}
