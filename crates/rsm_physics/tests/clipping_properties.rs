//! crates/rsm_physics/tests/clipping_properties.rs
//!
//! 可实现性裁剪性质验证
//!
//! 覆盖：
//! - 对角下限与 Cauchy-Schwarz 约束
//! - 特征值修正后的迹
//! - 耗散率反射与增长上限
//! - 连续两次裁剪的幂等性
//! - 近奇异、负特征值、超界非对角三个典型单元

use rsm_config::{ClippingConfig, DissipationClipMode, SolveMode};
use rsm_foundation::{DBL_EPSILON, EPZERO, EPZERO_SQ};
use rsm_physics::clipping::{
    clip_coupled, clip_dissipation, clip_segregated, eigen_correction, reference_trace,
};
use rsm_physics::{LocalReduce, RealizabilityClipper, RecordingClippingSink, SymTensor};

// ============================================================
// 测试辅助设施
// ============================================================

/// 线性同余伪随机数，返回 [-1, 1)
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 11) as f64) / ((1u64 << 53) as f64) * 2.0 - 1.0
    }
}

/// 随机（多数不可实现的）张量场，首个单元为各方向极值锚点
fn random_field(n: usize, seed: u64) -> Vec<SymTensor> {
    let mut rng = Lcg(seed);
    let mut field = vec![SymTensor::isotropic(100.0)];
    for _ in 1..n {
        field.push(SymTensor::new(
            rng.next(),
            rng.next(),
            rng.next(),
            2.0 * rng.next(),
            2.0 * rng.next(),
            2.0 * rng.next(),
        ));
    }
    field
}

fn assert_realizable(rij: &[SymTensor], floor: f64) {
    for (c, r) in rij.iter().enumerate() {
        for m in 0..3 {
            assert!(r[m] >= floor, "单元 {c} 对角 {m} = {}", r[m]);
        }
        for (m, (i, j)) in [(3, (0, 1)), (4, (1, 2)), (5, (0, 2))] {
            let bound = (r[i] * r[j]).sqrt() * (1.0 + DBL_EPSILON);
            assert!(r[m].abs() <= bound, "单元 {c} 非对角 {m}: {} > {bound}", r[m]);
        }
    }
}

// ============================================================
// 逐分量裁剪
// ============================================================

#[test]
fn test_segregated_floor_and_cauchy_schwarz() {
    let config = ClippingConfig::default();
    let mut rij = random_field(500, 7);
    let stats = clip_segregated(&mut rij, &config);
    assert!(stats.total_clips > 0);
    assert_realizable(&rij, EPZERO_SQ);
}

#[test]
fn test_segregated_is_idempotent() {
    let config = ClippingConfig::default();
    let mut rij = random_field(500, 11);
    clip_segregated(&mut rij, &config);
    let snapshot = rij.clone();
    let second = clip_segregated(&mut rij, &config);
    assert_eq!(second.total_clips, 0);
    assert_eq!(second.component_clips(), 0);
    assert_eq!(rij, snapshot);
}

#[test]
fn test_scenario_c_off_diagonal_clamp() {
    let mut rij = vec![SymTensor::new(1.0, 1.0, 1.0, 5.0, 0.0, 0.0)];
    let stats = clip_segregated(&mut rij, &ClippingConfig::default());
    assert_eq!(stats.clip_count[3], 1);
    assert!((rij[0][3] - 1.0 / (1.0 + DBL_EPSILON)).abs() < 1e-15);
    assert!(rij[0][3] > 0.0);

    let mut neg = vec![SymTensor::new(1.0, 4.0, 1.0, -5.0, 0.0, 0.0)];
    clip_segregated(&mut neg, &ClippingConfig::default());
    assert!((neg[0][3] + 2.0).abs() < 1e-14);
}

#[test]
fn test_statistics_report_pre_clip_extrema() {
    let mut rij = vec![SymTensor::new(-2.0, 1.0, 1.0, 0.0, 0.0, 0.0), SymTensor::isotropic(3.0)];
    let stats = clip_segregated(&mut rij, &ClippingConfig::default());
    assert_eq!(stats.min[0], -2.0);
    assert_eq!(stats.max[0], 3.0);
    assert_eq!(stats.clip_count[0], 1);
    assert_eq!(stats.total_clips, 1);
}

// ============================================================
// 耗散率
// ============================================================

#[test]
fn test_dissipation_reflection_is_bounded_by_growth() {
    let config = ClippingConfig::default();
    let mut rng = Lcg(3);
    let prev: Vec<f64> = (0..200).map(|_| 0.5 + rng.next().abs()).collect();
    let mut eps: Vec<f64> = (0..200).map(|_| 5.0 * rng.next()).collect();
    let before = eps.clone();

    clip_dissipation(&mut eps, &prev, DissipationClipMode::Reflect, &config);
    for c in 0..eps.len() {
        assert!(eps[c] >= EPZERO_SQ);
        if before[c] < 0.0 {
            assert!(eps[c] <= config.dissipation_growth * prev[c] + 1e-15);
            assert!(eps[c] <= before[c].abs());
        } else {
            assert_eq!(eps[c], before[c]);
        }
    }
}

#[test]
fn test_dissipation_floor_mode() {
    let config = ClippingConfig::default();
    let mut eps = vec![-1.0, 0.0, 2.0];
    let stats = clip_dissipation(&mut eps, &[1.0; 3], DissipationClipMode::Floor, &config);
    assert_eq!(eps, vec![EPZERO_SQ, EPZERO_SQ, 2.0]);
    assert_eq!(stats.total_clips, 2);
}

// ============================================================
// 张量裁剪
// ============================================================

#[test]
fn test_coupled_result_is_realizable() {
    let config = ClippingConfig::default();
    let mut rij = random_field(500, 23);
    let trace_ref = reference_trace(&rij, &LocalReduce);
    clip_coupled(&mut rij, &config, trace_ref);
    assert_realizable(&rij, EPZERO_SQ);
    for r in &rij {
        let lambda = r.min_eigenvalue();
        assert!(lambda > -1e-12 * r.trace().max(1.0), "最小特征值 {lambda}");
    }
}

#[test]
fn test_coupled_is_idempotent() {
    let config = ClippingConfig::default();
    let mut rij = random_field(500, 31);
    let trace_ref = reference_trace(&rij, &LocalReduce);
    let first = clip_coupled(&mut rij, &config, trace_ref);
    assert!(first.total_clips > 0);

    let snapshot = rij.clone();
    let trace_ref = reference_trace(&rij, &LocalReduce);
    let second = clip_coupled(&mut rij, &config, trace_ref);
    assert_eq!(second.total_clips, 0);
    assert_eq!(rij, snapshot);
}

#[test]
fn test_coupled_is_idempotent_without_anchor() {
    // 无各向同性锚点时，修正会抬高方向最大值，第二遍参考迹变大
    let config = ClippingConfig::default();
    let mut rij = vec![SymTensor::diagonal(1.0, 1.0, -0.5), SymTensor::diagonal(0.5, 0.5, -1.0)];
    let t1 = reference_trace(&rij, &LocalReduce);
    clip_coupled(&mut rij, &config, t1);
    let t2 = reference_trace(&rij, &LocalReduce);
    assert!(t2 > t1);

    let snapshot = rij.clone();
    let second = clip_coupled(&mut rij, &config, t2);
    assert_eq!(second.total_clips, 0);
    assert_eq!(rij, snapshot);

    let mut field = random_field(300, 37).split_off(1);
    let trace_ref = reference_trace(&field, &LocalReduce);
    clip_coupled(&mut field, &config, trace_ref);
    let snapshot = field.clone();
    let trace_ref = reference_trace(&field, &LocalReduce);
    let second = clip_coupled(&mut field, &config, trace_ref);
    assert_eq!(second.total_clips, 0);
    assert_eq!(field, snapshot);
}

#[test]
fn test_eigen_correction_trace_growth() {
    let tol = 1e-4;
    let mut rng = Lcg(5);
    for _ in 0..200 {
        let r = SymTensor::new(
            rng.next().abs() + 0.1,
            rng.next().abs() + 0.1,
            rng.next().abs() + 0.1,
            rng.next(),
            rng.next(),
            rng.next(),
        );
        if let Some(c) = eigen_correction(&r, tol) {
            assert!((c.trace() - r.trace() * (1.0 + tol)).abs() < 1e-12 * r.trace());
            assert!(c.min_eigenvalue() / c.trace() >= tol);
        }
    }
}

#[test]
fn test_scenario_a_zero_trace_cell() {
    let config = ClippingConfig::default();
    let mut rij = vec![SymTensor::diagonal(3.0, 2.0, 4.0), SymTensor::new(0.0, 0.0, 0.0, 0.3, 0.0, 0.0)];
    let trace_ref = reference_trace(&rij, &LocalReduce);
    assert!((trace_ref - 3.0).abs() < 1e-14);

    clip_coupled(&mut rij, &config, trace_ref);
    let expected = EPZERO * 9.0 / 3.0;
    for m in 0..3 {
        assert!((rij[1][m] - expected).abs() < 1e-26);
    }
    for m in 3..6 {
        assert_eq!(rij[1][m], 0.0);
    }
    assert_eq!(rij[0], SymTensor::diagonal(3.0, 2.0, 4.0));
}

#[test]
fn test_scenario_b_negative_eigenvalue() {
    let tol = 1e-4;
    // 归一化特征值 {0.6, 0.5, −0.1}
    let r = SymTensor::diagonal(0.6, 0.5, -0.1);
    let offset = (0.1_f64 / (1.0 / 3.0 + 0.1) + 0.1).min(1.0);
    assert!((offset - 0.3308).abs() < 1e-4);

    let c = eigen_correction(&r, tol).unwrap();
    let iso = (offset + tol) / 3.0;
    assert!((c[0] - ((1.0 - offset) * 0.6 + iso)).abs() < 1e-12);
    assert!((c[1] - ((1.0 - offset) * 0.5 + iso)).abs() < 1e-12);
    assert!((c[2] - ((1.0 - offset) * -0.1 + iso)).abs() < 1e-12);
    assert!(c[2] > 0.0);
}

#[test]
fn test_clipper_emits_both_fields() {
    let clipper = RealizabilityClipper::new(ClippingConfig::default(), SolveMode::Coupled);
    let mut rij = random_field(50, 41);
    let mut eps = vec![-0.5; 50];
    let prev = vec![0.2; 50];
    let mut sink = RecordingClippingSink::new();
    let summary = clipper.clip(&mut rij, &mut eps, &prev, &LocalReduce, &mut sink).unwrap();

    assert_eq!(sink.records.len(), 2);
    assert_eq!(sink.last("epsilon").map(|s| s.total_clips), Some(50));
    assert_eq!(summary.epsilon_clips, 50);
    // 张量模式恒为反射：min(0.5, 1.1·0.2)
    assert!(eps.iter().all(|&e| (e - 0.22).abs() < 1e-15));
    assert!(summary.reference_trace.is_some());
}

#[test]
fn test_clipper_rejects_size_mismatch() {
    let clipper = RealizabilityClipper::new(ClippingConfig::default(), SolveMode::Segregated);
    let mut rij = vec![SymTensor::isotropic(1.0); 3];
    let mut eps = vec![1.0; 2];
    let mut sink = RecordingClippingSink::new();
    assert!(clipper.clip(&mut rij, &mut eps, &[1.0; 3], &LocalReduce, &mut sink).is_err());
    assert!(sink.records.is_empty());
}
