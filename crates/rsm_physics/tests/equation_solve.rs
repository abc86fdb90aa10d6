//! crates/rsm_physics/tests/equation_solve.rs
//!
//! 方程驱动端到端测试
//!
//! 在结构化小盒子上推进若干步，验证：
//! - 均匀剪切下各单元保持一致、剪应力符号正确
//! - 两种求解模式、三种闭合都收敛且结果可实现
//! - 外推存储、Dirichlet 边界、迎风对流、GGDH 扩散
//! - 步报告与裁剪统计的 JSON 序列化
//! - 入口校验

use glam::DVec3;

use rsm_config::{DiffusionModel, RsmConfig, SolveMode, TurbulenceModelKind};
use rsm_foundation::{RsmError, EPZERO_SQ};
use rsm_physics::{
    daly_harlow_tensor, shear_production, ClipSummary, ClippingStatistics, FaceTopology, LogClippingSink,
    Mat3, RecordingClippingSink, ReynoldsStressEquation, RsmInputs, SolveReport, SolverStatus, StepReport,
    SymTensor,
};
use rsm_physics::tensor::MAT3_ZERO;

// ============================================================
// 测试辅助设施
// ============================================================

const SHEAR: f64 = 1.0;
const DT: f64 = 0.01;

/// 均匀剪切盒子的场
struct ShearBox {
    topo: FaceTopology,
    grad: Vec<Mat3>,
    density: Vec<f64>,
    viscosity: Vec<f64>,
    mu_t: Vec<f64>,
    alpha: Vec<f64>,
    alpha_grad: Vec<DVec3>,
    rij: Vec<SymTensor>,
    eps: Vec<f64>,
}

impl ShearBox {
    fn new(dims: [usize; 3], shear: f64) -> Self {
        let topo = FaceTopology::structured_box(dims, [1.0; 3]).unwrap();
        let n = topo.n_cells();
        let mut g = MAT3_ZERO;
        g[0][1] = shear;
        Self {
            topo,
            grad: vec![g; n],
            density: vec![1.0; n],
            viscosity: vec![1e-3; n],
            mu_t: vec![0.1; n],
            alpha: vec![1.0; n],
            alpha_grad: vec![DVec3::ZERO; n],
            rij: vec![SymTensor::isotropic(2.0 / 3.0); n],
            eps: vec![1.0; n],
        }
    }

    fn production(&self) -> Vec<SymTensor> {
        self.rij
            .iter()
            .zip(&self.grad)
            .map(|(r, g)| shear_production(r, g))
            .collect()
    }

    fn step(&mut self, eq: &ReynoldsStressEquation) -> StepReport {
        let prod = self.production();
        let eps_prev = self.eps.clone();
        let inputs = RsmInputs::new(&self.grad, &prod, &self.density, &self.viscosity, &self.mu_t)
            .with_elliptic_blending(&self.alpha, &self.alpha_grad);
        let mut sink = LogClippingSink;
        eq.step(&self.topo, &inputs, &mut self.rij, &mut self.eps, &eps_prev, DT, None, &mut sink)
            .unwrap()
    }
}

fn assert_realizable(rij: &[SymTensor]) {
    for r in rij {
        for m in 0..3 {
            assert!(r[m] >= EPZERO_SQ);
        }
        assert!(r[3].abs() <= (r[0] * r[1]).sqrt() * (1.0 + 1e-15));
        assert!(r[4].abs() <= (r[1] * r[2]).sqrt() * (1.0 + 1e-15));
        assert!(r[5].abs() <= (r[0] * r[2]).sqrt() * (1.0 + 1e-15));
    }
}

// ============================================================
// 均匀剪切
// ============================================================

#[test]
fn test_homogeneous_shear_all_models_and_modes() {
    for model in TurbulenceModelKind::ALL {
        for mode in [SolveMode::Segregated, SolveMode::Coupled] {
            let eq = ReynoldsStressEquation::new(RsmConfig::new(model, mode)).unwrap();
            let mut b = ShearBox::new([3, 3, 1], SHEAR);
            for _ in 0..10 {
                let report = b.step(&eq);
                assert!(report.converged(), "{model} {mode:?}: {report:?}");
                assert_eq!(report.solver.len(), if mode.is_coupled() { 1 } else { 6 });
            }

            assert_realizable(&b.rij);
            let first = b.rij[0];
            assert!(first[3] < 0.0, "{model} {mode:?}: R12 = {}", first[3]);
            assert!(first[0] > first[1], "{model} {mode:?}: R11 = {}, R22 = {}", first[0], first[1]);
            for r in &b.rij {
                for m in 0..6 {
                    assert!((r[m] - first[m]).abs() < 1e-8, "{model} {mode:?}: 单元不一致");
                }
            }
        }
    }
}

#[test]
fn test_modes_agree_without_shear() {
    // 无剪切时没有分量间耦合，两种模式给出同一结果
    let mut seg = ShearBox::new([2, 2, 1], 0.0);
    let mut cpl = ShearBox::new([2, 2, 1], 0.0);
    for b in [&mut seg, &mut cpl] {
        b.rij = vec![SymTensor::new(1.0, 0.6, 0.4, -0.2, 0.05, 0.1); b.topo.n_cells()];
    }
    let eq_seg =
        ReynoldsStressEquation::new(RsmConfig::new(TurbulenceModelKind::Lrr, SolveMode::Segregated)).unwrap();
    let eq_cpl =
        ReynoldsStressEquation::new(RsmConfig::new(TurbulenceModelKind::Lrr, SolveMode::Coupled)).unwrap();
    for _ in 0..3 {
        seg.step(&eq_seg);
        cpl.step(&eq_cpl);
    }
    for (a, b) in seg.rij.iter().zip(&cpl.rij) {
        for m in 0..6 {
            assert!((a[m] - b[m]).abs() < 1e-9);
        }
    }
}

// ============================================================
// 外推、边界、扩散模型
// ============================================================

#[test]
fn test_extrapolation_store_round_trip() {
    let mut config = RsmConfig::new(TurbulenceModelKind::Ssg, SolveMode::Coupled);
    config.time_scheme.extrapolate = true;
    let eq = ReynoldsStressEquation::new(config).unwrap();
    let mut b = ShearBox::new([2, 1, 1], SHEAR);
    let n = b.topo.n_cells();
    let mut store = vec![SymTensor::ZERO; n];

    for _ in 0..5 {
        let prod = b.production();
        let eps_prev = b.eps.clone();
        let inputs = RsmInputs::new(&b.grad, &prod, &b.density, &b.viscosity, &b.mu_t);
        let mut sink = RecordingClippingSink::new();
        let report = eq
            .step(&b.topo, &inputs, &mut b.rij, &mut b.eps, &eps_prev, DT, Some(&mut store), &mut sink)
            .unwrap();
        assert!(report.converged());
        assert_eq!(sink.records.len(), 2);
    }
    // 存储保存的是最近一步的显式源，剪切下非零
    assert!(store.iter().all(|s| s.is_finite() && s[3] != 0.0));
    assert_realizable(&b.rij);
}

#[test]
fn test_extrapolation_without_store_is_rejected() {
    let mut config = RsmConfig::default();
    config.time_scheme.extrapolate = true;
    let eq = ReynoldsStressEquation::new(config).unwrap();
    let mut b = ShearBox::new([2, 1, 1], SHEAR);
    let prod = b.production();
    let eps_prev = b.eps.clone();
    let inputs = RsmInputs::new(&b.grad, &prod, &b.density, &b.viscosity, &b.mu_t);
    let before = b.rij.clone();
    let err = eq
        .step(&b.topo, &inputs, &mut b.rij, &mut b.eps, &eps_prev, DT, None, &mut LogClippingSink)
        .unwrap_err();
    assert!(matches!(err, RsmError::MissingInput { .. }));
    assert_eq!(b.rij, before);
}

#[test]
fn test_dirichlet_boundary_raises_field() {
    let config = RsmConfig::new(TurbulenceModelKind::Lrr, SolveMode::Coupled);
    let eq = ReynoldsStressEquation::new(config).unwrap();

    let mut free = ShearBox::new([3, 1, 1], 0.0);
    let mut held = ShearBox::new([3, 1, 1], 0.0);
    held.mu_t = vec![10.0; 3];
    free.mu_t = vec![10.0; 3];
    free.step(&eq);

    let boundary = vec![SymTensor::isotropic(5.0); held.topo.boundary_faces().len()];
    let prod = held.production();
    let eps_prev = held.eps.clone();
    let inputs = RsmInputs::new(&held.grad, &prod, &held.density, &held.viscosity, &held.mu_t)
        .with_boundary_values(&boundary);
    eq.step(&held.topo, &inputs, &mut held.rij, &mut held.eps, &eps_prev, DT, None, &mut LogClippingSink)
        .unwrap();

    for (f, h) in free.rij.iter().zip(&held.rij) {
        assert!(h[0] > f[0]);
        assert!(h[3].abs() < 1e-12);
    }
}

#[test]
fn test_mass_flux_carries_stress_downstream() {
    let eq = ReynoldsStressEquation::new(RsmConfig::new(TurbulenceModelKind::Lrr, SolveMode::Segregated)).unwrap();
    let run = |flux: Option<&[f64]>| {
        let mut b = ShearBox::new([3, 1, 1], 0.0);
        b.rij[0] = SymTensor::isotropic(2.0);
        let prod = b.production();
        let eps_prev = b.eps.clone();
        let mut inputs = RsmInputs::new(&b.grad, &prod, &b.density, &b.viscosity, &b.mu_t);
        if let Some(flux) = flux {
            inputs = inputs.with_mass_flux(flux);
        }
        let report = eq
            .step(&b.topo, &inputs, &mut b.rij, &mut b.eps, &eps_prev, DT, None, &mut LogClippingSink)
            .unwrap();
        assert!(report.converged());
        b.rij
    };

    let still = run(None);
    let forward = run(Some(&[1.0, 1.0][..]));
    let backward = run(Some(&[-1.0, -1.0][..]));
    // 顺流时第二个单元从高应力的上游单元获得补充
    assert!(forward[1][0] > still[1][0] + 1e-4, "{} vs {}", forward[1][0], still[1][0]);
    // 逆流时它的上游是低应力单元
    assert!(backward[1][0] < forward[1][0]);
    assert_realizable(&forward);
}

#[test]
fn test_ggdh_with_daly_harlow_tensor() {
    let mut config = RsmConfig::new(TurbulenceModelKind::Ssg, SolveMode::Segregated);
    config.diffusion.model = DiffusionModel::Ggdh;
    let eq = ReynoldsStressEquation::new(config).unwrap();
    let mut b = ShearBox::new([2, 2, 2], SHEAR);

    let visten: Vec<SymTensor> = b
        .rij
        .iter()
        .zip(&b.eps)
        .map(|(r, &e)| daly_harlow_tensor(r, 1.0, e, 0.22, EPZERO_SQ))
        .collect();
    let prod = b.production();
    let eps_prev = b.eps.clone();
    let inputs = RsmInputs::new(&b.grad, &prod, &b.density, &b.viscosity, &b.mu_t)
        .with_viscosity_tensor(&visten);
    let report = eq
        .step(&b.topo, &inputs, &mut b.rij, &mut b.eps, &eps_prev, DT, None, &mut LogClippingSink)
        .unwrap();
    assert!(report.converged());
    assert_realizable(&b.rij);

    // 缺少湍流黏度张量时在入口报错
    let inputs = RsmInputs::new(&b.grad, &prod, &b.density, &b.viscosity, &b.mu_t);
    let err = eq
        .step(&b.topo, &inputs, &mut b.rij, &mut b.eps, &eps_prev, DT, None, &mut LogClippingSink)
        .unwrap_err();
    assert!(matches!(err, RsmError::MissingInput { name: "viscosity_tensor" }));
}

#[test]
fn test_negative_dissipation_is_reflected_after_step() {
    let eq = ReynoldsStressEquation::new(RsmConfig::new(TurbulenceModelKind::Lrr, SolveMode::Coupled)).unwrap();
    let mut b = ShearBox::new([2, 1, 1], SHEAR);
    let prod = b.production();
    let eps_prev = vec![0.5; 2];
    b.eps = vec![-2.0, 0.3];
    let inputs = RsmInputs::new(&b.grad, &prod, &b.density, &b.viscosity, &b.mu_t);
    let mut sink = RecordingClippingSink::new();
    let report = eq
        .step(&b.topo, &inputs, &mut b.rij, &mut b.eps, &eps_prev, DT, None, &mut sink)
        .unwrap();
    assert_eq!(report.clipping.epsilon_clips, 1);
    assert!((b.eps[0] - 0.55).abs() < 1e-12);
    assert_eq!(b.eps[1], 0.3);
}

// ============================================================
// 报告序列化
// ============================================================

#[test]
fn test_step_report_json_round_trip() {
    let report = StepReport {
        mode: SolveMode::Coupled,
        solver: vec![SolveReport {
            status: SolverStatus::Converged,
            iterations: 12,
            residual_norm: 0.0009765625,
            initial_residual_norm: 0.5,
        }],
        clipping: ClipSummary { rij_clips: 3, epsilon_clips: 1, reference_trace: Some(0.75) },
    };
    let json = serde_json::to_string(&report).unwrap();
    let back: StepReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
    assert!(back.converged());

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["mode"], serde_json::to_value(SolveMode::Coupled).unwrap());
    assert_eq!(value["clipping"]["rij_clips"], 3);
    assert!(value["clipping"]["reference_trace"].is_number());

    // 逐分量模式没有参考迹
    let segregated = ClipSummary { rij_clips: 0, epsilon_clips: 0, reference_trace: None };
    let value = serde_json::to_value(segregated).unwrap();
    assert!(value["reference_trace"].is_null());
}

#[test]
fn test_clipping_statistics_json_round_trip() {
    let mut stats = ClippingStatistics::new("rij", 6);
    for (m, v) in [0.5, -0.25, 1.5, 2.0, -0.125, 0.0].into_iter().enumerate() {
        stats.observe(m, v);
        stats.observe(m, 2.0 * v);
    }
    stats.clip_count[1] = 4;
    stats.total_clips = 4;

    let json = serde_json::to_string_pretty(&stats).unwrap();
    assert!(json.contains("\"field\": \"rij\""));
    let back: ClippingStatistics = serde_json::from_str(&json).unwrap();
    assert_eq!(back, stats);
    assert_eq!(back.component_clips(), 4);
    assert_eq!(back.min[1], -0.5);
    assert_eq!(back.max[2], 3.0);
}
