// apps/rsm_cli/src/commands/run.rs

//! 均匀剪切演示命令
//!
//! 在结构化盒子上施加 ∂u/∂y = S 的均匀剪切，推进 Reynolds 应力方程，
//! 输出湍动能与剪应力各向异性的演化。

use anyhow::{Context, Result};
use clap::Args;
use glam::DVec3;
use rsm_config::{RsmConfig, SolveMode, TurbulenceModelKind};
use rsm_foundation::EPZERO_SQ;
use rsm_physics::tensor::MAT3_ZERO;
use rsm_physics::{
    shear_production, FaceTopology, LogClippingSink, ReynoldsStressEquation, RsmInputs, StepReport,
    SymTensor,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径（给出时忽略 --model 与 --mode）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 湍流闭合 (Rij-epsilon, Rij-SSG, Rij-EBRSM)
    #[arg(short, long, default_value = "Rij-SSG")]
    pub model: String,

    /// 求解模式 (segregated, coupled)
    #[arg(long, default_value = "coupled")]
    pub mode: String,

    /// 每个水平方向的单元数
    #[arg(long, default_value = "4")]
    pub cells: usize,

    /// 时间步数
    #[arg(short = 'n', long, default_value = "100")]
    pub steps: usize,

    /// 时间步长 [s]
    #[arg(long, default_value = "0.01")]
    pub dt: f64,

    /// 剪切率 S [1/s]
    #[arg(long, default_value = "1.0")]
    pub shear: f64,

    /// 开启显式源项外推
    #[arg(long)]
    pub extrapolate: bool,

    /// 输出步报告 (JSON)
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== RSM 均匀剪切 ===");

    let mut config = load_config(&args)?;
    if args.extrapolate {
        config.time_scheme.extrapolate = true;
    }
    let eq = ReynoldsStressEquation::new(config).context("创建 Reynolds 应力方程失败")?;

    let topo = FaceTopology::structured_box([args.cells, args.cells, 1], [1.0; 3])
        .context("创建网格失败")?;
    let n = topo.n_cells();
    info!("网格: {} 个单元, {} 个内部面", n, topo.internal_faces().len());
    info!("闭合: {}, 模式: {:?}", eq.config().turbulence_model, eq.config().solve_mode);

    let mut grad_u = MAT3_ZERO;
    grad_u[0][1] = args.shear;
    let grad = vec![grad_u; n];
    let density = vec![1.0; n];
    let viscosity = vec![1e-5; n];
    let mu_t = vec![0.09; n];
    let alpha = vec![1.0; n];
    let alpha_grad = vec![DVec3::ZERO; n];

    let mut rij = vec![SymTensor::isotropic(2.0 / 3.0); n];
    let mut eps = vec![1.0; n];
    let mut store = vec![SymTensor::ZERO; n];
    let mut reports: Vec<StepReport> = Vec::with_capacity(args.steps);

    let start = Instant::now();
    let print_every = (args.steps / 10).max(1);

    for step in 1..=args.steps {
        let production: Vec<SymTensor> =
            rij.iter().zip(&grad).map(|(r, g)| shear_production(r, g)).collect();
        let eps_prev = eps.clone();
        let inputs = RsmInputs::new(&grad, &production, &density, &viscosity, &mu_t)
            .with_elliptic_blending(&alpha, &alpha_grad);
        let previous = eq.config().time_scheme.extrapolate.then_some(store.as_mut_slice());

        let report = eq
            .step(&topo, &inputs, &mut rij, &mut eps, &eps_prev, args.dt, previous, &mut LogClippingSink)
            .with_context(|| format!("第 {step} 步失败"))?;

        if !report.converged() {
            warn!("第 {} 步线性求解未收敛", step);
        }
        if step % print_every == 0 || step == args.steps {
            let r = &rij[0];
            let k = (0.5 * r.trace()).max(EPZERO_SQ);
            info!(
                "步 {:>5}  t = {:.3}  k = {:.5e}  R12/k = {:+.4}  裁剪 R/ε = {}/{}",
                step,
                step as f64 * args.dt,
                k,
                r[3] / k,
                report.clipping.rij_clips,
                report.clipping.epsilon_clips
            );
        }
        reports.push(report);
    }

    let elapsed = start.elapsed();
    let total_clips: u64 = reports.iter().map(|r| r.clipping.rij_clips).sum();
    println!("\n=== 完成 ===");
    println!("  步数: {}", args.steps);
    println!("  耗时: {:.2?}", elapsed);
    println!("  累计 R 裁剪: {}", total_clips);
    println!("  最终 Rij[0]: {:?}", rij[0]);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&reports).context("序列化步报告失败")?;
        std::fs::write(path, json).with_context(|| format!("无法写入 {}", path.display()))?;
        info!("步报告已写入 {}", path.display());
    }
    Ok(())
}

fn load_config(args: &RunArgs) -> Result<RsmConfig> {
    if let Some(path) = &args.config {
        info!("加载配置: {}", path.display());
        return RsmConfig::from_file(path).with_context(|| format!("无法加载配置 {}", path.display()));
    }
    let model: TurbulenceModelKind = args.model.parse()?;
    let mode: SolveMode = args.mode.parse()?;
    Ok(RsmConfig::new(model, mode))
}
