// crates/rsm_physics/src/clipping/mod.rs

//! 可实现性裁剪
//!
//! 求解后对 R 与 ε 施加物理约束，保证 R 半正定、满足 Cauchy-Schwarz，
//! ε 为正。逐分量求解用 [`clip_segregated`]，张量求解用 [`clip_coupled`]。
//! 每次裁剪为 `"rij"` 与 `"epsilon"` 各输出一条统计。
//!
//! 裁剪次数只用于记录，不会中止计算。

pub mod coupled;
pub mod reduce;
pub mod segregated;
pub mod stats;

pub use coupled::{clip_coupled, eigen_correction, reference_trace};
pub use reduce::{GlobalReduce, LocalReduce};
pub use segregated::{clip_dissipation, clip_dissipation_value, clip_segregated};
pub use stats::{ClippingLog, ClippingStatistics, LogClippingSink, RecordingClippingSink};

use serde::{Deserialize, Serialize};

use rsm_config::{ClippingConfig, DissipationClipMode, SolveMode};
use rsm_foundation::{ensure_len, RsmResult};

use crate::tensor::SymTensor;

/// 一次裁剪的汇总
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipSummary {
    /// R 被修改的单元数
    pub rij_clips: u64,
    /// ε 被修改的单元数
    pub epsilon_clips: u64,
    /// 参考迹（仅张量裁剪）
    pub reference_trace: Option<f64>,
}

/// 可实现性裁剪器
#[derive(Debug, Clone, Copy)]
pub struct RealizabilityClipper {
    config: ClippingConfig,
    mode: SolveMode,
}

impl RealizabilityClipper {
    /// 创建
    pub fn new(config: ClippingConfig, mode: SolveMode) -> Self {
        Self { config, mode }
    }

    /// 裁剪配置
    pub fn config(&self) -> &ClippingConfig {
        &self.config
    }

    /// 实际使用的耗散率裁剪方式（张量模式恒为反射）
    pub fn dissipation_mode(&self) -> DissipationClipMode {
        if self.mode.is_coupled() {
            DissipationClipMode::Reflect
        } else {
            self.config.dissipation
        }
    }

    /// 执行一次裁剪
    pub fn clip(
        &self,
        rij: &mut [SymTensor],
        epsilon: &mut [f64],
        epsilon_prev: &[f64],
        reducer: &dyn GlobalReduce,
        sink: &mut dyn ClippingLog,
    ) -> RsmResult<ClipSummary> {
        let n = rij.len();
        ensure_len!(epsilon, n, "epsilon");
        ensure_len!(epsilon_prev, n, "epsilon_prev");

        let (mut rij_stats, reference) = match self.mode {
            SolveMode::Segregated => (clip_segregated(rij, &self.config), None),
            SolveMode::Coupled => {
                let trace_ref = reference_trace(rij, reducer);
                (clip_coupled(rij, &self.config, trace_ref), Some(trace_ref))
            }
        };
        let mut eps_stats = clip_dissipation(epsilon, epsilon_prev, self.dissipation_mode(), &self.config);

        rij_stats.reduce(reducer);
        eps_stats.reduce(reducer);
        sink.record(&rij_stats);
        sink.record(&eps_stats);

        if let Some(t) = reference {
            log::debug!("参考迹 {:.6e}", t);
        }
        Ok(ClipSummary {
            rij_clips: rij_stats.total_clips,
            epsilon_clips: eps_stats.total_clips,
            reference_trace: reference,
        })
    }
}
