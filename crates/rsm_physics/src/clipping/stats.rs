// crates/rsm_physics/src/clipping/stats.rs

//! 裁剪统计与日志收集器

use serde::{Deserialize, Serialize};

use super::reduce::GlobalReduce;

/// 单次裁剪的统计
///
/// `min`/`max` 为裁剪前的逐分量极值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClippingStatistics {
    /// 场名
    pub field: String,
    /// 被修改的单元总数
    pub total_clips: u64,
    /// 各分量最小值
    pub min: Vec<f64>,
    /// 各分量最大值
    pub max: Vec<f64>,
    /// 各分量裁剪次数
    pub clip_count: Vec<u64>,
}

impl ClippingStatistics {
    /// 空统计
    pub fn new(field: &str, n_components: usize) -> Self {
        Self {
            field: field.to_string(),
            total_clips: 0,
            min: vec![f64::INFINITY; n_components],
            max: vec![f64::NEG_INFINITY; n_components],
            clip_count: vec![0; n_components],
        }
    }

    /// 记录一个分量的取值
    #[inline]
    pub fn observe(&mut self, component: usize, value: f64) {
        self.min[component] = self.min[component].min(value);
        self.max[component] = self.max[component].max(value);
    }

    /// 合并另一份局部统计
    pub fn merge(mut self, other: Self) -> Self {
        self.total_clips += other.total_clips;
        for c in 0..self.min.len() {
            self.min[c] = self.min[c].min(other.min[c]);
            self.max[c] = self.max[c].max(other.max[c]);
            self.clip_count[c] += other.clip_count[c];
        }
        self
    }

    /// 全局归约
    pub fn reduce(&mut self, reducer: &dyn GlobalReduce) {
        reducer.min_in_place(&mut self.min);
        reducer.max_in_place(&mut self.max);
        reducer.sum_u64_in_place(&mut self.clip_count);
        let mut total = [self.total_clips];
        reducer.sum_u64_in_place(&mut total);
        self.total_clips = total[0];
    }

    /// 分量裁剪次数之和
    pub fn component_clips(&self) -> u64 {
        self.clip_count.iter().sum()
    }
}

/// 统计收集器
///
/// 纯粹的接收端，返回值不影响裁剪结果。
pub trait ClippingLog {
    /// 接收一条统计
    fn record(&mut self, stats: &ClippingStatistics);
}

/// 通过 `log` 输出的收集器
#[derive(Debug, Clone, Copy, Default)]
pub struct LogClippingSink;

impl ClippingLog for LogClippingSink {
    fn record(&mut self, stats: &ClippingStatistics) {
        if stats.total_clips == 0 {
            log::debug!("裁剪 {}: 无裁剪", stats.field);
            return;
        }
        log::info!(
            "裁剪 {}: {} 个单元, 分量计数 {:?}, min {:?}, max {:?}",
            stats.field,
            stats.total_clips,
            stats.clip_count,
            stats.min,
            stats.max
        );
    }
}

/// 在内存中保留统计的收集器
#[derive(Debug, Clone, Default)]
pub struct RecordingClippingSink {
    /// 已接收的统计
    pub records: Vec<ClippingStatistics>,
}

impl RecordingClippingSink {
    /// 创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 按场名取最近一条
    pub fn last(&self, field: &str) -> Option<&ClippingStatistics> {
        self.records.iter().rev().find(|s| s.field == field)
    }
}

impl ClippingLog for RecordingClippingSink {
    fn record(&mut self, stats: &ClippingStatistics) {
        self.records.push(stats.clone());
    }
}
