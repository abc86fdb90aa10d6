// crates/rsm_physics/src/clipping/reduce.rs

//! 全局归约
//!
//! 参考迹尺度与裁剪统计需要跨分区归约。只使用 max/min/sum，
//! 结果与分区方式和进程数无关。

/// 全局归约接口
pub trait GlobalReduce: Send + Sync {
    /// 逐元素取全局最大值
    fn max_in_place(&self, values: &mut [f64]);

    /// 逐元素取全局最小值
    fn min_in_place(&self, values: &mut [f64]);

    /// 逐元素全局求和
    fn sum_in_place(&self, values: &mut [f64]);

    /// 逐元素全局求和（计数）
    fn sum_u64_in_place(&self, values: &mut [u64]);
}

/// 单进程归约（恒等）
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalReduce;

impl GlobalReduce for LocalReduce {
    fn max_in_place(&self, _values: &mut [f64]) {}

    fn min_in_place(&self, _values: &mut [f64]) {}

    fn sum_in_place(&self, _values: &mut [f64]) {}

    fn sum_u64_in_place(&self, _values: &mut [u64]) {}
}
