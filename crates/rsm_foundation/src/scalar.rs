// crates/rsm_foundation/src/scalar.rs

//! 标量类型与数值常量
//!
//! 闭合模型的所有张量运算都在双精度下进行；裁剪阈值依赖
//! 下列常量，修改它们会改变可实现性裁剪的判定结果。

/// 计算用标量类型
pub type Scalar = f64;

/// 机器零（用于迹判定、归一化分母下限）
pub const EPZERO: Scalar = 1e-12;

/// 平方机器零（对角分量与耗散率的下限）
pub const EPZERO_SQ: Scalar = EPZERO * EPZERO;

/// 双精度机器 epsilon（Cauchy–Schwarz 裁剪的安全裕度）
pub const DBL_EPSILON: Scalar = f64::EPSILON;

/// 安全除法
///
/// 分母绝对值小于 [`EPZERO`] 时返回 `fallback`。
#[inline]
pub fn safe_div(num: Scalar, den: Scalar, fallback: Scalar) -> Scalar {
    if den.abs() < EPZERO {
        fallback
    } else {
        num / den
    }
}
