// crates/rsm_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `RsmError` 枚举和 `RsmResult` 类型别名。
//!
//! 逐单元的数值退化（零迹、负耗散率、零梯度方向）一律通过替换值处理，
//! 不产生错误。这里的错误只在调用入口处（尺寸校验、缺失输入、配置）出现。
//!
//! # 示例
//!
//! ```
//! use rsm_foundation::error::{RsmError, RsmResult};
//!
//! fn load() -> RsmResult<()> {
//!     Err(RsmError::config("未知的湍流模型"))
//! }
//! assert!(load().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type RsmResult<T> = Result<T, RsmError>;

/// RSM 错误类型
#[derive(Error, Debug)]
pub enum RsmError {
    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 缺少必需输入
    #[error("缺少必需输入: {name}")]
    MissingInput {
        /// 输入名称
        name: &'static str,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 线性求解器错误
    #[error("线性求解失败: {message}")]
    Solver {
        /// 失败原因
        message: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

impl RsmError {
    /// 创建尺寸不匹配错误
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch { name, expected, actual }
    }

    /// 创建缺失输入错误
    pub fn missing(name: &'static str) -> Self {
        Self::MissingInput { name }
    }

    /// 创建无效输入错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// 创建求解器错误
    pub fn solver(message: impl Into<String>) -> Self {
        Self::Solver { message: message.into() }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// 是否为配置类错误
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidConfig { .. })
    }
}

/// 校验切片长度，不匹配时返回 [`RsmError::SizeMismatch`]
///
/// ```
/// use rsm_foundation::{ensure_len, RsmResult};
///
/// fn f(a: &[f64]) -> RsmResult<()> {
///     ensure_len!(a, 3, "a");
///     Ok(())
/// }
/// assert!(f(&[1.0, 2.0, 3.0]).is_ok());
/// assert!(f(&[1.0]).is_err());
/// ```
#[macro_export]
macro_rules! ensure_len {
    ($slice:expr, $expected:expr, $name:expr) => {
        if $slice.len() != $expected {
            return Err($crate::error::RsmError::size_mismatch(
                $name,
                $expected,
                $slice.len(),
            ));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RsmError::size_mismatch("rij", 10, 9);
        let msg = err.to_string();
        assert!(msg.contains("rij"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_is_config() {
        assert!(RsmError::config("x").is_config());
        assert!(!RsmError::missing("alpha").is_config());
    }
}
