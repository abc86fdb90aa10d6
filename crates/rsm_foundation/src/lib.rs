// crates/rsm_foundation/src/lib.rs

//! RSM Foundation Layer
//!
//! 基础层，提供整个项目共享的最小抽象。
//!
//! # 模块概览
//!
//! - [`scalar`]: 标量类型与数值常量（机器零、平方机器零等）
//! - [`error`]: 统一错误类型
//!
//! # 设计原则
//!
//! 1. **最少依赖**: 仅依赖 thiserror
//! 2. **无物理语义**: 本层不了解湍流模型，只提供数值与错误基础设施
//!
//! # 示例
//!
//! ```
//! use rsm_foundation::{RsmError, RsmResult, Scalar, EPZERO};
//!
//! fn check_volume(v: Scalar) -> RsmResult<Scalar> {
//!     if v <= EPZERO {
//!         return Err(RsmError::invalid_input("单元体积必须为正"));
//!     }
//!     Ok(v)
//! }
//!
//! assert!(check_volume(1.0).is_ok());
//! assert!(check_volume(0.0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod scalar;

// 重导出常用类型
pub use error::{RsmError, RsmResult};
pub use scalar::{safe_div, Scalar, DBL_EPSILON, EPZERO, EPZERO_SQ};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{RsmError, RsmResult};
    pub use crate::scalar::{safe_div, Scalar, DBL_EPSILON, EPZERO, EPZERO_SQ};
    pub use crate::ensure_len;
}
