// crates/rsm_physics/src/tensor.rs

//! 对称张量与 6×6 块代数
//!
//! Reynolds 应力以 6 个独立分量存储，顺序固定为 `(11, 22, 33, 12, 23, 13)`。
//! 下游的求解器与后处理依赖这一顺序，不得更改。
//!
//! # 存储约定
//!
//! 非对角分量只存一份，`R_12` 与 `R_21` 共用下标 3。
//! 对于关于 R 线性的算子 f，`f(E_m)`（E_m 为第 m 个存储分量为 1 的对称张量）
//! 就是 f 对存储变量 m 的导数列。

use nalgebra::{Matrix6, Vector6};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use rsm_foundation::EPZERO;

/// 3×3 矩阵（行主序）
pub type Mat3 = [[f64; 3]; 3];

/// 6×6 块矩阵，行列均按存储分量顺序
pub type Block6 = Matrix6<f64>;

/// 按存储顺序排列的分量矢量
pub type Vec6 = Vector6<f64>;

/// 存储下标到 (i, j) 的映射
pub const COMPONENTS: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (0, 1), (1, 2), (0, 2)];

/// (i, j) 到存储下标的映射
pub const COMPONENT_INDEX: [[usize; 3]; 3] = [[0, 3, 5], [3, 1, 4], [5, 4, 2]];

/// 分量名称，用于日志
pub const COMPONENT_NAMES: [&str; 6] = ["R11", "R22", "R33", "R12", "R23", "R13"];

/// Kronecker δ 的存储形式
pub const KRONECKER: [f64; 6] = [1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

/// 零 3×3 矩阵
pub const MAT3_ZERO: Mat3 = [[0.0; 3]; 3];

/// 存储下标是否为对角分量
#[inline]
pub fn is_diagonal(m: usize) -> bool {
    m < 3
}

/// 对称 3×3 张量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SymTensor(pub [f64; 6]);

impl SymTensor {
    /// 零张量
    pub const ZERO: Self = Self([0.0; 6]);

    /// 单位张量
    pub const IDENTITY: Self = Self(KRONECKER);

    /// 从六个分量创建
    #[inline]
    pub const fn new(r11: f64, r22: f64, r33: f64, r12: f64, r23: f64, r13: f64) -> Self {
        Self([r11, r22, r33, r12, r23, r13])
    }

    /// 对角张量
    #[inline]
    pub const fn diagonal(d1: f64, d2: f64, d3: f64) -> Self {
        Self([d1, d2, d3, 0.0, 0.0, 0.0])
    }

    /// 各向同性张量 `s·δ`
    #[inline]
    pub const fn isotropic(s: f64) -> Self {
        Self([s, s, s, 0.0, 0.0, 0.0])
    }

    /// 六个存储分量同为 `s`（逐分量方程的对角系数）
    #[inline]
    pub const fn uniform(s: f64) -> Self {
        Self([s; 6])
    }

    /// 第 m 个存储分量为 1 的基张量
    #[inline]
    pub fn unit(m: usize) -> Self {
        let mut t = Self::ZERO;
        t.0[m] = 1.0;
        t
    }

    /// 按存储顺序转为矢量
    #[inline]
    pub fn to_vector(&self) -> Vec6 {
        Vec6::from(self.0)
    }

    /// 由存储顺序的矢量构建
    #[inline]
    pub fn from_vector(v: Vec6) -> Self {
        Self(v.into())
    }

    /// 由一般 3×3 矩阵取对称部分
    pub fn from_mat_sym(m: &Mat3) -> Self {
        let mut t = Self::ZERO;
        for (idx, &(i, j)) in COMPONENTS.iter().enumerate() {
            t.0[idx] = 0.5 * (m[i][j] + m[j][i]);
        }
        t
    }

    /// 按 (i, j) 取值
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.0[COMPONENT_INDEX[i][j]]
    }

    /// 展开为 3×3 矩阵
    pub fn to_mat(&self) -> Mat3 {
        let mut m = MAT3_ZERO;
        for (i, row) in m.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = self.get(i, j);
            }
        }
        m
    }

    /// 迹
    #[inline]
    pub fn trace(&self) -> f64 {
        self.0[0] + self.0[1] + self.0[2]
    }

    /// 双点积 `A_ij B_ij`
    #[inline]
    pub fn ddot(&self, other: &Self) -> f64 {
        let d = self.0;
        let o = other.0;
        d[0] * o[0] + d[1] * o[1] + d[2] * o[2] + 2.0 * (d[3] * o[3] + d[4] * o[4] + d[5] * o[5])
    }

    /// 行列式
    pub fn determinant(&self) -> f64 {
        let [a, b, c, d, e, f] = self.0;
        a * (b * c - e * e) - d * (d * c - e * f) + f * (d * e - b * f)
    }

    /// 张量乘矢量 `T·v`
    pub fn mul_vec(&self, v: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, o) in out.iter_mut().enumerate() {
            *o = (0..3).map(|j| self.get(i, j) * v[j]).sum();
        }
        out
    }

    /// 二次型 `vᵀ·T·v`
    pub fn quadratic_form(&self, v: [f64; 3]) -> f64 {
        let tv = self.mul_vec(v);
        tv[0] * v[0] + tv[1] * v[1] + tv[2] * v[2]
    }

    /// 各分量是否有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// 缩放
    #[inline]
    pub fn scale(&self, factor: f64) -> Self {
        let mut t = *self;
        t.0.iter_mut().for_each(|v| *v *= factor);
        t
    }

    /// 逐分量取 `max(v, 0)`
    #[inline]
    pub fn positive_part(&self) -> Self {
        let mut t = *self;
        t.0.iter_mut().for_each(|v| *v = v.max(0.0));
        t
    }

    /// 特征值，降序排列
    ///
    /// 使用三角函数闭式解，适用于任意实对称矩阵。
    pub fn eigenvalues(&self) -> [f64; 3] {
        let [a11, a22, a33, a12, a23, a13] = self.0;
        let p1 = a12 * a12 + a23 * a23 + a13 * a13;
        if p1 <= EPZERO * EPZERO * (a11 * a11 + a22 * a22 + a33 * a33).max(f64::MIN_POSITIVE) {
            let mut ev = [a11, a22, a33];
            ev.sort_by(|x, y| y.total_cmp(x));
            return ev;
        }

        let q = self.trace() / 3.0;
        let p2 = (a11 - q).powi(2) + (a22 - q).powi(2) + (a33 - q).powi(2) + 2.0 * p1;
        let p = (p2 / 6.0).sqrt();
        let b = Self::new(a11 - q, a22 - q, a33 - q, a12, a23, a13).scale(1.0 / p);
        let r = (0.5 * b.determinant()).clamp(-1.0, 1.0);
        let phi = r.acos() / 3.0;

        let e1 = q + 2.0 * p * phi.cos();
        let e3 = q + 2.0 * p * (phi + 2.0 * std::f64::consts::PI / 3.0).cos();
        let e2 = 3.0 * q - e1 - e3;
        [e1, e2, e3]
    }

    /// 最小特征值
    #[inline]
    pub fn min_eigenvalue(&self) -> f64 {
        self.eigenvalues()[2]
    }
}

impl Index<usize> for SymTensor {
    type Output = f64;

    #[inline]
    fn index(&self, m: usize) -> &f64 {
        &self.0[m]
    }
}

impl IndexMut<usize> for SymTensor {
    #[inline]
    fn index_mut(&mut self, m: usize) -> &mut f64 {
        &mut self.0[m]
    }
}

impl Add for SymTensor {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for SymTensor {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl Sub for SymTensor {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl SubAssign for SymTensor {
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
    }
}

impl Mul<f64> for SymTensor {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Neg for SymTensor {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

// ============================================================================
// 3×3 矩阵工具
// ============================================================================

/// `A + s·B`
pub fn mat3_axpy(a: &Mat3, s: f64, b: &Mat3) -> Mat3 {
    let mut c = *a;
    for i in 0..3 {
        for j in 0..3 {
            c[i][j] += s * b[i][j];
        }
    }
    c
}

/// 角速度矢量对应的反对称矩阵，满足 `Ω·v = ω × v`
pub fn skew(omega: [f64; 3]) -> Mat3 {
    let [w1, w2, w3] = omega;
    [[0.0, -w3, w2], [w3, 0.0, -w1], [-w2, w1, 0.0]]
}

// ============================================================================
// 6×6 块
// ============================================================================

/// 线性算子 f 对存储变量的 Jacobian，第 m 列为 `f(E_m)`
pub fn linear_jacobian(f: impl Fn(&SymTensor) -> SymTensor) -> Block6 {
    let mut j = Block6::zeros();
    for m in 0..6 {
        j.set_column(m, &f(&SymTensor::unit(m)).to_vector());
    }
    j
}

/// 块乘张量 `B·x`
#[inline]
pub fn block_apply(b: &Block6, x: &SymTensor) -> SymTensor {
    SymTensor::from_vector(b * x.to_vector())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_tables_are_inverse() {
        for (m, &(i, j)) in COMPONENTS.iter().enumerate() {
            assert_eq!(COMPONENT_INDEX[i][j], m);
            assert_eq!(COMPONENT_INDEX[j][i], m);
        }
    }

    #[test]
    fn test_ddot_and_trace() {
        let a = SymTensor::new(1.0, 2.0, 3.0, 0.5, 0.0, 0.0);
        assert!((a.trace() - 6.0).abs() < 1e-14);
        // 1 + 4 + 9 + 2*0.25
        assert!((a.ddot(&a) - 14.5).abs() < 1e-14);
    }

    #[test]
    fn test_eigenvalues_diagonal() {
        let ev = SymTensor::diagonal(0.4, -0.1, 0.7).eigenvalues();
        assert!((ev[0] - 0.7).abs() < 1e-14);
        assert!((ev[1] - 0.4).abs() < 1e-14);
        assert!((ev[2] + 0.1).abs() < 1e-14);
    }

    #[test]
    fn test_eigenvalues_general() {
        // 特征值 3, 1, 1 的矩阵
        let t = SymTensor::new(2.0, 2.0, 1.0, 1.0, 0.0, 0.0);
        let ev = t.eigenvalues();
        // 重根处 acos 对舍入敏感，容差放宽
        assert!((ev[0] - 3.0).abs() < 1e-6);
        assert!((ev[1] - 1.0).abs() < 1e-6);
        assert!((ev[2] - 1.0).abs() < 1e-6);
        assert!((ev.iter().sum::<f64>() - t.trace()).abs() < 1e-12);
        assert!((ev.iter().product::<f64>() - t.determinant()).abs() < 1e-5);
    }

    #[test]
    fn test_linear_jacobian_of_identity_map() {
        let j = linear_jacobian(|r| *r);
        for r in 0..6 {
            for c in 0..6 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_eq!(j[(r, c)], expected);
            }
        }
    }

    #[test]
    fn test_block_apply_and_inverse() {
        let a = Block6::from_fn(|r, c| if r == c { 4.0 + r as f64 } else { 1.0 / (1.0 + (r + c) as f64) });
        let x = SymTensor::new(1.0, -2.0, 0.5, 3.0, -1.0, 0.25);
        let b = block_apply(&a, &x);
        assert!((b[0] - (4.0 * 1.0 + (-2.0 / 2.0) + 0.5 / 3.0 + 3.0 / 4.0 - 1.0 / 5.0 + 0.25 / 6.0)).abs() < 1e-12);

        let inv = a.try_inverse().unwrap();
        let sol = block_apply(&inv, &b);
        for m in 0..6 {
            assert!((sol[m] - x[m]).abs() < 1e-12);
        }
        assert!(Block6::zeros().try_inverse().is_none());
    }

    #[test]
    fn test_skew_is_cross_product() {
        let w = [0.3, -1.0, 2.0];
        let v = [1.0, 0.5, -0.25];
        let m = skew(w);
        let mv: Vec<f64> = (0..3).map(|i| (0..3).map(|j| m[i][j] * v[j]).sum()).collect();
        let cross = [w[1] * v[2] - w[2] * v[1], w[2] * v[0] - w[0] * v[2], w[0] * v[1] - w[1] * v[0]];
        for i in 0..3 {
            assert!((mv[i] - cross[i]).abs() < 1e-14);
        }
    }
}
