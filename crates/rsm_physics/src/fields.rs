// crates/rsm_physics/src/fields.rs

//! 外部输入场
//!
//! 本模块不拥有任何场存储，只持有调用方数据的借用。
//! 所有尺寸与缺失检查在 [`RsmInputs::validate`] 中一次完成，
//! 之后的逐单元循环不再返回错误。

use glam::DVec3;

use rsm_config::{DiffusionModel, RsmConfig, TurbulenceModelKind};
use rsm_foundation::{RsmError, RsmResult};

use crate::tensor::{Mat3, SymTensor};

/// 质量源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MassSourceKind {
    /// 注入流体携带指定的 R_inj
    Imposed,
    /// 注入流体与环境相同，不产生源项
    #[default]
    Ambient,
}

/// 用户显式/隐式源项
///
/// 源项形式为 `explicit + implicit·R`，隐式部分逐分量给出，
/// 取负值表示稳定的汇。两者均已乘单元体积。
#[derive(Debug, Clone, Copy)]
pub struct UserSources<'a> {
    /// 显式部分
    pub explicit: &'a [SymTensor],
    /// 隐式系数（逐分量）
    pub implicit: &'a [SymTensor],
}

/// 拉格朗日两相耦合源项
#[derive(Debug, Clone, Copy)]
pub struct LagrangianSources<'a> {
    /// 显式张量（已体积积分）
    pub explicit: &'a [SymTensor],
    /// 隐式标量系数 [1/s]
    pub implicit: &'a [f64],
}

/// 质量注入
#[derive(Debug, Clone, Copy)]
pub struct MassInjection<'a> {
    /// 注入率 γ [kg/(m³·s)]
    pub gamma: &'a [f64],
    /// 注入类型
    pub kind: &'a [MassSourceKind],
    /// 注入值 R_inj
    pub value: &'a [SymTensor],
}

/// 单步输入
#[derive(Debug, Clone, Copy)]
pub struct RsmInputs<'a> {
    /// 速度梯度 `∂u_i/∂x_j`
    pub velocity_gradient: &'a [Mat3],
    /// 平均剪切产生项（未含科氏修正）
    pub production: &'a [SymTensor],
    /// 密度
    pub density: &'a [f64],
    /// 分子动力黏度
    pub viscosity: &'a [f64],
    /// 湍流黏度
    pub turbulent_viscosity: &'a [f64],
    /// 密度梯度（浮力）
    pub density_gradient: Option<&'a [DVec3]>,
    /// 椭圆混合变量 α
    pub alpha: Option<&'a [f64]>,
    /// α 的梯度
    pub alpha_gradient: Option<&'a [DVec3]>,
    /// 壁面距离（壁面回声）
    pub wall_distance: Option<&'a [f64]>,
    /// 壁面单位法向（壁面回声）
    pub wall_normal: Option<&'a [DVec3]>,
    /// 湍流黏度张量（GGDH）
    pub viscosity_tensor: Option<&'a [SymTensor]>,
    /// 内部面质量通量，owner → neighbor 为正
    pub mass_flux: Option<&'a [f64]>,
    /// 边界面 Dirichlet 值；缺省为零梯度
    pub boundary_values: Option<&'a [SymTensor]>,
    /// 用户源项
    pub user: Option<UserSources<'a>>,
    /// 拉格朗日耦合
    pub lagrangian: Option<LagrangianSources<'a>>,
    /// 质量注入
    pub mass_injection: Option<MassInjection<'a>>,
}

impl<'a> RsmInputs<'a> {
    /// 由必需场创建，可选场均为空
    pub fn new(
        velocity_gradient: &'a [Mat3],
        production: &'a [SymTensor],
        density: &'a [f64],
        viscosity: &'a [f64],
        turbulent_viscosity: &'a [f64],
    ) -> Self {
        Self {
            velocity_gradient,
            production,
            density,
            viscosity,
            turbulent_viscosity,
            density_gradient: None,
            alpha: None,
            alpha_gradient: None,
            wall_distance: None,
            wall_normal: None,
            viscosity_tensor: None,
            mass_flux: None,
            boundary_values: None,
            user: None,
            lagrangian: None,
            mass_injection: None,
        }
    }

    /// 设置密度梯度
    pub fn with_density_gradient(mut self, grad: &'a [DVec3]) -> Self {
        self.density_gradient = Some(grad);
        self
    }

    /// 设置椭圆混合场
    pub fn with_elliptic_blending(mut self, alpha: &'a [f64], gradient: &'a [DVec3]) -> Self {
        self.alpha = Some(alpha);
        self.alpha_gradient = Some(gradient);
        self
    }

    /// 设置壁面距离与法向
    pub fn with_wall(mut self, distance: &'a [f64], normal: &'a [DVec3]) -> Self {
        self.wall_distance = Some(distance);
        self.wall_normal = Some(normal);
        self
    }

    /// 设置湍流黏度张量
    pub fn with_viscosity_tensor(mut self, visten: &'a [SymTensor]) -> Self {
        self.viscosity_tensor = Some(visten);
        self
    }

    /// 设置内部面质量通量
    pub fn with_mass_flux(mut self, flux: &'a [f64]) -> Self {
        self.mass_flux = Some(flux);
        self
    }

    /// 设置边界值
    pub fn with_boundary_values(mut self, values: &'a [SymTensor]) -> Self {
        self.boundary_values = Some(values);
        self
    }

    /// 设置用户源项
    pub fn with_user_sources(mut self, user: UserSources<'a>) -> Self {
        self.user = Some(user);
        self
    }

    /// 设置拉格朗日耦合
    pub fn with_lagrangian(mut self, lag: LagrangianSources<'a>) -> Self {
        self.lagrangian = Some(lag);
        self
    }

    /// 设置质量注入
    pub fn with_mass_injection(mut self, inj: MassInjection<'a>) -> Self {
        self.mass_injection = Some(inj);
        self
    }

    /// 单元数（以速度梯度为准）
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.velocity_gradient.len()
    }

    /// 校验尺寸与配置所需的输入
    ///
    /// `n_internal` 与 `n_boundary` 为面数，用于面场的尺寸检查。
    pub fn validate(&self, config: &RsmConfig, n_internal: usize, n_boundary: usize) -> RsmResult<()> {
        let n = self.n_cells();
        check("production", n, self.production.len())?;
        check("density", n, self.density.len())?;
        check("viscosity", n, self.viscosity.len())?;
        check("turbulent_viscosity", n, self.turbulent_viscosity.len())?;

        if config.buoyancy.enabled {
            let grad = self.density_gradient.ok_or_else(|| RsmError::missing("density_gradient"))?;
            check("density_gradient", n, grad.len())?;
        }

        if config.turbulence_model == TurbulenceModelKind::Ebrsm {
            let alpha = self.alpha.ok_or_else(|| RsmError::missing("alpha"))?;
            let grad = self.alpha_gradient.ok_or_else(|| RsmError::missing("alpha_gradient"))?;
            check("alpha", n, alpha.len())?;
            check("alpha_gradient", n, grad.len())?;
        }

        if config.wall_echo_active() {
            let dist = self.wall_distance.ok_or_else(|| RsmError::missing("wall_distance"))?;
            let normal = self.wall_normal.ok_or_else(|| RsmError::missing("wall_normal"))?;
            check("wall_distance", n, dist.len())?;
            check("wall_normal", n, normal.len())?;
        }

        if config.diffusion.model == DiffusionModel::Ggdh {
            let visten = self.viscosity_tensor.ok_or_else(|| RsmError::missing("viscosity_tensor"))?;
            check("viscosity_tensor", n, visten.len())?;
        }

        if let Some(flux) = self.mass_flux {
            check("mass_flux", n_internal, flux.len())?;
        }
        if let Some(values) = self.boundary_values {
            check("boundary_values", n_boundary, values.len())?;
        }
        if let Some(user) = &self.user {
            check("user.explicit", n, user.explicit.len())?;
            check("user.implicit", n, user.implicit.len())?;
        }
        if let Some(lag) = &self.lagrangian {
            check("lagrangian.explicit", n, lag.explicit.len())?;
            check("lagrangian.implicit", n, lag.implicit.len())?;
        }
        if let Some(inj) = &self.mass_injection {
            check("mass_injection.gamma", n, inj.gamma.len())?;
            check("mass_injection.kind", n, inj.kind.len())?;
            check("mass_injection.value", n, inj.value.len())?;
        }
        Ok(())
    }
}

#[inline]
fn check(name: &'static str, expected: usize, actual: usize) -> RsmResult<()> {
    if expected != actual {
        return Err(RsmError::size_mismatch(name, expected, actual));
    }
    Ok(())
}
