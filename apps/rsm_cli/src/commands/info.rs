// apps/rsm_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示闭合常数表与默认配置。

use anyhow::{Context, Result};
use clap::Args;
use rsm_config::{ClosureConstants, RsmConfig, TurbulenceModelKind};
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 只显示指定闭合 (Rij-epsilon, Rij-SSG, Rij-EBRSM)
    #[arg(short, long)]
    pub model: Option<String>,

    /// 以 JSON 输出默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== RSM 信息 ===");
    println!("rsm_cli 版本: {}", env!("CARGO_PKG_VERSION"));

    let constants = ClosureConstants::default();
    let models = match &args.model {
        Some(name) => vec![name
            .parse::<TurbulenceModelKind>()
            .with_context(|| format!("无法识别闭合 '{name}'"))?],
        None => TurbulenceModelKind::ALL.to_vec(),
    };

    let common = &constants.common;
    println!("\n=== 公共常数 ===");
    println!("  Cμ = {}, C_s = {}, κ = {}, C3 = {}", common.cmu, common.csrij, common.kappa, common.crij3);

    for model in models {
        print_model(model, &constants);
    }

    if args.defaults {
        println!("\n=== 默认配置 ===");
        let json = serde_json::to_string_pretty(&RsmConfig::default()).context("序列化默认配置失败")?;
        println!("{json}");
    }
    Ok(())
}

fn print_model(model: TurbulenceModelKind, c: &ClosureConstants) {
    println!("\n=== {model} ===");
    match model {
        TurbulenceModelKind::Lrr => {
            println!("  C1 = {}, C2 = {}", c.lrr.crij1, c.lrr.crij2);
            println!("  壁面回声 C1' = {}, C2' = {}", c.lrr.crijp1, c.lrr.crijp2);
        }
        TurbulenceModelKind::Ssg => {
            let s = &c.ssg;
            println!("  Cs1 = {}, Cs2 = {}", s.cssgs1, s.cssgs2);
            println!(
                "  Cr1..Cr5 = {}, {}, {}, {}, {}",
                s.cssgr1, s.cssgr2, s.cssgr3, s.cssgr4, s.cssgr5
            );
        }
        TurbulenceModelKind::Ebrsm => {
            let e = &c.ebrsm;
            println!("  Cs1 = {}, Cs2 = {}", e.cebms1, e.cebms2);
            println!(
                "  Cr1..Cr5 = {}, {}, {}, {}, {}",
                e.cebmr1, e.cebmr2, e.cebmr3, e.cebmr4, e.cebmr5
            );
            println!("  近壁系数 = {}", e.wall_coef);
            println!("  需要椭圆混合场 α 及其梯度");
        }
    }
}
