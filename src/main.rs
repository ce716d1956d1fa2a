// 该文件是 Mailuo （脉络） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use mailuo::{
  EffectiveArea, FromUrl, ScorerConfig,
  output::{OutputWrapper, Render, Session},
  task::{RealImageTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("输入图像: {}", args.input);
  info!("系数 Sc: {}", args.coefficient);

  let area = EffectiveArea::new(ScorerConfig::default().with_coefficient(args.coefficient))?;
  let outputs = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  let report = RealImageTask::new(args.input)
    .with_mask_output(args.mask)
    .run_task(&area)?;

  let session = Session {
    verification: None,
    real_image: Some(report),
  };
  for output in &outputs {
    output.render_result(&session)?;
  }

  Ok(())
}
