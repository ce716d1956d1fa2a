// 该文件是 Mailuo （脉络） 项目的一部分。
// src/bin/q1_verify.rs - Q1 验证测试程序
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use url::Url;

use mailuo::{
  EffectiveArea, FromUrl, ScorerConfig,
  input::ImageFileInput,
  output::{OutputWrapper, Render, Session},
  score::FINGER_COEFFICIENT,
  task::{RealImageTask, Task, VerificationTask},
};

/// ISO/IEC 29794-9 Q1 验证测试
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 测试图像输出目录
  #[arg(long, default_value = "test_outputs", value_name = "DIR")]
  pub directory: PathBuf,
  /// 有效面积系数 Sc（像素）
  #[arg(long, default_value_t = FINGER_COEFFICIENT, value_name = "PIXELS")]
  pub coefficient: u32,
  /// 额外测试的真实图像
  #[arg(long, value_name = "IMAGE")]
  pub image: Option<ImageFileInput>,
  /// 输出方式，可重复指定（console: 或 json:///path/to/report.json）
  #[arg(long, default_value = "console:", value_name = "OUTPUT")]
  pub output: Vec<Url>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("测试图像目录: {}", args.directory.display());
  info!("系数 Sc: {}", args.coefficient);

  let area = EffectiveArea::new(ScorerConfig::default().with_coefficient(args.coefficient))?;
  let outputs = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  let verification = VerificationTask::new(&args.directory).run_task(&area)?;
  let real_image = match args.image {
    Some(input) => Some(RealImageTask::new(input).run_task(&area)?),
    None => None,
  };

  let session = Session {
    verification: Some(verification),
    real_image,
  };
  for output in &outputs {
    output.render_result(&session)?;
  }

  Ok(())
}
