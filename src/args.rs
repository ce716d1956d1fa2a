// 该文件是 Mailuo （脉络） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use clap::Parser;
use mailuo::{input::ImageFileInput, score::FINGER_COEFFICIENT};
use url::Url;

/// Mailuo 有效面积（Q1）计算参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图像（文件路径或 image:///path 形式的 URL）
  /// 支持格式: *.bmp, *.png, *.jpg, *.jpeg
  #[arg(long, value_name = "IMAGE")]
  pub input: ImageFileInput,

  /// 有效面积系数 Sc（像素），指静脉为 20000
  #[arg(long, default_value_t = FINGER_COEFFICIENT, value_name = "PIXELS")]
  pub coefficient: u32,

  /// 输出方式，可重复指定
  /// - 终端: console:
  /// - JSON 文件: json:///path/to/report.json
  #[arg(long, default_value = "console:", value_name = "OUTPUT")]
  pub output: Vec<Url>,

  /// 选中前景区域掩码的保存路径
  #[arg(long, value_name = "FILE")]
  pub mask: Option<PathBuf>,
}
