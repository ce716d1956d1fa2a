// 该文件是 Mailuo （脉络） 项目的一部分。
// src/quality.rs - 有效面积（Q1）计算流程
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

use std::path::Path;

use image::GrayImage;
use thiserror::Error;
use tracing::{error, info};

use crate::{
  input::{ImageFileInput, InputError},
  score::{QualityLevel, ScoreError, Scorer, ScorerConfig},
  segment::{Region, SegmentError, Segmenter},
};

#[derive(Error, Debug)]
pub enum QualityError {
  #[error("图像输入错误: {0}")]
  InputError(#[from] InputError),
  #[error("前景分割错误: {0}")]
  SegmentError(#[from] SegmentError),
  #[error("评分配置错误: {0}")]
  ScoreError(#[from] ScoreError),
}

/// 单幅图像的 Q1 评估结果
#[derive(Debug, Clone)]
pub struct Assessment {
  pub score: u8,
  pub pixel_count: u32,
  pub width: u32,
  pub height: u32,
  pub region: Region,
}

impl Assessment {
  pub fn level(&self) -> QualityLevel {
    QualityLevel::from(self.score)
  }

  pub fn as_pair(&self) -> (u8, u32) {
    (self.score, self.pixel_count)
  }
}

/// 有效面积计算器，无内部状态，可在多线程间自由共享
#[derive(Debug, Default, Clone, Copy)]
pub struct EffectiveArea {
  segmenter: Segmenter,
  scorer: Scorer,
}

impl EffectiveArea {
  pub fn new(config: ScorerConfig) -> Result<Self, QualityError> {
    Ok(Self {
      segmenter: Segmenter,
      scorer: Scorer::new(config)?,
    })
  }

  pub fn scorer(&self) -> &Scorer {
    &self.scorer
  }

  pub fn assess_image(&self, image: &GrayImage) -> Result<Assessment, QualityError> {
    let region = self.segmenter.segment(image)?;
    let pixel_count = region.pixel_count;
    let score = self.scorer.score(pixel_count);

    Ok(Assessment {
      score,
      pixel_count,
      width: image.width(),
      height: image.height(),
      region,
    })
  }

  pub fn assess(&self, input: &ImageFileInput) -> Result<Assessment, QualityError> {
    let image = input.load()?;
    let assessment = self.assess_image(&image)?;
    info!(
      "{}: S_unoccluded = {}, Q1 = {}",
      input, assessment.pixel_count, assessment.score
    );
    Ok(assessment)
  }

  pub fn assess_path(&self, path: impl AsRef<Path>) -> Result<Assessment, QualityError> {
    self.assess(&ImageFileInput::new(path))
  }
}

/// 计算 Q1，返回 `(Q1, S_unoccluded)`。
///
/// 读取失败、解码失败或前景无效都归为 `(0, 0)`，错误只记录到日志。
/// 需要区分失败原因时使用 [`EffectiveArea::assess_path`]。
pub fn calculate_q1(image_path: impl AsRef<Path>) -> (u8, u32) {
  calculate_q1_with(&EffectiveArea::default(), image_path)
}

pub fn calculate_q1_with(area: &EffectiveArea, image_path: impl AsRef<Path>) -> (u8, u32) {
  let path = image_path.as_ref();
  match area.assess_path(path) {
    Ok(assessment) => assessment.as_pair(),
    Err(e) => {
      error!("处理图像 {} 出错: {}", path.display(), e);
      (0, 0)
    }
  }
}
