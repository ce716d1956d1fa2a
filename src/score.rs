// 该文件是 Mailuo （脉络） 项目的一部分。
// src/score.rs - Q1 评分
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

use std::fmt;

use thiserror::Error;
use tracing::debug;

/// 指静脉（第二指节）的有效面积系数 Sc，单位: 像素
pub const FINGER_COEFFICIENT: u32 = 20000;
pub const MAX_SCORE: u8 = 100;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
  #[error("系数必须大于零")]
  InvalidCoefficient,
}

/// 采集模态，决定系数 Sc
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
  #[default]
  Finger,
}

impl Modality {
  pub fn coefficient(self) -> u32 {
    match self {
      Modality::Finger => FINGER_COEFFICIENT,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorerConfig {
  pub coefficient: u32,
}

impl Default for ScorerConfig {
  fn default() -> Self {
    Modality::default().into()
  }
}

impl From<Modality> for ScorerConfig {
  fn from(modality: Modality) -> Self {
    Self {
      coefficient: modality.coefficient(),
    }
  }
}

impl ScorerConfig {
  pub fn with_coefficient(mut self, coefficient: u32) -> Self {
    self.coefficient = coefficient;
    self
  }

  pub fn build(self) -> Result<Scorer, ScoreError> {
    Scorer::new(self)
  }
}

/// Q1 = MIN(100, ROUND(S_unoccluded / Sc * 100))，S_unoccluded 为零时否决为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scorer {
  coefficient: u32,
}

impl Default for Scorer {
  fn default() -> Self {
    Self {
      coefficient: FINGER_COEFFICIENT,
    }
  }
}

impl Scorer {
  pub fn new(config: ScorerConfig) -> Result<Self, ScoreError> {
    if config.coefficient == 0 {
      return Err(ScoreError::InvalidCoefficient);
    }
    Ok(Self {
      coefficient: config.coefficient,
    })
  }

  pub fn coefficient(&self) -> u32 {
    self.coefficient
  }

  /// 舍入采用“四舍六入五成双”（银行家舍入）
  pub fn score(&self, pixel_count: u32) -> u8 {
    if pixel_count == 0 {
      return 0;
    }

    let raw = pixel_count as f64 / self.coefficient as f64 * 100.0;
    let rounded = raw.round_ties_even().min(MAX_SCORE as f64);
    debug!("S_unoccluded = {}, 原始分数 {:.4}, Q1 = {}", pixel_count, raw, rounded);

    rounded as u8
  }
}

/// 面向报告的粗粒度质量等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualityLevel {
  Low,
  Medium,
  High,
}

impl From<u8> for QualityLevel {
  fn from(score: u8) -> Self {
    match score {
      80.. => QualityLevel::High,
      50..80 => QualityLevel::Medium,
      _ => QualityLevel::Low,
    }
  }
}

impl QualityLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      QualityLevel::Low => "Low",
      QualityLevel::Medium => "Medium",
      QualityLevel::High => "High",
    }
  }
}

impl fmt::Display for QualityLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_area_is_vetoed() {
    assert_eq!(Scorer::default().score(0), 0);
  }

  #[test]
  fn linear_scaling_at_reference_points() {
    let scorer = Scorer::default();
    assert_eq!(scorer.score(5000), 25);
    assert_eq!(scorer.score(10000), 50);
    assert_eq!(scorer.score(20000), 100);
  }

  #[test]
  fn score_is_capped() {
    let scorer = Scorer::default();
    assert_eq!(scorer.score(25000), 100);
    assert_eq!(scorer.score(40000), 100);
    assert_eq!(scorer.score(u32::MAX), 100);
  }

  #[test]
  fn halves_round_to_even() {
    let scorer = Scorer::default();
    assert_eq!(scorer.score(100), 0);
    assert_eq!(scorer.score(300), 2);
    assert_eq!(scorer.score(500), 2);
    assert_eq!(scorer.score(900), 4);
    assert_eq!(scorer.score(4900), 24);
    assert_eq!(scorer.score(10100), 50);
    assert_eq!(scorer.score(10300), 52);
    assert_eq!(scorer.score(19900), 100);
  }

  #[test]
  fn non_half_values_round_to_nearest() {
    let scorer = Scorer::default();
    assert_eq!(scorer.score(5041), 25);
    assert_eq!(scorer.score(19899), 99);
    assert_eq!(scorer.score(19901), 100);
  }

  #[test]
  fn score_is_monotone_up_to_the_cap() {
    let scorer = Scorer::default();
    let mut previous = 0;
    for count in 0..=FINGER_COEFFICIENT + 1000 {
      let score = scorer.score(count);
      assert!(score >= previous, "score dropped at {}", count);
      assert!(score <= MAX_SCORE);
      previous = score;
    }
    assert_eq!(previous, MAX_SCORE);
  }

  #[test]
  fn custom_coefficient_changes_scale() {
    let scorer = ScorerConfig::default()
      .with_coefficient(10000)
      .build()
      .unwrap();
    assert_eq!(scorer.coefficient(), 10000);
    assert_eq!(scorer.score(5000), 50);
    assert_eq!(scorer.score(10000), 100);
  }

  #[test]
  fn zero_coefficient_is_rejected() {
    let result = ScorerConfig::default().with_coefficient(0).build();
    assert_eq!(result.unwrap_err(), ScoreError::InvalidCoefficient);
  }

  #[test]
  fn finger_modality_uses_reference_coefficient() {
    let config = ScorerConfig::from(Modality::Finger);
    assert_eq!(config.coefficient, 20000);
    assert_eq!(Scorer::new(config).unwrap(), Scorer::default());
  }

  #[test]
  fn quality_levels_follow_score_bands() {
    assert_eq!(QualityLevel::from(0), QualityLevel::Low);
    assert_eq!(QualityLevel::from(49), QualityLevel::Low);
    assert_eq!(QualityLevel::from(50), QualityLevel::Medium);
    assert_eq!(QualityLevel::from(79), QualityLevel::Medium);
    assert_eq!(QualityLevel::from(80), QualityLevel::High);
    assert_eq!(QualityLevel::from(100).to_string(), "High");
  }
}
