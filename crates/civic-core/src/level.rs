//! Level calculator: maps cumulative points onto the fixed threshold table.

use serde::{Deserialize, Serialize};

/// Cumulative points needed to reach each level; index `i` is level `i + 1`.
/// Must stay strictly increasing and start at zero.
pub const LEVEL_THRESHOLDS: [i64; 15] = [
  0, 100, 250, 450, 700, 1000, 1350, 1750, 2200, 2700, 3250, 3850, 4500, 5200,
  5950,
];

/// Points added past the last threshold to give the progress bar an upper
/// bound once the table is exhausted.
pub const OPEN_ENDED_CEILING: i64 = 1000;

/// Level for a cumulative total. Always at least 1.
pub fn level(points: i64) -> u32 {
  let reached = LEVEL_THRESHOLDS.iter().take_while(|&&t| points >= t).count();
  reached.max(1) as u32
}

/// A level plus the bounds of the band the total falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
  pub level:                u32,
  pub current_level_points: i64,
  pub next_level_points:    i64,
}

impl LevelProgress {
  pub fn for_points(points: i64) -> Self {
    let level = level(points);
    let idx = level as usize;
    let next_level_points = LEVEL_THRESHOLDS
      .get(idx)
      .copied()
      .unwrap_or(LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1] + OPEN_ENDED_CEILING);
    Self {
      level,
      current_level_points: LEVEL_THRESHOLDS[idx - 1],
      next_level_points,
    }
  }
}
