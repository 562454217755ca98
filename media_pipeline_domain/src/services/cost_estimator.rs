// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The cost estimator: a pure pre-run forecast of what a plan will cost,
//! and the per-stage `(service, units, unit_cost)` shape stages report to
//! the cost tracker once they actually run.

use crate::value_objects::{CostAmount, StageName};

/// One stage's cost contribution: a paid external service call (or zero
/// for local-only stages).
#[derive(Debug, Clone, PartialEq)]
pub struct CostLineItem {
    pub stage_name: StageName,
    pub service: String,
    pub units: f64,
    pub unit_cost: CostAmount,
}

impl CostLineItem {
    pub fn amount(&self) -> CostAmount {
        CostAmount::from_usd(self.units * self.unit_cost.as_usd()).unwrap_or(CostAmount::ZERO)
    }

    pub fn zero(stage_name: StageName) -> Self {
        Self {
            stage_name,
            service: "local".to_string(),
            units: 0.0,
            unit_cost: CostAmount::ZERO,
        }
    }
}

/// Per-minute or per-call rate for a paid service, keyed by stage name.
/// `None` for a stage means it never invokes a paid service.
fn rate_for_stage(stage_name: &str) -> Option<(&'static str, f64)> {
    match stage_name {
        "asr" => Some(("asr_api", 0.006)),                     // USD per minute of media
        "translation" => Some(("translation_api", 0.00002)),    // USD per character
        "tmdb" => Some(("tmdb_api", 0.0)),                      // free tier, still tracked
        "lyrics_detection" => Some(("llm_api", 0.002)),          // USD per minute
        "hallucination_removal" => Some(("llm_api", 0.002)),     // USD per minute
        "ner" => Some(("llm_api", 0.0015)),                      // USD per minute
        _ => None,
    }
}

/// Estimates the cost of running `stage_name` against media of
/// `duration_millis`, with `estimated_chars` used for per-character
/// services such as translation.
pub fn estimate_stage(stage_name: &StageName, duration_millis: u64, estimated_chars: u64) -> CostLineItem {
    let Some((service, rate)) = rate_for_stage(stage_name.as_str()) else {
        return CostLineItem::zero(stage_name.clone());
    };
    let (units, unit_cost) = match stage_name.as_str() {
        "translation" => (estimated_chars as f64, rate),
        _ => (duration_millis as f64 / 60_000.0, rate),
    };
    CostLineItem {
        stage_name: stage_name.clone(),
        service: service.to_string(),
        units,
        unit_cost: CostAmount::from_usd(unit_cost).unwrap_or(CostAmount::ZERO),
    }
}

/// Forecasts the total cost of a full plan, used by `--estimate-only`.
pub fn forecast_plan(stage_names: &[StageName], duration_millis: u64, estimated_chars: u64) -> CostAmount {
    stage_names
        .iter()
        .map(|name| estimate_stage(name, duration_millis, estimated_chars).amount())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_only_stage_is_zero_cost() {
        let item = estimate_stage(&StageName::new("demux"), 60_000, 0);
        assert_eq!(item.amount(), CostAmount::ZERO);
    }

    #[test]
    fn asr_cost_scales_with_duration() {
        let item = estimate_stage(&StageName::new("asr"), 120_000, 0);
        assert!(item.amount().as_usd() > 0.0);
    }

    #[test]
    fn forecast_sums_all_stage_costs() {
        let stages = vec![StageName::new("demux"), StageName::new("asr")];
        let total = forecast_plan(&stages, 60_000, 0);
        let asr_only = estimate_stage(&StageName::new("asr"), 60_000, 0).amount();
        assert_eq!(total, asr_only);
    }
}
