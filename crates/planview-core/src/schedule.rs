use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Plans that share a wave number and can run together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveGroup {
    pub wave: u32,
    pub plans: Vec<String>,
    pub can_parallelize: bool,
}

pub fn build_wave_schedule(tasks: &[Task]) -> Vec<WaveGroup> {
    let mut waves: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for task in tasks {
        waves.entry(task.wave).or_default().push(task.id.clone());
    }
    waves
        .into_iter()
        .map(|(wave, plans)| WaveGroup {
            wave,
            can_parallelize: plans.len() > 1,
            plans,
        })
        .collect()
}

pub fn format_wave_message(schedule: &[WaveGroup]) -> String {
    if schedule.is_empty() {
        return "No waves to execute".to_string();
    }
    schedule
        .iter()
        .map(|group| {
            let mode = if group.can_parallelize {
                "parallel"
            } else {
                "sequential"
            };
            format!("Wave {}: {} ({mode})", group.wave, group.plans.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
}

impl ComplexityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplexityLevel::Simple => "simple",
            ComplexityLevel::Moderate => "moderate",
            ComplexityLevel::Complex => "complex",
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityReport {
    pub level: ComplexityLevel,
    pub plan_count: usize,
    pub wave_count: usize,
    pub message: String,
}

/// Rough effort classification of the current task set.
///
/// Two plans in one wave stay simple; six or more plans, a third wave, or
/// an average of two dependencies per plan tip over to complex.
pub fn detect_complexity(tasks: &[Task]) -> ComplexityReport {
    let plan_count = tasks.len();
    let waves: BTreeSet<u32> = tasks.iter().map(|t| t.wave).collect();
    let wave_count = waves.len();
    let max_wave = waves.iter().next_back().copied().unwrap_or(0);
    let avg_deps = if plan_count == 0 {
        0.0
    } else {
        tasks.iter().map(|t| t.depends_on.len()).sum::<usize>() as f64 / plan_count as f64
    };

    let level = if plan_count <= 2 && max_wave <= 1 {
        ComplexityLevel::Simple
    } else if plan_count >= 6 || max_wave >= 3 || avg_deps >= 2.0 {
        ComplexityLevel::Complex
    } else {
        ComplexityLevel::Moderate
    };

    let plans = if plan_count == 1 { "plan" } else { "plans" };
    let waves_word = if wave_count == 1 { "wave" } else { "waves" };
    let message = format!("Detected: {level} ({plan_count} {plans}, {wave_count} {waves_word})");

    ComplexityReport {
        level,
        plan_count,
        wave_count,
        message,
    }
}
