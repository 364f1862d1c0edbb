use crate::config::{DomainThresholds, JudgmentConfig};
use crate::layout::{DomainCounts, RenderNode, SeverityCounts};
use crate::theme::{NodeColor, Theme};

use super::percent;

/// Outcome of comparing a node against the threshold tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Some but not all domain buckets within limits.
    Mixed,
    /// Close to a severity threshold without exceeding it.
    Borderline,
    Fail,
}

impl Verdict {
    fn color(self, theme: &Theme) -> NodeColor {
        match self {
            Verdict::Pass => theme.pass.clone(),
            Verdict::Mixed => theme.warning.clone(),
            Verdict::Borderline => theme.borderline.clone(),
            Verdict::Fail => theme.fail.clone(),
        }
    }
}

/// Counts the domain buckets at or below their limit; all three pass is
/// green, none is red.
pub fn domain_verdict(
    domains: &DomainCounts,
    total: u64,
    limits: &DomainThresholds,
    as_percentage: bool,
) -> Verdict {
    let measure = |bucket: u64| {
        if as_percentage {
            percent(bucket, total)
        } else {
            bucket as f64
        }
    };
    let passed = [
        measure(domains.clinical) <= limits.clinical,
        measure(domains.management) <= limits.management,
        measure(domains.relational) <= limits.relational,
    ]
    .into_iter()
    .filter(|ok| *ok)
    .count();
    match passed {
        3 => Verdict::Pass,
        0 => Verdict::Fail,
        _ => Verdict::Mixed,
    }
}

pub fn severity_numbers_verdict(severity: &SeverityCounts, config: &JudgmentConfig) -> Verdict {
    let low = severity.low as f64;
    let medium = severity.medium as f64;
    if low > config.severity_low || medium > config.severity_medium {
        return Verdict::Fail;
    }
    let ratio = config.borderline_ratio;
    if low >= config.severity_low * ratio || medium >= config.severity_medium * ratio {
        return Verdict::Borderline;
    }
    Verdict::Pass
}

pub fn severity_percentage_verdict(
    severity: &SeverityCounts,
    total: u64,
    config: &JudgmentConfig,
) -> Verdict {
    let high = percent(severity.high, total);
    let limit = config.severity_high_percentage;
    if high > limit {
        Verdict::Fail
    } else if high > limit * config.borderline_ratio {
        Verdict::Borderline
    } else {
        Verdict::Pass
    }
}

/// Index into the red-flag intensity ramp: 0, few, some, many.
pub fn red_flag_bucket(count: u64, config: &JudgmentConfig) -> usize {
    if count == 0 {
        0
    } else if count <= config.red_flag_few {
        1
    } else if count <= config.red_flag_some {
        2
    } else {
        3
    }
}

pub fn never_event_verdict(count: u64) -> Verdict {
    if count == 0 { Verdict::Pass } else { Verdict::Fail }
}

pub fn color_for(
    node: &RenderNode,
    level: i32,
    tree_type: crate::ir::TreeType,
    config: &JudgmentConfig,
    theme: &Theme,
) -> NodeColor {
    (super::strategy_for(tree_type).color)(node, level, config, theme)
}

pub(super) fn incident_count(
    _node: &RenderNode,
    level: i32,
    _config: &JudgmentConfig,
    theme: &Theme,
) -> NodeColor {
    theme.level_color(level)
}

pub(super) fn domain_numbers(
    node: &RenderNode,
    _level: i32,
    config: &JudgmentConfig,
    theme: &Theme,
) -> NodeColor {
    domain_verdict(&node.domains, node.count, &config.domain_numbers, false).color(theme)
}

pub(super) fn domain_percentage(
    node: &RenderNode,
    _level: i32,
    config: &JudgmentConfig,
    theme: &Theme,
) -> NodeColor {
    domain_verdict(&node.domains, node.count, &config.domain_percentage, true).color(theme)
}

pub(super) fn severity_numbers(
    node: &RenderNode,
    _level: i32,
    config: &JudgmentConfig,
    theme: &Theme,
) -> NodeColor {
    severity_numbers_verdict(&node.severity, config).color(theme)
}

pub(super) fn severity_percentage(
    node: &RenderNode,
    _level: i32,
    config: &JudgmentConfig,
    theme: &Theme,
) -> NodeColor {
    severity_percentage_verdict(&node.severity, node.count, config).color(theme)
}

pub(super) fn red_flags(
    node: &RenderNode,
    _level: i32,
    config: &JudgmentConfig,
    theme: &Theme,
) -> NodeColor {
    theme.red_flag_color(red_flag_bucket(node.red_flags, config))
}

pub(super) fn never_events(
    node: &RenderNode,
    _level: i32,
    _config: &JudgmentConfig,
    theme: &Theme,
) -> NodeColor {
    never_event_verdict(node.never_events).color(theme)
}

pub(super) fn neutral(
    _node: &RenderNode,
    _level: i32,
    _config: &JudgmentConfig,
    theme: &Theme,
) -> NodeColor {
    theme.neutral.clone()
}
