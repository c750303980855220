// ==========================================
// Merchify 动态降价引擎 - 降价档位判定引擎
// ==========================================
// 红线: 档位是"等级制"，由 (周转, 目标, 规则, 策略) 唯一确定，无隐藏状态
// ==========================================
// 判定顺序（命中即返回）:
// 1) 周转 Undefined → 按零销量策略（默认: 销售数据不足）
// 2) 策略需要目标且目标 Undefined → 无目标
// 3) 计算 metric (gap / ratio / coverage)
// 4) 从最激进规则向下，第一个 metric > threshold 命中
// 5) 全部未命中 → 基础档
// ==========================================

use crate::config::tier_rules::TierRuleSet;
use crate::domain::decision::{Coverage, DecisionOutcome, MarkdownDecision, TargetCoverage};
use crate::domain::types::{ComparisonPolicy, ZeroSalesPolicy};
use serde_json::json;

// ==========================================
// MarkdownTierEngine - 降价档位判定引擎
// ==========================================
pub struct MarkdownTierEngine<'a> {
    rules: &'a TierRuleSet,
    zero_sales_policy: ZeroSalesPolicy,
}

impl<'a> MarkdownTierEngine<'a> {
    pub fn new(rules: &'a TierRuleSet, zero_sales_policy: ZeroSalesPolicy) -> Self {
        Self {
            rules,
            zero_sales_policy,
        }
    }

    /// 判定单行降价档位
    pub fn evaluate(&self, coverage: Coverage, target: TargetCoverage) -> MarkdownDecision {
        let policy = self.rules.policy;

        // 规则1: 无近期销售
        let coverage_value = match coverage {
            Coverage::Finite(v) => v,
            Coverage::Undefined => return self.evaluate_zero_sales(target),
        };

        // 规则2: 无目标
        let target_value = match (policy.requires_target(), target.value()) {
            (true, None) => {
                let reason = json!({
                    "outcome": "NO_TARGET_DEFINED",
                    "policy": policy.to_string(),
                    "coverage": coverage_value,
                    "target_source": target.source(),
                });
                return self.decision(
                    DecisionOutcome::NoTargetDefined,
                    coverage,
                    target,
                    None,
                    reason,
                );
            }
            (_, t) => t,
        };

        // 规则3: 计算比较量
        let metric = match (policy, target_value) {
            (ComparisonPolicy::AbsoluteGap, Some(t)) => coverage_value - t,
            (ComparisonPolicy::Ratio, Some(t)) if t > 0.0 => coverage_value / t,
            (ComparisonPolicy::Ratio, Some(t)) => {
                let reason = json!({
                    "outcome": "NO_TARGET_DEFINED",
                    "policy": policy.to_string(),
                    "coverage": coverage_value,
                    "target": t,
                    "detail": "ratio policy needs a positive target",
                });
                return self.decision(
                    DecisionOutcome::NoTargetDefined,
                    coverage,
                    target,
                    None,
                    reason,
                );
            }
            _ => coverage_value,
        };

        // 规则4/5: 档位匹配
        let (outcome, matched_threshold) = self.classify(metric);

        let reason = json!({
            "outcome": outcome.code(),
            "policy": policy.to_string(),
            "coverage": coverage_value,
            "target": target_value,
            "target_source": target.source(),
            "metric": metric,
            "matched_threshold": matched_threshold,
        });

        self.decision(outcome, coverage, target, Some(metric), reason)
    }

    /// 比较量 → 档位
    ///
    /// 返回: (结果, 命中的阈值；基础档为 None)
    pub fn classify(&self, metric: f64) -> (DecisionOutcome, Option<f64>) {
        for (idx, rule) in self.rules.rules.iter().enumerate() {
            if metric > rule.threshold {
                return (
                    DecisionOutcome::TierAssigned {
                        tier: rule.tier.clone(),
                        level: self.rules.level_of(idx),
                    },
                    Some(rule.threshold),
                );
            }
        }

        (
            DecisionOutcome::TierAssigned {
                tier: self.rules.base_tier.clone(),
                level: 0,
            },
            None,
        )
    }

    fn evaluate_zero_sales(&self, target: TargetCoverage) -> MarkdownDecision {
        match self.zero_sales_policy {
            ZeroSalesPolicy::ReviewRequired => {
                let reason = json!({
                    "outcome": "INSUFFICIENT_SALES_DATA",
                    "primary_reason": "NO_RECENT_SALES",
                    "zero_sales_policy": self.zero_sales_policy.to_string(),
                    "target": target.value(),
                });
                self.decision(
                    DecisionOutcome::InsufficientSalesData,
                    Coverage::Undefined,
                    target,
                    None,
                    reason,
                )
            }
            ZeroSalesPolicy::TreatAsOverstock => {
                let (tier, level) = self.rules.most_aggressive();
                let reason = json!({
                    "outcome": "TIER_ASSIGNED",
                    "primary_reason": "ZERO_SALES_AS_OVERSTOCK",
                    "zero_sales_policy": self.zero_sales_policy.to_string(),
                    "target": target.value(),
                    "tier": tier.label,
                });
                self.decision(
                    DecisionOutcome::TierAssigned {
                        tier: tier.clone(),
                        level,
                    },
                    Coverage::Undefined,
                    target,
                    None,
                    reason,
                )
            }
        }
    }

    fn decision(
        &self,
        outcome: DecisionOutcome,
        coverage: Coverage,
        target: TargetCoverage,
        metric: Option<f64>,
        reason: serde_json::Value,
    ) -> MarkdownDecision {
        MarkdownDecision {
            outcome,
            coverage,
            target,
            policy: self.rules.policy,
            metric,
            reason: reason.to_string(),
        }
    }
}
