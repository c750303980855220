// ==========================================
// Merchify 动态降价引擎 - 目标周转解析器
// ==========================================
// 职责: (品类, 期间) → 目标周转
// 红线: 只读查表；配置修改只走 ConfigManager
// ==========================================

use crate::config::target_table::TargetCoverageTable;
use crate::domain::decision::{ResolvedPeriod, TargetCoverage};

// ==========================================
// TargetCoverageResolver - 目标周转解析器
// ==========================================
pub struct TargetCoverageResolver<'a> {
    table: &'a TargetCoverageTable,
}

impl<'a> TargetCoverageResolver<'a> {
    pub fn new(table: &'a TargetCoverageTable) -> Self {
        Self { table }
    }

    /// 查找目标周转
    ///
    /// 期间无法解析时不做任何猜测，直接返回 Undefined
    pub fn resolve(&self, category: &str, period: Option<&ResolvedPeriod>) -> TargetCoverage {
        match period {
            Some(p) => self.table.lookup(category, &p.period),
            None => TargetCoverage::Undefined,
        }
    }
}
