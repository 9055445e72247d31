// ==========================================
// 酒庄酒窖管理系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有跳过/失败必须输出 reason
// ==========================================

pub mod lifecycle;
pub mod maintenance;
pub mod ordering;
pub mod planner;
pub mod reconciliation;
pub mod splitter;

// 重导出核心引擎
pub use maintenance::{
    classify_replacement, classify_topping, find_duplicate_names, replacement_report,
    resolve_duplicate_names, topping_report, RenamePlan, ReplacementAdvice, ToppingAlert,
};
pub use ordering::{cellar_ordered, natural_sort_key, sort_cellar_order};
pub use planner::AllocationPlanner;
pub use reconciliation::{is_active_child_status, is_fully_allocated, remaining_volume};
pub use splitter::{LotSplitExecutor, SplitFailure, SplitOutcome, SplitStage};
