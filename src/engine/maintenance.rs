// ==========================================
// 酒庄酒窖管理系统 - 维护调度引擎
// ==========================================
// 职责: 添桶到期判定 + 换桶评估 + 重名容器检测/修复
// 红线: 判定为纯谓词,每次读取现算,不落 "due" 标志列
// 红线: 换桶评估只做建议,不阻断分配
// ==========================================

use crate::config::MaintenanceThresholds;
use crate::domain::container::Container;
use crate::domain::types::{ContainerStatus, ToppingSeverity};
use crate::engine::ordering::cellar_ordered;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

// ==========================================
// 添桶到期判定
// ==========================================

/// 添桶提醒
#[derive(Debug, Clone, PartialEq)]
pub struct ToppingAlert {
    pub container_id: String,
    pub name: String,
    pub days_since_topping: Option<i64>, // None = 从未添桶
    pub severity: ToppingSeverity,
}

/// 单桶添桶判定
///
/// 规则:
/// - 仅看使用中的橡木桶
/// - 从未添桶 → DUE
/// - 距上次添桶 > topping_due_days → DUE
/// - 距上次添桶 > topping_urgent_days → URGENT
pub fn classify_topping(
    container: &Container,
    today: NaiveDate,
    thresholds: &MaintenanceThresholds,
) -> Option<ToppingAlert> {
    if !container.is_barrel() || container.status != ContainerStatus::InUse {
        return None;
    }

    match container.last_topping_date {
        None => Some(ToppingAlert {
            container_id: container.container_id.clone(),
            name: container.name.clone(),
            days_since_topping: None,
            severity: ToppingSeverity::Due,
        }),
        Some(last) => {
            let days = (today - last).num_days();
            if days > thresholds.topping_urgent_days {
                Some(ToppingAlert {
                    container_id: container.container_id.clone(),
                    name: container.name.clone(),
                    days_since_topping: Some(days),
                    severity: ToppingSeverity::Urgent,
                })
            } else if days > thresholds.topping_due_days {
                Some(ToppingAlert {
                    container_id: container.container_id.clone(),
                    name: container.name.clone(),
                    days_since_topping: Some(days),
                    severity: ToppingSeverity::Due,
                })
            } else {
                None
            }
        }
    }
}

/// 批量添桶判定 (按酒窖自然顺序)
pub fn topping_report(
    containers: &[Container],
    today: NaiveDate,
    thresholds: &MaintenanceThresholds,
) -> Vec<ToppingAlert> {
    cellar_ordered(containers)
        .iter()
        .filter_map(|c| classify_topping(c, today, thresholds))
        .collect()
}

// ==========================================
// 换桶评估
// ==========================================

/// 换桶建议 (仅建议,不阻断分配)
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementAdvice {
    pub container_id: String,
    pub name: String,
    pub total_fills: i32,
    pub age_years: Option<i64>,
    pub reasons: Vec<String>, // 机器可读原因码
}

/// 单桶换桶评估
///
/// 规则 (命中任一即建议):
/// - total_fills ≥ replacement_fill_threshold
/// - 桶龄 ≥ replacement_age_years (按 purchase_date 计)
pub fn classify_replacement(
    container: &Container,
    today: NaiveDate,
    thresholds: &MaintenanceThresholds,
) -> Option<ReplacementAdvice> {
    if !container.is_barrel() || container.status == ContainerStatus::Retired {
        return None;
    }

    let age_years = container
        .purchase_date
        .map(|purchased| (today - purchased).num_days() / 365);

    let mut reasons = Vec::new();
    if container.total_fills >= thresholds.replacement_fill_threshold {
        reasons.push(format!(
            "FILL_THRESHOLD: total_fills={} >= {}",
            container.total_fills, thresholds.replacement_fill_threshold
        ));
    }
    if let Some(age) = age_years {
        if age >= thresholds.replacement_age_years {
            reasons.push(format!(
                "AGE_THRESHOLD: age_years={} >= {}",
                age, thresholds.replacement_age_years
            ));
        }
    }

    if reasons.is_empty() {
        return None;
    }

    Some(ReplacementAdvice {
        container_id: container.container_id.clone(),
        name: container.name.clone(),
        total_fills: container.total_fills,
        age_years,
        reasons,
    })
}

/// 批量换桶评估 (按酒窖自然顺序)
pub fn replacement_report(
    containers: &[Container],
    today: NaiveDate,
    thresholds: &MaintenanceThresholds,
) -> Vec<ReplacementAdvice> {
    cellar_ordered(containers)
        .iter()
        .filter_map(|c| classify_replacement(c, today, thresholds))
        .collect()
}

// ==========================================
// 重名容器检测/修复
// ==========================================

/// 重命名计划项
#[derive(Debug, Clone, PartialEq)]
pub struct RenamePlan {
    pub container_id: String,
    pub old_name: String,
    pub new_name: String,
}

/// 拆出名称的尾部整数: "Barrel 12" → ("Barrel", Some(12))
fn split_trailing_number(name: &str) -> (&str, Option<u64>) {
    let trimmed = name.trim_end();
    let digit_start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, ch)| ch.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    match digit_start {
        Some(start) if start > 0 => {
            let digits = &trimmed[start..];
            match digits.parse::<u64>() {
                Ok(n) => (trimmed[..start].trim_end(), Some(n)),
                Err(_) => (trimmed, None),
            }
        }
        _ => (trimmed, None),
    }
}

/// 检测重名容器组 (按酒窖自然顺序;组大小 > 1 才算重名)
pub fn find_duplicate_names(containers: &[Container]) -> Vec<(String, Vec<Container>)> {
    let ordered = cellar_ordered(containers);
    let mut groups: Vec<(String, Vec<Container>)> = Vec::new();

    for container in ordered {
        match groups.iter_mut().find(|(name, _)| *name == container.name) {
            Some((_, members)) => members.push(container),
            None => groups.push((container.name.clone(), vec![container])),
        }
    }

    groups.retain(|(_, members)| members.len() > 1);
    groups
}

/// 生成重名修复计划
///
/// 规则: 每组保留首个成员 (酒窖自然顺序),其余改名为 "{base} {n}",
/// n 从 1 + 全量名称中同 base 的最大尾部整数起逐个递增。
/// 一次性批量修复,不是持续不变式;绕过建档逻辑仍可能再次产生重名。
pub fn resolve_duplicate_names(containers: &[Container]) -> Vec<RenamePlan> {
    let ordered = cellar_ordered(containers);

    // 当前已占用的名称全集 (改名过程中动态维护)
    let mut taken: HashSet<String> = ordered.iter().map(|c| c.name.clone()).collect();
    // 每个 base 的下一个候选整数
    let mut next_by_base: HashMap<String, u64> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut plans = Vec::new();

    for container in &ordered {
        if seen.insert(container.name.clone()) {
            // 组内首个成员保持不动
            continue;
        }

        let (base, _) = split_trailing_number(&container.name);
        let base = base.to_string();

        let next = next_by_base.entry(base.clone()).or_insert_with(|| {
            let max_suffix = ordered
                .iter()
                .filter_map(|c| {
                    let (b, n) = split_trailing_number(&c.name);
                    if b == base {
                        n
                    } else {
                        None
                    }
                })
                .max()
                .unwrap_or(0);
            max_suffix + 1
        });

        // 跳过已被占用的候选名
        let mut candidate = format!("{} {}", base, next);
        while taken.contains(&candidate) {
            *next += 1;
            candidate = format!("{} {}", base, next);
        }
        *next += 1;

        taken.insert(candidate.clone());
        plans.push(RenamePlan {
            container_id: container.container_id.clone(),
            old_name: container.name.clone(),
            new_name: candidate,
        });
    }

    plans
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ContainerType;
    use chrono::Utc;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn barrel(id: &str, name: &str, status: ContainerStatus) -> Container {
        let now = Utc::now();
        Container {
            container_id: id.to_string(),
            winery_id: "w1".to_string(),
            name: name.to_string(),
            container_type: ContainerType::Barrel,
            capacity_gal: 60.0,
            status,
            total_fills: 0,
            last_topping_date: None,
            purchase_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    // ==========================================
    // 添桶判定测试
    // ==========================================

    #[test]
    fn test_topping_never_topped_is_due() {
        let thresholds = MaintenanceThresholds::default();
        let container = barrel("c1", "Barrel 1", ContainerStatus::InUse);

        let alert = classify_topping(&container, today(), &thresholds).unwrap();
        assert_eq!(alert.severity, ToppingSeverity::Due);
        assert_eq!(alert.days_since_topping, None);
    }

    #[test]
    fn test_topping_threshold_escalation() {
        let thresholds = MaintenanceThresholds::default();
        let mut container = barrel("c1", "Barrel 1", ContainerStatus::InUse);

        // 20 天前添过桶 → 未到期
        container.last_topping_date = today().checked_sub_days(chrono::Days::new(20));
        assert!(classify_topping(&container, today(), &thresholds).is_none());

        // 35 天 → 到期
        container.last_topping_date = today().checked_sub_days(chrono::Days::new(35));
        let alert = classify_topping(&container, today(), &thresholds).unwrap();
        assert_eq!(alert.severity, ToppingSeverity::Due);
        assert_eq!(alert.days_since_topping, Some(35));

        // 50 天 → 紧急
        container.last_topping_date = today().checked_sub_days(chrono::Days::new(50));
        let alert = classify_topping(&container, today(), &thresholds).unwrap();
        assert_eq!(alert.severity, ToppingSeverity::Urgent);
    }

    #[test]
    fn test_topping_only_in_use_barrels() {
        let thresholds = MaintenanceThresholds::default();

        // 空桶不判
        let empty = barrel("c1", "Barrel 1", ContainerStatus::Empty);
        assert!(classify_topping(&empty, today(), &thresholds).is_none());

        // 储酒罐不判
        let mut tank = barrel("c2", "Tank 1", ContainerStatus::InUse);
        tank.container_type = ContainerType::Tank;
        assert!(classify_topping(&tank, today(), &thresholds).is_none());
    }

    // ==========================================
    // 换桶评估测试
    // ==========================================

    #[test]
    fn test_replacement_by_fill_count() {
        let thresholds = MaintenanceThresholds::default();
        let mut container = barrel("c1", "Barrel 1", ContainerStatus::InUse);
        container.total_fills = 4;

        let advice = classify_replacement(&container, today(), &thresholds).unwrap();
        assert_eq!(advice.reasons.len(), 1);
        assert!(advice.reasons[0].starts_with("FILL_THRESHOLD"));
    }

    #[test]
    fn test_replacement_by_age() {
        let thresholds = MaintenanceThresholds::default();
        let mut container = barrel("c1", "Barrel 1", ContainerStatus::Empty);
        container.purchase_date = NaiveDate::from_ymd_opt(2020, 6, 1);

        let advice = classify_replacement(&container, today(), &thresholds).unwrap();
        assert!(advice.reasons[0].starts_with("AGE_THRESHOLD"));
        assert_eq!(advice.age_years, Some(6));
    }

    #[test]
    fn test_replacement_below_thresholds_is_silent() {
        let thresholds = MaintenanceThresholds::default();
        let mut container = barrel("c1", "Barrel 1", ContainerStatus::InUse);
        container.total_fills = 2;
        container.purchase_date = NaiveDate::from_ymd_opt(2024, 6, 1);

        assert!(classify_replacement(&container, today(), &thresholds).is_none());
    }

    #[test]
    fn test_replacement_both_reasons_reported() {
        let thresholds = MaintenanceThresholds::default();
        let mut container = barrel("c1", "Barrel 1", ContainerStatus::InUse);
        container.total_fills = 7;
        container.purchase_date = NaiveDate::from_ymd_opt(2019, 1, 1);

        let advice = classify_replacement(&container, today(), &thresholds).unwrap();
        assert_eq!(advice.reasons.len(), 2);
    }

    // ==========================================
    // 重名检测/修复测试
    // ==========================================

    #[test]
    fn test_find_duplicates() {
        let containers = vec![
            barrel("c1", "Barrel 1", ContainerStatus::Empty),
            barrel("c2", "Barrel 1", ContainerStatus::Empty),
            barrel("c3", "Barrel 3", ContainerStatus::Empty),
        ];

        let groups = find_duplicate_names(&containers);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "Barrel 1");
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_resolve_renames_past_max_suffix() {
        // ["Barrel 1","Barrel 1","Barrel 3"] → 第二个 "Barrel 1" 改为 "Barrel 4"
        let containers = vec![
            barrel("c1", "Barrel 1", ContainerStatus::Empty),
            barrel("c2", "Barrel 1", ContainerStatus::Empty),
            barrel("c3", "Barrel 3", ContainerStatus::Empty),
        ];

        let plans = resolve_duplicate_names(&containers);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].old_name, "Barrel 1");
        assert_eq!(plans[0].new_name, "Barrel 4");
    }

    #[test]
    fn test_resolve_multiple_duplicates_advance() {
        let containers = vec![
            barrel("c1", "Barrel 2", ContainerStatus::Empty),
            barrel("c2", "Barrel 2", ContainerStatus::Empty),
            barrel("c3", "Barrel 2", ContainerStatus::Empty),
        ];

        let plans = resolve_duplicate_names(&containers);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].new_name, "Barrel 3");
        assert_eq!(plans[1].new_name, "Barrel 4");
    }

    #[test]
    fn test_resolve_unnumbered_duplicates() {
        let containers = vec![
            barrel("c1", "Puncheon", ContainerStatus::Empty),
            barrel("c2", "Puncheon", ContainerStatus::Empty),
        ];

        let plans = resolve_duplicate_names(&containers);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].new_name, "Puncheon 1");
    }

    #[test]
    fn test_resolve_no_duplicates_is_empty() {
        let containers = vec![
            barrel("c1", "Barrel 1", ContainerStatus::Empty),
            barrel("c2", "Barrel 2", ContainerStatus::Empty),
        ];
        assert!(resolve_duplicate_names(&containers).is_empty());
    }
}
