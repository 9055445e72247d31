// ==========================================
// 酒庄酒窖管理系统 - 酒窖自然排序
// ==========================================
// 职责: 容器的确定性全序,供分桶引擎与操作员列表共用
// 规则: 名称中首个整数升序;无整数的排最后(哨兵键);
//       同键按全名大小写不敏感比较
// 红线: 排序必须确定,同输入必得同序
// ==========================================

use crate::domain::container::Container;

/// 无整数名称的哨兵键
const NO_NUMBER_SENTINEL: u64 = u64::MAX;

/// 提取名称的自然排序键
///
/// 例: "Barrel 10" → (10, "barrel 10"), "Old Puncheon" → (哨兵, "old puncheon")
pub fn natural_sort_key(name: &str) -> (u64, String) {
    let mut digits = String::new();
    for ch in name.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else if !digits.is_empty() {
            break;
        }
    }

    let numeric = if digits.is_empty() {
        NO_NUMBER_SENTINEL
    } else {
        // 超长数字串按饱和处理,仍排在哨兵之前
        digits.parse::<u64>().unwrap_or(NO_NUMBER_SENTINEL - 1)
    };

    (numeric, name.to_lowercase())
}

/// 按酒窖自然顺序原地排序容器
pub fn sort_cellar_order(containers: &mut [Container]) {
    containers.sort_by(|a, b| natural_sort_key(&a.name).cmp(&natural_sort_key(&b.name)));
}

/// 排序后的副本 (输入不可变时使用)
pub fn cellar_ordered(containers: &[Container]) -> Vec<Container> {
    let mut sorted = containers.to_vec();
    sort_cellar_order(&mut sorted);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::container::ContainerDraft;
    use crate::domain::types::ContainerType;
    use chrono::Utc;

    fn container(name: &str) -> Container {
        let now = Utc::now();
        let draft = ContainerDraft::new("w1", name, ContainerType::Barrel, 60.0);
        Container {
            container_id: name.to_string(),
            winery_id: draft.winery_id,
            name: draft.name,
            container_type: draft.container_type,
            capacity_gal: draft.capacity_gal,
            status: draft.status,
            total_fills: 0,
            last_topping_date: None,
            purchase_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_numeric_before_lexical() {
        // "Barrel 2" 在 "Barrel 10" 之前 (数值序,非字典序)
        let mut list = vec![container("Barrel 2"), container("Barrel 10"), container("Barrel 1")];
        sort_cellar_order(&mut list);
        let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Barrel 1", "Barrel 2", "Barrel 10"]);
    }

    #[test]
    fn test_unnumbered_sort_after_numbered() {
        let mut list = vec![
            container("Puncheon"),
            container("Barrel 3"),
            container("amphora"),
        ];
        sort_cellar_order(&mut list);
        let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
        // 无整数名称排最后,同键内大小写不敏感字典序
        assert_eq!(names, vec!["Barrel 3", "amphora", "Puncheon"]);
    }

    #[test]
    fn test_embedded_number_is_used() {
        // 整数不要求在开头
        let (key, _) = natural_sort_key("Tank A-07 East");
        assert_eq!(key, 7);
        // 只取首个数字串
        let (key, _) = natural_sort_key("Bay 2 Rack 11");
        assert_eq!(key, 2);
    }

    #[test]
    fn test_tie_break_is_case_insensitive() {
        let mut list = vec![container("barrel 5 b"), container("Barrel 5 A")];
        sort_cellar_order(&mut list);
        assert_eq!(list[0].name, "Barrel 5 A");
        assert_eq!(list[1].name, "barrel 5 b");
    }

    #[test]
    fn test_determinism() {
        let source = vec![
            container("Barrel 12"),
            container("Barrel 2"),
            container("Tote"),
            container("Tank 1"),
        ];
        let first = cellar_ordered(&source);
        let second = cellar_ordered(&source);
        let names =
            |v: &Vec<Container>| v.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&first), names(&second));
    }
}
