// ==========================================
// 分桶流程端到端测试
// ==========================================
// 测试范围:
// 1. 预览 → 提交的完整流程 (含容量不足整批拒绝)
// 2. 守恒/容量/确定性/排序性质
// 3. 多轮分装与剩余体积对账
// ==========================================

mod helpers;
mod test_helpers;

use helpers::test_data_builder::{ContainerBuilder, LotBuilder};
use winery_cellar_ops::api::ApiError;
use winery_cellar_ops::domain::types::{ContainerStatus, LotStatus};
use winery_cellar_ops::domain::OperatorSession;
use winery_cellar_ops::logging;

fn session() -> OperatorSession {
    OperatorSession::new("w1", "cellar-hand")
}

// ==========================================
// 容量不足场景
// ==========================================

#[tokio::test]
async fn test_245_gallons_into_four_barrels_is_rejected() {
    logging::init_test();
    let (_tmp, app) = test_helpers::create_test_app().expect("无法创建测试环境");
    let session = session();

    // 245 加仑压榨批 + 4 × 60 加仑桶
    let lot = app
        .lot_api
        .create_lot(&session, LotBuilder::new("2025 Syrah").volume(245.0).build("w1"))
        .await
        .unwrap();
    for i in 1..=4 {
        app.container_api
            .create_container(
                &session,
                ContainerBuilder::barrel(&format!("Barrel {}", i)).build("w1"),
            )
            .await
            .unwrap();
    }

    // 预览: 4 项计划 + 余量 5
    let preview = app.allocation_api.preview(&session, &lot.lot_id).await.unwrap();
    assert_eq!(preview.requested_gal, 245.0);
    assert_eq!(preview.plan.fills.len(), 4);
    for fill in &preview.plan.fills {
        assert_eq!(fill.volume_gal, 60.0);
    }
    assert_eq!(preview.plan.remainder_gal, 5.0);

    // 提交: 整批拒绝,错误点名缺口 5 加仑
    let err = app
        .allocation_api
        .commit(&session, &lot.lot_id, &preview.plan)
        .await
        .unwrap_err();
    match err {
        ApiError::InsufficientCapacity { shortfall_gal } => assert_eq!(shortfall_gal, 5.0),
        other => panic!("期望 InsufficientCapacity,实际 {:?}", other),
    }

    // 失败关闭: 未发生任何写入
    let detail = app.lot_api.get_lot_detail(&session, &lot.lot_id).await.unwrap();
    assert!(detail.children.is_empty());
    assert_eq!(detail.remaining_gal, 245.0);
    for container in app.container_api.list_containers(&session).await.unwrap() {
        assert_eq!(container.status, ContainerStatus::Empty);
        assert_eq!(container.total_fills, 0);
    }
}

#[tokio::test]
async fn test_fifth_barrel_allows_full_commit() {
    let (_tmp, app) = test_helpers::create_test_app().expect("无法创建测试环境");
    let session = session();

    let lot = app
        .lot_api
        .create_lot(&session, LotBuilder::new("2025 Syrah").volume(245.0).build("w1"))
        .await
        .unwrap();
    for i in 1..=5 {
        app.container_api
            .create_container(
                &session,
                ContainerBuilder::barrel(&format!("Barrel {}", i)).build("w1"),
            )
            .await
            .unwrap();
    }

    // 预览: 第 5 桶只装尾量 5 加仑
    let preview = app.allocation_api.preview(&session, &lot.lot_id).await.unwrap();
    assert_eq!(preview.plan.fills.len(), 5);
    assert_eq!(preview.plan.fills[4].volume_gal, 5.0);
    assert_eq!(preview.plan.remainder_gal, 0.0);

    // 提交成功
    let report = app
        .allocation_api
        .commit(&session, &lot.lot_id, &preview.plan)
        .await
        .unwrap();
    assert_eq!(report.succeeded, 5);
    assert_eq!(report.containers_attempted, 5);
    assert!(report.errors.is_empty());
    assert!(report.message.contains("5/5"));

    // 守恒: 子批次体积合计 == 请求体积
    let detail = app.lot_api.get_lot_detail(&session, &lot.lot_id).await.unwrap();
    assert_eq!(detail.children.len(), 5);
    let total: f64 = detail.children.iter().map(|c| c.volume_gal).sum();
    assert_eq!(total, 245.0);
    for child in &detail.children {
        assert_eq!(child.status, LotStatus::Aging);
    }

    // 母批次剩余归零,状态推进
    assert_eq!(detail.remaining_gal, 0.0);
    assert!(detail.fully_allocated);
    assert_eq!(detail.lot.status, LotStatus::Aging);

    // 全部容器使用中,装桶数 +1
    for container in app.container_api.list_containers(&session).await.unwrap() {
        assert_eq!(container.status, ContainerStatus::InUse);
        assert_eq!(container.total_fills, 1);
    }
}

// ==========================================
// 排序与资格性质
// ==========================================

#[tokio::test]
async fn test_planner_visits_barrels_in_natural_order() {
    let (_tmp, app) = test_helpers::create_test_app().expect("无法创建测试环境");
    let session = session();

    let lot = app
        .lot_api
        .create_lot(&session, LotBuilder::new("2025 Grenache").volume(150.0).build("w1"))
        .await
        .unwrap();
    // 建档顺序故意打乱
    for name in ["Barrel 2", "Barrel 10", "Barrel 1"] {
        app.container_api
            .create_container(&session, ContainerBuilder::barrel(name).build("w1"))
            .await
            .unwrap();
    }

    let preview = app.allocation_api.preview(&session, &lot.lot_id).await.unwrap();
    let visited: Vec<&str> = preview
        .plan
        .fills
        .iter()
        .map(|f| f.container_name.as_str())
        .collect();
    // 数值序,非字典序
    assert_eq!(visited, vec!["Barrel 1", "Barrel 2", "Barrel 10"]);
}

#[tokio::test]
async fn test_in_use_container_is_never_selected() {
    let (_tmp, app) = test_helpers::create_test_app().expect("无法创建测试环境");
    let session = session();

    let lot = app
        .lot_api
        .create_lot(&session, LotBuilder::new("2025 Syrah").volume(60.0).build("w1"))
        .await
        .unwrap();
    // 使用中的桶即使有标称容量也不参与
    app.container_api
        .create_container(
            &session,
            ContainerBuilder::barrel("Barrel 1")
                .status(ContainerStatus::InUse)
                .build("w1"),
        )
        .await
        .unwrap();
    app.container_api
        .create_container(&session, ContainerBuilder::barrel("Barrel 2").build("w1"))
        .await
        .unwrap();

    let preview = app.allocation_api.preview(&session, &lot.lot_id).await.unwrap();
    assert_eq!(preview.eligible_container_count, 1);
    assert_eq!(preview.plan.fills.len(), 1);
    assert_eq!(preview.plan.fills[0].container_name, "Barrel 2");

    // 已消毒的桶可参与
    app.container_api
        .create_container(
            &session,
            ContainerBuilder::barrel("Barrel 3")
                .status(ContainerStatus::Sanitized)
                .build("w1"),
        )
        .await
        .unwrap();
    let preview = app.allocation_api.preview(&session, &lot.lot_id).await.unwrap();
    assert_eq!(preview.eligible_container_count, 2);
}

#[tokio::test]
async fn test_preview_is_deterministic_and_read_only() {
    let (_tmp, app) = test_helpers::create_test_app().expect("无法创建测试环境");
    let session = session();

    let lot = app
        .lot_api
        .create_lot(&session, LotBuilder::new("2025 Syrah").volume(245.0).build("w1"))
        .await
        .unwrap();
    for i in 1..=5 {
        app.container_api
            .create_container(
                &session,
                ContainerBuilder::barrel(&format!("Barrel {}", i)).build("w1"),
            )
            .await
            .unwrap();
    }

    // 同输入反复预览,计划完全一致
    let first = app.allocation_api.preview(&session, &lot.lot_id).await.unwrap();
    let second = app.allocation_api.preview(&session, &lot.lot_id).await.unwrap();
    assert_eq!(first.plan, second.plan);

    // 预览绝不写库
    let detail = app.lot_api.get_lot_detail(&session, &lot.lot_id).await.unwrap();
    assert!(detail.children.is_empty());
    for container in app.container_api.list_containers(&session).await.unwrap() {
        assert_eq!(container.total_fills, 0);
    }
}

// ==========================================
// 多轮分装与对账
// ==========================================

#[tokio::test]
async fn test_partial_round_leaves_remaining_volume() {
    let (_tmp, app) = test_helpers::create_test_app().expect("无法创建测试环境");
    let session = session();

    // 150 加仑批次,本轮只分装 100
    let lot = app
        .lot_api
        .create_lot(&session, LotBuilder::new("2025 Mourvedre").volume(150.0).build("w1"))
        .await
        .unwrap();
    for i in 1..=2 {
        app.container_api
            .create_container(
                &session,
                ContainerBuilder::barrel(&format!("Barrel {}", i))
                    .capacity(50.0)
                    .build("w1"),
            )
            .await
            .unwrap();
    }

    let preview = app
        .allocation_api
        .preview_volume(&session, &lot.lot_id, 100.0)
        .await
        .unwrap();
    assert_eq!(preview.plan.remainder_gal, 0.0);
    assert_eq!(preview.plan.total_volume_gal(), 100.0);

    let report = app
        .allocation_api
        .commit(&session, &lot.lot_id, &preview.plan)
        .await
        .unwrap();
    assert_eq!(report.succeeded, 2);

    // 对账: 150 − 100 = 50
    let remaining = app
        .lot_api
        .remaining_volume(&session, &lot.lot_id)
        .await
        .unwrap();
    assert_eq!(remaining, 50.0);

    // 第二轮以现算剩余为请求体积
    app.container_api
        .create_container(
            &session,
            ContainerBuilder::barrel("Barrel 3").capacity(50.0).build("w1"),
        )
        .await
        .unwrap();
    let second = app.allocation_api.preview(&session, &lot.lot_id).await.unwrap();
    assert_eq!(second.requested_gal, 50.0);
    assert_eq!(second.plan.fills.len(), 1);
    assert_eq!(second.plan.fills[0].container_name, "Barrel 3");

    let report = app
        .allocation_api
        .commit(&session, &lot.lot_id, &second.plan)
        .await
        .unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(
        app.lot_api
            .remaining_volume(&session, &lot.lot_id)
            .await
            .unwrap(),
        0.0
    );
}

#[tokio::test]
async fn test_auto_fill_one_shot() {
    let (_tmp, app) = test_helpers::create_test_app().expect("无法创建测试环境");
    let session = session();

    let lot = app
        .lot_api
        .create_lot(&session, LotBuilder::new("2025 Viognier").varietal("Viognier").volume(110.0).build("w1"))
        .await
        .unwrap();
    for i in 1..=2 {
        app.container_api
            .create_container(
                &session,
                ContainerBuilder::barrel(&format!("Barrel {}", i)).build("w1"),
            )
            .await
            .unwrap();
    }

    let report = app.allocation_api.auto_fill(&session, &lot.lot_id).await.unwrap();
    assert_eq!(report.succeeded, 2);
    assert!(report.message.contains("2/2"));

    // 审计履历可按容器重建
    let containers = app.container_api.list_containers(&session).await.unwrap();
    let history = app
        .container_api
        .vessel_history(&session, &containers[0].container_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].volume_gal, 60.0);
    assert_eq!(history[0].actor, "cellar-hand");
}

#[tokio::test]
async fn test_committed_containers_excluded_from_next_round() {
    let (_tmp, app) = test_helpers::create_test_app().expect("无法创建测试环境");
    let session = session();

    let lot = app
        .lot_api
        .create_lot(&session, LotBuilder::new("2025 Syrah").volume(200.0).build("w1"))
        .await
        .unwrap();
    for i in 1..=2 {
        app.container_api
            .create_container(
                &session,
                ContainerBuilder::barrel(&format!("Barrel {}", i)).build("w1"),
            )
            .await
            .unwrap();
    }

    // 第一轮用掉两只桶 (120 加仑)
    let preview = app
        .allocation_api
        .preview_volume(&session, &lot.lot_id, 120.0)
        .await
        .unwrap();
    app.allocation_api
        .commit(&session, &lot.lot_id, &preview.plan)
        .await
        .unwrap();

    // 第二轮: 已占用的桶不再是候选,剩余 80 无处可去
    let second = app.allocation_api.preview(&session, &lot.lot_id).await.unwrap();
    assert_eq!(second.requested_gal, 80.0);
    assert_eq!(second.eligible_container_count, 0);
    assert_eq!(second.plan.remainder_gal, 80.0);

    let err = app
        .allocation_api
        .commit(&session, &lot.lot_id, &second.plan)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InsufficientCapacity { .. }));
}
