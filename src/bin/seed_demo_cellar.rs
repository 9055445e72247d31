// ==========================================
// 酒庄酒窖管理系统 - 演示酒窖种子数据
// ==========================================
// 用途: 在默认数据库里种一个可演示的酒窖:
//       8 只橡木桶 + 1 个储酒罐 + 1 个压榨待分装批次
// 运行: cargo run --bin seed_demo_cellar
// ==========================================

use chrono::NaiveDate;
use winery_cellar_ops::app::{get_default_db_path, AppState};
use winery_cellar_ops::domain::{ContainerDraft, LotDraft, OperatorSession};
use winery_cellar_ops::domain::types::{ContainerType, LotStatus};
use winery_cellar_ops::logging;

const DEMO_WINERY: &str = "default";
const BARREL_COUNT: u32 = 8;
const BARREL_CAPACITY_GAL: f64 = 60.0;

#[tokio::main]
async fn main() {
    logging::init();

    let db_path = get_default_db_path();
    tracing::info!("种子数据写入: {}", db_path);

    let app_state = AppState::new(db_path).expect("无法初始化AppState");
    let session = OperatorSession::new(DEMO_WINERY, "seed");

    // 橡木桶 Barrel 1..8
    for i in 1..=BARREL_COUNT {
        let mut draft = ContainerDraft::new(
            DEMO_WINERY,
            &format!("Barrel {}", i),
            ContainerType::Barrel,
            BARREL_CAPACITY_GAL,
        );
        draft.purchase_date = NaiveDate::from_ymd_opt(2023, 7, 15);
        let container = app_state
            .container_api
            .create_container(&session, draft)
            .await
            .expect("建档橡木桶失败");
        tracing::info!("已建档: {}", container.name);
    }

    // 储酒罐
    let tank = app_state
        .container_api
        .create_container(
            &session,
            ContainerDraft::new(DEMO_WINERY, "Tank 1", ContainerType::Tank, 500.0),
        )
        .await
        .expect("建档储酒罐失败");
    tracing::info!("已建档: {}", tank.name);

    // 压榨待分装批次: 245 加仑 Syrah
    let mut draft = LotDraft::new(DEMO_WINERY, "2025 Syrah 压榨批", 2025, "Syrah");
    draft.status = LotStatus::Pressed;
    draft.volume_gal = 245.0;
    draft.harvest_date = NaiveDate::from_ymd_opt(2025, 9, 28);
    draft.press_date = NaiveDate::from_ymd_opt(2025, 10, 12);
    draft.yeast_strain = Some("D254".to_string());
    draft.chemistry.ph = Some(3.65);
    draft.chemistry.ta_g_l = Some(6.1);
    let lot = app_state
        .lot_api
        .create_lot(&session, draft)
        .await
        .expect("创建批次失败");
    tracing::info!("已创建批次: {} ({} 加仑)", lot.name, lot.volume_gal);

    // 预览一轮分桶,展示规划结果
    let preview = app_state
        .allocation_api
        .preview(&session, &lot.lot_id)
        .await
        .expect("分桶预览失败");
    tracing::info!(
        "分桶预览: {} 个计划项, 余量 {} 加仑",
        preview.plan.fills.len(),
        preview.plan.remainder_gal
    );

    tracing::info!("演示酒窖种子数据完成");
}
