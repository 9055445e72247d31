// ==========================================
// 酒庄酒窖管理系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 职责: 初始化日志与应用状态,输出酒窖摘要
// ==========================================

use chrono::Utc;
use winery_cellar_ops::app::{get_default_db_path, AppState};
use winery_cellar_ops::domain::OperatorSession;
use winery_cellar_ops::logging;

#[tokio::main]
async fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", winery_cellar_ops::APP_NAME);
    tracing::info!("系统版本: {}", winery_cellar_ops::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("AppState初始化成功");

    // 输出默认租户的酒窖摘要
    let session = OperatorSession::new("default", "system");
    let today = Utc::now().date_naive();
    match app_state.dashboard_api.cellar_summary(&session, today).await {
        Ok(summary) => {
            tracing::info!("批次分布: {:?}", summary.lots_by_status);
            tracing::info!("容器分布: {:?}", summary.containers_by_status);
            tracing::info!("待分装体积: {} 加仑", summary.unallocated_pressed_gal);
            tracing::info!(
                "添桶提醒: {} (其中紧急 {})",
                summary.topping_due_count,
                summary.topping_urgent_count
            );
            tracing::info!("换桶评估: {} 只桶待考虑", summary.replacement_candidates);
        }
        Err(e) => {
            tracing::error!("酒窖摘要查询失败: {}", e);
            std::process::exit(1);
        }
    }
}
