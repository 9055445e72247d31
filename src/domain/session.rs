// ==========================================
// 酒庄酒窖管理系统 - 操作会话
// ==========================================
// 用途: 显式传入核心调用的租户/操作人身份
// 红线: 核心层不读环境/全局上下文,身份只从会话对象来
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// OperatorSession - 操作会话
// ==========================================
// 由外层(鉴权/订阅网关)构造,核心只消费
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorSession {
    pub winery_id: String, // 租户 (酒庄)
    pub operator: String,  // 操作人标识,写入审计行 actor
}

impl OperatorSession {
    pub fn new(winery_id: &str, operator: &str) -> Self {
        Self {
            winery_id: winery_id.to_string(),
            operator: operator.to_string(),
        }
    }
}
