use crate::domain::commands::PayFine;
use crate::domain::fine;
use crate::ports::FineView;

use super::errors::{CirculationError, Result};
use super::loan_service::ServiceDependencies;

/// 延滞金を支払う
///
/// ビジネスルール：
/// - 延滞金が存在し、Pendingであること
/// - 支払方法は必須（コマンド生成時に検証済み）
/// - 支払日時は延滞金の発生以降
pub async fn pay_fine(deps: &ServiceDependencies, cmd: PayFine) -> Result<FineView> {
    // 1. 外部システムから延滞金を取得
    let view = deps
        .fine_gateway
        .get_fine(cmd.fine_id)
        .await
        .map_err(CirculationError::FineGatewayError)?
        .ok_or(CirculationError::FineNotFound)?;

    // 2. ドメイン層の純粋関数で遷移を検証
    let (_, event) = fine::pay_fine(&view.fine, cmd.payment_method, cmd.paid_at)?;

    // 3. 外部システムに支払を記録
    let confirmed = deps
        .fine_gateway
        .record_payment(cmd.fine_id, cmd.payment_method, cmd.paid_at)
        .await
        .map_err(CirculationError::FineGatewayError)?;

    tracing::info!(
        fine_id = %event.fine_id.value(),
        amount = event.amount.value(),
        payment_method = %event.payment_method,
        "Fine paid"
    );

    Ok(confirmed)
}
