use crate::domain::fine::Fine;
use crate::domain::loan::{BookRef, UserRef};
use crate::domain::value_objects::{FineId, PaymentMethod, UserId};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 延滞金ビュー
///
/// 一覧表示・検索用に、延滞金と元の貸出の表示情報をまとめたもの。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FineView {
    #[serde(flatten)]
    pub fine: Fine,
    pub due_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub book: Option<BookRef>,
    pub user: Option<UserRef>,
}

/// 延滞金ゲートウェイポート
#[async_trait]
pub trait FineGateway: Send + Sync {
    /// すべての延滞金を取得する
    async fn list_fines(&self) -> Result<Vec<FineView>>;

    /// 利用者の延滞金を取得する
    async fn list_fines_by_user(&self, user_id: UserId) -> Result<Vec<FineView>>;

    /// IDで延滞金を取得する
    async fn get_fine(&self, fine_id: FineId) -> Result<Option<FineView>>;

    /// 支払を記録する
    ///
    /// Pending → Paid の遷移を外部システムに確定させる。
    async fn record_payment(
        &self,
        fine_id: FineId,
        payment_method: PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<FineView>;
}
