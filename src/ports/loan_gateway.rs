use crate::domain::loan::{Loan, NewLoan};
use crate::domain::value_objects::{LoanId, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出ゲートウェイポート
///
/// 貸出記録を所有する外部システムとの境界。
/// クライアント側は読み取り用コピーを保持するだけで、
/// 変更は必ずこのポート経由で外部システムに確定させる。
#[async_trait]
pub trait LoanGateway: Send + Sync {
    /// すべての貸出を取得する
    async fn list_loans(&self) -> Result<Vec<Loan>>;

    /// 利用者の貸出を取得する
    async fn list_loans_by_user(&self, user_id: UserId) -> Result<Vec<Loan>>;

    /// IDで貸出を取得する
    async fn get_loan(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 貸出を登録する
    ///
    /// IDは外部システムが採番し、確定した記録を返す。
    async fn create_loan(&self, loan: NewLoan) -> Result<Loan>;

    /// 返却を記録する
    ///
    /// 延滞金の発行は外部システムが行い、確定した記録（延滞金を含む）を返す。
    async fn record_return(&self, loan_id: LoanId, return_date: NaiveDate) -> Result<Loan>;
}
