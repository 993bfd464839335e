use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, FineId, LoanId, Money, PaymentMethod, UserId};

/// イベント：貸出が開始された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOpened {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// イベント：延滞金が発生した
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineAssessed {
    pub fine_id: FineId,
    pub loan_id: LoanId,
    pub days_late: u32,
    pub amount: Money,
    pub assessed_at: DateTime<Utc>,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanReturned {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub return_date: NaiveDate,
    pub was_overdue: bool,
    pub days_late: u32,
    /// 期限後の返却で発生した延滞金
    pub fine: Option<FineAssessed>,
}

/// イベント：延滞金が支払われた
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePaid {
    pub fine_id: FineId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}
