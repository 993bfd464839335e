use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, FineId, LoanId, PaymentMethod, UserId};

/// コマンド：貸出を開始する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLoan {
    pub book_id: BookId,
    pub user_id: UserId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLoan {
    pub loan_id: LoanId,
    pub return_date: NaiveDate,
}

/// コマンド：延滞金を支払う
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayFine {
    pub fine_id: FineId,
    pub payment_method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}
