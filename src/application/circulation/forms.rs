//! フォーム入力の境界
//!
//! 日付の欠落・解析不能は計算機に渡す前にここで拒否する。
//! 計算機自体は整った日付を前提とする。

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::commands::{OpenLoan, PayFine, ReturnLoan};
use crate::domain::loan::default_due_date;
use crate::domain::value_objects::{
    BookId, FineId, LoanId, PaymentMethod, PaymentMethodError, UserId,
};

/// フォーム検証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} is not a valid date: {value}")]
    Unparseable { field: &'static str, value: String },

    #[error("due date must be after the borrow date")]
    DueDateNotAfterBorrowDate,

    #[error("payment method is required")]
    MissingPaymentMethod,

    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}

const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// フォームの日付文字列を暦日に変換する
///
/// `yyyy-MM-dd` を受け付ける。RFC 3339の日時はUTCに正規化してから日付部分を取る。
pub fn parse_form_date(field: &'static str, raw: &str) -> Result<NaiveDate, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FormError::Missing { field });
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, FORM_DATE_FORMAT) {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| FormError::Unparseable {
            field,
            value: raw.to_string(),
        })
}

/// 貸出フォーム
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanForm {
    pub book_id: Option<BookId>,
    pub user_id: Option<UserId>,
    pub borrow_date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub notes: String,
}

impl LoanForm {
    /// 新規貸出フォームの初期値
    ///
    /// 貸出日は `today`、返却期限は `today` + 貸出期間。
    pub fn prefilled(today: NaiveDate, loan_period_days: u32) -> Self {
        Self {
            borrow_date: today.format(FORM_DATE_FORMAT).to_string(),
            due_date: default_due_date(today, loan_period_days)
                .format(FORM_DATE_FORMAT)
                .to_string(),
            ..Self::default()
        }
    }

    /// フォームを貸出コマンドに変換する
    ///
    /// 送信時の返却期限は必須。空欄を補完することはしない。
    pub fn into_command(self) -> Result<OpenLoan, FormError> {
        let book_id = self.book_id.ok_or(FormError::Missing { field: "bookId" })?;
        let user_id = self.user_id.ok_or(FormError::Missing { field: "userId" })?;
        let loan_date = parse_form_date("borrowDate", &self.borrow_date)?;
        let due_date = parse_form_date("dueDate", &self.due_date)?;

        if due_date <= loan_date {
            return Err(FormError::DueDateNotAfterBorrowDate);
        }

        let notes = Some(self.notes.trim().to_string()).filter(|n| !n.is_empty());

        Ok(OpenLoan {
            book_id,
            user_id,
            loan_date,
            due_date,
            notes,
        })
    }
}

/// 返却フォーム
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnForm {
    pub return_date: String,
}

impl ReturnForm {
    /// 返却日の候補を解析する（見積もり用）
    pub fn candidate_date(&self) -> Result<NaiveDate, FormError> {
        parse_form_date("returnDate", &self.return_date)
    }

    pub fn into_command(self, loan_id: LoanId) -> Result<ReturnLoan, FormError> {
        Ok(ReturnLoan {
            loan_id,
            return_date: self.candidate_date()?,
        })
    }
}

/// 支払フォーム
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    pub payment_method: String,
}

impl PaymentForm {
    pub fn into_command(self, fine_id: FineId, paid_at: DateTime<Utc>) -> Result<PayFine, FormError> {
        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|e| match e {
                PaymentMethodError::Empty => FormError::MissingPaymentMethod,
                PaymentMethodError::Unknown(value) => FormError::UnknownPaymentMethod(value),
            })?;

        Ok(PayFine {
            fine_id,
            payment_method,
            paid_at,
        })
    }
}
