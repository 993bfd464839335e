use thiserror::Error;

use crate::domain::{LoanValidationError, PayFineError, ReturnLoanError};

use super::forms::FormError;

/// 貸出・延滞金アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CirculationError {
    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 延滞金が見つからない
    #[error("Fine not found")]
    FineNotFound,

    /// フォーム入力の検証エラー
    #[error("Invalid form: {0}")]
    InvalidForm(#[from] FormError),

    /// 外部システムから受け取った記録が不変条件を満たさない
    #[error("Invalid loan record: {0:?}")]
    InvalidLoanRecord(LoanValidationError),

    /// 返却期限が貸出日より後でない
    #[error("Due date must be after the loan date")]
    DueDateNotAfterLoanDate,

    /// 既に返却済み
    #[error("Loan is already returned")]
    LoanAlreadyReturned,

    /// 返却日が貸出日より前
    #[error("Return date is before the loan date")]
    ReturnBeforeLoanDate,

    /// 既に支払済み
    #[error("Fine is already paid")]
    FineAlreadyPaid,

    /// 支払日時が延滞金の発生より前
    #[error("Payment date is before the fine was assessed")]
    PaidBeforeAssessed,

    /// LoanGatewayのエラー
    #[error("Loan gateway error")]
    LoanGatewayError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// FineGatewayのエラー
    #[error("Fine gateway error")]
    FineGatewayError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<LoanValidationError> for CirculationError {
    fn from(err: LoanValidationError) -> Self {
        match err {
            LoanValidationError::DueDateNotAfterLoanDate => {
                CirculationError::DueDateNotAfterLoanDate
            }
            LoanValidationError::ReturnBeforeLoanDate => CirculationError::ReturnBeforeLoanDate,
        }
    }
}

impl From<ReturnLoanError> for CirculationError {
    fn from(err: ReturnLoanError) -> Self {
        match err {
            ReturnLoanError::AlreadyReturned => CirculationError::LoanAlreadyReturned,
            ReturnLoanError::ReturnBeforeLoanDate => CirculationError::ReturnBeforeLoanDate,
        }
    }
}

impl From<PayFineError> for CirculationError {
    fn from(err: PayFineError) -> Self {
        match err {
            PayFineError::AlreadyPaid => CirculationError::FineAlreadyPaid,
            PayFineError::PaidBeforeAssessed => CirculationError::PaidBeforeAssessed,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CirculationError>;
