/// 貸出記録の不変条件違反
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanValidationError {
    /// 返却期限が貸出日より後でない
    DueDateNotAfterLoanDate,
    /// 返却日が貸出日より前
    ReturnBeforeLoanDate,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 既に返却済み
    AlreadyReturned,
    /// 返却日が貸出日より前
    ReturnBeforeLoanDate,
}

/// 延滞金支払のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayFineError {
    /// 既に支払済み（PAIDは不可逆）
    AlreadyPaid,
    /// 支払日時が延滞金の発生日時より前
    PaidBeforeAssessed,
}
