use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::fine::{Fine, assessed_event};
use super::fine_calculator::days_late;
use super::{
    BookId, LoanId, LoanOpened, LoanReturned, LoanValidationError, ReturnLoanError, UserId,
};

/// 貸出期間（日数）の既定値
pub const DEFAULT_LOAN_PERIOD_DAYS: u32 = 14;

/// 暦日を比較用の時刻に正規化する
///
/// すべての日付はUTCの00:00として扱う。
pub fn due_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// 貸出日から返却期限を求める
pub fn default_due_date(loan_date: NaiveDate, loan_period_days: u32) -> NaiveDate {
    loan_date + Duration::days(i64::from(loan_period_days))
}

/// 貸出ステータス
///
/// 外部システムの記録値は参考情報にすぎず、
/// 実効ステータスは常に `evaluate_status` で算出する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    /// 画面表示用のラベル
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Active => "Prestado",
            LoanStatus::Overdue => "Vencido",
            LoanStatus::Returned => "Devuelto",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// 純粋関数：実効ステータスの判定
///
/// ビジネスルール：
/// - 返却日あり → Returned（終端状態）
/// - now > 返却期限 → Overdue
/// - それ以外 → Active（now == 返却期限 はまだActive）
///
/// 副作用なし。同じ入力には常に同じ結果を返す。
pub fn evaluate_status(
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> LoanStatus {
    if return_date.is_some() {
        return LoanStatus::Returned;
    }

    if now > due_instant(due_date) {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    }
}

/// 書籍の表示用参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRef {
    pub title: String,
    pub author: String,
}

/// 利用者の表示用参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub first_name: String,
    pub last_name: String,
}

impl UserRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 貸出 - 1冊の書籍の1回の貸出
///
/// 外部システムが所有する記録の読み取り用コピー。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    // 識別子
    pub id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub user_id: UserId,

    // 貸出管理の責務
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,

    /// 外部システムに記録されたステータス（権威ではない）
    #[serde(rename = "status")]
    pub recorded_status: LoanStatus,

    #[serde(default)]
    pub notes: Option<String>,

    // 表示用に外部APIが埋め込む参照
    #[serde(default)]
    pub book: Option<BookRef>,
    #[serde(default)]
    pub user: Option<UserRef>,

    #[serde(default)]
    pub fine: Option<Fine>,
}

impl Loan {
    /// 記録の不変条件を検証する
    ///
    /// - 返却期限 > 貸出日
    /// - 返却日 >= 貸出日（返却済みの場合）
    pub fn validate(&self) -> Result<(), LoanValidationError> {
        if self.due_date <= self.loan_date {
            return Err(LoanValidationError::DueDateNotAfterLoanDate);
        }
        if let Some(return_date) = self.return_date {
            if return_date < self.loan_date {
                return Err(LoanValidationError::ReturnBeforeLoanDate);
            }
        }
        Ok(())
    }

    /// 実効ステータス
    pub fn effective_status(&self, now: DateTime<Utc>) -> LoanStatus {
        evaluate_status(self.due_date, self.return_date, now)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == LoanStatus::Overdue
    }

    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }

    /// 未払いの延滞金
    pub fn pending_fine(&self) -> Option<&Fine> {
        self.fine.as_ref().filter(|fine| fine.is_pending())
    }
}

/// 貸出の登録内容
///
/// IDは外部システムが採番するため持たない。
/// `open_loan` を通したものだけが不変条件を満たす。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    pub book_id: BookId,
    pub user_id: UserId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewLoan {
    /// 採番されたIDで貸出記録にする（状態はActive）
    pub fn into_loan(self, id: LoanId) -> Loan {
        Loan {
            id,
            book_id: self.book_id,
            user_id: self.user_id,
            loan_date: self.loan_date,
            due_date: self.due_date,
            return_date: None,
            recorded_status: LoanStatus::Active,
            notes: self.notes,
            book: None,
            user: None,
            fine: None,
        }
    }
}

/// 純粋関数：貸出を開始する
///
/// ビジネスルール：
/// - 返却期限は貸出日より後
///
/// 副作用なし。外部システムに登録する内容を返す。
pub fn open_loan(
    book_id: BookId,
    user_id: UserId,
    loan_date: NaiveDate,
    due_date: NaiveDate,
    notes: Option<String>,
) -> Result<NewLoan, LoanValidationError> {
    if due_date <= loan_date {
        return Err(LoanValidationError::DueDateNotAfterLoanDate);
    }

    Ok(NewLoan {
        book_id,
        user_id,
        loan_date,
        due_date,
        notes,
    })
}

/// 登録済みの貸出から開始イベントを作る
pub fn opened_event(loan: &Loan) -> LoanOpened {
    LoanOpened {
        loan_id: loan.id,
        book_id: loan.book_id,
        user_id: loan.user_id,
        loan_date: loan.loan_date,
        due_date: loan.due_date,
    }
}

/// 返却済みの貸出から返却イベントを作る
///
/// 延滞金はその記録に含まれるもの（外部システムが発行したもの）だけを載せる。
pub fn returned_event(loan: &Loan, return_date: NaiveDate) -> LoanReturned {
    let days_late = days_late(loan.due_date, return_date);

    LoanReturned {
        loan_id: loan.id,
        book_id: loan.book_id,
        user_id: loan.user_id,
        return_date,
        was_overdue: days_late > 0,
        days_late,
        fine: loan.fine.as_ref().map(|fine| assessed_event(fine, days_late)),
    }
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 延滞していても返却は受け付ける
/// - 返却日は貸出日以降
///
/// 延滞金は外部システムが発行するため、ここでは作成しない。
/// 副作用なし。新しいLoanとイベントを返す。
pub fn return_loan(
    loan: &Loan,
    return_date: NaiveDate,
) -> Result<(Loan, LoanReturned), ReturnLoanError> {
    // バリデーション：既に返却済みは不可
    if loan.is_returned() {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    // バリデーション：貸出日より前の返却は不可
    if return_date < loan.loan_date {
        return Err(ReturnLoanError::ReturnBeforeLoanDate);
    }

    let new_loan = Loan {
        return_date: Some(return_date),
        recorded_status: LoanStatus::Returned,
        ..loan.clone()
    };
    let event = returned_event(&new_loan, return_date);

    Ok((new_loan, event))
}
