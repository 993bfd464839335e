//! 画面表示用のヘルパー

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

use super::loan::{Loan, LoanStatus, due_instant};

/// 日付を dd/MM/yyyy 形式にする
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// 日付がなければ "N/A"
pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_else(|| "N/A".to_string())
}

/// 返却期限までの残り（または超過）日数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRemaining {
    pub is_overdue: bool,
    /// 切り捨てた日数
    pub days: i64,
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_overdue { "Vencido hace" } else { "Vence en" };
        match self.days {
            0 => write!(f, "{} menos de un día", prefix),
            1 => write!(f, "{} 1 día", prefix),
            n => write!(f, "{} {} días", prefix, n),
        }
    }
}

/// 返却期限までの残り時間
///
/// 返却済みの貸出にはNoneを返す。延滞判定は `evaluate_status` と同じ規則に従う。
pub fn time_remaining(loan: &Loan, now: DateTime<Utc>) -> Option<TimeRemaining> {
    let due = due_instant(loan.due_date);
    match loan.effective_status(now) {
        LoanStatus::Returned => None,
        LoanStatus::Overdue => Some(TimeRemaining {
            is_overdue: true,
            days: (now - due).num_days(),
        }),
        LoanStatus::Active => Some(TimeRemaining {
            is_overdue: false,
            days: (due - now).num_days(),
        }),
    }
}
