use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Money;
use super::loan::due_instant;

/// 1日あたりの延滞金（既定値）
pub const DEFAULT_FINE_PER_DAY: u64 = 5;

/// 延滞日数を計算する純粋関数
///
/// `max(0, 返却日 - 返却期限)` を日単位で返す。
pub fn days_late(due_date: NaiveDate, return_date: NaiveDate) -> u32 {
    clamp_days((return_date - due_date).num_days())
}

/// 任意の時刻における延滞日数を計算する純粋関数
///
/// 返却期限（UTC 00:00）からの経過時間を日単位で切り捨てる。
pub fn days_late_at(due_date: NaiveDate, at: DateTime<Utc>) -> u32 {
    clamp_days((at - due_instant(due_date)).num_days())
}

fn clamp_days(days: i64) -> u32 {
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// 延滞金の見積もり結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FineAssessment {
    pub days_late: u32,
    pub amount: Money,
}

impl FineAssessment {
    pub const NONE: FineAssessment = FineAssessment {
        days_late: 0,
        amount: Money::ZERO,
    };

    /// 延滞金エンティティを作成すべきか
    ///
    /// 延滞日数が0の場合は作成しない。
    pub fn is_chargeable(&self) -> bool {
        self.days_late > 0
    }
}

/// 延滞金計算機
///
/// 1日あたりの料金だけを保持する。呼び出し間で状態を持たないため、
/// 返却日の候補が変わるたびに何度呼んでもよい。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineCalculator {
    per_day_rate: Money,
}

impl FineCalculator {
    pub fn new(per_day_rate: Money) -> Self {
        Self { per_day_rate }
    }

    pub fn per_day_rate(&self) -> Money {
        self.per_day_rate
    }

    /// 返却日（実際または候補）に対する延滞金を計算する
    ///
    /// ビジネスルール：
    /// - 延滞日数 = max(0, 返却日 - 返却期限)
    /// - 金額 = 延滞日数 × 1日あたりの料金
    pub fn assess(&self, due_date: NaiveDate, return_date: NaiveDate) -> FineAssessment {
        self.for_days(days_late(due_date, return_date))
    }

    /// 任意の時刻で返却した場合の延滞金を計算する
    ///
    /// 返却フォームを開いた時点の見積もり（now基準）に使用される。
    pub fn assess_at(&self, due_date: NaiveDate, at: DateTime<Utc>) -> FineAssessment {
        self.for_days(days_late_at(due_date, at))
    }

    fn for_days(&self, days_late: u32) -> FineAssessment {
        FineAssessment {
            days_late,
            amount: self.per_day_rate.times_days(days_late),
        }
    }
}

impl Default for FineCalculator {
    fn default() -> Self {
        Self::new(Money::new(DEFAULT_FINE_PER_DAY))
    }
}
