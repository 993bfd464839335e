use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fine_calculator::FineAssessment;
use super::{FineAssessed, FineId, FinePaid, LoanId, Money, PayFineError, PaymentMethod};

/// 延滞金ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FineStatus {
    /// 未払い
    Pending,
    /// 支払済み
    Paid,
}

impl FineStatus {
    /// 画面表示用のラベル
    pub fn label(&self) -> &'static str {
        match self {
            FineStatus::Pending => "Pendiente",
            FineStatus::Paid => "Pagado",
        }
    }
}

impl std::str::FromStr for FineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FineStatus::Pending),
            "paid" => Ok(FineStatus::Paid),
            _ => Err(format!("Invalid fine status: {}", s)),
        }
    }
}

/// 延滞金の精算状態
///
/// 支払日時と支払方法はPaidのときだけ存在する（型で保証）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FineSettlement {
    Pending,
    #[serde(rename_all = "camelCase")]
    Paid {
        paid_at: DateTime<Utc>,
        payment_method: PaymentMethod,
    },
}

/// 延滞金
///
/// ビジネスルール：
/// - 期限後の返却時にのみ作成される
/// - Pending → Paid は一度だけ、不可逆
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fine {
    pub id: FineId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub settlement: FineSettlement,
}

impl Fine {
    pub fn status(&self) -> FineStatus {
        match self.settlement {
            FineSettlement::Pending => FineStatus::Pending,
            FineSettlement::Paid { .. } => FineStatus::Paid,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status() == FineStatus::Pending
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        match self.settlement {
            FineSettlement::Paid { paid_at, .. } => Some(paid_at),
            FineSettlement::Pending => None,
        }
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        match self.settlement {
            FineSettlement::Paid { payment_method, .. } => Some(payment_method),
            FineSettlement::Pending => None,
        }
    }
}

/// 純粋関数：延滞金を発生させる
///
/// IDは外部システムが採番したものを受け取る。
/// 延滞日数が0の場合は延滞金を作成せずNoneを返す。
pub fn assess_fine(
    fine_id: FineId,
    loan_id: LoanId,
    assessment: FineAssessment,
    assessed_at: DateTime<Utc>,
) -> Option<(Fine, FineAssessed)> {
    if !assessment.is_chargeable() {
        return None;
    }

    let fine = Fine {
        id: fine_id,
        loan_id,
        amount: assessment.amount,
        created_at: assessed_at,
        settlement: FineSettlement::Pending,
    };

    let event = assessed_event(&fine, assessment.days_late);

    Some((fine, event))
}

/// 発行済みの延滞金から発生イベントを作る
pub fn assessed_event(fine: &Fine, days_late: u32) -> FineAssessed {
    FineAssessed {
        fine_id: fine.id,
        loan_id: fine.loan_id,
        days_late,
        amount: fine.amount,
        assessed_at: fine.created_at,
    }
}

/// 純粋関数：延滞金を支払う
///
/// ビジネスルール：
/// - Pendingのみ支払可能
/// - 支払日時は発生日時以降
///
/// 副作用なし。新しいFineとイベントを返す。
pub fn pay_fine(
    fine: &Fine,
    payment_method: PaymentMethod,
    paid_at: DateTime<Utc>,
) -> Result<(Fine, FinePaid), PayFineError> {
    if !fine.is_pending() {
        return Err(PayFineError::AlreadyPaid);
    }

    if paid_at < fine.created_at {
        return Err(PayFineError::PaidBeforeAssessed);
    }

    let paid = Fine {
        settlement: FineSettlement::Paid {
            paid_at,
            payment_method,
        },
        ..fine.clone()
    };

    let event = FinePaid {
        fine_id: fine.id,
        loan_id: fine.loan_id,
        amount: fine.amount,
        payment_method,
        paid_at,
    };

    Ok((paid, event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending_fine(amount: u64) -> Fine {
        let assessment = FineAssessment {
            days_late: 3,
            amount: Money::new(amount),
        };
        assess_fine(FineId::from_raw(40), LoanId::from_raw(12), assessment, Utc::now())
            .unwrap()
            .0
    }

    // TDD: assess_fine() のテスト
    #[test]
    fn test_assess_fine_creates_pending_fine() {
        let loan_id = LoanId::from_raw(12);
        let assessed_at = Utc::now();
        let assessment = FineAssessment {
            days_late: 3,
            amount: Money::new(15),
        };

        let (fine, event) =
            assess_fine(FineId::from_raw(40), loan_id, assessment, assessed_at).unwrap();

        assert_eq!(fine.id, FineId::from_raw(40));
        assert_eq!(fine.loan_id, loan_id);
        assert_eq!(fine.amount, Money::new(15));
        assert_eq!(fine.status(), FineStatus::Pending);
        assert_eq!(fine.paid_at(), None);
        assert_eq!(fine.payment_method(), None);

        assert_eq!(event.fine_id, fine.id);
        assert_eq!(event.days_late, 3);
        assert_eq!(event.assessed_at, assessed_at);
    }

    #[test]
    fn test_assess_fine_skips_zero_days() {
        let assessed = assess_fine(
            FineId::from_raw(40),
            LoanId::from_raw(12),
            FineAssessment::NONE,
            Utc::now(),
        );
        assert!(assessed.is_none());
    }

    // TDD: pay_fine() のテスト
    #[test]
    fn test_pay_fine_success() {
        let fine = pending_fine(15);
        let paid_at = fine.created_at + Duration::days(2);

        let (paid, event) = pay_fine(&fine, PaymentMethod::Cash, paid_at).unwrap();

        assert_eq!(paid.status(), FineStatus::Paid);
        assert_eq!(paid.paid_at(), Some(paid_at));
        assert_eq!(paid.payment_method(), Some(PaymentMethod::Cash));
        assert_eq!(paid.amount, fine.amount);

        assert_eq!(event.fine_id, fine.id);
        assert_eq!(event.amount, Money::new(15));
    }

    #[test]
    fn test_pay_fine_fails_when_already_paid() {
        let fine = pending_fine(15);
        let paid_at = fine.created_at + Duration::hours(1);
        let (paid, _) = pay_fine(&fine, PaymentMethod::Transfer, paid_at).unwrap();

        // 2回目の支払は失敗
        let result = pay_fine(&paid, PaymentMethod::Cash, paid_at + Duration::hours(1));
        assert_eq!(result.unwrap_err(), PayFineError::AlreadyPaid);
    }

    #[test]
    fn test_pay_fine_fails_before_assessment() {
        let fine = pending_fine(15);
        let result = pay_fine(
            &fine,
            PaymentMethod::CreditCard,
            fine.created_at - Duration::minutes(5),
        );
        assert_eq!(result.unwrap_err(), PayFineError::PaidBeforeAssessed);
    }

    #[test]
    fn test_fine_json_shape() {
        let fine = pending_fine(15);
        let json = serde_json::to_value(&fine).unwrap();

        assert_eq!(json["status"], "pending");
        assert_eq!(json["amount"], 15);
        assert!(json.get("paidAt").is_none());

        let (paid, _) = pay_fine(&fine, PaymentMethod::Cash, fine.created_at).unwrap();
        let json = serde_json::to_value(&paid).unwrap();
        assert_eq!(json["status"], "paid");
        assert_eq!(json["paymentMethod"], "Efectivo");
        assert!(json.get("paidAt").is_some());
    }

    #[test]
    fn test_fine_deserializes_paid_record() {
        let json = serde_json::json!({
            "id": 40,
            "loanId": 12,
            "amount": 20,
            "createdAt": "2024-01-14T10:00:00Z",
            "status": "paid",
            "paidAt": "2024-01-15T09:30:00Z",
            "paymentMethod": "Transferencia",
        });

        let fine: Fine = serde_json::from_value(json).unwrap();
        assert_eq!(fine.status(), FineStatus::Paid);
        assert_eq!(fine.payment_method(), Some(PaymentMethod::Transfer));
    }

    #[test]
    fn test_fine_status_parse() {
        assert_eq!("pending".parse::<FineStatus>(), Ok(FineStatus::Pending));
        assert_eq!("paid".parse::<FineStatus>(), Ok(FineStatus::Paid));
        assert!("unknown".parse::<FineStatus>().is_err());
    }
}
