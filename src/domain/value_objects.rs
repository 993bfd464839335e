use serde::{Deserialize, Serialize};
use std::fmt;

/// 外部システムが採番する数値IDの型を定義する
macro_rules! external_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

external_id!(
    /// 貸出ID
    LoanId
);
external_id!(
    /// 書籍ID - カタログへの参照
    BookId
);
external_id!(
    /// 利用者ID - 利用者管理への参照
    UserId
);
external_id!(
    /// 延滞金ID
    FineId
);

/// 金額（通貨単位の整数）
///
/// 不変条件：負の値を持たない。
/// u64で表現することで型レベルで非負を保証する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn new(units: u64) -> Self {
        Self(units)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// 日数を掛ける（上限で飽和する）
    ///
    /// 飽和演算のため、日数に対して単調非減少。
    pub fn times_days(self, days: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(days)))
    }

    /// 合計（上限で飽和する）
    pub fn saturating_add(self, other: Money) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// 支払方法のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodError {
    /// 未選択
    Empty,
    /// 受け付けていない支払方法
    Unknown(String),
}

/// 支払方法
///
/// 窓口で受け付ける支払方法のみ。外部APIとの間では表示名の文字列で受け渡す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Efectivo")]
    Cash,
    #[serde(rename = "Tarjeta de débito")]
    DebitCard,
    #[serde(rename = "Tarjeta de crédito")]
    CreditCard,
    #[serde(rename = "Transferencia")]
    Transfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::DebitCard,
        PaymentMethod::CreditCard,
        PaymentMethod::Transfer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::DebitCard => "Tarjeta de débito",
            PaymentMethod::CreditCard => "Tarjeta de crédito",
            PaymentMethod::Transfer => "Transferencia",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = PaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PaymentMethodError::Empty);
        }
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| PaymentMethodError::Unknown(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_plain_numbers_on_the_wire() {
        let json = serde_json::to_string(&LoanId::from_raw(12)).unwrap();
        assert_eq!(json, "12");

        let id: FineId = serde_json::from_str("7").unwrap();
        assert_eq!(id.value(), 7);
    }

    #[test]
    fn test_id_rejects_uuid_string() {
        let result = serde_json::from_str::<BookId>("\"d6be8a1e-0000-0000-0000-000000000000\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UserId::from_raw(42).to_string(), "42");
    }

    #[test]
    fn test_money_times_days() {
        assert_eq!(Money::new(5).times_days(3), Money::new(15));
        assert_eq!(Money::new(5).times_days(0), Money::ZERO);
    }

    #[test]
    fn test_money_times_days_saturates() {
        let huge = Money::new(u64::MAX).times_days(2);
        assert_eq!(huge.value(), u64::MAX);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(15).to_string(), "$15");
    }

    // TDD: PaymentMethod のパース
    #[test]
    fn test_payment_method_parse_labels() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.label().parse::<PaymentMethod>(), Ok(method));
        }
    }

    #[test]
    fn test_payment_method_parse_empty() {
        assert_eq!("  ".parse::<PaymentMethod>(), Err(PaymentMethodError::Empty));
    }

    #[test]
    fn test_payment_method_parse_unknown() {
        assert_eq!(
            "Cheque".parse::<PaymentMethod>(),
            Err(PaymentMethodError::Unknown("Cheque".to_string()))
        );
    }

    #[test]
    fn test_payment_method_serializes_as_label() {
        let json = serde_json::to_string(&PaymentMethod::DebitCard).unwrap();
        assert_eq!(json, "\"Tarjeta de débito\"");
    }
}
