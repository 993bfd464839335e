use std::env;

use thiserror::Error;

use crate::domain::Money;
use crate::domain::fine_calculator::{DEFAULT_FINE_PER_DAY, FineCalculator};
use crate::domain::loan::DEFAULT_LOAN_PERIOD_DAYS;

pub const FINE_PER_DAY_RATE_VAR: &str = "SIGABE_FINE_PER_DAY_RATE";
pub const LOAN_PERIOD_DAYS_VAR: &str = "SIGABE_LOAN_PERIOD_DAYS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

/// 貸出・延滞金の運用ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CirculationConfig {
    /// 1日あたりの延滞金
    pub fine_per_day_rate: Money,
    /// 返却期限を省略したときの貸出期間（日数）
    pub loan_period_days: u32,
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            fine_per_day_rate: Money::new(DEFAULT_FINE_PER_DAY),
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
        }
    }
}

impl CirculationConfig {
    /// 環境変数から読み込む
    ///
    /// `.env` があれば先に読み込む。未設定の項目は既定値を使う。
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let fine_per_day_rate = match lookup(FINE_PER_DAY_RATE_VAR) {
            Some(raw) => Money::new(parse_var(FINE_PER_DAY_RATE_VAR, &raw)?),
            None => defaults.fine_per_day_rate,
        };

        let loan_period_days = match lookup(LOAN_PERIOD_DAYS_VAR) {
            Some(raw) => match parse_var::<u32>(LOAN_PERIOD_DAYS_VAR, &raw)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        var: LOAN_PERIOD_DAYS_VAR,
                        value: raw,
                    });
                }
                days => days,
            },
            None => defaults.loan_period_days,
        };

        Ok(Self {
            fine_per_day_rate,
            loan_period_days,
        })
    }

    pub fn fine_calculator(&self) -> FineCalculator {
        FineCalculator::new(self.fine_per_day_rate)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
    })
}
