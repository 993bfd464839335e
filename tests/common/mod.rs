#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sigabe_circulation::adapters::mock::Circulation;
use sigabe_circulation::application::circulation::ServiceDependencies;
use sigabe_circulation::domain::loan::{self, BookRef, Loan, NewLoan, UserRef};
use sigabe_circulation::domain::value_objects::*;
use sigabe_circulation::ports::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

static NEXT_ID: AtomicI64 = AtomicI64::new(1000);

/// テストごとに重複しない数値ID
pub fn next_id() -> i64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// 書籍・利用者の表示情報付きの貸出を作成
pub fn loan_with_refs(
    title: &str,
    first_name: &str,
    last_name: &str,
    loan_date: NaiveDate,
    due_date: NaiveDate,
) -> Loan {
    let mut loan = loan::open_loan(
        BookId::from_raw(next_id()),
        UserId::from_raw(next_id()),
        loan_date,
        due_date,
        None,
    )
    .unwrap()
    .into_loan(LoanId::from_raw(next_id()));
    loan.book = Some(BookRef {
        title: title.to_string(),
        author: "Autor de prueba".to_string(),
    });
    loan.user = Some(UserRef {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    });
    loan
}

/// インメモリの外部システムを両方のゲートウェイとして使う
pub fn deps_for(circulation: &Arc<Circulation>) -> ServiceDependencies {
    ServiceDependencies {
        loan_gateway: circulation.clone(),
        fine_gateway: circulation.clone(),
    }
}

// ============================================================================
// 常に失敗する外部システム（通信障害の再現用）
// ============================================================================

pub struct UnavailableGateway;

#[async_trait]
impl LoanGateway for UnavailableGateway {
    async fn list_loans(&self) -> loan_gateway::Result<Vec<Loan>> {
        Err("external system unavailable".into())
    }

    async fn list_loans_by_user(&self, _user_id: UserId) -> loan_gateway::Result<Vec<Loan>> {
        Err("external system unavailable".into())
    }

    async fn get_loan(&self, _loan_id: LoanId) -> loan_gateway::Result<Option<Loan>> {
        Err("external system unavailable".into())
    }

    async fn create_loan(&self, _loan: NewLoan) -> loan_gateway::Result<Loan> {
        Err("external system unavailable".into())
    }

    async fn record_return(
        &self,
        _loan_id: LoanId,
        _return_date: NaiveDate,
    ) -> loan_gateway::Result<Loan> {
        Err("external system unavailable".into())
    }
}

#[async_trait]
impl FineGateway for UnavailableGateway {
    async fn list_fines(&self) -> fine_gateway::Result<Vec<FineView>> {
        Err("external system unavailable".into())
    }

    async fn list_fines_by_user(&self, _user_id: UserId) -> fine_gateway::Result<Vec<FineView>> {
        Err("external system unavailable".into())
    }

    async fn get_fine(&self, _fine_id: FineId) -> fine_gateway::Result<Option<FineView>> {
        Err("external system unavailable".into())
    }

    async fn record_payment(
        &self,
        _fine_id: FineId,
        _payment_method: PaymentMethod,
        _paid_at: DateTime<Utc>,
    ) -> fine_gateway::Result<FineView> {
        Err("external system unavailable".into())
    }
}

pub fn unavailable_deps() -> ServiceDependencies {
    let gateway = Arc::new(UnavailableGateway);
    ServiceDependencies {
        loan_gateway: gateway.clone(),
        fine_gateway: gateway,
    }
}
