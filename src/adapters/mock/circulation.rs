use crate::domain::fine::{assess_fine, pay_fine};
use crate::domain::fine_calculator::FineCalculator;
use crate::domain::loan::{Loan, NewLoan, due_instant, return_loan};
use crate::domain::value_objects::{FineId, LoanId, PaymentMethod, UserId};
use crate::ports::fine_gateway::{self, FineGateway, FineView};
use crate::ports::loan_gateway::{self, LoanGateway};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// インメモリ実装が返すエラー
#[derive(Debug, Error)]
pub enum MockCirculationError {
    #[error("Loan {0:?} not found")]
    LoanNotFound(LoanId),

    #[error("Fine {0:?} not found")]
    FineNotFound(FineId),

    #[error("Rejected: {0}")]
    Rejected(String),
}

#[derive(Default)]
struct State {
    loans: HashMap<LoanId, Loan>,
    fine_index: HashMap<FineId, LoanId>,
    last_loan_id: i64,
    last_fine_id: i64,
}

impl State {
    fn next_loan_id(&mut self) -> LoanId {
        self.last_loan_id += 1;
        LoanId::from_raw(self.last_loan_id)
    }

    fn next_fine_id(&mut self) -> FineId {
        self.last_fine_id += 1;
        FineId::from_raw(self.last_fine_id)
    }

    fn store(&mut self, loan: Loan) {
        self.last_loan_id = self.last_loan_id.max(loan.id.value());
        if let Some(fine) = &loan.fine {
            self.last_fine_id = self.last_fine_id.max(fine.id.value());
            self.fine_index.insert(fine.id, loan.id);
        }
        self.loans.insert(loan.id, loan);
    }
}

/// 外部貸出システムのインメモリ実装
///
/// 貸出と延滞金を保持し、LoanGatewayとFineGatewayの両方を実装する。
/// 貸出・延滞金のIDは連番で採番し、
/// 返却時の延滞金はサーバー側設定の料金で発行する。
/// テストやローカル配線で外部APIの代わりに使用する。
pub struct Circulation {
    state: Mutex<State>,
    fine_calculator: FineCalculator,
}

impl Circulation {
    pub fn new() -> Self {
        Self::with_fine_calculator(FineCalculator::default())
    }

    /// サーバー側の延滞金料金を指定して作成
    pub fn with_fine_calculator(fine_calculator: FineCalculator) -> Self {
        Self {
            state: Mutex::new(State::default()),
            fine_calculator,
        }
    }

    /// テスト用に貸出記録を登録
    ///
    /// 採番はこのIDより後から続く。
    pub fn insert_loan(&self, loan: Loan) {
        self.state.lock().unwrap().store(loan);
    }

    /// テスト用に登録済みの貸出を取得
    pub fn loan(&self, loan_id: LoanId) -> Option<Loan> {
        self.state.lock().unwrap().loans.get(&loan_id).cloned()
    }
}

impl Default for Circulation {
    fn default() -> Self {
        Self::new()
    }
}

fn fine_view(loan: &Loan) -> Option<FineView> {
    loan.fine.as_ref().map(|fine| FineView {
        fine: fine.clone(),
        due_date: Some(loan.due_date),
        return_date: loan.return_date,
        book: loan.book.clone(),
        user: loan.user.clone(),
    })
}

#[async_trait]
impl LoanGateway for Circulation {
    async fn list_loans(&self) -> loan_gateway::Result<Vec<Loan>> {
        let state = self.state.lock().unwrap();
        let mut loans: Vec<Loan> = state.loans.values().cloned().collect();
        loans.sort_by_key(|loan| (loan.loan_date, loan.id.value()));
        Ok(loans)
    }

    async fn list_loans_by_user(&self, user_id: UserId) -> loan_gateway::Result<Vec<Loan>> {
        let loans = self.list_loans().await?;
        Ok(loans
            .into_iter()
            .filter(|loan| loan.user_id == user_id)
            .collect())
    }

    async fn get_loan(&self, loan_id: LoanId) -> loan_gateway::Result<Option<Loan>> {
        Ok(self.state.lock().unwrap().loans.get(&loan_id).cloned())
    }

    async fn create_loan(&self, loan: NewLoan) -> loan_gateway::Result<Loan> {
        let mut state = self.state.lock().unwrap();
        let loan = loan.into_loan(state.next_loan_id());
        loan.validate()
            .map_err(|e| MockCirculationError::Rejected(format!("{:?}", e)))?;

        state.store(loan.clone());
        Ok(loan)
    }

    async fn record_return(
        &self,
        loan_id: LoanId,
        return_date: NaiveDate,
    ) -> loan_gateway::Result<Loan> {
        let mut state = self.state.lock().unwrap();
        let loan = state
            .loans
            .get(&loan_id)
            .cloned()
            .ok_or(MockCirculationError::LoanNotFound(loan_id))?;

        let (mut returned, _) = return_loan(&loan, return_date)
            .map_err(|e| MockCirculationError::Rejected(format!("{:?}", e)))?;

        // 延滞金の発生時刻は返却日とする
        let assessment = self.fine_calculator.assess(loan.due_date, return_date);
        if assessment.is_chargeable() {
            let fine_id = state.next_fine_id();
            returned.fine = assess_fine(fine_id, loan_id, assessment, due_instant(return_date))
                .map(|(fine, _)| fine);
        }

        state.store(returned.clone());
        Ok(returned)
    }
}

#[async_trait]
impl FineGateway for Circulation {
    async fn list_fines(&self) -> fine_gateway::Result<Vec<FineView>> {
        let loans = self.list_loans().await?;
        Ok(loans.iter().filter_map(fine_view).collect())
    }

    async fn list_fines_by_user(&self, user_id: UserId) -> fine_gateway::Result<Vec<FineView>> {
        let loans = self.list_loans_by_user(user_id).await?;
        Ok(loans.iter().filter_map(fine_view).collect())
    }

    async fn get_fine(&self, fine_id: FineId) -> fine_gateway::Result<Option<FineView>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .fine_index
            .get(&fine_id)
            .and_then(|loan_id| state.loans.get(loan_id))
            .and_then(fine_view))
    }

    async fn record_payment(
        &self,
        fine_id: FineId,
        payment_method: PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> fine_gateway::Result<FineView> {
        let mut state = self.state.lock().unwrap();
        let loan_id = *state
            .fine_index
            .get(&fine_id)
            .ok_or(MockCirculationError::FineNotFound(fine_id))?;
        let loan = state
            .loans
            .get_mut(&loan_id)
            .ok_or(MockCirculationError::LoanNotFound(loan_id))?;
        let fine = loan
            .fine
            .as_ref()
            .ok_or(MockCirculationError::FineNotFound(fine_id))?;

        let (paid, _) = pay_fine(fine, payment_method, paid_at)
            .map_err(|e| MockCirculationError::Rejected(format!("{:?}", e)))?;
        loan.fine = Some(paid);

        fine_view(loan).ok_or_else(|| MockCirculationError::FineNotFound(fine_id).into())
    }
}
