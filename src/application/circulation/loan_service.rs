use crate::domain::commands::{OpenLoan, ReturnLoan};
use crate::domain::fine_calculator::{FineAssessment, FineCalculator};
use crate::domain::loan::{self, Loan};
use crate::domain::value_objects::{LoanId, Money};
use crate::domain::LoanReturned;
use crate::ports::{FineGateway, LoanGateway};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

use super::errors::{CirculationError, Result};

/// サービスの依存関係
///
/// 外部システムへのゲートウェイをデータ構造として保持し、
/// 各ユースケース関数に明示的に渡す。グローバルな状態は持たない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub loan_gateway: Arc<dyn LoanGateway>,
    pub fine_gateway: Arc<dyn FineGateway>,
}

/// 返却の結果
#[derive(Debug, Clone)]
pub struct ReturnOutcome {
    /// 外部システムが確定した貸出記録
    pub loan: Loan,
    /// クライアント側で計算した延滞金の見積もり
    pub estimate: FineAssessment,
    /// 確定した貸出記録から組み立てたイベント
    pub event: LoanReturned,
}

impl ReturnOutcome {
    /// 確定した延滞金額（なければ0）
    pub fn confirmed_fine_amount(&self) -> Money {
        self.loan
            .fine
            .as_ref()
            .map(|fine| fine.amount)
            .unwrap_or(Money::ZERO)
    }
}

/// 外部システムから貸出を取得するヘルパー関数
///
/// # エラー
/// - LoanGatewayError: 取得失敗
/// - LoanNotFound: 存在しない
/// - InvalidLoanRecord: 記録が不変条件を満たさない
pub(super) async fn load_loan(gateway: &Arc<dyn LoanGateway>, loan_id: LoanId) -> Result<Loan> {
    let loan = gateway
        .get_loan(loan_id)
        .await
        .map_err(CirculationError::LoanGatewayError)?
        .ok_or(CirculationError::LoanNotFound)?;

    loan.validate()
        .map_err(CirculationError::InvalidLoanRecord)?;

    Ok(loan)
}

/// 貸出を開始する
///
/// ビジネスルール：
/// - 返却期限は貸出日より後
///
/// # 戻り値
/// 外部システムが確定した貸出記録
pub async fn open_loan(deps: &ServiceDependencies, cmd: OpenLoan) -> Result<Loan> {
    // 1. ドメイン層の純粋関数を呼び出し
    let draft = loan::open_loan(
        cmd.book_id,
        cmd.user_id,
        cmd.loan_date,
        cmd.due_date,
        cmd.notes,
    )?;

    // 2. 外部システムに登録
    let confirmed = deps
        .loan_gateway
        .create_loan(draft)
        .await
        .map_err(CirculationError::LoanGatewayError)?;

    let event = loan::opened_event(&confirmed);
    tracing::info!(
        loan_id = %event.loan_id.value(),
        due_date = %event.due_date,
        "Loan opened"
    );

    Ok(confirmed)
}

/// 返却日の候補に対する延滞金を見積もる
///
/// 副作用なし。返却日の候補が変わるたびに呼び出してよい。
/// 結果は表示用であり、確定値は外部システムが返す。
pub async fn preview_fine(
    deps: &ServiceDependencies,
    loan_id: LoanId,
    candidate_return_date: NaiveDate,
    calculator: &FineCalculator,
) -> Result<FineAssessment> {
    let loan = load_loan(&deps.loan_gateway, loan_id).await?;

    if loan.is_returned() {
        return Err(CirculationError::LoanAlreadyReturned);
    }
    if candidate_return_date < loan.loan_date {
        return Err(CirculationError::ReturnBeforeLoanDate);
    }

    let assessment = calculator.assess(loan.due_date, candidate_return_date);
    tracing::debug!(
        loan_id = %loan_id.value(),
        days_late = assessment.days_late,
        amount = assessment.amount.value(),
        "Fine preview"
    );

    Ok(assessment)
}

/// 現時点で返却した場合の延滞金を見積もる
///
/// 返却フォームを開いたときの初期表示に使用される。
pub async fn preview_fine_at(
    deps: &ServiceDependencies,
    loan_id: LoanId,
    now: DateTime<Utc>,
    calculator: &FineCalculator,
) -> Result<FineAssessment> {
    let loan = load_loan(&deps.loan_gateway, loan_id).await?;

    if loan.is_returned() {
        return Err(CirculationError::LoanAlreadyReturned);
    }

    Ok(calculator.assess_at(loan.due_date, now))
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出が存在し、未返却であること
/// - 返却日は貸出日以降
/// - 延滞していても返却は受け付ける
/// - 期限後の返却は延滞金（Pending）を伴う
///
/// ドメイン層の遷移で検証し、見積もりを計算したうえで外部システムに返却を記録する。
/// 延滞金は外部システムが発行する。確定値が見積もりと異なる場合は警告を記録する。
pub async fn return_loan(
    deps: &ServiceDependencies,
    cmd: ReturnLoan,
    calculator: &FineCalculator,
) -> Result<ReturnOutcome> {
    // 1. 外部システムから貸出を取得
    let loan = load_loan(&deps.loan_gateway, cmd.loan_id).await?;

    // 2. ドメイン層の純粋関数で検証し、延滞金を見積もる
    loan::return_loan(&loan, cmd.return_date)?;
    let estimate = calculator.assess(loan.due_date, cmd.return_date);

    // 3. 外部システムに返却を記録
    let confirmed = deps
        .loan_gateway
        .record_return(cmd.loan_id, cmd.return_date)
        .await
        .map_err(CirculationError::LoanGatewayError)?;

    let return_date = confirmed.return_date.unwrap_or(cmd.return_date);
    let outcome = ReturnOutcome {
        event: loan::returned_event(&confirmed, return_date),
        loan: confirmed,
        estimate,
    };

    // 4. 見積もりと確定値の比較
    let confirmed_amount = outcome.confirmed_fine_amount();
    if confirmed_amount != estimate.amount {
        tracing::warn!(
            loan_id = %cmd.loan_id.value(),
            estimated = estimate.amount.value(),
            confirmed = confirmed_amount.value(),
            "Confirmed fine differs from local estimate"
        );
    }

    tracing::info!(
        loan_id = %cmd.loan_id.value(),
        return_date = %cmd.return_date,
        days_late = estimate.days_late,
        fine = confirmed_amount.value(),
        "Loan returned"
    );

    Ok(outcome)
}
