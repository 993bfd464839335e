//! 一覧表示用のクエリ
//!
//! ステータスは外部システムの記録値を使わず、常に `now` から再計算する。

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::fine::FineStatus;
use crate::domain::format::{TimeRemaining, time_remaining};
use crate::domain::loan::{BookRef, Loan, LoanStatus, UserRef};
use crate::domain::value_objects::{Money, UserId};
use crate::ports::FineView;

use super::errors::{CirculationError, Result};
use super::loan_service::ServiceDependencies;

/// 並び替えの対象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoanSortField {
    LoanDate,
    #[default]
    DueDate,
    ReturnDate,
    BookTitle,
    UserName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// 貸出一覧の検索条件
#[derive(Debug, Clone, Default)]
pub struct LoanQuery {
    /// 書籍名・利用者名に対する部分一致（大文字小文字を区別しない）
    pub search: Option<String>,
    /// 実効ステータスでの絞り込み
    pub status: Option<LoanStatus>,
    /// 利用者での絞り込み
    pub user_id: Option<UserId>,
    pub sort_field: LoanSortField,
    pub direction: SortDirection,
}

/// 一覧の1行
#[derive(Debug, Clone)]
pub struct LoanSummary {
    pub loan: Loan,
    /// `now` 時点の実効ステータス
    pub status: LoanStatus,
    pub time_remaining: Option<TimeRemaining>,
    pub pending_fine: Option<Money>,
}

/// ステータス別の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoanCounts {
    pub active: usize,
    pub overdue: usize,
    pub returned: usize,
}

impl LoanCounts {
    fn record(&mut self, status: LoanStatus) {
        match status {
            LoanStatus::Active => self.active += 1,
            LoanStatus::Overdue => self.overdue += 1,
            LoanStatus::Returned => self.returned += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoanListing {
    pub loans: Vec<LoanSummary>,
    /// 絞り込み前の件数
    pub counts: LoanCounts,
}

fn normalize_search(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn matches_search(needle: &str, book: Option<&BookRef>, user: Option<&UserRef>) -> bool {
    let in_book = book.is_some_and(|b| b.title.to_lowercase().contains(needle));
    let in_user = user.is_some_and(|u| {
        u.first_name.to_lowercase().contains(needle) || u.last_name.to_lowercase().contains(needle)
    });
    in_book || in_user
}

fn book_title(loan: &Loan) -> String {
    loan.book
        .as_ref()
        .map(|b| b.title.to_lowercase())
        .unwrap_or_default()
}

fn user_name(loan: &Loan) -> String {
    loan.user
        .as_ref()
        .map(|u| u.full_name().to_lowercase())
        .unwrap_or_default()
}

/// 昇順での比較。日付がないものは先頭に来る。
fn compare_loans(a: &Loan, b: &Loan, field: LoanSortField) -> Ordering {
    match field {
        LoanSortField::LoanDate => a.loan_date.cmp(&b.loan_date),
        LoanSortField::DueDate => a.due_date.cmp(&b.due_date),
        LoanSortField::ReturnDate => a.return_date.cmp(&b.return_date),
        LoanSortField::BookTitle => book_title(a).cmp(&book_title(b)),
        LoanSortField::UserName => user_name(a).cmp(&user_name(b)),
    }
}

/// 貸出一覧を取得する
///
/// 1. 外部システムから貸出を取得（利用者指定があれば利用者単位）
/// 2. 各貸出の実効ステータスを `now` で再計算
/// 3. 件数を集計し、検索・ステータスで絞り込み、並び替える
pub async fn list_loans(
    deps: &ServiceDependencies,
    query: &LoanQuery,
    now: DateTime<Utc>,
) -> Result<LoanListing> {
    let loans = match query.user_id {
        Some(user_id) => deps.loan_gateway.list_loans_by_user(user_id).await,
        None => deps.loan_gateway.list_loans().await,
    }
    .map_err(CirculationError::LoanGatewayError)?;

    let needle = normalize_search(&query.search);
    let mut counts = LoanCounts::default();
    let mut summaries = Vec::with_capacity(loans.len());

    for loan in loans {
        let status = loan.effective_status(now);
        counts.record(status);

        if query.status.is_some_and(|wanted| wanted != status) {
            continue;
        }
        if let Some(needle) = &needle {
            if !matches_search(needle, loan.book.as_ref(), loan.user.as_ref()) {
                continue;
            }
        }

        summaries.push(LoanSummary {
            time_remaining: time_remaining(&loan, now),
            pending_fine: loan.pending_fine().map(|fine| fine.amount),
            status,
            loan,
        });
    }

    summaries.sort_by(|a, b| {
        let ordering = compare_loans(&a.loan, &b.loan, query.sort_field);
        match query.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    Ok(LoanListing {
        loans: summaries,
        counts,
    })
}

/// 延滞金一覧の検索条件
#[derive(Debug, Clone, Default)]
pub struct FineQuery {
    pub search: Option<String>,
    pub status: Option<FineStatus>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct FineListing {
    pub fines: Vec<FineView>,
    /// 絞り込み前の件数
    pub pending: usize,
    pub paid: usize,
    /// 未払い延滞金の合計
    pub outstanding_amount: Money,
}

/// 延滞金一覧を取得する
pub async fn list_fines(deps: &ServiceDependencies, query: &FineQuery) -> Result<FineListing> {
    let views = match query.user_id {
        Some(user_id) => deps.fine_gateway.list_fines_by_user(user_id).await,
        None => deps.fine_gateway.list_fines().await,
    }
    .map_err(CirculationError::FineGatewayError)?;

    let needle = normalize_search(&query.search);
    let mut pending = 0;
    let mut paid = 0;
    let mut outstanding_amount = Money::ZERO;

    for view in &views {
        match view.fine.status() {
            FineStatus::Pending => {
                pending += 1;
                outstanding_amount = outstanding_amount.saturating_add(view.fine.amount);
            }
            FineStatus::Paid => paid += 1,
        }
    }

    let fines = views
        .into_iter()
        .filter(|view| query.status.is_none_or(|wanted| wanted == view.fine.status()))
        .filter(|view| {
            needle
                .as_deref()
                .is_none_or(|n| matches_search(n, view.book.as_ref(), view.user.as_ref()))
        })
        .collect();

    Ok(FineListing {
        fines,
        pending,
        paid,
        outstanding_amount,
    })
}
