mod errors;
mod fine_service;
mod forms;
mod loan_service;
mod queries;

pub use errors::{CirculationError, Result};
pub use fine_service::pay_fine;
pub use forms::{FormError, LoanForm, PaymentForm, ReturnForm, parse_form_date};
pub use loan_service::{
    ReturnOutcome, ServiceDependencies, open_loan, preview_fine, preview_fine_at, return_loan,
};
pub use queries::{
    FineListing, FineQuery, LoanCounts, LoanListing, LoanQuery, LoanSortField, LoanSummary,
    SortDirection, list_fines, list_loans,
};
