pub mod fine_gateway;
pub mod loan_gateway;

pub use fine_gateway::{FineGateway, FineView};
pub use loan_gateway::LoanGateway;
