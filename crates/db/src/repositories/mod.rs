//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod budget_repo;
pub mod category_repo;
pub mod contract_period_repo;
pub mod document_repo;
pub mod fund_repo;
pub mod project_repo;
pub mod recurring_repo;
pub mod session_repo;
pub mod supplier_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use budget_repo::BudgetRepo;
pub use category_repo::CategoryRepo;
pub use contract_period_repo::ContractPeriodRepo;
pub use document_repo::DocumentRepo;
pub use fund_repo::FundRepo;
pub use project_repo::ProjectRepo;
pub use recurring_repo::RecurringRepo;
pub use session_repo::SessionRepo;
pub use supplier_repo::SupplierRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;
