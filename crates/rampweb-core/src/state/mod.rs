//! Data-holding state slots behind the view controller
//!
//! - employees: employee list for the picker
//! - paginated: page-by-page transaction list with a next-page cursor
//! - by_employee: unpaginated transactions of the selected employee

pub mod by_employee;
pub mod employees;
pub mod paginated;
mod slot;

pub use by_employee::TransactionsByEmployeeState;
pub use employees::EmployeesState;
pub use paginated::PaginatedTransactionsState;
