//! Transaction routes - list, employee filter, pagination, approvals
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: full page and fragment rendering

pub mod api;
pub mod page;

pub use api::{
    api_approvals,
    htmx_employee_select,
    htmx_transaction_approval,
    htmx_transactions_list,
    htmx_view_more,
};

pub use page::{
    format_currency,
    page_transactions,
    render_employee_picker,
    render_transaction_list,
    render_transaction_row,
    render_transactions_section,
    render_view_more,
};
