//! Transactions page rendering
//!
//! Endpoints:
//! - page_transactions: main page with the employee picker and the list
//!
//! Helper functions:
//! - render_transactions_section: list plus View More, the `#transactions-content` body
//! - render_transaction_list / render_transaction_row: list renderer
//! - render_employee_picker: "Filter by employee" select
//! - format_currency: USD display amounts

use super::api::{ensure_loaded, synced_view};
use crate::{escape_html, AppState};
use rampweb_core::{display_approval, ApprovalMap, Employee, Transaction, TransactionView};
use rust_decimal::{Decimal, RoundingStrategy};

/// Transactions page - instructions, picker, list and View More
pub async fn page_transactions(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    ensure_loaded(&state.app).await;
    let (view, overlay) = synced_view(&state.app);
    let approvals_loading = state.app.approvals().loading();

    let inner_content = format!(
        r#"<div class='mb-6'>
            <h1 class='text-2xl font-bold'>Transactions</h1>
            <p class='text-sm text-gray-600 mt-1'>Review employee card transactions. Tick a row to approve it; approvals are remembered on this server.</p>
        </div>
        <hr class='my-6'>
        {}
        <div class='my-6'></div>
        <div id='transactions-content' class='space-y-3'>
            {}
        </div>"#,
        render_employee_picker(&view),
        render_transactions_section(&view, &overlay, approvals_loading),
    );

    axum::response::Html(crate::page_response(&headers, "Transactions", &inner_content))
}

/// Body of `#transactions-content`
pub fn render_transactions_section(view: &TransactionView, overlay: &ApprovalMap, approvals_loading: bool) -> String {
    let employees = view.employees.as_deref().unwrap_or(&[]);
    format!(
        "{}{}",
        render_transaction_list(view.transactions.as_deref(), employees, overlay, approvals_loading),
        render_view_more(view)
    )
}

/// One row per transaction, or the loading placeholder when nothing is loaded
pub fn render_transaction_list(
    transactions: Option<&[Transaction]>,
    employees: &[Employee],
    overlay: &ApprovalMap,
    toggles_disabled: bool,
) -> String {
    let Some(transactions) = transactions else {
        return "<div class='text-gray-500 text-center py-8'>Loading...</div>".to_string();
    };

    let rows: Vec<String> = transactions
        .iter()
        .map(|t| {
            let employee_name = employees
                .iter()
                .find(|e| e.id == t.employee_id)
                .map(Employee::full_name)
                .unwrap_or_default();
            render_transaction_row(t, &employee_name, display_approval(overlay, t), toggles_disabled)
        })
        .collect();

    format!("<div data-testid='transaction-container' class='space-y-2'>{}</div>", rows.join(""))
}

pub fn render_transaction_row(transaction: &Transaction, employee_name: &str, approved: bool, disabled: bool) -> String {
    let id = escape_html(&transaction.id);
    format!(
        r#"<div id='transaction-{id}' class='transaction-row flex items-center justify-between bg-white rounded-lg border p-4'>
    <div>
        <p class='font-medium'>{merchant}</p>
        <p class='text-sm text-gray-500'>{employee} - {date}</p>
    </div>
    <div class='flex items-center gap-4'>
        <span class='font-semibold'>{amount}</span>
        <input type='checkbox' aria-label='Approved' class='approval-toggle h-5 w-5'{checked}{disabled}
            hx-post='/transactions/{id}/approval' hx-vals='{{"value": "{next}"}}'
            hx-target='#transaction-{id}' hx-swap='outerHTML'
            hx-sync='#transactions-content:drop' hx-disabled-elt='.approval-toggle'>
    </div>
</div>"#,
        id = id,
        merchant = escape_html(&transaction.merchant),
        employee = escape_html(employee_name),
        date = transaction.date.format("%Y-%m-%d"),
        amount = format_currency(transaction.amount),
        checked = if approved { " checked" } else { "" },
        disabled = if disabled { " disabled" } else { "" },
        next = !approved,
    )
}

/// Picker over "All Employees" plus every loaded employee, current selection marked
pub fn render_employee_picker(view: &TransactionView) -> String {
    let selected = view.selected_employee_id.as_str();
    let options = if view.employees_loading {
        "<option value='' disabled selected>Loading employees...</option>".to_string()
    } else {
        view.picker_items
            .iter()
            .map(|e| {
                format!(
                    "<option value='{}'{}>{}</option>",
                    escape_html(&e.id),
                    if e.id == selected { " selected" } else { "" },
                    escape_html(&e.full_name())
                )
            })
            .collect::<Vec<_>>()
            .join("")
    };

    format!(
        r#"<div class='flex flex-col gap-1'>
    <label for='employee-select' class='text-sm font-medium text-gray-700'>Filter by employee</label>
    <select id='employee-select' name='employee_id' class='px-3 py-2 border rounded-lg bg-white'{}
        hx-post='/employees/select' hx-trigger='change' hx-target='#transactions-content'>{}</select>
</div>"#,
        if view.employees_loading { " disabled" } else { "" },
        options
    )
}

/// "View More", only while unfiltered and another page exists
pub fn render_view_more(view: &TransactionView) -> String {
    if !view.show_view_more() {
        return String::new();
    }
    format!(
        r#"<button class='w-full mt-4 px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700 disabled:opacity-50'{}
    hx-post='/transactions/more' hx-target='#transactions-content'
    hx-sync='this:drop' hx-disabled-elt='this'>View More</button>"#,
        if view.transactions_loading { " disabled" } else { "" }
    )
}

/// US dollar amount with thousands separators, e.g. `-$1,234.50`
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
