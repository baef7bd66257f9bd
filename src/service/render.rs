use crate::{
    application::{
        coordinator::{ViewController, ViewMode},
        resources::LoadState,
    },
    domain::models::{DataAccess, Employee, Transaction},
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Formats an amount as US dollars, e.g. `$1,234.50` or `-$3.00`.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // sign follows the unrounded value, so -0.001 prints as -$0.00
    let negative = amount < Decimal::ZERO;
    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{}", if negative { "-" } else { "" }, grouped, cents)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowView {
    pub transaction_id: String,
    pub merchant: String,
    pub amount: String,
    pub employee_name: String,
    pub date: String,
    pub checked: bool,
    pub disabled: bool,
}

impl RowView {
    pub fn new(transaction: &Transaction, checked: bool, disabled: bool) -> Self {
        Self {
            transaction_id: transaction.id.clone(),
            merchant: transaction.merchant.clone(),
            amount: format_usd(transaction.amount),
            employee_name: transaction.employee.full_name(),
            date: transaction.date.format("%Y-%m-%d").to_string(),
            checked,
            disabled,
        }
    }
}

impl fmt::Display for RowView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let checkbox = match (self.checked, self.disabled) {
            (true, false) => "[x]",
            (false, false) => "[ ]",
            (true, true) => "[x]~",
            (false, true) => "[ ]~",
        };
        write!(
            f,
            "{:<4} {:<6} {:<24} {:>12}  {} - {}",
            checkbox, self.transaction_id, self.merchant, self.amount, self.employee_name, self.date
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewMoreButton {
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    Loading,
    /// The active listing could not be fetched
    Failed(String),
    Rows {
        rows: Vec<RowView>,
        view_more: Option<ViewMoreButton>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl From<&Employee> for SelectOption {
    fn from(employee: &Employee) -> Self {
        Self {
            value: employee.id.clone(),
            label: employee.full_name(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectView {
    pub loading: bool,
    pub options: Vec<SelectOption>,
    /// Id of the filtered employee, `None` for "All Employees"
    pub selected: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenView {
    pub select: SelectView,
    pub list: ListView,
    pub write_error: Option<String>,
}

/// Snapshot of everything the screen shows right now.
pub async fn screen<D>(controller: &ViewController<D>) -> ScreenView
where
    D: DataAccess + Send + Sync,
{
    let select = SelectView {
        loading: controller.employees_loading(),
        options: controller
            .employee_options()
            .await
            .iter()
            .map(SelectOption::from)
            .collect(),
        selected: controller.selected_employee_id().await,
    };

    ScreenView {
        select,
        list: list(controller).await,
        write_error: controller.transaction_list().last_write_error().await,
    }
}

pub async fn list<D>(controller: &ViewController<D>) -> ListView
where
    D: DataAccess + Send + Sync,
{
    let Some(transactions) = controller.visible_transactions().await else {
        let failure = match controller.mode().await {
            ViewMode::All { .. } => match controller.paginated().state().await {
                LoadState::LoadFailed(reason) => Some(reason),
                _ => None,
            },
            ViewMode::ByEmployee { .. } => match controller.by_employee().state().await {
                LoadState::LoadFailed(reason) => Some(reason),
                _ => None,
            },
        };
        return failure.map_or(ListView::Loading, ListView::Failed);
    };

    let approvals = controller.transaction_list();
    let writing = approvals.loading();
    let rows = transactions
        .iter()
        .map(|t| RowView::new(t, approvals.is_approved(t), writing))
        .collect();

    let view_more = if controller.is_pagination_used().await && controller.has_next_page().await
    {
        Some(ViewMoreButton {
            disabled: controller.paginated().loading(),
        })
    } else {
        None
    };

    ListView::Rows { rows, view_more }
}

impl fmt::Display for ScreenView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.select.loading {
            writeln!(f, "Filter by employee: Loading employees...")?;
        } else {
            let current = match &self.select.selected {
                None => self.select.options.first().map(|o| o.label.as_str()),
                Some(id) => self
                    .select
                    .options
                    .iter()
                    .skip(1)
                    .find(|o| &o.value == id)
                    .map(|o| o.label.as_str()),
            };
            writeln!(f, "Filter by employee: {}", current.unwrap_or("-"))?;
        }

        match &self.list {
            ListView::Loading => writeln!(f, "Loading...")?,
            ListView::Failed(reason) => writeln!(f, "Failed to load transactions: {}", reason)?,
            ListView::Rows { rows, view_more } => {
                for row in rows {
                    writeln!(f, "{}", row)?;
                }
                if let Some(button) = view_more {
                    let state = if button.disabled { " (loading)" } else { "" };
                    writeln!(f, "[ View More ]{}", state)?;
                }
            }
        }

        if let Some(error) = &self.write_error {
            writeln!(f, "! {}", error)?;
        }
        Ok(())
    }
}
