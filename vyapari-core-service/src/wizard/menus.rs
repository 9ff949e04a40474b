//! Menus and texts shown by the deletion wizard.

use chrono::NaiveDate;
use vyapari_core_api::domain::callback::{invoice_token, item_token};
use vyapari_core_api::domain::{CallbackToken, CancelLevel, Menu, MenuButton};
use vyapari_core_api::error::ApiResult;

pub const ROOT_TEXT: &str = "🗑️ Delete a transaction\nHow would you like to find it?";
pub const AWAITING_TEXT: &str = "🔍 Send the invoice number, for example INV_42/2025-07/051430-0A1B.\nType cancel to stop.";
pub const CANCELLED_TEXT: &str = "Deletion cancelled. Nothing was changed.";
pub const EXPIRED_TEXT: &str = "That menu has expired. Please start again:";
pub const NO_DATES_TEXT: &str = "No transactions found to delete.";
pub const RECORD_PROMPT: &str = "Tap ➕ Record Transaction to insert a template you can edit.";

pub fn date_label(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Editable text prefilled by the Record Transaction button.
pub fn record_template(today: NaiveDate) -> String {
    format!(
        "Sold <quantity> <item> at ₹<rate> each on {}, paid by cash",
        today.format("%Y-%m-%d")
    )
}

fn cancel_button(level: CancelLevel) -> ApiResult<MenuButton> {
    Ok(MenuButton::callback("❌ Cancel", CallbackToken::Cancel(level).encode()?))
}

fn search_row() -> ApiResult<Vec<MenuButton>> {
    Ok(vec![
        MenuButton::callback("🕒 Recent", CallbackToken::Recent.encode()?),
        MenuButton::callback("🔍 Search invoice", CallbackToken::Search.encode()?),
    ])
}

pub fn root_menu() -> ApiResult<Menu> {
    Ok(Menu::new().row(search_row()?).row(vec![cancel_button(CancelLevel::Root)?]))
}

/// Offered after a flow ends: start over, or record a new transaction.
pub fn restart_menu(today: NaiveDate) -> ApiResult<Menu> {
    Ok(Menu::new()
        .row(search_row()?)
        .row(vec![MenuButton::insert_text("➕ Record Transaction", record_template(today))]))
}

pub fn awaiting_menu() -> ApiResult<Menu> {
    Ok(Menu::new().row(vec![cancel_button(CancelLevel::Root)?]))
}

pub fn date_menu(dates: &[NaiveDate]) -> ApiResult<Menu> {
    let mut menu = Menu::new();
    for date in dates {
        let token = CallbackToken::Date(*date).encode()?;
        menu.push_row(vec![MenuButton::callback(format!("📅 {}", date_label(*date)), token)]);
    }
    menu.push_row(vec![cancel_button(CancelLevel::Root)?]);
    Ok(menu)
}

pub fn invoice_menu(date: NaiveDate, invoices: &[String]) -> ApiResult<Menu> {
    let mut menu = Menu::new();
    for (index, invoice) in invoices.iter().enumerate() {
        menu.push_row(vec![MenuButton::callback(
            format!("🧾 {invoice}"),
            invoice_token(date, invoice, index)?,
        )]);
    }
    menu.push_row(vec![cancel_button(CancelLevel::Date)?]);
    Ok(menu)
}

pub fn item_menu(invoice: &str, items: &[String]) -> ApiResult<Menu> {
    let mut menu = Menu::new();
    for (index, item) in items.iter().enumerate() {
        menu.push_row(vec![MenuButton::callback(
            format!("❌ {item}"),
            item_token(invoice, item, index)?,
        )]);
    }
    menu.push_row(vec![cancel_button(CancelLevel::Invoice)?]);
    Ok(menu)
}
