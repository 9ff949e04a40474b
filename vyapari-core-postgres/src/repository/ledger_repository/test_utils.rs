#[cfg(test)]
pub mod test_utils {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;
    use vyapari_core_api::domain::{AccountId, PaymentMethod};
    use vyapari_core_db::models::TransactionModel;

    pub fn create_test_transaction(
        account_id: &AccountId,
        invoice_number: &str,
        item_name: &str,
        invoice_date: NaiveDate,
        quantity: i32,
        unit_price: Decimal,
    ) -> TransactionModel {
        TransactionModel {
            id: Uuid::new_v4(),
            account_id: account_id.clone(),
            item_name: item_name.to_string(),
            item_code: None,
            quantity,
            unit_price,
            tax_rate: Decimal::from(18),
            discount_per_unit: Decimal::ZERO,
            invoice_date,
            invoice_number: invoice_number.to_string(),
            payment_method: PaymentMethod::Cash,
            currency: "INR".to_string(),
            customer_name: None,
            customer_details: None,
            raw_message: "test".to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn test_date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }
}
