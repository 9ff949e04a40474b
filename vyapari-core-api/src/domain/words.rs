//! Amount-in-words using the Indian numbering scale.

use rust_decimal::prelude::*;

use super::tax::round_money;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;
const HUNDRED: u64 = 100;

fn below_hundred(n: u64, out: &mut Vec<&'static str>) {
    debug_assert!(n < 100);
    let n = n as usize;
    if n < 20 {
        if n > 0 {
            out.push(ONES[n]);
        }
    } else {
        out.push(TENS[n / 10]);
        if n % 10 > 0 {
            out.push(ONES[n % 10]);
        }
    }
}

fn push_words(n: u64, out: &mut Vec<&'static str>) {
    let mut rest = n;
    if rest >= CRORE {
        // Amounts above 99 crore keep stacking crores ("One Hundred Crore").
        push_words(rest / CRORE, out);
        out.push("Crore");
        rest %= CRORE;
    }
    for (unit, name) in [(LAKH, "Lakh"), (THOUSAND, "Thousand"), (HUNDRED, "Hundred")] {
        if rest >= unit {
            below_hundred(rest / unit, out);
            out.push(name);
            rest %= unit;
        }
    }
    below_hundred(rest, out);
}

/// Spell out a non-negative integer, e.g. `125000` -> "One Lakh Twenty Five Thousand".
pub fn integer_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    let mut out = Vec::new();
    push_words(n, &mut out);
    out.join(" ")
}

/// Render a rupee amount for the invoice footer.
///
/// The amount is first rounded to paise. A zero paise part omits the paise
/// clause; zero rupees renders as "Zero Rupees".
///
/// ```
/// use rust_decimal::Decimal;
/// use vyapari_core_api::domain::words::amount_in_words;
///
/// assert_eq!(amount_in_words(Decimal::ZERO), "Zero Rupees Only");
/// assert_eq!(amount_in_words(Decimal::new(150, 2)), "One Rupees and Fifty Paise Only");
/// ```
pub fn amount_in_words(amount: Decimal) -> String {
    let amount = round_money(amount.abs());
    let rupees = amount.trunc();
    let paise = ((amount - rupees) * Decimal::ONE_HUNDRED).to_u64().unwrap_or(0);
    let rupees = rupees.to_u64().unwrap_or(u64::MAX);

    let mut words = format!("{} Rupees", integer_to_words(rupees));
    if paise > 0 {
        words.push_str(&format!(" and {} Paise", integer_to_words(paise)));
    }
    words.push_str(" Only");
    words
}
