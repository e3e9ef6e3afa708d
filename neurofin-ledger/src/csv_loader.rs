//! Load transaction CSV exports into typed transactions.
//!
//! Expected header:
//! id,date,category,amount,emoji,description,type
//!
//! Only `date` and `amount` are required per row. A blank `category` or
//! `emoji` is filled from the description by the category rules, a blank `id`
//! becomes the 1-based row number. A negative amount is a refund: it is
//! loaded as income with the absolute amount, so it never lowers a category
//! total below zero.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use neurofin_core::{Transaction, TxnKind};
use regex::Regex;
use std::path::Path;

use crate::category_rules::categorize;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

// -1,234.50 / €18.90 / 18.90 € / 12
const AMOUNT_PATTERN: &str = concat!(
    r"^(?P<neg>-)?\s*[€$£]?\s*",
    r"(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)",
    r"\s*[€$£]?$"
);

/// Parse a transactions CSV file, returning all valid rows.
/// Rows with an unparseable date or amount are skipped with a warning.
pub fn load_transactions_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let amount_re = Regex::new(AMOUNT_PATTERN)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    let col = Columns::from_headers(&headers)
        .with_context(|| format!("{}: header must name at least `date` and `amount`", path.display()))?;

    let mut txns = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = result.with_context(|| format!("reading row {row} of {}", path.display()))?;

        let date_str = col.get(&record, col.date);
        let Some(date) = parse_date(date_str) else {
            tracing::warn!(row, date = date_str, "skipping row with unparseable date");
            continue;
        };

        let amount_str = col.get(&record, col.amount);
        let Some(amount) = parse_amount(&amount_re, amount_str) else {
            tracing::warn!(row, amount = amount_str, "skipping row with unparseable amount");
            continue;
        };

        let description = col.get(&record, col.description);
        let guess = categorize(description);
        let category = non_empty(col.get(&record, col.category)).unwrap_or(guess.category);
        let emoji = non_empty(col.get(&record, col.emoji)).unwrap_or(guess.emoji);
        let id = col.get(&record, col.id).parse().unwrap_or(row as u64);

        let mut kind = TxnKind::parse(col.get(&record, col.kind));
        if amount < 0.0 {
            tracing::debug!(row, amount, "negative amount loaded as a refund");
            kind = Some(TxnKind::Income);
        }

        let mut txn = Transaction::new(id, date, category, amount.abs(), emoji);
        if !description.is_empty() {
            txn = txn.with_description(description);
        }
        if let Some(kind) = kind {
            txn = txn.with_kind(kind);
        }
        txns.push(txn);
    }

    tracing::debug!(count = txns.len(), path = %path.display(), "loaded transactions");
    Ok(txns)
}

/// Column positions resolved from the header row, so column order is free.
struct Columns {
    id: Option<usize>,
    date: Option<usize>,
    category: Option<usize>,
    amount: Option<usize>,
    emoji: Option<usize>,
    description: Option<usize>,
    kind: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Option<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let cols = Self {
            id: find("id"),
            date: find("date"),
            category: find("category"),
            amount: find("amount"),
            emoji: find("emoji"),
            description: find("description"),
            kind: find("type"),
        };
        (cols.date.is_some() && cols.amount.is_some()).then_some(cols)
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, idx: Option<usize>) -> &'r str {
        idx.and_then(|i| record.get(i)).unwrap_or("")
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Accepts a currency symbol on either side and thousands separators.
fn parse_amount(re: &Regex, s: &str) -> Option<f64> {
    let caps = re.captures(s)?;
    let value: f64 = caps["num"].replace(',', "").parse().ok()?;
    Some(if caps.name("neg").is_some() { -value } else { value })
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_full_rows() {
        let f = write_csv(
            "id,date,category,amount,emoji,description,type\n\
             7,2025-10-01,Groceries,42.10,🛒,Lidl weekly shop,expense\n\
             8,2025-10-02,Salary,1500,💼,October payroll,income\n",
        );
        let txns = load_transactions_csv(f.path()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].id, 7);
        assert_eq!(txns[0].category, "Groceries");
        assert_eq!(txns[0].description.as_deref(), Some("Lidl weekly shop"));
        assert_eq!(txns[1].kind, Some(TxnKind::Income));
        assert!(!txns[1].is_expense());
    }

    #[test]
    fn test_bad_rows_skipped() {
        let f = write_csv(
            "id,date,category,amount,emoji,description,type\n\
             1,not-a-date,Groceries,10,🛒,,\n\
             2,2025-10-01,Groceries,ten,🛒,,\n\
             3,2025-10-01,Groceries,10,🛒,,\n",
        );
        let txns = load_transactions_csv(f.path()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].id, 3);
    }

    #[test]
    fn test_missing_category_filled_by_rules() {
        let f = write_csv("date,amount,description\n10/03/2025,€18.90,UBER EATS order\n");
        let txns = load_transactions_csv(f.path()).unwrap();
        assert_eq!(txns[0].category, "Food Delivery");
        assert_eq!(txns[0].emoji, "🍕");
        assert_eq!(txns[0].amount, 18.90);
        assert_eq!(txns[0].id, 1);
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2025, 10, 3).unwrap());
    }

    #[test]
    fn test_refund_rows_never_reduce_category_totals() {
        let f = write_csv(
            "date,category,amount,type\n\
             2025-10-01,Groceries,10.00,\n\
             2025-10-02,Groceries,-30.00,\n\
             2025-10-03,Transport,5.00,\n\
             2025-10-04,Shopping,-12.00,expense\n",
        );
        let txns = load_transactions_csv(f.path()).unwrap();
        assert_eq!(txns.len(), 4);
        assert_eq!(txns[1].kind, Some(TxnKind::Income));
        assert_eq!(txns[1].amount, 30.0);
        assert!(!txns[3].is_expense());

        let cats = neurofin_core::aggregate(&txns);
        assert!(cats.iter().all(|c| c.value >= 0.0));
        assert_eq!(cats[0].name, "Groceries");
        assert_eq!(cats[0].value, 10.0);
        assert_eq!(cats.len(), 2);
    }

    #[test]
    fn test_amount_formats() {
        let re = Regex::new(AMOUNT_PATTERN).unwrap();
        assert_eq!(parse_amount(&re, "€18.90"), Some(18.90));
        assert_eq!(parse_amount(&re, "18.90 €"), Some(18.90));
        assert_eq!(parse_amount(&re, "1,234.50"), Some(1234.50));
        assert_eq!(parse_amount(&re, "-12"), Some(-12.0));
        assert_eq!(parse_amount(&re, "ten"), None);
        assert_eq!(parse_amount(&re, "12,5"), None);
        assert_eq!(parse_amount(&re, ""), None);
    }

    #[test]
    fn test_header_without_amount_is_an_error() {
        let f = write_csv("id,date,category\n1,2025-10-01,Groceries\n");
        assert!(load_transactions_csv(f.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_transactions_csv("/definitely/not/here.csv").unwrap_err();
        assert!(err.to_string().contains("opening"));
    }
}
