//! Turns a `Statement` into a self-contained HTML document for the PDF engine.

use crate::statement::{Statement, StatementLine};
use crate::totals::format_currency;
use crate::Labels;
use chrono::Datelike;
use rust_decimal::Decimal;

const STYLESHEET: &str = include_str!("statement.css");
const BANK_NAME: &str = "DBS Bank";
const DEBIT: &str = "debit";
const CREDIT: &str = "credit";

/// Renders `statement` using the text in `labels`. Every value that comes from the database is
/// escaped.
pub(crate) fn statement_html(statement: &Statement, labels: &Labels) -> String {
    let customer = statement.customer();
    let account = statement.account();
    let totals = statement.totals();

    let mut html = String::with_capacity(16 * 1024);
    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>\n{STYLESHEET}\nbody {{ font-family: {}; }}\n</style>\n\
         </head>\n<body>\n",
        escape(labels.lang),
        escape(labels.html_dir),
        escape(labels.statement_title),
        labels.font_family,
    ));

    html.push_str(&format!(
        "<div class=\"header\">\n<div class=\"logo\">{BANK_NAME}</div>\n\
         <h1 class=\"statement-title\">{}</h1>\n</div>\n",
        escape(labels.statement_title)
    ));

    html.push_str("<div class=\"customer-info info-grid\">\n<div>\n");
    html.push_str(&info_item(labels.customer, &customer.full_name()));
    html.push_str(&info_item("ID", &customer.customer_id.to_string()));
    html.push_str(&info_item(labels.email, &customer.email));
    html.push_str(&info_item(labels.phone, &customer.phone));
    html.push_str(&info_item(labels.address, &customer.address));
    html.push_str("</div>\n<div>\n");
    html.push_str(&info_item(
        labels.statement_date,
        &statement.date().format("%B %d, %Y").to_string(),
    ));
    html.push_str(&info_item(labels.account_number, &account.account_number));
    html.push_str(&info_item(labels.card_number, &account.card_suffix()));
    html.push_str(&info_item(
        labels.credit_limit,
        &format_currency(account.credit_limit),
    ));
    html.push_str("</div>\n</div>\n");

    html.push_str(&format!(
        "<div class=\"account-summary\">\n<h2 class=\"summary-title\">{}</h2>\n\
         <div class=\"info-grid\">\n<div>\n",
        escape(labels.account_summary)
    ));
    html.push_str(&info_item(
        labels.total_purchases,
        &format_currency(totals.purchases()),
    ));
    html.push_str(&info_item(
        labels.total_payments,
        &format_currency(totals.payments()),
    ));
    html.push_str("</div>\n<div>\n");
    html.push_str(&info_item(labels.total_fees, &format_currency(totals.fees())));
    html.push_str(&info_item(
        labels.total_credits,
        &format_currency(totals.credits()),
    ));
    html.push_str("</div>\n</div>\n</div>\n");

    html.push_str(&format!(
        "<h2 class=\"summary-title\">{}</h2>\n<table>\n<thead>\n<tr>\
         <th>{}</th><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr>\n</thead>\n<tbody>\n",
        escape(labels.transaction_details),
        escape(labels.date),
        escape(labels.merchant),
        escape(labels.category),
        escape(labels.transaction_type),
        escape(labels.amount),
    ));
    for line in statement.lines() {
        html.push_str(&transaction_row(line));
    }
    html.push_str("</tbody>\n</table>\n");

    let net = totals.net_total();
    html.push_str("<div class=\"totals\">\n<table class=\"totals-table\">\n");
    html.push_str(&totals_row(labels.total_purchases, totals.purchases(), None));
    html.push_str(&totals_row(labels.total_payments, totals.payments(), None));
    html.push_str(&totals_row(labels.total_fees, totals.fees(), None));
    html.push_str(&totals_row(labels.total_credits, totals.credits(), None));
    html.push_str(&totals_row(
        labels.current_balance,
        net,
        Some(balance_class(net)),
    ));
    html.push_str("</table>\n</div>\n");

    html.push_str(&format!(
        "<div class=\"footer\">\n<p>{}</p>\n<p>{}</p>\n</div>\n</body>\n</html>\n",
        escape(labels.footer_text),
        escape(&labels.copyright(statement.date().year())),
    ));
    html
}

fn info_item(label: &str, value: &str) -> String {
    format!(
        "<div class=\"info-item\"><span class=\"label\">{}:</span> {}</div>\n",
        escape(label),
        escape(value)
    )
}

fn transaction_row(line: &StatementLine) -> String {
    let record = &line.record;
    let class = if line.is_debit() { DEBIT } else { CREDIT };
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{class}\">{}</td></tr>\n",
        record.transaction_date().format("%Y-%m-%d"),
        escape(record.merchant_name()),
        escape(record.category()),
        escape(record.transaction_type()),
        escape(&format_currency(line.amount)),
    )
}

fn totals_row(label: &str, amount: Decimal, class: Option<&str>) -> String {
    match class {
        Some(class) => format!(
            "<tr class=\"total-row\"><td>{}</td><td class=\"{class}\">{}</td></tr>\n",
            escape(label),
            escape(&format_currency(amount))
        ),
        None => format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape(label),
            escape(&format_currency(amount))
        ),
    }
}

/// A balance above zero is owed by the customer.
fn balance_class(net: Decimal) -> &'static str {
    if net > Decimal::ZERO {
        DEBIT
    } else {
        CREDIT
    }
}

/// Escapes text for use in HTML element content and double-quoted attribute values.
fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, Customer, Language, TransactionRecord};
    use crate::Translations;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn statement(transactions: Vec<TransactionRecord>) -> Statement {
        let customer = Customer {
            customer_id: 7,
            first_name: "Tom".to_string(),
            last_name: "<script>".to_string(),
            email: "tom@example.com".to_string(),
            phone: "N/A".to_string(),
            address: "1 Rock & Roll Way".to_string(),
        };
        let account = Account {
            account_id: 3,
            account_number: "ACC-0007".to_string(),
            account_type: "Platinum".to_string(),
            card_number: "4532015112830366".to_string(),
            credit_limit: Decimal::from_str("15000").unwrap(),
        };
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        Statement::new(customer, account, transactions, date).unwrap()
    }

    fn tx(merchant: &str, amount: &str, transaction_type: &str) -> TransactionRecord {
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            merchant,
            amount,
            transaction_type,
            None,
        )
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_english_statement() {
        let translations = Translations::builtin();
        let html = statement_html(
            &statement(vec![
                tx("Coffee & Co", "1234.5", "Purchase"),
                tx("Bank", "200.00", "Payment"),
            ]),
            translations.get(Language::En),
        );
        assert!(html.contains("<html lang=\"en\" dir=\"ltr\">"));
        assert!(html.contains("DBS Bank Credit Card Statement"));
        assert!(html.contains("March 04, 2025"));
        assert!(html.contains("XXXX-0366"));
        assert!(!html.contains("4532015112830366"));
        assert!(html.contains("$15,000.00"));
        assert!(html.contains("2025-02-28"));
        assert!(html.contains("Coffee &amp; Co"));
        assert!(html.contains("General"));
        assert!(html.contains("<td class=\"debit\">$1,234.50</td>"));
        assert!(html.contains("<td class=\"credit\">$200.00</td>"));
        assert!(html.contains("<td class=\"debit\">$1,034.50</td>"));
        assert!(html.contains("© 2025 DBS Bank. All rights reserved."));
    }

    #[test]
    fn test_database_text_is_escaped() {
        let translations = Translations::builtin();
        let html = statement_html(
            &statement(vec![tx("<b>Evil</b>", "1.00", "Fee")]),
            translations.get(Language::En),
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("Tom &lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;Evil&lt;/b&gt;"));
        assert!(html.contains("1 Rock &amp; Roll Way"));
    }

    #[test]
    fn test_credit_balance() {
        let translations = Translations::builtin();
        let html = statement_html(
            &statement(vec![tx("Shop", "10.00", "Refund")]),
            translations.get(Language::Zh),
        );
        assert!(html.contains("<html lang=\"zh\" dir=\"ltr\">"));
        assert!(html.contains("当前余额"));
        assert!(html.contains("<td class=\"credit\">-$10.00</td>"));
        assert!(html.contains("Noto Sans SC"));
    }

    #[test]
    fn test_balance_class() {
        assert_eq!(balance_class(Decimal::new(1, 2)), DEBIT);
        assert_eq!(balance_class(Decimal::ZERO), CREDIT);
        assert_eq!(balance_class(Decimal::new(-1, 2)), CREDIT);
    }
}
