//! Reconstructs a small statement history from hand-built page records

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use statement_history::{
    CheckRecord, Classification, HistoryReconstructor, PageExtractionRecord, PageMetadata,
    ReconstructionConfig, TransactionRow,
};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

fn page(file: &str, index: u32, statement_date: NaiveDate) -> PageMetadata {
    PageMetadata {
        statement_date: Some(statement_date),
        page_number: Some(index + 1),
        total_pages: Some(1),
        ..PageMetadata::new(file, index)
    }
}

fn statement(
    file: &str,
    statement_date: NaiveDate,
    account: &str,
    beginning: &str,
    ending: &str,
    rows: Vec<(NaiveDate, &str, &str, Option<&str>)>,
) -> Result<PageExtractionRecord, Box<dyn std::error::Error>> {
    let meta = page(file, 0, statement_date);
    let mut record = PageExtractionRecord::new(meta.clone(), Classification::Bank);
    record.statement_date = Some(statement_date);
    record.account_number = Some(account.to_string());
    record.beginning_balance = Some(BigDecimal::from_str(beginning)?);
    record.ending_balance = Some(BigDecimal::from_str(ending)?);

    for (date, description, amount, check_number) in rows {
        let mut row = TransactionRow::new(
            Some(date),
            Some(description.to_string()),
            Some(BigDecimal::from_str(amount)?),
            meta.clone(),
        );
        row.check_number = check_number.map(str::to_string);
        record.transactions.push(row);
    }

    Ok(record)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("statement_history=debug".parse()?))
        .init();

    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).ok_or("invalid date");

    println!("🏦 Statement History - Reconstruction Example\n");

    let records = vec![
        statement(
            "2020-06.pdf",
            date(2020, 6, 1)?,
            "xxxxxxx7890",
            "1000.00",
            "750.00",
            vec![(date(2020, 6, 10)?, "Check 1001", "-250.00", Some("1001"))],
        )?,
        statement(
            "2020-07.pdf",
            date(2020, 7, 1)?,
            "7890",
            "750.00",
            "800.00", // OCR misread, should be 700.00
            vec![(date(2020, 7, 2)?, "Service fee", "-50.00", None)],
        )?,
        statement(
            "2020-09.pdf",
            date(2020, 9, 1)?,
            "56-7890",
            "700.00",
            "700.00",
            vec![(date(2020, 9, 4)?, "Check", "-40.00", None)],
        )?,
    ];

    let check = CheckRecord {
        account_number: Some("567890".to_string()),
        check_number: Some("1001".to_string()),
        description: Some("Acme Property Mgmt".to_string()),
        date: Some(date(2020, 6, 10)?),
        amount: Some(BigDecimal::from_str("250.00")?),
        page: PageMetadata::new("checks.pdf", 0),
    };
    let checks = BTreeMap::from([(check.key(), check)]);

    let reconstructor = HistoryReconstructor::with_config(&ReconstructionConfig::default())?;
    let history = reconstructor.reconstruct(records, checks);

    println!("📄 Statements");
    for entry in &history.statement_summaries {
        println!(
            "  {} {} {} pages, {} transactions, net {}",
            entry.account_number.as_deref().unwrap_or("?"),
            entry
                .statement_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "?".to_string()),
            entry.page_count,
            entry.transaction_count,
            entry.net_transactions
        );
        for reason in &entry.suspicious_reasons {
            println!("    ⚠️  {}", reason);
        }
    }

    println!("\n🔎 Checks");
    println!("  not found: {:?}", history.not_found);
    println!("  not used:  {:?}", history.not_used);

    println!("\n📅 Coverage");
    for summary in &history.account_summaries {
        println!(
            "  {} {} → {} missing {:?} suspicious {:?}",
            summary.account_number,
            summary.first_statement_date,
            summary.last_statement_date,
            summary.missing_months,
            summary.suspicious_dates
        );
    }

    Ok(())
}
