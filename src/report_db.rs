//! SQLite-backed [`ReportSource`].
//!
//! Reads a single table of monthly per-account totals:
//!
//! ```sql
//! aggregated_accounts_by_month(xtn_month TEXT, account TEXT, commodity TEXT, amount REAL)
//! ```
//!
//! `xtn_month` is the first day of the month as `YYYY-MM-DD`. Only `$` amounts
//! are reported. Bracketed (virtual) accounts are skipped everywhere, and
//! retirement/brokerage holdings are kept out of the balance sheet.

use crate::error::{LedgerSynthError, Result};
use crate::report::{NetWorthPoint, QueryResult, ReportSource};
use chrono::{Datelike, Months, NaiveDate};
use log::debug;
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use std::path::Path;

const INCOME_FILTER: &str = "commodity = '$'
    AND account NOT LIKE '%[%]%'
    AND instr(account, '401K') = 0
    AND (account LIKE '%Income%' OR account LIKE '%Expenses%' OR account LIKE '%Liabilities%')
    AND instr(account, 'Depreciation') = 0
    AND instr(account, 'Amex') = 0";

const BALANCE_FILTER: &str = "commodity = '$'
    AND account NOT LIKE '%[%]%'
    AND (account LIKE '%Assets%' OR account LIKE '%Liabilities%')
    AND instr(account, '401K') = 0
    AND instr(account, 'WePay') = 0
    AND instr(account, 'Schwab') = 0
    AND instr(account, 'Vanguard') = 0";

const SPENDING_FILTER: &str = "commodity = '$'
    AND account NOT LIKE '%[%]%'
    AND (account LIKE '%Income%' OR account LIKE '%Expenses%')";

/// Months of net spending averaged into the burn rate.
const BURN_WINDOW_MONTHS: u32 = 3;

pub struct SqliteReportSource {
    conn: Connection,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn months_back(month: NaiveDate, count: u32) -> Result<NaiveDate> {
    month.checked_sub_months(Months::new(count)).ok_or_else(|| {
        LedgerSynthError::DateError(format!("{} months before {} is out of range", count, month))
    })
}

/// Comparison months for the statement columns, oldest first:
/// 3 years ago, 2 years ago, 1 year ago, 1 month ago, this month.
fn comparison_months(month: NaiveDate) -> Result<[String; 5]> {
    Ok([
        month_key(months_back(month, 36)?),
        month_key(months_back(month, 24)?),
        month_key(months_back(month, 12)?),
        month_key(months_back(month, 1)?),
        month_key(month),
    ])
}

/// `comparison` is `=` for period activity and `<=` for running balances.
fn statement_sql(filter: &str, comparison: &str) -> String {
    let sums = ["c3y", "c2y", "c1y", "c1m", "c0"]
        .iter()
        .enumerate()
        .map(|(i, alias)| {
            format!(
                "TOTAL(CASE WHEN xtn_month {} ?{} THEN amount ELSE 0 END) AS {}",
                comparison,
                i + 1,
                alias
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT account, c3y, c2y, c1y, c1m, c0 FROM (
            SELECT account, {sums} FROM aggregated_accounts_by_month
            WHERE {filter} GROUP BY account
            UNION ALL
            SELECT 'Total' AS account, {sums} FROM aggregated_accounts_by_month
            WHERE {filter}
        )
        WHERE c3y != 0 OR c2y != 0 OR c1y != 0 OR c1m != 0 OR c0 != 0
        ORDER BY account",
        sums = sums,
        filter = filter
    )
}

impl SqliteReportSource {
    /// Opens an existing database read-only; a missing file is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn statement(&self, filter: &str, comparison: &str, month: NaiveDate) -> Result<QueryResult> {
        let months = comparison_months(first_of_month(month))?;
        let mut stmt = self.conn.prepare(&statement_sql(filter, comparison))?;

        let rows = stmt
            .query_map(params_from_iter(months.iter()), |row| {
                let mut cells = vec![row.get::<_, String>(0)?];
                for i in 1..=5 {
                    cells.push(format!("{:.2}", row.get::<_, f64>(i)?));
                }
                Ok(cells)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Statement for {} returned {} rows", month, rows.len());
        Ok(QueryResult::new(rows))
    }

    fn net_worth_at(&self, month: NaiveDate) -> Result<f64> {
        let sql = format!(
            "SELECT TOTAL(amount) FROM aggregated_accounts_by_month WHERE {} AND xtn_month <= ?1",
            BALANCE_FILTER
        );
        Ok(self
            .conn
            .query_row(&sql, params![month_key(month)], |row| row.get(0))?)
    }

    fn average_spending(&self, month: NaiveDate) -> Result<f64> {
        let window_start = months_back(month, BURN_WINDOW_MONTHS)?;
        let sql = format!(
            "SELECT TOTAL(amount) FROM aggregated_accounts_by_month
             WHERE {} AND xtn_month > ?1 AND xtn_month <= ?2",
            SPENDING_FILTER
        );
        let total: f64 = self.conn.query_row(
            &sql,
            params![month_key(window_start), month_key(month)],
            |row| row.get(0),
        )?;
        Ok(total / BURN_WINDOW_MONTHS as f64)
    }
}

impl ReportSource for SqliteReportSource {
    fn income_statement(&mut self, month: NaiveDate) -> Result<QueryResult> {
        self.statement(INCOME_FILTER, "=", month)
    }

    fn balance_sheet(&mut self, month: NaiveDate) -> Result<QueryResult> {
        self.statement(BALANCE_FILTER, "<=", month)
    }

    /// Burn is the average monthly net spending (expenses plus negative income)
    /// over the last three months. When it is positive, the runway is the
    /// number of whole months current net worth covers, and the drop-dead date
    /// is the first day of the month after the runway runs out.
    fn burn_rate(&mut self, month: NaiveDate) -> Result<QueryResult> {
        let month = first_of_month(month);
        let burn = self.average_spending(month)?;
        let net_worth = self.net_worth_at(month)?;

        let (months, drop_dead) = if burn > 0.0 {
            let runway = (net_worth / burn).floor().max(0.0) as u32;
            let drop_dead = month
                .checked_add_months(Months::new(runway + 1))
                .map(month_key)
                .unwrap_or_else(|| "n/a".to_string());
            (runway.to_string(), drop_dead)
        } else {
            ("n/a".to_string(), "n/a".to_string())
        };

        Ok(QueryResult::new(vec![vec![
            format!("{:.2}", burn),
            months,
            drop_dead,
        ]]))
    }

    fn net_worth(&mut self, month: NaiveDate) -> Result<Vec<NetWorthPoint>> {
        let sql = format!(
            "SELECT xtn_month, TOTAL(amount) FROM aggregated_accounts_by_month
             WHERE {} AND xtn_month <= ?1
             GROUP BY xtn_month ORDER BY xtn_month",
            BALANCE_FILTER
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let monthly = stmt
            .query_map(params![month_key(first_of_month(month))], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut running = 0.0;
        let mut points = Vec::with_capacity(monthly.len());
        for (raw_month, amount) in monthly {
            let month = NaiveDate::parse_from_str(&raw_month, "%Y-%m-%d").map_err(|_| {
                LedgerSynthError::QueryError(format!("Malformed xtn_month '{}'", raw_month))
            })?;
            running += amount;
            points.push(NetWorthPoint {
                month,
                total: running,
            });
        }

        Ok(points)
    }
}
