//! Static HTML rendering for the monthly financial report.
//!
//! Query execution lives behind [`ReportSource`]; this module only turns
//! tabular results and the net worth series into a single page written to
//! `<dir>/<month>.html`.

use crate::error::Result;
use chrono::NaiveDate;
use log::info;
use std::path::{Path, PathBuf};

const STATEMENT_COLUMNS: [&str; 6] = [
    "Account",
    "3 years ago",
    "2 years ago",
    "1 year ago",
    "1 month ago",
    "This month",
];
const STATEMENT_CLASSES: [&str; 6] = ["", "right", "right", "right", "right", "right"];
const BURN_COLUMNS: [&str; 3] = ["Burn", "Months", "Drop Dead"];
const BURN_CLASSES: [&str; 3] = ["center", "center", "center"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetWorthPoint {
    pub month: NaiveDate,
    pub total: f64,
}

/// Supplies the four aggregate queries behind a report. Any error aborts the run.
pub trait ReportSource {
    fn income_statement(&mut self, month: NaiveDate) -> Result<QueryResult>;
    fn balance_sheet(&mut self, month: NaiveDate) -> Result<QueryResult>;
    fn burn_rate(&mut self, month: NaiveDate) -> Result<QueryResult>;
    fn net_worth(&mut self, month: NaiveDate) -> Result<Vec<NetWorthPoint>>;
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_row<S: AsRef<str>>(cells: &[S], cell_tag: &str, classes: &[&str]) -> String {
    let mut row = String::from("<tr>");
    for (i, cell) in cells.iter().enumerate() {
        let class = classes.get(i).copied().unwrap_or("");
        row.push_str(&format!(
            "<{tag} class=\"{class}\">{data}</{tag}>",
            tag = cell_tag,
            class = class,
            data = escape_html(cell.as_ref())
        ));
    }
    row.push_str("</tr>");
    row
}

/// Renders a table with a header row and one body row per result row.
/// Cell `i` gets `classes[i]`, or an empty class when there are fewer classes than cells.
pub fn render_table<S: AsRef<str>>(
    id: &str,
    columns: &[S],
    rows: &[Vec<String>],
    classes: &[&str],
) -> String {
    let header = render_row(columns, "th", classes);
    let body = rows
        .iter()
        .map(|row| render_row(row, "td", classes))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\n<table cellpadding=0 cellspacing=0 border=0 class=\"display\" id=\"{}\">\n<thead>{}</thead>\n<tbody>{}</tbody>\n</table>\n",
        escape_html(id),
        header,
        body
    )
}

/// Renders the series as a JavaScript array literal: `[['2009-01-01',100.5],...]`.
pub fn render_chart_data(points: &[NetWorthPoint]) -> String {
    let items: Vec<String> = points
        .iter()
        .map(|p| format!("['{}',{}]", p.month.format("%Y-%m-%d"), p.total))
        .collect();
    format!("[{}]", items.join(","))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    pub month: NaiveDate,
    pub balance_sheet: String,
    pub income_statement: String,
    pub burn_rate: String,
    pub net_worth_data: String,
}

impl ReportPage {
    pub fn month_label(&self) -> String {
        self.month.format("%Y-%m-%d").to_string()
    }

    pub fn render(&self) -> String {
        let month = self.month_label();
        format!(
            r#"<html>
<head>
<script type="text/javascript">
var net_worth_line = {net_worth};
</script>
<title>{month} Reports</title>
</head>
<body>
<div id="container">
<h1>{month}</h1>
<h2>Balance Sheet</h2>
{balance_sheet}
<h2>Net Worth by Month</h2>
<div id="net_worth_chart" style="height:300px; width:650px"></div>
<br />
<h2>Income Statement</h2>
{income_statement}
<br /><br />
<h2>Burn Rate</h2>
{burn_rate}
</div>
</body>
</html>
"#,
            net_worth = self.net_worth_data,
            month = month,
            balance_sheet = self.balance_sheet,
            income_statement = self.income_statement,
            burn_rate = self.burn_rate,
        )
    }

    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.html", self.month_label()))
    }
}

/// Runs every query for `month` and assembles the page sections.
pub fn build_report<S: ReportSource + ?Sized>(source: &mut S, month: NaiveDate) -> Result<ReportPage> {
    let income = source.income_statement(month)?;
    let balance = source.balance_sheet(month)?;
    let burn = source.burn_rate(month)?;
    let net_worth = source.net_worth(month)?;

    Ok(ReportPage {
        month,
        balance_sheet: render_table("balance", &STATEMENT_COLUMNS, &balance.rows, &STATEMENT_CLASSES),
        income_statement: render_table("income", &STATEMENT_COLUMNS, &income.rows, &STATEMENT_CLASSES),
        burn_rate: render_table("burn", &BURN_COLUMNS, &burn.rows, &BURN_CLASSES),
        net_worth_data: render_chart_data(&net_worth),
    })
}

pub fn write_report(dir: &Path, page: &ReportPage) -> Result<PathBuf> {
    let path = page.output_path(dir);
    std::fs::write(&path, page.render())?;
    info!("Wrote report for {} to {}", page.month_label(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerSynthError;

    fn month() -> NaiveDate {
        NaiveDate::from_ymd_opt(2011, 6, 1).unwrap()
    }

    struct FixedSource;

    impl ReportSource for FixedSource {
        fn income_statement(&mut self, _month: NaiveDate) -> Result<QueryResult> {
            Ok(QueryResult::new(vec![vec![
                "Expenses:Rent".to_string(),
                "1000.00".to_string(),
                "1100.00".to_string(),
                "1150.00".to_string(),
                "1200.00".to_string(),
                "1200.00".to_string(),
            ]]))
        }

        fn balance_sheet(&mut self, _month: NaiveDate) -> Result<QueryResult> {
            Ok(QueryResult::new(vec![vec![
                "Assets:Checking".to_string(),
                "100".to_string(),
                "200".to_string(),
                "300".to_string(),
                "400".to_string(),
                "500".to_string(),
            ]]))
        }

        fn burn_rate(&mut self, _month: NaiveDate) -> Result<QueryResult> {
            Ok(QueryResult::new(vec![vec![
                "2500.00".to_string(),
                "14".to_string(),
                "2012-09-01".to_string(),
            ]]))
        }

        fn net_worth(&mut self, _month: NaiveDate) -> Result<Vec<NetWorthPoint>> {
            Ok(vec![
                NetWorthPoint {
                    month: NaiveDate::from_ymd_opt(2011, 5, 1).unwrap(),
                    total: 1000.5,
                },
                NetWorthPoint {
                    month: NaiveDate::from_ymd_opt(2011, 6, 1).unwrap(),
                    total: 1200.0,
                },
            ])
        }
    }

    struct BrokenSource;

    impl ReportSource for BrokenSource {
        fn income_statement(&mut self, _month: NaiveDate) -> Result<QueryResult> {
            Err(LedgerSynthError::QueryError("connection refused".to_string()))
        }

        fn balance_sheet(&mut self, _month: NaiveDate) -> Result<QueryResult> {
            Ok(QueryResult::default())
        }

        fn burn_rate(&mut self, _month: NaiveDate) -> Result<QueryResult> {
            Ok(QueryResult::default())
        }

        fn net_worth(&mut self, _month: NaiveDate) -> Result<Vec<NetWorthPoint>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_render_table_structure() {
        let html = render_table(
            "burn",
            &["Burn", "Months"],
            &[vec!["10".to_string(), "3".to_string()]],
            &["center"],
        );
        assert!(html.contains("id=\"burn\""));
        assert!(html.contains(
            "<thead><tr><th class=\"center\">Burn</th><th class=\"\">Months</th></tr></thead>"
        ));
        assert!(html.contains(
            "<tbody><tr><td class=\"center\">10</td><td class=\"\">3</td></tr></tbody>"
        ));
    }

    #[test]
    fn test_render_table_escapes_cells() {
        let html = render_table("t", &["A"], &[vec!["<b>R&D</b>".to_string()]], &[]);
        assert!(html.contains("&lt;b&gt;R&amp;D&lt;/b&gt;"));
    }

    #[test]
    fn test_render_table_without_rows() {
        let html = render_table("empty", &["A"], &[], &[]);
        assert!(html.contains("<tbody></tbody>"));
    }

    #[test]
    fn test_render_chart_data() {
        let points = FixedSource.net_worth(month()).unwrap();
        assert_eq!(
            render_chart_data(&points),
            "[['2011-05-01',1000.5],['2011-06-01',1200]]"
        );
        assert_eq!(render_chart_data(&[]), "[]");
    }

    #[test]
    fn test_build_and_render_page() {
        let page = build_report(&mut FixedSource, month()).unwrap();
        let html = page.render();

        assert!(html.contains("<title>2011-06-01 Reports</title>"));
        assert!(html.contains("<h1>2011-06-01</h1>"));
        assert!(html.contains("id=\"balance\""));
        assert!(html.contains("id=\"income\""));
        assert!(html.contains("id=\"burn\""));
        assert!(html.contains("Expenses:Rent"));
        assert!(html.contains("<th class=\"center\">Drop Dead</th>"));
        assert!(html.contains("var net_worth_line = [['2011-05-01',1000.5],['2011-06-01',1200]];"));
    }

    #[test]
    fn test_query_failure_aborts() {
        let result = build_report(&mut BrokenSource, month());
        assert!(matches!(result, Err(LedgerSynthError::QueryError(_))));
    }

    #[test]
    fn test_write_report_names_file_by_month() {
        let dir = std::env::temp_dir().join(format!("ledger-synth-report-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let page = build_report(&mut FixedSource, month()).unwrap();
        let path = write_report(&dir, &page).unwrap();

        assert_eq!(path, dir.join("2011-06-01.html"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, page.render());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
