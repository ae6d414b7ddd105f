//! Output formatting for deals (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::deals::dispatcher::DealsOutcome;
use crate::deals::models::Deal;

/// Formats deals for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a list of deals.
    pub fn format_deals(&self, deals: &[Deal]) -> String {
        if deals.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No deals found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json(deals),
            OutputFormat::Table => self.table_deals(deals),
            OutputFormat::Markdown => self.markdown_deals(deals),
            OutputFormat::Csv => self.csv_deals(deals),
        }
    }

    /// Formats per-source outcomes, one section per source.
    pub fn format_outcomes(&self, outcomes: &[DealsOutcome]) -> String {
        match self.format {
            OutputFormat::Json => self.json(outcomes),
            OutputFormat::Csv => {
                let mut lines = vec![format!("source,{}", self.csv_header())];
                for outcome in outcomes {
                    for deal in &outcome.deals {
                        lines.push(format!("{},{}", outcome.source, Self::csv_row(deal)));
                    }
                }
                lines.join("\n")
            }
            OutputFormat::Table | OutputFormat::Markdown => {
                let heading = if self.format == OutputFormat::Markdown { "## " } else { "== " };
                outcomes
                    .iter()
                    .map(|outcome| {
                        let body = match &outcome.failure {
                            Some(failure) => format!("Failed: {}", failure),
                            None => self.format_deals(&outcome.deals),
                        };
                        format!("{}{}\n\n{}", heading, outcome.source.name(), body)
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
        }
    }

    fn json<T: serde::Serialize + ?Sized>(&self, value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_deals(&self, deals: &[Deal]) -> String {
        let price_width = 14;
        let unit_width = 10;
        let title_width = 50;

        let mut lines = Vec::new();

        lines.push(format!("{:<price_width$}  {:<unit_width$}  {}", "Price", "Unit", "Title"));
        lines.push(format!("{:-<price_width$}  {:-<unit_width$}  {:-<title_width$}", "", "", ""));

        for deal in deals {
            let unit = deal.unit.as_deref().unwrap_or("-");
            lines.push(format!(
                "{:>price_width$}  {:<unit_width$}  {}",
                truncate(&deal.price, price_width),
                truncate(unit, unit_width),
                truncate(&deal.title, title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} deals", deals.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_deals(&self, deals: &[Deal]) -> String {
        let mut lines = Vec::new();

        lines.push("| Price | Was | Stock | Title |".to_string());
        lines.push("|-------|-----|-------|-------|".to_string());

        for deal in deals {
            lines.push(format!(
                "| {} | {} | {} | [{}]({}) |",
                deal.price,
                deal.old_price.as_deref().map(|p| format!("~~{}~~", p)).unwrap_or_default(),
                deal.stock.as_deref().unwrap_or(""),
                truncate(&deal.title, 40).replace('|', "\\|"),
                deal.link
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} deals found*", deals.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "title,price,old_price,unit,stock,image,link".to_string()
    }

    fn csv_deals(&self, deals: &[Deal]) -> String {
        let mut lines = vec![self.csv_header()];
        lines.extend(deals.iter().map(Self::csv_row));
        lines.join("\n")
    }

    fn csv_row(deal: &Deal) -> String {
        let optional = |v: &Option<String>| v.as_deref().map(Self::csv_escape).unwrap_or_default();

        format!(
            "{},{},{},{},{},{},{}",
            Self::csv_escape(&deal.title),
            Self::csv_escape(&deal.price),
            optional(&deal.old_price),
            optional(&deal.unit),
            optional(&deal.stock),
            Self::csv_escape(&deal.image),
            Self::csv_escape(&deal.link)
        )
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Shortens to `max` characters, ending with `...` when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
