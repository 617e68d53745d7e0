use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{
        customer::Entity as Customer,
        expense::{self, Entity as Expense},
        expense_category::Entity as ExpenseCategory,
        product::Entity as Product,
        sale::{self, Entity as Sale},
        sale_item::{self, Entity as SaleItem},
        user::Entity as User,
    },
    errors::ServiceError,
};

/// Named reporting periods. Resolution must stay exactly as documented; the
/// dashboards and exports all share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Today,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    ThisYear,
    AllTime,
    Custom,
}

impl ReportPeriod {
    /// Parses the query-string form; anything unrecognized resolves to
    /// `None` and callers fall back to their default period.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "today" => Some(Self::Today),
            "last_7_days" => Some(Self::Last7Days),
            "last_30_days" => Some(Self::Last30Days),
            "this_month" => Some(Self::ThisMonth),
            "last_month" => Some(Self::LastMonth),
            "this_year" => Some(Self::ThisYear),
            "all_time" => Some(Self::AllTime),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Last7Days => "last_7_days",
            Self::Last30Days => "last_30_days",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::ThisYear => "this_year",
            Self::AllTime => "all_time",
            Self::Custom => "custom",
        }
    }
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Resolves a named period to a date range relative to `today`.
///
/// `Custom` parses `start_date`/`end_date` as `%Y-%m-%d`; each field that
/// fails to parse produces a user-visible warning and falls back to the
/// corresponding bound of `default_period` rather than failing the request.
pub fn resolve_date_range(
    period: ReportPeriod,
    start_date: Option<&str>,
    end_date: Option<&str>,
    default_period: ReportPeriod,
    today: NaiveDate,
) -> (DateRange, Vec<String>) {
    let named = |p: ReportPeriod| -> DateRange {
        match p {
            ReportPeriod::Today => DateRange {
                start: today,
                end: today,
            },
            ReportPeriod::Last7Days => DateRange {
                start: today - Duration::days(6),
                end: today,
            },
            ReportPeriod::Last30Days => DateRange {
                start: today - Duration::days(29),
                end: today,
            },
            ReportPeriod::ThisMonth => DateRange {
                start: today.with_day(1).unwrap_or(today),
                end: today,
            },
            ReportPeriod::LastMonth => {
                let first_of_current = today.with_day(1).unwrap_or(today);
                let end = first_of_current.pred_opt().unwrap_or(today);
                DateRange {
                    start: end.with_day(1).unwrap_or(end),
                    end,
                }
            }
            ReportPeriod::ThisYear => DateRange {
                start: NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                end: today,
            },
            ReportPeriod::AllTime => DateRange {
                start: NaiveDate::MIN,
                end: today,
            },
            // Custom is handled below; as a named default it means "this month".
            ReportPeriod::Custom => DateRange {
                start: today.with_day(1).unwrap_or(today),
                end: today,
            },
        }
    };

    let mut warnings = Vec::new();

    if period != ReportPeriod::Custom {
        return (named(period), warnings);
    }

    let fallback = named(if default_period == ReportPeriod::Custom {
        ReportPeriod::ThisMonth
    } else {
        default_period
    });

    let start = match start_date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|_| {
            warnings.push("Invalid start date format for custom range.".to_string());
            fallback.start
        }),
        None => fallback.start,
    };
    let end = match end_date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|_| {
            warnings.push("Invalid end date format for custom range.".to_string());
            fallback.end
        }),
        None => fallback.end,
    };

    (DateRange { start, end }, warnings)
}

/// One day's bucketed sales total.
#[derive(Debug, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total: Decimal,
}

/// Sales dashboard payload.
#[derive(Debug, Serialize)]
pub struct SalesSummaryReport {
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_revenue: Decimal,
    pub transaction_count: u64,
    pub average_sale_value: Decimal,
    pub daily_sales: Vec<DailySales>,
    pub chart_labels: Vec<String>,
    pub chart_data: Vec<f64>,
    pub warnings: Vec<String>,
}

/// Per-product sales aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPerformance {
    pub product_id: i32,
    pub name: String,
    pub total_quantity_sold: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ProductPerformanceReport {
    pub by_quantity: Vec<ProductPerformance>,
    pub by_revenue: Vec<ProductPerformance>,
}

#[derive(Debug, Serialize)]
pub struct CategoryExpense {
    pub category_name: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct MonthlyExpense {
    /// `%Y-%m` bucket
    pub month: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ExpenseReport {
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_expenses: Decimal,
    pub by_category: Vec<CategoryExpense>,
    pub monthly: Vec<MonthlyExpense>,
    pub chart_labels: Vec<String>,
    pub chart_data: Vec<f64>,
    pub warnings: Vec<String>,
}

/// A generated CSV document.
#[derive(Debug)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

/// Aggregation reports over sales and expenses. All math happens over rows
/// fetched in one pass; the store does the filtering, the service does the
/// bucketing.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Revenue, transaction count, average sale value and a day-bucketed
    /// series for the resolved range, optionally restricted to one
    /// employee's sales.
    #[instrument(skip(self))]
    pub async fn sales_summary(
        &self,
        period: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        user_id: Option<i32>,
    ) -> Result<SalesSummaryReport, ServiceError> {
        let db = &*self.db;
        let today = Utc::now().date_naive();

        let period = period
            .and_then(ReportPeriod::parse)
            .unwrap_or(ReportPeriod::Last30Days);
        let (range, warnings) = resolve_date_range(
            period,
            start_date,
            end_date,
            ReportPeriod::Last30Days,
            today,
        );

        let (range_start, range_end) = datetime_bounds(&range);

        let mut query = Sale::find()
            .filter(sale::Column::SaleDate.gte(range_start))
            .filter(sale::Column::SaleDate.lt(range_end));
        if let Some(uid) = user_id {
            query = query.filter(sale::Column::UserId.eq(uid));
        }

        let sales = query
            .order_by_asc(sale::Column::SaleDate)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let transaction_count = sales.len() as u64;
        let total_revenue: Decimal = sales.iter().map(|s| s.total_amount).sum();
        let average_sale_value = if transaction_count > 0 {
            (total_revenue / Decimal::from(transaction_count)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for sale_row in &sales {
            *buckets
                .entry(sale_row.sale_date.date_naive())
                .or_insert(Decimal::ZERO) += sale_row.total_amount;
        }

        let daily_sales: Vec<DailySales> = buckets
            .into_iter()
            .map(|(date, total)| DailySales { date, total })
            .collect();
        let chart_labels = daily_sales
            .iter()
            .map(|d| d.date.format("%Y-%m-%d").to_string())
            .collect();
        let chart_data = daily_sales
            .iter()
            .map(|d| d.total.to_f64().unwrap_or(0.0))
            .collect();

        Ok(SalesSummaryReport {
            period: period.as_str().to_string(),
            start_date: range.start,
            end_date: range.end,
            total_revenue,
            transaction_count,
            average_sale_value,
            daily_sales,
            chart_labels,
            chart_data,
            warnings,
        })
    }

    /// Per-product quantity sold and revenue, products with no sales
    /// omitted.
    #[instrument(skip(self))]
    pub async fn product_performance(&self) -> Result<ProductPerformanceReport, ServiceError> {
        let db = &*self.db;

        let rows = SaleItem::find()
            .find_also_related(Product)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut aggregates: HashMap<i32, ProductPerformance> = HashMap::new();
        for (item, prod) in &rows {
            let entry = aggregates
                .entry(item.product_id)
                .or_insert_with(|| ProductPerformance {
                    product_id: item.product_id,
                    name: prod
                        .as_ref()
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| "unknown".to_string()),
                    total_quantity_sold: 0,
                    total_revenue: Decimal::ZERO,
                });
            entry.total_quantity_sold += item.quantity as i64;
            entry.total_revenue += item.unit_price * Decimal::from(item.quantity);
        }

        let sold: Vec<ProductPerformance> = aggregates
            .into_values()
            .filter(|p| p.total_quantity_sold > 0)
            .collect();

        let mut by_quantity = sold.clone();
        by_quantity.sort_by(|a, b| b.total_quantity_sold.cmp(&a.total_quantity_sold));

        let mut by_revenue = sold;
        by_revenue.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));

        Ok(ProductPerformanceReport {
            by_quantity,
            by_revenue,
        })
    }

    /// Total, per-category breakdown and month-bucketed series for the
    /// resolved range. Defaults to this month.
    #[instrument(skip(self))]
    pub async fn expense_report(
        &self,
        period: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<ExpenseReport, ServiceError> {
        let db = &*self.db;
        let today = Utc::now().date_naive();

        let period = period
            .and_then(ReportPeriod::parse)
            .unwrap_or(ReportPeriod::ThisMonth);
        let (range, warnings) =
            resolve_date_range(period, start_date, end_date, ReportPeriod::ThisMonth, today);

        let rows = Expense::find()
            .filter(expense::Column::Date.gte(range.start))
            .filter(expense::Column::Date.lte(range.end))
            .find_also_related(ExpenseCategory)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let total_expenses: Decimal = rows.iter().map(|(e, _)| e.amount).sum();

        let mut per_category: HashMap<String, Decimal> = HashMap::new();
        let mut per_month: BTreeMap<String, Decimal> = BTreeMap::new();
        for (exp, cat) in &rows {
            let category_name = cat
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "uncategorized".to_string());
            *per_category.entry(category_name).or_insert(Decimal::ZERO) += exp.amount;
            *per_month
                .entry(exp.date.format("%Y-%m").to_string())
                .or_insert(Decimal::ZERO) += exp.amount;
        }

        let mut by_category: Vec<CategoryExpense> = per_category
            .into_iter()
            .map(|(category_name, total_amount)| CategoryExpense {
                category_name,
                total_amount,
            })
            .collect();
        by_category.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

        let monthly: Vec<MonthlyExpense> = per_month
            .into_iter()
            .map(|(month, total_amount)| MonthlyExpense {
                month,
                total_amount,
            })
            .collect();
        let chart_labels = monthly.iter().map(|m| m.month.clone()).collect();
        let chart_data = monthly
            .iter()
            .map(|m| m.total_amount.to_f64().unwrap_or(0.0))
            .collect();

        Ok(ExpenseReport {
            period: period.as_str().to_string(),
            start_date: range.start,
            end_date: range.end,
            total_expenses,
            by_category,
            monthly,
            chart_labels,
            chart_data,
            warnings,
        })
    }

    /// Exports sales as CSV, one row per line item, a placeholder row for a
    /// sale without items. Periods: daily / weekly / monthly / anything
    /// else = all time.
    #[instrument(skip(self))]
    pub async fn export_sales_csv(&self, period: &str) -> Result<CsvExport, ServiceError> {
        let db = &*self.db;
        let now = Utc::now();

        let start: DateTime<Utc> = match period {
            "daily" => now - Duration::days(1),
            "weekly" => now - Duration::weeks(1),
            "monthly" => now - Duration::days(30),
            _ => DateTime::<Utc>::MIN_UTC,
        };

        let sales = Sale::find()
            .filter(sale::Column::SaleDate.gte(start))
            .filter(sale::Column::SaleDate.lte(now))
            .order_by_asc(sale::Column::SaleDate)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let sale_ids: Vec<i32> = sales.iter().map(|s| s.id).collect();

        let mut items_by_sale: HashMap<i32, Vec<(sale_item::Model, String)>> = HashMap::new();
        if !sale_ids.is_empty() {
            let items = SaleItem::find()
                .filter(sale_item::Column::SaleId.is_in(sale_ids.clone()))
                .find_also_related(Product)
                .all(db)
                .await
                .map_err(ServiceError::db_error)?;
            for (item, prod) in items {
                let name = prod.map(|p| p.name).unwrap_or_else(|| "unknown".to_string());
                items_by_sale.entry(item.sale_id).or_default().push((item, name));
            }
        }

        let usernames = {
            let user_rows = User::find().all(db).await.map_err(ServiceError::db_error)?;
            user_rows
                .into_iter()
                .map(|u| (u.id, u.username))
                .collect::<HashMap<_, _>>()
        };
        let customer_names = {
            let customer_rows = Customer::find()
                .all(db)
                .await
                .map_err(ServiceError::db_error)?;
            customer_rows
                .into_iter()
                .map(|c| (c.id, c.full_name()))
                .collect::<HashMap<_, _>>()
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "Sale ID",
                "Sale Date",
                "Total Amount",
                "Processed By",
                "Customer",
                "Product Name",
                "Quantity",
                "Unit Price",
                "Subtotal",
            ])
            .map_err(csv_err)?;

        for sale_row in &sales {
            let processed_by = sale_row
                .user_id
                .and_then(|id| usernames.get(&id).cloned())
                .unwrap_or_else(|| "N/A (User Deleted/Missing)".to_string());
            let customer_name = sale_row
                .customer_id
                .and_then(|id| customer_names.get(&id).cloned())
                .unwrap_or_default();
            let sale_fields = [
                sale_row.id.to_string(),
                sale_row.sale_date.format("%Y-%m-%d %H:%M:%S").to_string(),
                format!("{:.2}", sale_row.total_amount),
                processed_by,
                customer_name,
            ];

            match items_by_sale.get(&sale_row.id) {
                Some(items) if !items.is_empty() => {
                    for (item, product_name) in items {
                        let mut record = sale_fields.to_vec();
                        record.push(product_name.clone());
                        record.push(item.quantity.to_string());
                        record.push(format!("{:.2}", item.unit_price));
                        record.push(format!("{:.2}", item.subtotal));
                        writer.write_record(&record).map_err(csv_err)?;
                    }
                }
                _ => {
                    // Keep the sale visible in the export even without lines.
                    let mut record = sale_fields.to_vec();
                    record.push("(no items)".to_string());
                    record.push("0".to_string());
                    record.push(String::new());
                    record.push(String::new());
                    writer.write_record(&record).map_err(csv_err)?;
                }
            }
        }

        let body = String::from_utf8(
            writer
                .into_inner()
                .map_err(|e| ServiceError::InternalError(format!("CSV buffer error: {}", e)))?,
        )
        .map_err(|e| ServiceError::InternalError(format!("CSV encoding error: {}", e)))?;

        let filename = format!(
            "sales_report_{}_{}.csv",
            period,
            now.format("%Y%m%d_%H%M%S")
        );

        info!(rows = sales.len(), %filename, "Sales CSV export generated");

        Ok(CsvExport { filename, body })
    }
}

fn datetime_bounds(range: &DateRange) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = range
        .start
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = range
        .end
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

fn csv_err(err: csv::Error) -> ServiceError {
    ServiceError::InternalError(format!("CSV write error: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_resolves_to_single_day() {
        let today = date(2024, 3, 15);
        let (range, warnings) =
            resolve_date_range(ReportPeriod::Today, None, None, ReportPeriod::Last30Days, today);
        assert_eq!(range.start, today);
        assert_eq!(range.end, today);
        assert!(warnings.is_empty());
    }

    #[test]
    fn last_7_days_includes_today() {
        let today = date(2024, 3, 15);
        let (range, _) = resolve_date_range(
            ReportPeriod::Last7Days,
            None,
            None,
            ReportPeriod::Last30Days,
            today,
        );
        assert_eq!(range.start, date(2024, 3, 9));
        assert_eq!(range.end, today);
    }

    #[test]
    fn last_30_days_includes_today() {
        let today = date(2024, 3, 15);
        let (range, _) = resolve_date_range(
            ReportPeriod::Last30Days,
            None,
            None,
            ReportPeriod::Last30Days,
            today,
        );
        assert_eq!(range.start, date(2024, 2, 15));
        assert_eq!(range.end, today);
    }

    #[test]
    fn last_month_handles_leap_february() {
        let today = date(2024, 3, 15);
        let (range, _) = resolve_date_range(
            ReportPeriod::LastMonth,
            None,
            None,
            ReportPeriod::ThisMonth,
            today,
        );
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.end, date(2024, 2, 29));
    }

    #[test]
    fn last_month_crosses_year_boundary() {
        let today = date(2024, 1, 10);
        let (range, _) = resolve_date_range(
            ReportPeriod::LastMonth,
            None,
            None,
            ReportPeriod::ThisMonth,
            today,
        );
        assert_eq!(range.start, date(2023, 12, 1));
        assert_eq!(range.end, date(2023, 12, 31));
    }

    #[test]
    fn this_year_starts_january_first() {
        let today = date(2024, 3, 15);
        let (range, _) = resolve_date_range(
            ReportPeriod::ThisYear,
            None,
            None,
            ReportPeriod::ThisMonth,
            today,
        );
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, today);
    }

    #[test]
    fn all_time_starts_at_minimum_date() {
        let today = date(2024, 3, 15);
        let (range, _) = resolve_date_range(
            ReportPeriod::AllTime,
            None,
            None,
            ReportPeriod::ThisMonth,
            today,
        );
        assert_eq!(range.start, NaiveDate::MIN);
        assert_eq!(range.end, today);
    }

    #[test]
    fn custom_range_parses_both_bounds() {
        let today = date(2024, 3, 15);
        let (range, warnings) = resolve_date_range(
            ReportPeriod::Custom,
            Some("2024-01-05"),
            Some("2024-02-10"),
            ReportPeriod::ThisMonth,
            today,
        );
        assert_eq!(range.start, date(2024, 1, 5));
        assert_eq!(range.end, date(2024, 2, 10));
        assert!(warnings.is_empty());
    }

    #[test]
    fn bad_custom_date_warns_and_falls_back_to_default() {
        let today = date(2024, 3, 15);
        let (range, warnings) = resolve_date_range(
            ReportPeriod::Custom,
            Some("not-a-date"),
            Some("2024-03-10"),
            ReportPeriod::ThisMonth,
            today,
        );
        // Falls back to the default (this month) start.
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 10));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn unknown_period_string_is_rejected_by_parse() {
        assert_eq!(ReportPeriod::parse("fortnight"), None);
        assert_eq!(ReportPeriod::parse("last_month"), Some(ReportPeriod::LastMonth));
    }
}
