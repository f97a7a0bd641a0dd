use deal_liquidity_forecast::*;

const SAMPLE_EXPORT: &str = "\"Deal - Wert\",\"Deal - Status\",\"Deal - Datum des gewonnenen Deals\",\"Deal - Event Datum\",\"Deal - Datum des verlorenen Deals\"
\"4000\",\"Gewonnen\",\"2024-05-06\",\"2024-07-12\",\"\"
\"2500\",\"Gewonnen\",\"2024-05-08\",\"2024-12-13\",\"\"
\"1200\",\"Verloren\",\"\",\"\",\"2024-05-14\"
";

fn main() {
    // Usage: forecast_from_csv [deals.csv] [revenues.json]
    let args: Vec<String> = std::env::args().skip(1).collect();

    let csv = match args.first() {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("❌ Could not read {}: {}", path, e);
                return;
            }
        },
        None => SAMPLE_EXPORT.to_string(),
    };

    let adjustments: Box<dyn AdjustmentSource> = match args.get(1) {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(InMemoryAdjustments::new(vec![
            RevenueAdjustment::partnership(2024, 6, 1500.0),
            RevenueAdjustment::prior_year(2024, 7, 866.0, Some(0.8)),
        ])),
    };

    let engine = match std::env::var("FORECAST_TODAY") {
        Ok(raw) => match chrono::NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(today) => ForecastEngine::default().with_today(today),
            Err(e) => {
                eprintln!("❌ FORECAST_TODAY must be YYYY-MM-DD: {}", e);
                return;
            }
        },
        Err(_) => ForecastEngine::default(),
    };

    match engine.weekly_report(Some(csv.as_str()), adjustments.as_ref()) {
        Ok(report) => {
            println!("📊 Weekly liquidity forecast\n");
            println!("  Won deals:        {}", report.won_deals);
            println!("  Total deal value: {:.2}", report.total_deal_value);
            println!();

            for entry in &report.liquidity_forecast.weekly_forecast {
                println!(
                    "  {}  {:>14}  balance {:>14}",
                    entry.period, entry.formatted_amount, entry.formatted_cumulative_balance
                );
            }

            println!(
                "\n✅ {} weeks, final balance {}",
                report.liquidity_forecast.summary.total_weeks,
                report.liquidity_forecast.summary.formatted_final_balance
            );
        }
        Err(e) => eprintln!("❌ Error: {}", e),
    }
}
