use super::ui;
use crate::core::currency::{CurrencyRateProvider, lookup, parse_code};
use crate::core::insights::market_summary;
use crate::core::rates::convert;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub converted: f64,
}

pub async fn calculate<P: CurrencyRateProvider + ?Sized>(
    provider: &P,
    amount: f64,
    from: &str,
    to: &str,
) -> Result<Conversion> {
    let from = parse_code(from)?;
    let to = parse_code(to)?;
    let rate = provider.get_rate(&from, &to).await?;
    Ok(Conversion {
        amount,
        converted: convert(amount, rate),
        from,
        to,
        rate,
    })
}

fn label(code: &str) -> String {
    lookup(code).map_or(code.to_string(), |c| format!("{} {}", c.flag, c.code))
}

pub fn render(conversion: &Conversion) -> String {
    let headline = format!(
        "{:.2} {} = {}",
        conversion.amount,
        label(&conversion.from),
        ui::style_text(
            &format!("{:.2} {}", conversion.converted, label(&conversion.to)),
            ui::StyleType::Value
        )
    );
    let rate_line = ui::style_text(
        &format!(
            "1 {} = {:.4} {}",
            conversion.from, conversion.rate, conversion.to
        ),
        ui::StyleType::Subtle,
    );
    format!(
        "{headline}\n{rate_line}\n\n{}",
        market_summary(&conversion.from, &conversion.to)
    )
}

pub async fn run<P: CurrencyRateProvider + ?Sized>(
    provider: &P,
    amount: f64,
    from: &str,
    to: &str,
) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching {from}/{to} rate..."));
    let result = calculate(provider, amount, from, to).await;
    spinner.finish_and_clear();

    println!("{}", render(&result?));
    Ok(())
}
