//! Console rendering of the ranked results.

use analyzer::JoinStats;
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use core_types::ReturnRecord;
use rust_decimal::{Decimal, RoundingStrategy};

const ISSUER_WIDTH: usize = 16;

/// Renders one ranking as a table.
pub fn ranking_table(records: &[&ReturnRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Kod", "Dayanak", "Tip", "İhraççı", "Strike", "Getiri"]);

    for record in records {
        let instrument = &record.instrument;
        table.add_row(vec![
            Cell::new(&instrument.code),
            Cell::new(instrument.underlying.as_deref().unwrap_or("-")),
            Cell::new(instrument.option_type.symbol()),
            Cell::new(truncate(instrument.issuer_name.as_deref().unwrap_or("-"), ISSUER_WIDTH)),
            Cell::new(format_strike(instrument.strike_price)).set_alignment(CellAlignment::Right),
            Cell::new(format_return(record.return_pct)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Prints a titled ranking to stdout.
pub fn print_ranking(title: &str, records: &[&ReturnRecord]) {
    println!("\n{}", "=".repeat(60));
    println!(" {title}");
    println!("{}", "=".repeat(60));
    println!("{}", ranking_table(records));
}

/// One-line summary of how many instruments survived the join.
pub fn coverage_line(stats: &JoinStats) -> String {
    let mut line = format!(
        "{} / {} aktif varant için başlangıç ve bitiş fiyatı bulundu",
        stats.joined, stats.instruments
    );
    if stats.rejected_start_price > 0 {
        line.push_str(&format!(
            " ({} varant sıfır veya negatif başlangıç fiyatı nedeniyle atlandı)",
            stats.rejected_start_price
        ));
    }
    if stats.overflowed_returns > 0 {
        line.push_str(&format!(
            " ({} varant getirisi hesaplanamadığı için atlandı)",
            stats.overflowed_returns
        ));
    }
    line
}

fn format_strike(strike: Option<Decimal>) -> String {
    strike.map(|s| format!("{:.2}", round2(s))).unwrap_or_else(|| "-".to_string())
}

fn format_return(return_pct: Decimal) -> String {
    let sign = if return_pct >= Decimal::ZERO { "+" } else { "" };
    format!("{sign}{:.2}%", round2(return_pct))
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn returns_are_signed_with_two_decimals() {
        assert_eq!(format_return(dec!(25)), "+25.00%");
        assert_eq!(format_return(dec!(0)), "+0.00%");
        assert_eq!(format_return(dec!(-12.345)), "-12.35%");
    }

    #[test]
    fn missing_strike_prints_a_dash() {
        assert_eq!(format_strike(Some(dec!(10.5))), "10.50");
        assert_eq!(format_strike(None), "-");
    }

    #[test]
    fn issuer_names_are_truncated_by_character() {
        assert_eq!(truncate("Garanti BBVA Yatırım", 16), "Garanti BBVA Yat");
        assert_eq!(truncate("İş Yatırım", 16), "İş Yatırım");
    }

    #[test]
    fn coverage_mentions_rejected_records_only_when_present() {
        let stats = JoinStats {
            instruments: 10,
            joined: 7,
            ..JoinStats::default()
        };
        assert!(!coverage_line(&stats).contains("atlandı"));

        let stats = JoinStats {
            rejected_start_price: 1,
            ..stats
        };
        assert!(coverage_line(&stats).contains("negatif"));

        let stats = JoinStats {
            rejected_start_price: 0,
            overflowed_returns: 2,
            ..stats
        };
        let line = coverage_line(&stats);
        assert!(line.contains("2 varant getirisi hesaplanamadığı"));
        assert!(!line.contains("negatif"));
    }
}
