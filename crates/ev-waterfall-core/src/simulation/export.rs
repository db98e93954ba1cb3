use std::io::Write;

use super::engine::LedgerRow;
use crate::error::EvWaterfallError;
use crate::EvWaterfallResult;

/// Write the ledger as UTF-8 CSV with a header row of the `LedgerRow` field names.
pub fn write_ledger_csv<W: Write>(writer: W, ledger: &[LedgerRow]) -> EvWaterfallResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in ledger {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn ledger_to_csv_string(ledger: &[LedgerRow]) -> EvWaterfallResult<String> {
    let mut buf = Vec::new();
    write_ledger_csv(&mut buf, ledger)?;
    String::from_utf8(buf).map_err(|e| EvWaterfallError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::{SimulationConfig, SimulationInput};
    use crate::simulation::engine::run;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_and_row_count() {
        let result = run(&SimulationConfig::new(SimulationInput::default()).unwrap());
        let csv = ledger_to_csv_string(&result.ledger).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 85);
        assert_eq!(
            lines[0],
            "month,year,month_in_year,phase,revenue,operating_expense,operating_profit,\
             investor_flow,company_flow,cumulative_company_balance,price_regime,\
             principal_transfer,note"
        );
        assert!(lines[1].starts_with("1,1,1,Interest,"));
        assert!(lines[1].contains(",promo,"));
    }

    #[test]
    fn test_notes_are_written() {
        let result = run(&SimulationConfig::new(SimulationInput::default()).unwrap());
        let csv = ledger_to_csv_string(&result.ledger).unwrap();
        let month_60 = csv.lines().nth(60).unwrap();
        assert!(month_60.starts_with("60,5,12,Profit share,"));
        assert!(month_60.ends_with(",principal repayment"));
    }
}
