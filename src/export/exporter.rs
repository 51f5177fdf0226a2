use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::charge::Charge;
use super::date_range::parse_month;
use super::error::Error;

/// Column names of the CSV export, in output order.
pub const CSV_HEADER: [&str; 16] = [
    "id",
    "status",
    "amount",
    "invoice_num",
    "currency",
    "created_at",
    "failure_message",
    "failure_type",
    "gateway",
    "payment_type",
    "cc_brand",
    "cc_last_four",
    "cc_expiry",
    "payment_info",
    "risk_level",
    "outcome_network_status",
];

/// Value of the `gateway` column on every row.
pub const GATEWAY: &str = "stripe";

/// How fetched charges are written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportMode {
    /// Pretty-printed records for a human to read
    #[default]
    Dump,
    /// Fixed 16-column CSV
    Csv,
}

impl ExportMode {
    pub fn from_flag(export_csv: bool) -> Self {
        if export_csv {
            ExportMode::Csv
        } else {
            ExportMode::Dump
        }
    }
}

/// One CSV row. Field order matches `CSV_HEADER`.
#[derive(Debug, Serialize, PartialEq)]
pub struct ChargeRow<'a> {
    pub id: &'a str,
    pub status: &'a str,
    pub amount: i64,
    pub invoice_num: &'a str,
    pub currency: &'a str,
    pub created_at: i64,
    pub failure_message: &'a str,
    pub failure_type: &'a str,
    pub gateway: &'static str,
    pub payment_type: &'a str,
    pub cc_brand: &'a str,
    pub cc_last_four: &'a str,
    pub cc_expiry: i64,
    pub payment_info: String,
    pub risk_level: &'a str,
    pub outcome_network_status: &'a str,
}

impl<'a> ChargeRow<'a> {
    /// Project a charge onto the CSV columns.
    ///
    /// A charge without a card gets `now` as its `cc_expiry` and empty brand
    /// and last four. A card whose expiry does not form a valid `MM/YYYY`
    /// fails with `Error::CardExpiry`.
    pub fn from_charge(charge: &'a Charge, now: DateTime<Utc>) -> Result<Self, Error> {
        let (cc_brand, cc_last_four, cc_expiry) = match charge.card() {
            Some(card) => {
                let expiry = parse_month(&card.expiry()).map_err(|source| Error::CardExpiry {
                    charge: charge.id.clone(),
                    source,
                })?;
                (card.brand, card.last_four, expiry.timestamp())
            }
            None => ("", "", now.timestamp()),
        };

        let outcome = charge.outcome.as_ref();

        Ok(Self {
            id: &charge.id,
            status: &charge.status,
            amount: charge.amount,
            invoice_num: charge.invoice_id().unwrap_or_default(),
            currency: &charge.currency,
            created_at: charge.created,
            failure_message: charge.failure_message.as_deref().unwrap_or_default(),
            failure_type: charge.failure_code.as_deref().unwrap_or_default(),
            gateway: GATEWAY,
            payment_type: charge
                .source
                .as_ref()
                .map(|source| source.kind.as_str())
                .unwrap_or_default(),
            cc_brand,
            cc_last_four,
            cc_expiry,
            payment_info: charge
                .source
                .as_ref()
                .map(|source| source.display())
                .unwrap_or_default(),
            risk_level: outcome
                .and_then(|o| o.risk_level.as_deref())
                .unwrap_or_default(),
            outcome_network_status: outcome
                .and_then(|o| o.network_status.as_deref())
                .unwrap_or_default(),
        })
    }
}

/// Writes fetched charges to a sink in the selected mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChargeExporter {
    mode: ExportMode,
}

impl ChargeExporter {
    pub fn new(mode: ExportMode) -> Self {
        Self { mode }
    }

    /// Write `charges` to any sink (Stdout, File, etc.) and return how many
    /// were exported.
    ///
    /// In CSV mode the header and every row are flushed as soon as they are
    /// written, so on error all rows before the failing one remain in the sink.
    pub fn export<W: Write>(&self, charges: &[Charge], writer: W) -> Result<usize, Error> {
        log::info!("Exporting {} charges as {:?}", charges.len(), self.mode);
        let exported = match self.mode {
            ExportMode::Dump => Self::export_dump(charges, writer)?,
            ExportMode::Csv => Self::export_csv(charges, writer)?,
        };
        log::info!("Export complete: {exported} charges");
        Ok(exported)
    }

    fn export_dump<W: Write>(charges: &[Charge], mut writer: W) -> Result<usize, Error> {
        for (i, charge) in charges.iter().enumerate() {
            writeln!(writer, "[{i}] {charge:#?}")?;
        }
        writer.flush()?;
        Ok(charges.len())
    }

    fn export_csv<W: Write>(charges: &[Charge], writer: W) -> Result<usize, Error> {
        // Header is written by hand so an empty month still produces it.
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(CSV_HEADER)?;
        csv_writer.flush()?;

        for (i, charge) in charges.iter().enumerate() {
            let row = ChargeRow::from_charge(charge, Utc::now())?;
            log::trace!("[row {}] {} {}", i + 1, row.id, row.status);
            csv_writer.serialize(&row)?;
            csv_writer.flush()?;
        }

        Ok(charges.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io;

    fn charge(value: serde_json::Value) -> Charge {
        serde_json::from_value(value).unwrap()
    }

    fn card_charge(id: &str) -> Charge {
        charge(serde_json::json!({
            "id": id,
            "status": "succeeded",
            "amount": 1999,
            "currency": "usd",
            "created": 1_484_000_000,
            "invoice": "in_7",
            "source": {"object": "card", "brand": "Visa", "last4": "4242", "exp_month": 8, "exp_year": 2021},
            "outcome": {"risk_level": "normal", "network_status": "approved_by_network"}
        }))
    }

    fn bare_charge(id: &str) -> Charge {
        charge(serde_json::json!({
            "id": id,
            "status": "failed",
            "amount": 500,
            "currency": "eur",
            "created": 1_484_100_000,
            "failure_message": "Your card was declined.",
            "failure_code": "card_declined"
        }))
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    fn export_to_string(mode: ExportMode, charges: &[Charge]) -> String {
        let mut out = Vec::new();
        let exported = ChargeExporter::new(mode).export(charges, &mut out).unwrap();
        assert_eq!(exported, charges.len());
        String::from_utf8(out).unwrap()
    }

    /// Accepts writes until `allowed_flushes` flushes have completed, then
    /// fails like a closed pipe.
    struct BrokenPipeAfter<'a> {
        out: &'a mut Vec<u8>,
        allowed_flushes: usize,
        flushes: usize,
    }

    impl Write for BrokenPipeAfter<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.flushes >= self.allowed_flushes {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_card_row_projection() {
        let charge = card_charge("ch_1");
        let row = ChargeRow::from_charge(&charge, fixed_now()).unwrap();

        assert_eq!(
            row,
            ChargeRow {
                id: "ch_1",
                status: "succeeded",
                amount: 1999,
                invoice_num: "in_7",
                currency: "usd",
                created_at: 1_484_000_000,
                failure_message: "",
                failure_type: "",
                gateway: "stripe",
                payment_type: "card",
                cc_brand: "Visa",
                cc_last_four: "4242",
                // 2021-08-01T00:00:00Z
                cc_expiry: 1_627_776_000,
                payment_info: "Visa ending in 4242".to_string(),
                risk_level: "normal",
                outcome_network_status: "approved_by_network",
            }
        );
    }

    #[test]
    fn test_missing_card_uses_now_as_expiry() {
        let charge = bare_charge("ch_2");
        let row = ChargeRow::from_charge(&charge, fixed_now()).unwrap();

        assert_eq!(row.cc_brand, "");
        assert_eq!(row.cc_last_four, "");
        assert_eq!(row.cc_expiry, fixed_now().timestamp());
        assert_eq!(row.invoice_num, "");
        assert_eq!(row.payment_type, "");
        assert_eq!(row.payment_info, "");
        assert_eq!(row.failure_message, "Your card was declined.");
        assert_eq!(row.failure_type, "card_declined");
    }

    #[test]
    fn test_non_card_source_uses_now_as_expiry() {
        let charge = charge(serde_json::json!({
            "id": "ch_3", "status": "pending", "amount": 10, "currency": "usd", "created": 1,
            "source": {"object": "bank_account", "last4": "6789"}
        }));
        let row = ChargeRow::from_charge(&charge, fixed_now()).unwrap();

        assert_eq!(row.payment_type, "bank_account");
        assert_eq!(row.payment_info, "Bank account ending in 6789");
        assert_eq!(row.cc_expiry, fixed_now().timestamp());
    }

    #[test]
    fn test_invalid_card_expiry_is_an_error() {
        let charge = charge(serde_json::json!({
            "id": "ch_bad", "status": "succeeded", "amount": 10, "currency": "usd", "created": 1,
            "source": {"object": "card", "brand": "Visa", "last4": "4242", "exp_month": 13, "exp_year": 2021}
        }));
        let err = ChargeRow::from_charge(&charge, fixed_now()).unwrap_err();
        assert!(matches!(err, Error::CardExpiry { ref charge, .. } if charge == "ch_bad"));
    }

    #[test]
    fn test_csv_header_and_rows() {
        let output = export_to_string(
            ExportMode::Csv,
            &[card_charge("ch_1"), bare_charge("ch_2")],
        );
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(
            lines[1],
            "ch_1,succeeded,1999,in_7,usd,1484000000,,,stripe,card,Visa,4242,1627776000,Visa ending in 4242,normal,approved_by_network"
        );
        assert!(lines[2].starts_with("ch_2,failed,500,,eur,1484100000,Your card was declined.,card_declined,stripe,,,,"));
    }

    #[test]
    fn test_csv_empty_month_is_header_only() {
        let output = export_to_string(ExportMode::Csv, &[]);
        assert_eq!(output, format!("{}\n", CSV_HEADER.join(",")));
    }

    #[test]
    fn test_csv_write_failure_keeps_flushed_rows() {
        let charges: Vec<_> = (1..=5).map(|i| card_charge(&format!("ch_{i}"))).collect();
        let mut out = Vec::new();
        let mut sink = BrokenPipeAfter {
            out: &mut out,
            // header + 2 rows
            allowed_flushes: 3,
            flushes: 0,
        };

        let result = ChargeExporter::new(ExportMode::Csv).export(&charges, &mut sink);
        assert!(matches!(result, Err(Error::Io(_) | Error::Csv(_))));

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("ch_1,"));
        assert!(lines[2].starts_with("ch_2,"));
    }

    #[test]
    fn test_card_expiry_failure_keeps_earlier_rows() {
        let bad = charge(serde_json::json!({
            "id": "ch_bad", "status": "succeeded", "amount": 10, "currency": "usd", "created": 1,
            "source": {"object": "card", "brand": "Visa", "last4": "4242"}
        }));
        let charges = vec![card_charge("ch_1"), bad, card_charge("ch_3")];
        let mut out = Vec::new();

        let err = ChargeExporter::new(ExportMode::Csv)
            .export(&charges, &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::CardExpiry { .. }));

        let output = String::from_utf8(out).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_dump_contains_every_record() {
        let output = export_to_string(ExportMode::Dump, &[card_charge("ch_1"), bare_charge("ch_2")]);

        assert!(output.contains("[0] Charge {"));
        assert!(output.contains("[1] Charge {"));
        assert!(output.contains("\"ch_1\""));
        assert!(output.contains("\"card_declined\""));
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(ExportMode::from_flag(true), ExportMode::Csv);
        assert_eq!(ExportMode::from_flag(false), ExportMode::Dump);
    }
}
