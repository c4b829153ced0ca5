// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print intent → device byte stream.
//
// Text and receipt intents go through the ESC/POS document model; raw
// intents are passed through untouched (no init, no cut).

use printhub_core::types::{EncodedJob, IntentKind, PrintIntent, ReceiptJob, TextJob};
use tracing::debug;

use crate::escpos::{Alignment, CutMode, EscPos};

/// Column widths of the receipt item table (Item / Qty / Price).
pub const RECEIPT_COLUMNS: [usize; 3] = [16, 6, 10];

/// Width of the receipt separator rules.
pub const RECEIPT_RULE_WIDTH: usize = 32;

/// Blank lines fed before the final cut of a receipt.
pub const RECEIPT_TAIL_FEED: usize = 3;

/// Encode one intent. Never fails: charset problems degrade to substitution
/// or UTF-8 rather than aborting the job.
pub fn encode(intent: &PrintIntent) -> EncodedJob {
    let job = match intent.kind() {
        IntentKind::Text(text) => text_document(text).build(),
        IntentKind::Receipt(receipt) => receipt_document(receipt).build(),
        IntentKind::Raw(bytes) => EncodedJob::new(bytes.clone()),
    };
    debug!(intent = intent.label(), bytes = job.len(), "encoded print intent");
    job
}

/// Text, `trailing_newlines` line feeds, then an optional full cut.
pub fn text_document(job: &TextJob) -> EscPos {
    let mut doc = EscPos::with_encoding(&job.encoding);
    doc.text(&job.content).feed(usize::from(job.trailing_newlines));
    if job.cut_after {
        doc.cut(CutMode::Full);
    }
    doc
}

/// The fixed receipt template. Missing optional fields skip their block.
pub fn receipt_document(job: &ReceiptJob) -> EscPos {
    let mut doc = EscPos::with_encoding(&job.encoding);
    let widths = &RECEIPT_COLUMNS[..];

    if let Some(header) = non_empty(&job.header) {
        doc.header(header);
    }
    if let Some(stamp) = non_empty(&job.timestamp_label) {
        doc.align(Alignment::Center).line(stamp).feed(1);
    }

    doc.separator('=', RECEIPT_RULE_WIDTH);
    doc.table_row(&["Item", "Qty", "Price"], Some(widths));
    doc.separator('-', RECEIPT_RULE_WIDTH);

    for item in &job.items {
        let columns = [
            item.name.clone(),
            item.quantity.to_string(),
            money(item.unit_price),
        ];
        doc.table_row(&columns, Some(widths));
    }

    doc.separator('-', RECEIPT_RULE_WIDTH);
    doc.bold(true)
        .table_row(&["TOTAL:".to_string(), String::new(), money(job.total)], Some(widths))
        .bold(false);
    doc.separator('=', RECEIPT_RULE_WIDTH);

    if let Some(footer) = non_empty(&job.footer) {
        doc.feed(1).align(Alignment::Center).line(footer);
    }

    doc.feed(RECEIPT_TAIL_FEED).cut(CutMode::Full);
    doc
}

/// `$` and exactly two decimals.
pub fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escpos::cmd;
    use printhub_core::types::ReceiptItem;

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn coffee_receipt() -> ReceiptJob {
        ReceiptJob {
            items: vec![
                ReceiptItem {
                    name: "Coffee".into(),
                    quantity: 2,
                    unit_price: 3.5,
                },
                ReceiptItem {
                    name: "Sandwich".into(),
                    quantity: 1,
                    unit_price: 8.99,
                },
            ],
            total: 15.99,
            header: Some("Test Store".into()),
            footer: Some("Thank you!".into()),
            timestamp_label: None,
            encoding: "utf-8".into(),
        }
    }

    #[test]
    fn text_intent_layout() {
        let intent = PrintIntent::text(TextJob::new("Hello")).unwrap();
        let job = encode(&intent);
        assert_eq!(job.as_bytes(), b"\x1b@Hello\n\n\x1d\x56\x00");
    }

    #[test]
    fn text_intent_without_cut_or_newlines() {
        let mut text = TextJob::new("Hi");
        text.trailing_newlines = 0;
        text.cut_after = false;
        let job = encode(&PrintIntent::text(text).unwrap());
        assert_eq!(job.as_bytes(), b"\x1b@Hi");
    }

    #[test]
    fn trailing_newlines_sit_between_text_and_cut() {
        for n in 0..=10u8 {
            let mut text = TextJob::new("x");
            text.trailing_newlines = n;
            let job = encode(&PrintIntent::text(text).unwrap());
            let bytes = job.as_bytes();
            let body = &bytes[cmd::INIT.len() + 1..bytes.len() - cmd::CUT_FULL.len()];
            assert_eq!(body, vec![b'\n'; usize::from(n)].as_slice(), "n = {n}");
            assert!(bytes.ends_with(cmd::CUT_FULL));
        }
    }

    #[test]
    fn raw_intent_is_verbatim() {
        let payload = vec![0x00, 0x1b, 0x40, 0xff, 0x0a];
        let job = encode(&PrintIntent::raw(payload.clone()).unwrap());
        assert_eq!(job.into_bytes(), payload);
    }

    #[test]
    fn receipt_contains_items_in_order() {
        let job = encode(&PrintIntent::receipt(coffee_receipt()).unwrap());
        let bytes = job.as_bytes();

        assert!(bytes.starts_with(cmd::INIT));
        let coffee = find(bytes, b"Coffee").unwrap();
        let sandwich = find(bytes, b"Sandwich").unwrap();
        assert!(coffee < sandwich);
        assert!(find(bytes, b"Test Store").is_some());
        assert!(find(bytes, b"Thank you!").is_some());
        assert!(find(bytes, b"$3.50").is_some());
        assert!(find(bytes, b"$8.99").is_some());
    }

    #[test]
    fn receipt_total_is_not_recomputed() {
        // Items sum to 15.99 but the caller says 20.
        let mut receipt = coffee_receipt();
        receipt.total = 20.0;
        let job = encode(&PrintIntent::receipt(receipt).unwrap());
        let total_row = format!("{:<16}{:<6}{:>10}\n", "TOTAL:", "", "$20.00");
        let mut bold_total = cmd::BOLD_ON.to_vec();
        bold_total.extend_from_slice(total_row.as_bytes());
        bold_total.extend_from_slice(cmd::BOLD_OFF);
        assert!(find(job.as_bytes(), &bold_total).is_some());
    }

    #[test]
    fn minimal_receipt_matches_template_exactly() {
        let receipt = ReceiptJob {
            items: vec![ReceiptItem {
                name: "Tea".into(),
                quantity: 1,
                unit_price: 2.0,
            }],
            total: 2.0,
            header: None,
            footer: None,
            timestamp_label: None,
            encoding: "utf-8".into(),
        };
        let job = encode(&PrintIntent::receipt(receipt).unwrap());

        let mut expected = cmd::INIT.to_vec();
        let rule_eq = format!("{}\n", "=".repeat(32));
        let rule_dash = format!("{}\n", "-".repeat(32));
        expected.extend_from_slice(rule_eq.as_bytes());
        expected.extend_from_slice(b"Item            Qty        Price\n");
        expected.extend_from_slice(rule_dash.as_bytes());
        expected.extend_from_slice(b"Tea             1          $2.00\n");
        expected.extend_from_slice(rule_dash.as_bytes());
        expected.extend_from_slice(cmd::BOLD_ON);
        expected.extend_from_slice(b"TOTAL:                     $2.00\n");
        expected.extend_from_slice(cmd::BOLD_OFF);
        expected.extend_from_slice(rule_eq.as_bytes());
        expected.extend_from_slice(b"\n\n\n");
        expected.extend_from_slice(cmd::CUT_FULL);
        assert_eq!(job.as_bytes(), expected.as_slice());
    }

    #[test]
    fn timestamp_is_centered_before_first_rule() {
        let mut receipt = coffee_receipt();
        receipt.header = None;
        receipt.timestamp_label = Some("16 Oct 2026 09:30".into());
        let job = encode(&PrintIntent::receipt(receipt).unwrap());

        let mut stamp = cmd::ALIGN_CENTER.to_vec();
        stamp.extend_from_slice(b"16 Oct 2026 09:30\n\n=");
        assert_eq!(find(job.as_bytes(), &stamp), Some(cmd::INIT.len()));
    }

    #[test]
    fn empty_optional_fields_are_skipped() {
        let mut receipt = coffee_receipt();
        receipt.header = Some(String::new());
        receipt.footer = None;
        let job = encode(&PrintIntent::receipt(receipt).unwrap());
        assert!(find(job.as_bytes(), cmd::SIZE_DOUBLE).is_none());
        assert!(find(job.as_bytes(), cmd::ALIGN_CENTER).is_none());
    }

    #[test]
    fn money_always_has_two_decimals() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(3.5), "$3.50");
        assert_eq!(money(1234.567), "$1234.57");
    }

    #[test]
    fn timestamp_alignment_carries_into_table() {
        // The stamp's centering is never reset, so the rules and column
        // header go out centered as well.
        let mut receipt = coffee_receipt();
        receipt.header = None;
        receipt.footer = None;
        receipt.timestamp_label = Some("09:30".into());
        let job = encode(&PrintIntent::receipt(receipt).unwrap());
        let bytes = job.as_bytes();

        let mut expected = cmd::INIT.to_vec();
        expected.extend_from_slice(cmd::ALIGN_CENTER);
        expected.extend_from_slice(b"09:30\n\n");
        expected.extend_from_slice(format!("{}\n", "=".repeat(32)).as_bytes());
        expected.extend_from_slice(b"Item            Qty        Price\n");
        assert!(bytes.starts_with(&expected));
        assert!(find(bytes, cmd::ALIGN_LEFT).is_none());
        assert!(find(bytes, cmd::ALIGN_RIGHT).is_none());
    }
}
