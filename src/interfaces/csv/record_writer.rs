use crate::domain::payment::Payment;
use crate::error::Result;
use std::io::Write;

/// Writes the final payment records as CSV.
///
/// Output is ordered by creation time (id as tie-breaker) so runs are
/// deterministic regardless of store iteration order.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_records(&mut self, mut payments: Vec<Payment>) -> Result<()> {
        payments.sort_by_key(|p| (p.created_at(), p.id().as_uuid()));

        for payment in payments {
            self.writer.serialize(payment)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writer_emits_header_and_rows() {
        let mut payment = Payment::new(dec!(10.00), "usd").unwrap();
        payment.validate().unwrap();
        payment.authorize("txn_9").unwrap();
        payment.capture().unwrap();

        let mut buf = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut buf);
            writer.write_records(vec![payment.clone()]).unwrap();
        }

        let output = String::from_utf8(buf).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,amount,currency,status,gateway_transaction_id,failure_reason,created_at,processed_at"
        );
        let row = lines.next().unwrap();
        assert!(row.contains(&payment.id().to_string()));
        assert!(row.contains("captured"));
        assert!(row.contains("txn_9"));
        assert!(row.contains("USD"));
    }
}
