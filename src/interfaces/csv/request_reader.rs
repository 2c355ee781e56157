use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RequestOp {
    Create,
    Confirm,
    Get,
}

/// One row of the request file.
///
/// `ref` is a file-local alias: a `create` row binds it to the generated
/// payment id, later rows resolve it (a raw UUID is accepted too).
/// `amount`/`currency` matter only for `create`; `idempotency_key` only for
/// write operations.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RequestRecord {
    pub op: RequestOp,
    pub r#ref: String,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub idempotency_key: Option<String>,
}

/// Reads payment requests from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<RequestRecord>`.
/// Whitespace is trimmed and records may omit trailing fields.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes requests, so
    /// large files stream without being loaded whole.
    pub fn requests(self) -> impl Iterator<Item = Result<RequestRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, ref, amount, currency, idempotency_key\n\
                    create, p1, 100.00, USD, key-1\n\
                    confirm, p1, , , key-2";
        let reader = RequestReader::new(data.as_bytes());
        let results: Vec<Result<RequestRecord>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        let create = results[0].as_ref().unwrap();
        assert_eq!(create.op, RequestOp::Create);
        assert_eq!(create.r#ref, "p1");
        assert_eq!(create.amount, Some(dec!(100.00)));
        assert_eq!(create.currency.as_deref(), Some("USD"));
        assert_eq!(create.idempotency_key.as_deref(), Some("key-1"));

        let confirm = results[1].as_ref().unwrap();
        assert_eq!(confirm.op, RequestOp::Confirm);
        assert_eq!(confirm.amount, None);
        assert_eq!(confirm.currency, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "op, ref, amount, currency, idempotency_key\n\
                    refund, p1, 1.0, USD,";
        let reader = RequestReader::new(data.as_bytes());
        let results: Vec<Result<RequestRecord>> = reader.requests().collect();

        assert!(results[0].is_err());
    }
}
