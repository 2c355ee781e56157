use crate::domain::payment::{Payment, PaymentId};
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing payment records.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent store implementation using RocksDB.
///
/// Payment records are kept in a dedicated Column Family, keyed by the
/// payment id's byte representation and serialized as JSON.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbPaymentStore {
    db: Arc<DB>,
}

impl RocksDbPaymentStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "payments" column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])
            .map_err(PaymentError::storage)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(CF_PAYMENTS)
            .ok_or_else(|| PaymentError::Storage("payments column family not found".to_string()))
    }
}

#[async_trait]
impl PaymentStore for RocksDbPaymentStore {
    async fn save(&self, payment: Payment) -> Result<()> {
        let cf = self.cf()?;

        let key = *payment.id().as_bytes();
        let value = serde_json::to_vec(&payment).map_err(PaymentError::storage)?;

        self.db.put_cf(cf, key, value).map_err(PaymentError::storage)?;

        Ok(())
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        let cf = self.cf()?;

        let result = self
            .db
            .get_cf(cf, id.as_bytes())
            .map_err(PaymentError::storage)?;

        match result {
            Some(bytes) => {
                let payment = serde_json::from_slice(&bytes).map_err(PaymentError::storage)?;
                Ok(Some(payment))
            }
            None => Ok(None),
        }
    }

    async fn all_payments(&self) -> Result<Vec<Payment>> {
        let cf = self.cf()?;

        let mut payments = Vec::new();
        let iter = self.db.iterator_cf(cf, rocksdb::IteratorMode::Start);

        for item in iter {
            let (_key, value) = item.map_err(PaymentError::storage)?;
            let payment: Payment =
                serde_json::from_slice(&value).map_err(PaymentError::storage)?;
            payments.push(payment);
        }

        Ok(payments)
    }
}
