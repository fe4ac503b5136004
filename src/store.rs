//! Key-value persistence for calculator state.
//!
//! State lives in an external store as opaque text blobs, read once at
//! command start and overwritten whole on every mutation. A malformed blob
//! fails closed: it is logged and treated as absent, never a crash.

use crate::ledger::Transaction;
use crate::tax::TaxInput;
use rust_decimal::Decimal;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

/// Serialized transaction list
pub const TRANSACTIONS_KEY: &str = "gold-transactions";
/// Current market price as a decimal string
pub const CURRENT_PRICE_KEY: &str = "gold-current-price";
/// Serialized tax calculator input
pub const TAX_INPUT_KEY: &str = "tax-input";

/// External key-value collaborator. The engines never touch this directly;
/// the command layer loads state, runs the pure computations, and saves.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// One file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

pub fn load_transactions(store: &dyn KeyValueStore) -> anyhow::Result<Vec<Transaction>> {
    match store.load(TRANSACTIONS_KEY)? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(transactions) => Ok(transactions),
            Err(err) => {
                log::warn!("discarding malformed transaction list: {}", err);
                Ok(Vec::new())
            }
        },
        None => Ok(Vec::new()),
    }
}

pub fn save_transactions(
    store: &dyn KeyValueStore,
    transactions: &[Transaction],
) -> anyhow::Result<()> {
    store.save(TRANSACTIONS_KEY, &serde_json::to_string(transactions)?)
}

pub fn load_current_price(store: &dyn KeyValueStore) -> anyhow::Result<Option<Decimal>> {
    match store.load(CURRENT_PRICE_KEY)? {
        Some(raw) => match Decimal::from_str(raw.trim()) {
            Ok(price) => Ok(Some(price)),
            Err(err) => {
                log::warn!("discarding malformed current price {:?}: {}", raw, err);
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

pub fn save_current_price(store: &dyn KeyValueStore, price: Decimal) -> anyhow::Result<()> {
    store.save(CURRENT_PRICE_KEY, &price.to_string())
}

pub fn load_tax_input(store: &dyn KeyValueStore) -> anyhow::Result<TaxInput> {
    match store.load(TAX_INPUT_KEY)? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(input) => Ok(input),
            Err(err) => {
                log::warn!("discarding malformed tax input: {}", err);
                Ok(TaxInput::default())
            }
        },
        None => Ok(TaxInput::default()),
    }
}

pub fn save_tax_input(store: &dyn KeyValueStore, input: &TaxInput) -> anyhow::Result<()> {
    store.save(TAX_INPUT_KEY, &serde_json::to_string(input)?)
}

pub fn clear_tax_input(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    store.remove(TAX_INPUT_KEY)
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: std::cell::RefCell<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
