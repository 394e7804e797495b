use crate::encoding::parse_field;
use crate::errors::{InclusionError, Result};
use crate::merkle_tree::CompressedAccount;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvAccount {
    owner_hashed: String,
    leaf_index: String,
    merkle_tree_hashed: String,
    discriminator: String,
    data_hash: String,
}

/// Reads compressed accounts from a semicolon separated file. Field columns accept decimal or
/// `0x` prefixed hex values.
pub fn parse_csv_to_accounts<P: AsRef<Path>>(path: P) -> Result<Vec<CompressedAccount>> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';') // The fields are separated by a semicolon
        .from_reader(file);

    let mut accounts = Vec::new();

    for result in rdr.deserialize() {
        let record: CsvAccount = result?;

        let leaf_index = record.leaf_index.trim().parse::<u64>().map_err(|_| {
            InclusionError::InvalidFieldEncoding(format!("leaf index {}", record.leaf_index))
        })?;

        accounts.push(CompressedAccount::new(
            parse_field(&record.owner_hashed)?,
            leaf_index,
            parse_field(&record.merkle_tree_hashed)?,
            parse_field(&record.discriminator)?,
            parse_field(&record.data_hash)?,
        ));
    }

    Ok(accounts)
}
