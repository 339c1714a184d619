//! Projections and derived quantities over a primes mapping table.

use crate::*;
use num_bigint::BigUint;
use std::collections::HashSet;
use std::hash::Hash;

fn ensure_distinct<T: Eq + Hash>(values: &[T], what: &str) -> Result<(), Error> {
    let mut seen = HashSet::with_capacity(values.len());
    if values.iter().all(|v| seen.insert(v)) {
        Ok(())
    } else {
        Err(Error::invalid(format!("{} must be distinct", what)))
    }
}

fn entries_for<'a>(
    table: &'a PrimesMappingTable,
    actual_voting_options: &[String],
) -> Result<Vec<&'a PrimesMappingTableEntry>, Error> {
    if actual_voting_options.is_empty() {
        return Ok(table.entries().collect());
    }
    ensure_distinct(actual_voting_options, "actual voting options")?;

    actual_voting_options
        .iter()
        .map(|a| {
            table
                .get_entry_by_actual(a)
                .map_err(|_| Error::invalid(format!("{} is not in the primes mapping table", a)))
        })
        .collect()
}

/// Encoded voting options of `actual_voting_options`, in the same order
///
/// An empty input selects the whole table.
pub fn get_encoded_voting_options(
    table: &PrimesMappingTable,
    actual_voting_options: &[String],
) -> Result<Vec<BigUint>, Error> {
    Ok(entries_for(table, actual_voting_options)?
        .into_iter()
        .map(|e| e.encoded_voting_option.clone())
        .collect())
}

/// Actual voting options of `encoded_voting_options`, in the same order
///
/// An empty input selects the whole table.
pub fn get_actual_voting_options(
    table: &PrimesMappingTable,
    encoded_voting_options: &[BigUint],
) -> Result<Vec<String>, Error> {
    if encoded_voting_options.is_empty() {
        return Ok(table
            .entries()
            .map(|e| e.actual_voting_option.clone())
            .collect());
    }
    ensure_distinct(encoded_voting_options, "encoded voting options")?;

    encoded_voting_options
        .iter()
        .map(|p| {
            table
                .get_entry_by_encoded(p)
                .map(|e| e.actual_voting_option.clone())
                .map_err(|_| {
                    Error::invalid(format!(
                        "{} is not in the primes mapping table",
                        to_hex_string(p)
                    ))
                })
        })
        .collect()
}

pub fn get_correctness_information(
    table: &PrimesMappingTable,
    actual_voting_options: &[String],
) -> Result<Vec<String>, Error> {
    Ok(entries_for(table, actual_voting_options)?
        .into_iter()
        .map(|e| e.correctness_information.clone())
        .collect())
}

pub fn get_semantic_information(
    table: &PrimesMappingTable,
    actual_voting_options: &[String],
) -> Result<Vec<String>, Error> {
    Ok(entries_for(table, actual_voting_options)?
        .into_iter()
        .map(|e| e.semantic_information.clone())
        .collect())
}

/// Sorted correctness information of the blank entries
///
/// Every well-formed ballot selects exactly one option per blank entry, so its
/// sorted correctness information equals this vector.
pub fn get_blank_correctness_information(table: &PrimesMappingTable) -> Vec<String> {
    let mut blank: Vec<String> = table
        .entries()
        .filter(|e| e.is_blank())
        .map(|e| e.correctness_information.clone())
        .collect();
    blank.sort();
    blank
}

/// Number of selectable slots
pub fn get_psi(table: &PrimesMappingTable) -> usize {
    table.entries().filter(|e| e.is_blank()).count()
}

/// Number of write-in slots plus one
pub fn get_delta(table: &PrimesMappingTable) -> usize {
    table.entries().filter(|e| e.is_write_in()).count() + 1
}

pub fn is_valid_ballot(
    table: &PrimesMappingTable,
    selected_actual_voting_options: &[String],
) -> Result<bool, Error> {
    if selected_actual_voting_options.is_empty() {
        return Ok(false);
    }
    let mut correctness = get_correctness_information(table, selected_actual_voting_options)?;
    correctness.sort();
    Ok(correctness == get_blank_correctness_information(table))
}
