use crate::*;
use indexmap::IndexMap;
use num_bigint::BigUint;
use std::collections::HashMap;
use std::convert::TryFrom;

/// Largest number of voting options a single election event may offer
pub const MAXIMUM_NUMBER_OF_VOTING_OPTIONS: usize = 5000;

/// Longest actual voting option accepted in a table
pub const MAXIMUM_ACTUAL_VOTING_OPTION_LENGTH: usize = 50;

pub const BLANK_PREFIX: &str = "BLANK|";
pub const WRITE_IN_PREFIX: &str = "WRITE_IN|";
pub const NON_BLANK_PREFIX: &str = "NON_BLANK|";

/// One selectable option and its encoding
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrimesMappingTableEntry {
    pub actual_voting_option: String,

    #[serde(with = "biguint_hex")]
    pub encoded_voting_option: BigUint,

    pub semantic_information: String,

    pub correctness_information: String,
}

impl PrimesMappingTableEntry {
    pub fn new(
        actual_voting_option: &str,
        encoded_voting_option: BigUint,
        semantic_information: &str,
        correctness_information: &str,
    ) -> Self {
        PrimesMappingTableEntry {
            actual_voting_option: actual_voting_option.to_owned(),
            encoded_voting_option,
            semantic_information: semantic_information.to_owned(),
            correctness_information: correctness_information.to_owned(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.semantic_information.starts_with(BLANK_PREFIX)
    }

    pub fn is_write_in(&self) -> bool {
        self.semantic_information.starts_with(WRITE_IN_PREFIX)
    }
}

/// The mapping of every selectable option of an election event to its encoding
///
/// Immutable once built. Entries keep the order the election authority gave them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(
    into = "Vec<PrimesMappingTableEntry>",
    try_from = "Vec<PrimesMappingTableEntry>"
)]
pub struct PrimesMappingTable {
    entries: IndexMap<String, PrimesMappingTableEntry>,
    by_encoded: HashMap<BigUint, usize>,
}

impl PrimesMappingTable {
    pub fn from_entries(entries: Vec<PrimesMappingTableEntry>) -> Result<Self, Error> {
        if entries.is_empty() {
            return Err(Error::invalid("the primes mapping table cannot be empty"));
        }
        if entries.len() > MAXIMUM_NUMBER_OF_VOTING_OPTIONS {
            return Err(Error::invalid(format!(
                "the primes mapping table supports at most {} voting options, found {}",
                MAXIMUM_NUMBER_OF_VOTING_OPTIONS,
                entries.len()
            )));
        }

        let mut map = IndexMap::with_capacity(entries.len());
        let mut by_encoded = HashMap::with_capacity(entries.len());

        for entry in entries {
            let length = entry.actual_voting_option.chars().count();
            if length == 0 || length > MAXIMUM_ACTUAL_VOTING_OPTION_LENGTH {
                return Err(Error::invalid(format!(
                    "actual voting options must be 1 to {} characters long",
                    MAXIMUM_ACTUAL_VOTING_OPTION_LENGTH
                )));
            }
            if by_encoded
                .insert(entry.encoded_voting_option.clone(), map.len())
                .is_some()
            {
                return Err(Error::invalid(format!(
                    "duplicate encoded voting option {}",
                    to_hex_string(&entry.encoded_voting_option)
                )));
            }
            if map.contains_key(&entry.actual_voting_option) {
                return Err(Error::invalid(format!(
                    "duplicate actual voting option {}",
                    entry.actual_voting_option
                )));
            }
            map.insert(entry.actual_voting_option.clone(), entry);
        }

        Ok(PrimesMappingTable {
            entries: map,
            by_encoded,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order
    pub fn entries(&self) -> impl Iterator<Item = &PrimesMappingTableEntry> {
        self.entries.values()
    }

    pub fn get_entry_by_actual(&self, actual_voting_option: &str) -> Result<&PrimesMappingTableEntry, Error> {
        self.entries
            .get(actual_voting_option)
            .ok_or_else(|| Error::NotFound(format!("actual voting option {}", actual_voting_option)))
    }

    pub fn get_entry_by_encoded(&self, encoded_voting_option: &BigUint) -> Result<&PrimesMappingTableEntry, Error> {
        self.by_encoded
            .get(encoded_voting_option)
            .and_then(|i| self.entries.get_index(*i))
            .map(|(_, entry)| entry)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "encoded voting option {}",
                    to_hex_string(encoded_voting_option)
                ))
            })
    }

    pub fn contains_actual(&self, actual_voting_option: &str) -> bool {
        self.entries.contains_key(actual_voting_option)
    }

    /// Every encoded voting option is an element of `group`
    pub fn belongs_to(&self, group: &GqGroup) -> bool {
        self.entries()
            .all(|e| group.is_member(&e.encoded_voting_option))
    }
}

impl TryFrom<Vec<PrimesMappingTableEntry>> for PrimesMappingTable {
    type Error = Error;

    fn try_from(entries: Vec<PrimesMappingTableEntry>) -> Result<Self, Self::Error> {
        PrimesMappingTable::from_entries(entries)
    }
}

impl From<PrimesMappingTable> for Vec<PrimesMappingTableEntry> {
    fn from(table: PrimesMappingTable) -> Self {
        table.entries.into_iter().map(|(_, entry)| entry).collect()
    }
}
