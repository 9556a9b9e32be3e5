//! Static reference tables: system contract addresses, display names for
//! recognized accounts, and selectors decodable without a stored ABI.

use alloy::primitives::{Address, address};

/// The block-signer system contract.
pub const BLOCK_SIGNER: Address = address!("0000000000000000000000000000000000000089");

/// The randomize system contract.
pub const RANDOMIZE: Address = address!("0000000000000000000000000000000000000090");

/// System contracts excluded by the "other contracts" listing category.
pub const SYSTEM_CONTRACTS: [Address; 2] = [BLOCK_SIGNER, RANDOMIZE];

/// Display name for a recognized well-known address.
pub fn account_name(address: &Address) -> Option<&'static str> {
    if *address == BLOCK_SIGNER {
        Some("BlockSigner Contract")
    } else if *address == RANDOMIZE {
        Some("Randomize Contract")
    } else if *address == Address::ZERO {
        Some("Genesis")
    } else {
        None
    }
}

/// Selectors recognized even when no contract record exists for the
/// destination. Keys are selector hex sans `0x`.
pub const WELL_KNOWN_SELECTORS: &[(&str, &str)] =
    &[("a9059cbb", "transfer(address _to, uint256 _value) ***")];

pub fn well_known_signature(selector: &str) -> Option<&'static str> {
    WELL_KNOWN_SELECTORS
        .iter()
        .find(|(sel, _)| *sel == selector)
        .map(|(_, sig)| *sig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_contract_names() {
        assert_eq!(account_name(&BLOCK_SIGNER), Some("BlockSigner Contract"));
        assert_eq!(account_name(&RANDOMIZE), Some("Randomize Contract"));
        assert_eq!(account_name(&Address::from_slice(&[0x42; 20])), None);
    }

    #[test]
    fn test_transfer_selector_lookup() {
        let sig = well_known_signature("a9059cbb").unwrap();
        assert_eq!(sig, "transfer(address _to, uint256 _value) ***");
        assert!(well_known_signature("deadbeef").is_none());
    }
}
