use alloy::primitives::hex;

use crate::data::known;
use crate::data::types::{Contract, Transaction};

/// Renders the human-readable `inputData` view of a transaction's call
/// data: an optional resolved function signature followed by the raw
/// selector and its 32-byte parameter words.
pub struct InputDecoder;

impl InputDecoder {
    /// Render call data for display.
    ///
    /// Returns None for contract creations (no destination to decode
    /// against) and for the empty-call marker. `contract` is the decoding
    /// record for the destination address, when one is stored.
    pub fn render(tx: &Transaction, contract: Option<&Contract>) -> Option<String> {
        if tx.to.is_none() || tx.input.is_empty() {
            return None;
        }
        let input = tx.input.as_ref();
        let method = format!("0x{}", hex::encode(&input[..input.len().min(4)]));
        let words = Self::payload_words(input);

        let signature = match contract {
            Some(contract) => Self::contract_signature(contract, &method[2..]),
            None => known::well_known_signature(&method[2..]).map(str::to_owned),
        };

        let mut out = String::new();
        if let Some(signature) = signature {
            out.push_str("Function: ");
            out.push_str(&signature);
            out.push('\n');
        }
        out.push_str("MethodID: ");
        out.push_str(&method);
        for (i, word) in words.iter().enumerate() {
            out.push_str(&format!("\n[{i}]: {word}"));
        }
        Some(out)
    }

    /// Split everything after the selector into 32-byte words.
    ///
    /// This is a lenient split, not a strict ABI decode: a trailing chunk
    /// shorter than 32 bytes is still emitted as a short word.
    fn payload_words(input: &[u8]) -> Vec<String> {
        if input.len() <= 4 {
            return Vec::new();
        }
        input[4..].chunks(32).map(hex::encode).collect()
    }

    /// Match `selector` (hex, sans `0x`) against the contract's selector
    /// table and render the matched function as `name(type1 arg1, ...)`.
    ///
    /// When the selector table names a function the ABI holds no body
    /// for, the rendered form is the bare `name(`.
    fn contract_signature(contract: &Contract, selector: &str) -> Option<String> {
        for (signature, sel) in &contract.function_hashes {
            if sel != selector {
                continue;
            }
            let name = signature.split('(').next().unwrap_or(signature);
            let mut rendered = format!("{name}(");
            if let Some(function) = contract.abi_code.functions().find(|f| f.name == name) {
                let params: Vec<String> = function
                    .inputs
                    .iter()
                    .map(|input| format!("{} {}", input.ty, input.name))
                    .collect();
                rendered.push_str(&params.join(", "));
                rendered.push(')');
            }
            return Some(rendered);
        }
        None
    }
}
