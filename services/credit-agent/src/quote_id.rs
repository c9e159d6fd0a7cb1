//! Deterministic quote identifiers

use credit_engine::CreditRequest;

const DIGEST_HEX_CHARS: usize = 16;

/// `quote_<actor_id>_<16 hex chars>`, where the hex is a BLAKE3 digest of
/// the request's canonical JSON. Identical requests share an ID.
pub fn quote_id(request: &CreditRequest) -> serde_json::Result<String> {
    let canonical = serde_json::to_vec(request)?;
    let digest = blake3::hash(&canonical).to_hex();

    Ok(format!(
        "quote_{}_{}",
        request.actor_id,
        &digest.as_str()[..DIGEST_HEX_CHARS]
    ))
}
