use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};

use crate::{error::DecodeError, pretty};

/// Prefix put in front of every line of decoded claims.
pub const CLAIMS_PREFIX: &str = "  ";

/// Decodes the claims segment of a compact JWT and renders it as indented JSON.
///
/// The signature is not verified.
///
/// # Errors
/// - the token has fewer than two segments
/// - the claims segment is not unpadded base64url
/// - the claims are not valid JSON
pub fn decode_claims(token: &str) -> Result<String, DecodeError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(claims)) = (segments.next(), segments.next()) else {
        return Err(DecodeError::InvalidTokenFormat);
    };

    let payload = BASE64_URL_SAFE_NO_PAD.decode(claims)?;
    Ok(pretty::indent(&payload, CLAIMS_PREFIX)?)
}
