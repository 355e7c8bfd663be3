use super::GameError;

pub(crate) fn parse_u64_be(payload: &[u8], offset: usize) -> Result<u64, GameError> {
    let end = offset.saturating_add(8);
    if payload.len() < end {
        return Err(GameError::InvalidPayload);
    }
    let bytes: [u8; 8] = payload[offset..end]
        .try_into()
        .map_err(|_| GameError::InvalidPayload)?;
    Ok(u64::from_be_bytes(bytes))
}

/// Parse an action payload carrying one integer: `[action:u8] [value:u64 BE]`.
pub(crate) fn parse_action_u64(payload: &[u8]) -> Result<(u8, u64), GameError> {
    let (&action, rest) = payload.split_first().ok_or(GameError::InvalidPayload)?;
    if rest.len() != 8 {
        return Err(GameError::InvalidPayload);
    }
    Ok((action, parse_u64_be(rest, 0)?))
}

/// Parse a single-byte selection payload: `[value:u8]`.
pub(crate) fn parse_single(payload: &[u8]) -> Result<u8, GameError> {
    match payload {
        [value] => Ok(*value),
        _ => Err(GameError::InvalidPayload),
    }
}

/// Parse a number-pick payload: `[count:u8] [n0] [n1] ...`.
///
/// Every number must lie in `low..=high`, appear once, and there must be between one and
/// `max_count` of them.
pub(crate) fn parse_number_set(
    payload: &[u8],
    low: u8,
    high: u8,
    max_count: usize,
) -> Result<Vec<u8>, GameError> {
    let (&count, numbers) = payload.split_first().ok_or(GameError::InvalidPayload)?;
    if numbers.len() != count as usize {
        return Err(GameError::InvalidPayload);
    }
    if numbers.is_empty() {
        return Err(GameError::InvalidSelection("no numbers selected"));
    }
    if numbers.len() > max_count {
        return Err(GameError::InvalidSelection("too many numbers selected"));
    }
    let mut seen = [false; 256];
    for &n in numbers {
        if n < low || n > high {
            return Err(GameError::InvalidSelection("number out of range"));
        }
        if seen[n as usize] {
            return Err(GameError::InvalidSelection("duplicate number"));
        }
        seen[n as usize] = true;
    }
    Ok(numbers.to_vec())
}

/// Encode a number-pick payload.
pub(crate) fn encode_number_set(numbers: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(numbers.len() + 1);
    out.push(numbers.len() as u8);
    out.extend_from_slice(numbers);
    out
}

pub(crate) fn ensure_empty(payload: &[u8]) -> Result<(), GameError> {
    if !payload.is_empty() {
        return Err(GameError::InvalidPayload);
    }
    Ok(())
}
