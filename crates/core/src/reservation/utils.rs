const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic lock-namespace id for a seat with no ticket row yet.
///
/// 64-bit FNV-1a of `"{event}:{schedule|0}:{row}:{number}"`, reduced mod
/// 1,000,000 and negated so it can never collide with a real (positive)
/// ticket id. The hash must be stable across processes; every instance of
/// the service has to map a seat to the same lock key.
pub fn synthetic_ticket_id(
    event_id: i64,
    schedule_id: Option<i64>,
    row: &str,
    number: i32,
) -> i64 {
    let key = format!(
        "{}:{}:{}:{}",
        event_id,
        schedule_id.unwrap_or(0),
        row,
        number
    );

    let mut hash = FNV_OFFSET_BASIS;
    for byte in key.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    -((hash % 1_000_000) as i64)
}

/// Cache key fragment for one seat.
pub fn seat_key(row: &str, number: i32) -> String {
    format!("{row}-{number}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_id_deterministic() {
        let a = synthetic_ticket_id(3, Some(7), "1", 5);
        let b = synthetic_ticket_id(3, Some(7), "1", 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthetic_id_never_positive() {
        for number in 1..200 {
            assert!(synthetic_ticket_id(3, None, "A", number) <= 0);
        }
    }

    #[test]
    fn test_synthetic_id_within_range() {
        let id = synthetic_ticket_id(42, Some(1), "B", 17);
        assert!(id > -1_000_000);
    }

    #[test]
    fn test_synthetic_id_distinguishes_seats() {
        let base = synthetic_ticket_id(3, Some(7), "1", 5);
        assert_ne!(base, synthetic_ticket_id(3, Some(7), "1", 6));
        assert_ne!(base, synthetic_ticket_id(3, Some(7), "2", 5));
        assert_ne!(base, synthetic_ticket_id(4, Some(7), "1", 5));
    }

    #[test]
    fn test_missing_schedule_hashes_as_zero() {
        assert_eq!(
            synthetic_ticket_id(3, None, "1", 5),
            synthetic_ticket_id(3, Some(0), "1", 5)
        );
    }

    #[test]
    fn test_seat_key() {
        assert_eq!(seat_key("1", 5), "1-5");
        assert_eq!(seat_key("A열", 12), "A열-12");
    }
}
