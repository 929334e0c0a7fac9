//! Validation helpers for enum-like string fields.
//!
//! Booking requests carry the seat grade and receipt method as strings so
//! that a bad value surfaces as a 400 with a readable message instead of a
//! deserialization rejection.

/// Valid seat grade values
pub const VALID_GRADES: &[&str] = &["VIP", "R", "S", "A"];

/// Valid receipt method values on a booking request
pub const VALID_RECEIPT_METHODS: &[&str] = &["delivery", "on_site"];

/// Validates that a value is one of the allowed values.
pub fn validate_enum_value(
    value: &str,
    valid_values: &[&str],
    field_name: &str,
) -> Result<(), String> {
    if valid_values.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        ))
    }
}

/// Validates a seat grade value
pub fn validate_grade(grade: &str) -> Result<(), String> {
    validate_enum_value(grade, VALID_GRADES, "grade")
}

/// Validates a receipt method value
pub fn validate_receipt_method(method: &str) -> Result<(), String> {
    validate_enum_value(method, VALID_RECEIPT_METHODS, "receipt method")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_grade() {
        assert!(validate_grade("VIP").is_ok());
        assert!(validate_grade("A").is_ok());
        assert!(validate_grade("B").is_err());
        assert!(validate_grade("vip").is_err());
    }

    #[test]
    fn test_validate_receipt_method() {
        assert!(validate_receipt_method("delivery").is_ok());
        assert!(validate_receipt_method("on_site").is_ok());
        assert!(validate_receipt_method("pickup").is_err());
    }
}
