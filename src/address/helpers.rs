use super::models::AddressRequest;
use crate::error::FieldErrors;

/// Minimum trimmed length of every address field
pub fn validate_address(req: &AddressRequest) -> FieldErrors {
    let rules = [
        ("street", 5, &req.street),
        ("buildingName", 5, &req.building_name),
        ("city", 4, &req.city),
        ("state", 2, &req.state),
        ("country", 2, &req.country),
        ("pincode", 5, &req.pincode),
    ];

    let mut errors = FieldErrors::new();
    for (field, min, value) in rules {
        if value.trim().chars().count() < min {
            errors.insert(
                field.to_string(),
                format!("{} must contain at least {} characters", field, min),
            );
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AddressRequest {
        AddressRequest {
            street: "Baker Street".into(),
            building_name: "Block 221B".into(),
            city: "London".into(),
            state: "LDN".into(),
            country: "UK".into(),
            pincode: "NW16XE".into(),
        }
    }

    #[test]
    fn test_valid_address() {
        assert!(validate_address(&valid()).is_empty());
    }

    #[test]
    fn test_short_fields_reported() {
        let req = AddressRequest {
            city: "Rom".into(),
            pincode: "123".into(),
            ..valid()
        };
        let errors = validate_address(&req);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["city"], "city must contain at least 4 characters");
        assert!(errors.contains_key("pincode"));
    }

    #[test]
    fn test_whitespace_does_not_count() {
        let req = AddressRequest {
            state: "  A ".into(),
            ..valid()
        };
        assert!(validate_address(&req).contains_key("state"));
    }
}
