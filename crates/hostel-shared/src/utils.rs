//! Utility functions

/// Masks the local part of an email address for log output.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let keep: String = local.chars().take(if local.chars().count() <= 2 { 1 } else { 2 }).collect();
            format!("{}***@{}", keep, domain)
        }
        _ => "***".to_string(),
    }
}

/// Keeps only the last three digits of a phone number.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 3 {
        return "***".to_string();
    }
    let tail: String = digits[digits.len() - 3..].iter().collect();
    format!("***{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_email_local_part() {
        assert_eq!(mask_email("amina@example.com"), "am***@example.com");
        assert_eq!(mask_email("a@example.com"), "a***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn masks_phone_digits() {
        assert_eq!(mask_phone("+255 712 345 678"), "***678");
        assert_eq!(mask_phone("12"), "***");
    }
}
