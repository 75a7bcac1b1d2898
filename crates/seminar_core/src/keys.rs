//! Key layout for every record kept in the key-value store.

pub const SESSION_PREFIX: &str = "session:";

pub fn lecturer(email: &str) -> String {
    format!("lecturer:{}", email)
}

pub fn class(class_id: &str) -> String {
    format!("class:{}", class_id)
}

pub fn class_students(class_id: &str) -> String {
    format!("class_students:{}", class_id)
}

pub fn student(usn: &str) -> String {
    format!("student:{}", usn)
}

pub fn lecturer_classes(email: &str) -> String {
    format!("lecturer_classes:{}", email)
}

pub fn session(token: &str) -> String {
    format!("{}{}", SESSION_PREFIX, token)
}

/// USNs are matched case-insensitively and without surrounding whitespace.
pub fn normalize_usn(usn: &str) -> String {
    usn.trim().to_uppercase()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usn_normalization() {
        assert_eq!(normalize_usn(" 1cr21cs001 "), "1CR21CS001");
        assert_eq!(student(&normalize_usn("1cr21cs001")), "student:1CR21CS001");
    }

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  Ada@Uni.EDU "), "ada@uni.edu");
    }
}
