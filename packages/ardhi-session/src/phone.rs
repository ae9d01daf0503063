//! Phone number normalization and directory lookup
//!
//! Stored and supplied numbers carry different formatting ("+255 712 345 678"
//! vs "255712345678"), so comparison is only ever done on the digit sequence.

use crate::types::User;

/// Strip every non-digit character.
pub fn normalize(phone_number: &str) -> String {
    phone_number.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// First user (in directory order) whose normalized number equals the
/// normalized `phone_number`. A supplied number with no digits never matches.
pub fn find_user<'a>(users: &'a [User], phone_number: &str) -> Option<&'a User> {
    let wanted = normalize(phone_number);
    if wanted.is_empty() {
        return None;
    }

    users.iter().find(|user| {
        let candidate = normalize(&user.phone_number);
        tracing::trace!(candidate = %candidate, wanted = %wanted, "Checking user phone");
        candidate == wanted
    })
}
