use serde::{Serialize, Serializer};
use std::fmt;

/// Wraps customer-supplied contact details so they never reach log output verbatim.
///
/// `Debug` and `Display` render a masked form; `Serialize` passes the real value
/// through, since API responses need it.
#[derive(Clone)]
pub struct Masked<T>(pub T);

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask_email(self.0.as_ref()))
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask_email(self.0.as_ref()))
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// Keeps the first character of the local part and the whole domain:
/// `jane@example.com` becomes `j***@example.com`.
/// Anything without an `@` is fully masked.
pub fn mask_email(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "********".to_string(),
    }
}
