//! Temporary artifact naming

use uuid::Uuid;

/// Prefix of every temporary snapshot artifact
pub const TMP_PREFIX: &str = "tmp_";

/// Suffix of every temporary snapshot artifact
pub const TMP_SUFFIX: &str = "dataset.xml";

/// File name for a temporary snapshot of `tables` taken on behalf of
/// `test_name`. A random nonce keeps names unique across calls with the same
/// test and table set.
pub fn temp_artifact_name<S: AsRef<str>>(test_name: &str, tables: &[S]) -> String {
    let mut name = String::from(TMP_PREFIX);
    name.push_str(&sanitize(test_name));
    for table in tables {
        name.push('_');
        name.push_str(&sanitize(table.as_ref()));
    }
    name.push('_');
    name.push_str(&short_nonce());
    name.push('_');
    name.push_str(TMP_SUFFIX);
    name
}

/// Replace anything that is not safe in a file name with `_`
pub fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

fn short_nonce() -> String {
    let mut nonce = Uuid::new_v4().simple().to_string();
    nonce.truncate(12);
    nonce
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_artifact_name() {
        let name = temp_artifact_name("UserServiceTest", &["users", "orders"]);

        assert!(name.starts_with("tmp_UserServiceTest_users_orders_"));
        assert!(name.ends_with("_dataset.xml"));
        assert_eq!(name.len(), "tmp_UserServiceTest_users_orders__dataset.xml".len() + 12);
    }

    #[test]
    fn test_names_are_unique_per_call() {
        let first = temp_artifact_name("T", &["users"]);
        let second = temp_artifact_name("T", &["users"]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("audit.events"), "audit.events");
        assert_eq!(sanitize("my test/../x"), "my_test_.._x");
        assert_eq!(sanitize("order items"), "order_items");
    }
}
