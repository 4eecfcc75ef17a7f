use std::fmt::{Debug, Formatter, Result as FmtResult};

/// Username and password for the account being exported.
///
/// Only ever held in memory. The [`Debug`] output redacts the password so
/// the credential can't leak through logs or error trees.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionCredential {
    username: String,
    password: String,
}
impl SessionCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}
impl Debug for SessionCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SessionCredential")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let credential = SessionCredential::new("jackreid", "hunter2");
        let debug = format!("{credential:?}");
        assert!(debug.contains("jackreid"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(credential.password(), "hunter2");
    }
}
