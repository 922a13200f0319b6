use configuration::ConfigurationError;

/// The user on whose behalf a configured object is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub user: String,
}

impl Accessor {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }
}

pub trait AccessPolicy: Send + Sync {
    /// Returns an error if `accessor` may not see the object.
    fn check_access(
        &self,
        type_id: &str,
        name: &str,
        accessor: &Accessor,
    ) -> Result<(), ConfigurationError>;
}

/// Everyone can access everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn check_access(
        &self,
        _type_id: &str,
        _name: &str,
        _accessor: &Accessor,
    ) -> Result<(), ConfigurationError> {
        Ok(())
    }
}
