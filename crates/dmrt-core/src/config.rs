/// Service configuration read from environment variables.
///
/// Field names map to upper-cased variable names. `Vec<String>` fields read
/// comma-separated values.
pub trait Config: Sized + serde::de::DeserializeOwned {
    /// Reads from an explicit set of variables instead of the process environment.
    fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    fn try_from_env() -> Result<Self, envy::Error> {
        Self::from_vars(std::env::vars())
    }

    /// # Panics
    ///
    /// Panics if a required variable is missing or malformed. Startup only.
    fn from_env() -> Self {
        Self::try_from_env().expect("failed to load config from environment")
    }
}
