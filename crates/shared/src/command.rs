#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validate(#[from] validator::ValidationErrors),

    #[error("forbidden")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    MealPlan(#[from] crate::mealplan::MealPlanError),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        Self::Unknown(value.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Unknown(value.into())
    }
}

#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Server(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::Error::Server(format!($err)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Server(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails(name: &str) -> Result<()> {
        if name.is_empty() {
            crate::bail!("name is required");
        }

        crate::bail!("unknown name {}", name);
    }

    #[test]
    fn test_bail_formats_server_error() {
        let err = fails("").unwrap_err();
        assert_eq!(err.to_string(), "name is required");

        let err = fails("john").unwrap_err();
        assert!(matches!(err, Error::Server(ref msg) if msg == "unknown name john"));
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::NotFound("mealplan 01J".to_owned());
        assert_eq!(err.to_string(), "not found: mealplan 01J");
    }
}
