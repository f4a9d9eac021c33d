#![forbid(unsafe_code)]

use rusqlite::ErrorCode;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    NotFound,
    InvalidReference {
        expected: String,
        actual: String,
    },
    InvalidPosition {
        given: i64,
    },
    StageNotEmpty {
        label: String,
        card_count: i64,
    },
    ConcurrentModification,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NotFound => write!(f, "not found"),
            Self::InvalidReference { expected, actual } => write!(
                f,
                "invalid reference (expected pipeline={expected}, card belongs to {actual})"
            ),
            Self::InvalidPosition { given } => {
                write!(f, "invalid position (given={given})")
            }
            Self::StageNotEmpty { label, card_count } => {
                write!(f, "stage not empty (label={label}, cards={card_count})")
            }
            Self::ConcurrentModification => write!(f, "concurrent modification"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &value {
            if matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ) {
                return Self::ConcurrentModification;
            }
        }
        Self::Sql(value)
    }
}
