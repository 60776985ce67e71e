use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("shape mismatch in {op}: {}x{} vs {}x{}", lhs.0, lhs.1, rhs.0, rhs.1)]
    ShapeMismatch {
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    #[error("{op} requires a row vector, got a matrix with {rows} rows")]
    NotARowVector { op: &'static str, rows: usize },

    #[error("{op} is undefined on an empty matrix")]
    EmptyMatrix { op: &'static str },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: cannot parse {token:?} as an integer", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_shapes_and_locations() {
        let err = Error::ShapeMismatch {
            op: "add",
            lhs: (2, 3),
            rhs: (3, 2),
        };
        assert_eq!(err.to_string(), "shape mismatch in add: 2x3 vs 3x2");

        let err = Error::Parse {
            path: PathBuf::from("train.csv"),
            line: 4,
            token: "x1".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "train.csv:4: cannot parse \"x1\" as an integer"
        );
    }
}
