use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AngleError {
    #[error("Specify exactly one of shms, sdms, rad, or deg; {0} were given")]
    NotExactlyOne(usize),

    #[error("char must be either '+' or '-', not {0:?}")]
    InvalidSignChar(char),

    #[error("Could not parse '{input}' as a sexagesimal angle: {reason}")]
    Parse { input: String, reason: &'static str },
}
