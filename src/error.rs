use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[derive(Debug, Display, Error)]
pub enum Error {
    // `#[error(not(source))]` below tells `derive_more` that `embassy_executor::SpawnError` does
    // not implement Rust's `core::error::Error` trait.
    #[cfg(feature = "arm")]
    #[display("{_0:?}")]
    TaskSpawn(#[error(not(source))] embassy_executor::SpawnError),

    #[display("Display (I2C) transfer failed")]
    Display,

    #[cfg(feature = "arm")]
    #[display("ADC read failed: {_0:?}")]
    Adc(#[error(not(source))] embassy_rp::adc::Error),
}

#[cfg(feature = "arm")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(err: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn(err)
    }
}

#[cfg(feature = "arm")]
impl From<embassy_rp::adc::Error> for Error {
    fn from(err: embassy_rp::adc::Error) -> Self {
        Self::Adc(err)
    }
}
