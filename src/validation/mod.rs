//! Reading selection and the error taxonomy

pub mod data;
pub mod error;

pub use data::{ReadingSelector, ResolvedReading};
pub use error::{Denominator, InputField, PositioningError, PositioningResult};
