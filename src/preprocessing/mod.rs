//! Data preprocessing
//!
//! Column-wise scaling, one-hot encoding, and the declarative
//! [`FeatureTransformer`] combining them per the declared schema families.

mod encoder;
mod scaler;
mod transformer;

pub use encoder::OneHotEncoder;
pub use scaler::{Scaler, ScalerType};
pub use transformer::FeatureTransformer;
