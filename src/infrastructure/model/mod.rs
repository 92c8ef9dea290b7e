//! Model artifact loading and inference

mod handle;
mod regressor;
mod schema;

pub use handle::ModelHandle;
pub use regressor::{DecisionTree, Regressor, TREE_LEAF};
pub use schema::{
    FeatureName, FeatureSchema, StandardScaler, TargetTransform, DEFAULT_REFERENCE_YEAR,
};
