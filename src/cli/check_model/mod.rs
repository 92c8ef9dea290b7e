//! Check-model command - loads the artifact pair and reports on it

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::Value;

use crate::domain::prediction::{round_price, FeatureBounds, FeatureVector, PriceModel, CURRENCY};
use crate::infrastructure::model::ModelHandle;

#[derive(Args, Debug)]
pub struct CheckModelArgs {
    /// Model file (defaults to `model.path`)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Feature schema file (defaults to `model.schema_path`)
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// JSON body to predict, e.g. '{"year":2014,"max_power_bhp":74,"torque_nm":190,"engine_cc":1248}'
    #[arg(long)]
    pub sample: Option<String>,
}

/// Load the model and print its summary
pub async fn run(args: CheckModelArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let model_path = args.model.clone().unwrap_or(config.model.path.clone());
    let schema_path = args.schema.clone().unwrap_or(config.model.schema_path.clone());

    let handle = ModelHandle::load(&model_path, &schema_path, config.model.version.as_deref())
        .with_context(|| format!("Model check failed for {}", model_path.display()))?;

    println!("{}", summarize(&handle));

    if let Some(sample) = &args.sample {
        let price = predict_sample(&handle, sample)?;
        println!("prediction:      {:.2} {}", price, CURRENCY);
    }

    Ok(())
}

fn summarize(handle: &ModelHandle) -> String {
    let schema = handle.schema();

    format!(
        "version:         {}\nregressor:       {}\nfeatures:        {}\nreference_year:  {}\nscaler:          {}\ntarget:          {:?}",
        handle.version(),
        handle.regressor().kind(),
        handle.feature_names().join(", "),
        schema.reference_year,
        if schema.scaler.is_some() { "standard" } else { "none" },
        schema.target_transform,
    )
}

fn predict_sample(handle: &ModelHandle, sample: &str) -> anyhow::Result<f64> {
    let body: Value = serde_json::from_str(sample).context("Sample is not valid JSON")?;
    let vector = FeatureVector::validate(&body, &FeatureBounds::current())
        .map_err(|errors| anyhow::anyhow!("Invalid sample: {}", errors))?;

    Ok(round_price(handle.predict(&vector)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled() -> ModelHandle {
        let root = env!("CARGO_MANIFEST_DIR");
        ModelHandle::load(
            format!("{}/models/rf_model.json", root),
            format!("{}/models/feature_info.json", root),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_summary_lists_features() {
        let summary = summarize(&bundled());

        assert!(summary.contains("random_forest"));
        assert!(summary.contains("vehicle_age, year, max_power_bhp, torque_nm, engine_cc"));
        assert!(summary.contains("standard"));
    }

    #[test]
    fn test_predict_sample() {
        let price = predict_sample(
            &bundled(),
            r#"{"year": 2014, "max_power_bhp": 74, "torque_nm": 190, "engine_cc": 1248}"#,
        )
        .unwrap();

        assert!(price > 0.0);
    }

    #[test]
    fn test_invalid_sample() {
        let result = predict_sample(&bundled(), r#"{"year": 1900}"#);
        assert!(result.is_err());
    }
}
