//! Similarity configuration loader.
//!
//! The document carries two top-level objects, `alphas` and `functions`,
//! each keyed by `"default"` or a decimal bin number.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use triage_core::errors::ConfigError;

use crate::similarity::{FunctionMap, Similarity, SimilarityFunction};

/// Read and parse a similarity configuration file.
pub fn load_similarity_config(path: &Path) -> Result<Similarity, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let doc: Value = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(parse_similarity_config(&doc))
}

/// Lift a parsed document into a similarity instance.
pub fn parse_similarity_config(doc: &Value) -> Similarity {
    let mut default_alpha = 1.0;
    let mut bin_alphas = BTreeMap::new();

    match doc.get("alphas").and_then(Value::as_object) {
        Some(alphas) => {
            for (key, value) in alphas {
                let Some(alpha) = value.as_f64() else {
                    tracing::warn!(key = %key, "alpha value is not a number; skipping");
                    continue;
                };
                if key == "default" {
                    default_alpha = alpha;
                } else {
                    match key.parse::<i32>() {
                        Ok(bin) => {
                            bin_alphas.insert(bin, alpha);
                        }
                        Err(_) => {
                            tracing::warn!(key = %key, "alpha key is neither \"default\" nor a bin number; skipping");
                        }
                    }
                }
            }
        }
        None => tracing::warn!("similarity configuration has no alphas object"),
    }

    let mut default_functions = FunctionMap::new();
    let mut bin_functions = BTreeMap::new();

    match doc.get("functions").and_then(Value::as_object) {
        Some(functions) => {
            for (key, value) in functions {
                let Some(list) = value.as_array() else {
                    tracing::warn!(key = %key, "functions entry is not an array; skipping");
                    continue;
                };
                let parsed = parse_function_list(list);
                if key == "default" {
                    default_functions = parsed;
                } else {
                    match key.parse::<i32>() {
                        Ok(bin) => {
                            bin_functions.insert(bin, parsed);
                        }
                        Err(_) => {
                            tracing::warn!(key = %key, "functions key is neither \"default\" nor a bin number; skipping");
                        }
                    }
                }
            }
        }
        None => tracing::warn!("similarity configuration has no functions object"),
    }

    Similarity::new(default_alpha, bin_alphas, default_functions, bin_functions)
}

fn parse_function_list(list: &[Value]) -> FunctionMap {
    let mut functions = FunctionMap::new();
    for item in list {
        match parse_function_entry(item) {
            Some((key, function)) => {
                functions.insert(key, function);
            }
            None => tracing::warn!("dropping malformed similarity function"),
        }
    }
    functions
}

fn parse_function_entry(item: &Value) -> Option<((String, String), SimilarityFunction)> {
    let key = item.get("key")?.as_array()?;
    let [instrument, product_type] = key.as_slice() else {
        return None;
    };
    let key = (instrument.as_str()?.to_string(), product_type.as_str()?.to_string());

    let function = item.get("function")?.as_object()?;
    let descriptor_values = function.get("diversity_descriptor")?.as_array()?;
    let weight_values = function.get("weights")?.as_array()?;
    let kernel = function.get("similarity_type")?.as_str()?.to_string();
    let parameter_values = function.get("similarity_parameters")?.as_object()?;

    if descriptor_values.len() != weight_values.len() {
        tracing::warn!(
            descriptors = descriptor_values.len(),
            weights = weight_values.len(),
            "diversity descriptor and weights differ in length"
        );
        return None;
    }

    // Descriptor/weight pairs stay parallel: a bad half drops the pair.
    let mut descriptors = Vec::new();
    let mut weights = Vec::new();
    for (descriptor, weight) in descriptor_values.iter().zip(weight_values) {
        let (Some(descriptor), Some(weight)) = (descriptor.as_str(), weight.as_f64()) else {
            tracing::warn!("dropping malformed descriptor/weight pair");
            continue;
        };
        descriptors.push(descriptor.to_string());
        weights.push(weight);
    }

    let mut parameters = BTreeMap::new();
    for (name, value) in parameter_values {
        match value.as_f64() {
            Some(value) => {
                parameters.insert(name.clone(), value);
            }
            None => {
                tracing::warn!(parameter = %name, "similarity parameter is not a number; skipping");
            }
        }
    }

    Some((key, SimilarityFunction::new(descriptors, weights, kernel, parameters)))
}
