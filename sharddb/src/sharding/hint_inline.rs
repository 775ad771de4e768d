use std::collections::{BTreeMap, HashMap};

use super::{
    algorithm::{validate_targets, AlgorithmKind, ShardingAlgorithm},
    expr::render_template,
    Error, ShardingValue,
};

/// Called when the value originates from a caller `Hint` rather than a SQL
/// column. Accepts a direct target name, or an expression using `${value}`,
/// `index_${value % count}`, or `range_${value / size}`.
///
/// `count` resolves to the number of `available_targets` at call time;
/// `size` resolves to the `bucket-size` property (default 1).
#[derive(Debug)]
pub struct HintInlineAlgorithm {
    expression: Option<String>,
    bucket_size: i64,
    properties: BTreeMap<String, String>,
}

impl HintInlineAlgorithm {
    pub fn new(properties: BTreeMap<String, String>) -> Result<Self, Error> {
        let expression = properties.get("algorithm-expression").cloned();
        let bucket_size = match properties.get("bucket-size") {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| Error::MissingProperty("hint_inline".into(), "bucket-size".into()))?,
            None => 1,
        };
        Ok(Self {
            expression,
            bucket_size,
            properties,
        })
    }
}

impl ShardingAlgorithm for HintInlineAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &ShardingValue,
    ) -> Result<Vec<String>, Error> {
        let target = match value {
            ShardingValue::Single { value, column } => match &self.expression {
                Some(expression) => {
                    let v = value
                        .as_int()
                        .ok_or_else(|| Error::InvalidValue(column.clone()))?;
                    let vars = HashMap::from([
                        ("value".to_string(), v),
                        ("count".to_string(), available_targets.len() as i64),
                        ("size".to_string(), self.bucket_size),
                    ]);
                    render_template(expression, &vars)?
                }
                None => value.as_str().into_owned(),
            },
            _ => return Ok(available_targets.to_vec()),
        };

        validate_targets(available_targets, vec![target])
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::HintInline
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
