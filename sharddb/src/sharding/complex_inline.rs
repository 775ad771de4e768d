use std::collections::BTreeMap;

use super::{
    algorithm::{validate_targets, AlgorithmKind, ShardingAlgorithm},
    expr::render_template,
    Error, ShardingValue,
};

/// `t_${(user_id % 2) + (order_id % 4)}` — same expression machinery as
/// INLINE, but placeholders name columns rather than a single `value`.
#[derive(Debug)]
pub struct ComplexInlineAlgorithm {
    expression: String,
    properties: BTreeMap<String, String>,
}

impl ComplexInlineAlgorithm {
    pub fn new(properties: BTreeMap<String, String>) -> Result<Self, Error> {
        let expression = properties
            .get("algorithm-expression")
            .ok_or_else(|| {
                Error::MissingProperty("complex_inline".into(), "algorithm-expression".into())
            })?
            .clone();
        Ok(Self {
            expression,
            properties,
        })
    }
}

impl ShardingAlgorithm for ComplexInlineAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &ShardingValue,
    ) -> Result<Vec<String>, Error> {
        let targets = match value {
            ShardingValue::Composite { values, columns } => {
                let mut vars = std::collections::HashMap::with_capacity(values.len());
                for column in columns {
                    let coerced = values
                        .get(column)
                        .ok_or_else(|| Error::MissingColumn(column.clone()))?;
                    let v = coerced
                        .as_int()
                        .ok_or_else(|| Error::InvalidValue(column.clone()))?;
                    vars.insert(column.clone(), v);
                }
                vec![render_template(&self.expression, &vars)?]
            }
            // A single-column bind against a composite strategy can't supply
            // every placeholder; broadcast rather than guess.
            _ => available_targets.to_vec(),
        };

        validate_targets(available_targets, targets)
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::ComplexInline
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
