use std::collections::{BTreeMap, HashMap};

use super::{
    algorithm::{dedup_preserve_order, validate_targets, AlgorithmKind, ShardingAlgorithm},
    expr::render_template,
    Error, ShardingValue,
};

/// `ds_${value % 2}` / `t_${value}` — substitutes `${value}` and evaluates
/// any arithmetic over integer literals.
#[derive(Debug)]
pub struct InlineAlgorithm {
    expression: String,
    properties: BTreeMap<String, String>,
}

impl InlineAlgorithm {
    pub fn new(properties: BTreeMap<String, String>) -> Result<Self, Error> {
        let expression = properties
            .get("algorithm-expression")
            .ok_or_else(|| {
                Error::MissingProperty("inline".into(), "algorithm-expression".into())
            })?
            .clone();
        Ok(Self {
            expression,
            properties,
        })
    }

    fn render_one(&self, v: i64) -> Result<String, Error> {
        let vars = HashMap::from([("value".to_string(), v)]);
        render_template(&self.expression, &vars)
    }
}

impl ShardingAlgorithm for InlineAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &ShardingValue,
    ) -> Result<Vec<String>, Error> {
        let targets = match value {
            ShardingValue::Single { value, column } => {
                let v = value
                    .as_int()
                    .ok_or_else(|| Error::InvalidValue(column.clone()))?;
                vec![self.render_one(v)?]
            }
            ShardingValue::Enumerated { values, column } => {
                let mut out = Vec::with_capacity(values.len());
                for value in values {
                    let v = value
                        .as_int()
                        .ok_or_else(|| Error::InvalidValue(column.clone()))?;
                    out.push(self.render_one(v)?);
                }
                dedup_preserve_order(out)
            }
            ShardingValue::Range { .. } | ShardingValue::Composite { .. } => {
                available_targets.to_vec()
            }
        };

        validate_targets(available_targets, targets)
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Inline
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::Coerced;

    #[test]
    fn test_inline_modulo_expression() {
        let algo = InlineAlgorithm::new(BTreeMap::from([(
            "algorithm-expression".into(),
            "ds_${value % 2}".into(),
        )]))
        .unwrap();
        let targets = vec!["ds_0".into(), "ds_1".into()];
        let result = algo
            .do_sharding(
                &targets,
                &ShardingValue::Single {
                    column: "user_id".into(),
                    value: Coerced::Int(5),
                },
            )
            .unwrap();
        assert_eq!(result, vec!["ds_1"]);
    }

    #[test]
    fn test_inline_direct_value() {
        let algo = InlineAlgorithm::new(BTreeMap::from([(
            "algorithm-expression".into(),
            "t_${value}".into(),
        )]))
        .unwrap();
        let targets = vec!["t_0".into(), "t_1".into(), "t_2".into()];
        let result = algo
            .do_sharding(
                &targets,
                &ShardingValue::Single {
                    column: "order_id".into(),
                    value: Coerced::Int(2),
                },
            )
            .unwrap();
        assert_eq!(result, vec!["t_2"]);
    }

    #[test]
    fn test_inline_target_outside_available_is_error() {
        let algo = InlineAlgorithm::new(BTreeMap::from([(
            "algorithm-expression".into(),
            "t_${value}".into(),
        )]))
        .unwrap();
        let targets = vec!["t_0".into(), "t_1".into()];
        let result = algo.do_sharding(
            &targets,
            &ShardingValue::Single {
                column: "order_id".into(),
                value: Coerced::Int(9),
            },
        );
        assert!(matches!(result, Err(Error::TargetNotAvailable(_))));
    }
}
