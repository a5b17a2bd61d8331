use super::ParamGen;

/// Yields a single value over and over, up to a limit. Biases start this way.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstParamGen {
    value: f32,
    left: usize,
}

impl ConstParamGen {
    /// # Arguments
    /// * `value` - The value every parameter starts at.
    /// * `limit` - How many values can be drawn in total.
    pub fn new(value: f32, limit: usize) -> Self {
        Self { value, left: limit }
    }
}

impl ParamGen for ConstParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        (self.left > 0).then(|| {
            let take = n.min(self.left);
            self.left -= take;
            vec![self.value; take]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn biases_start_at_the_constant() {
        let mut biases = ConstParamGen::new(0.1, 3);
        assert_eq!(biases.sample_exact(3).unwrap(), vec![0.1; 3]);
        assert!(biases.sample(1).is_none());
    }

    #[test]
    fn drawing_past_the_limit_fails() {
        let mut biases = ConstParamGen::new(0., 4);

        assert_eq!(biases.sample(3).map(|b| b.len()), Some(3));
        assert!(biases.sample_exact(2).is_err());
    }
}
