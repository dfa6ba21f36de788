//! Bounded baby-step/giant-step discrete log over the Ristretto basepoint.

use std::collections::HashMap;

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G, ristretto::RistrettoPoint, traits::Identity,
};

pub(crate) struct DiscreteLog {
    /// compress(j·G) -> j for j < step
    baby_steps: HashMap<[u8; 32], u64>,
    step: u64,
    /// step·G
    stride: RistrettoPoint,
    giant_steps: u64,
}

impl DiscreteLog {
    /// Solves `v·G` for every `v < 2^max_bits` using a table of `2^table_bits`
    /// points. Requires `table_bits <= max_bits < 64`.
    pub(crate) fn new(table_bits: u8, max_bits: u8) -> Self {
        let step = 1u64 << table_bits;
        let mut baby_steps = HashMap::with_capacity(step as usize);
        let mut point = RistrettoPoint::identity();
        for j in 0..step {
            baby_steps.insert(point.compress().to_bytes(), j);
            point += G;
        }
        Self {
            baby_steps,
            step,
            stride: point,
            giant_steps: 1u64 << (max_bits - table_bits),
        }
    }

    pub(crate) fn solve(&self, target: &RistrettoPoint) -> Option<u64> {
        let mut current = *target;
        for i in 0..self.giant_steps {
            if let Some(j) = self.baby_steps.get(current.compress().as_bytes()) {
                return Some(i * self.step + j);
            }
            current -= self.stride;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::scalar::Scalar;

    #[test]
    fn recovers_values_across_the_range() {
        let dlog = DiscreteLog::new(6, 14);
        for v in [0u64, 1, 63, 64, 65, 4_095, 9_999, (1 << 14) - 1] {
            assert_eq!(dlog.solve(&(Scalar::from(v) * G)), Some(v), "value {v}");
        }
    }

    #[test]
    fn values_beyond_bound_are_not_found() {
        let dlog = DiscreteLog::new(4, 8);
        assert_eq!(dlog.solve(&(Scalar::from(256u64) * G)), None);
    }
}
