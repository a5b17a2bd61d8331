/// The logistic function scaled by `amp`, `amp / (1 + e^-z)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sigmoid {
    amp: f32,
}

/// Evaluated on the side where the exponential can't overflow.
fn logistic(z: f32) -> f32 {
    if z >= 0. {
        1. / (1. + (-z).exp())
    } else {
        let e = z.exp();
        e / (1. + e)
    }
}

impl Sigmoid {
    pub fn new(amp: f32) -> Self {
        Self { amp }
    }

    pub fn f(&self, z: f32) -> f32 {
        self.amp * logistic(z)
    }

    pub fn df(&self, z: f32) -> f32 {
        let s = logistic(z);
        self.amp * s * (1. - s)
    }
}
