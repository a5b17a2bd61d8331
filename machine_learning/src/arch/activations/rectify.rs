/// Rectified linear unit, `max(0, z)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rectify;

impl Rectify {
    pub fn f(&self, z: f32) -> f32 {
        z.max(0.)
    }

    pub fn df(&self, z: f32) -> f32 {
        if z > 0. { 1. } else { 0. }
    }
}
