use d3rs::scale::{LinearScale, Scale as D3Scale};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleKind {
    Linear,
    /// Power scale with exponent 0.5, sign-preserving for negative inputs.
    Sqrt,
}

/// Continuous scale used for normalization and for pixel <-> data inversion.
///
/// The inner d3 scale always works on the transformed domain, so a `Sqrt`
/// scale is a linear interpolation between `sqrt(min)` and `sqrt(max)`.
#[derive(Clone)]
pub struct ChartScale {
    kind: ScaleKind,
    domain: (f64, f64),
    range: (f32, f32),
    inner: LinearScale,
}

impl ChartScale {
    pub fn new_linear(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self::build(ScaleKind::Linear, domain, range)
    }

    pub fn new_sqrt(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self::build(ScaleKind::Sqrt, domain, range)
    }

    fn build(kind: ScaleKind, domain: (f64, f64), range: (f32, f32)) -> Self {
        let mut d_min = transform(kind, domain.0);
        let mut d_max = transform(kind, domain.1);
        // A zero-width domain maps every value to the middle of the range.
        // Only an exactly constant domain is degenerate.
        if d_max == d_min {
            d_min -= 0.5;
            d_max += 0.5;
        }
        let inner = LinearScale::new()
            .domain(d_min, d_max)
            .range(range.0 as f64, range.1 as f64);
        Self {
            kind,
            domain,
            range,
            inner,
        }
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Maps a data value into the range at full precision.
    pub fn map_f64(&self, value: f64) -> f64 {
        let res = self.inner.scale(transform(self.kind, value));
        if res.is_nan() || res.is_infinite() {
            0.0
        } else {
            res
        }
    }

    pub fn map(&self, value: f64) -> f32 {
        self.map_f64(value) as f32
    }

    pub fn invert(&self, pixel: f32) -> f64 {
        let t = self.inner.invert(pixel as f64).unwrap_or(0.0);
        match self.kind {
            ScaleKind::Linear => t,
            ScaleKind::Sqrt => t.signum() * t * t,
        }
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn update_domain(&mut self, min: f64, max: f64) {
        *self = Self::build(self.kind, (min, max), self.range);
    }

    pub fn update_range(&mut self, min: f32, max: f32) {
        *self = Self::build(self.kind, self.domain, (min, max));
    }
}

fn transform(kind: ScaleKind, value: f64) -> f64 {
    match kind {
        ScaleKind::Linear => value,
        ScaleKind::Sqrt => value.signum() * value.abs().sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_scale_interpolates_transformed_domain() {
        let scale = ChartScale::new_sqrt((0.0, 100.0), (0.0, 1.0));
        assert!((scale.map_f64(0.0) - 0.0).abs() < 1e-9);
        assert!((scale.map_f64(25.0) - 0.5).abs() < 1e-9);
        assert!((scale.map_f64(100.0) - 1.0).abs() < 1e-9);
        assert!((scale.invert(0.5) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn sqrt_scale_handles_negative_domain() {
        let scale = ChartScale::new_sqrt((-4.0, 4.0), (0.0, 1.0));
        assert!((scale.map_f64(-4.0) - 0.0).abs() < 1e-9);
        assert!((scale.map_f64(0.0) - 0.5).abs() < 1e-9);
        assert!((scale.invert(0.0) + 4.0).abs() < 1e-6);
    }

    #[test]
    fn update_range_keeps_domain() {
        let mut scale = ChartScale::new_linear((0.0, 10.0), (0.0, 100.0));
        scale.update_range(0.0, 200.0);
        assert_eq!(scale.domain(), (0.0, 10.0));
        assert!((scale.map_f64(5.0) - 100.0).abs() < 1e-9);
    }
}
