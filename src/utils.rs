use gpui::Pixels;

pub trait PixelsExt {
    fn as_f32(&self) -> f32;
}

impl PixelsExt for Pixels {
    fn as_f32(&self) -> f32 {
        f32::from(*self)
    }
}

/// Rounds to two decimal places so cell edges land on a stable pixel grid.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(10.0), 10.0);
        assert_eq!(round2(0.005_1), 0.01);
    }
}
