use rand::Rng;

/// Colors handed out to leader labels
pub const LABEL_PALETTE: [&str; 10] = [
    "#ef4444", // red
    "#f97316", // orange
    "#eab308", // yellow
    "#22c55e", // green
    "#14b8a6", // teal
    "#3b82f6", // blue
    "#6366f1", // indigo
    "#a855f7", // purple
    "#ec4899", // pink
    "#64748b", // slate
];

/// Source of label colors. Picks may collide.
pub trait ColorSource {
    fn next_color(&mut self) -> &'static str;
}

/// Picks uniformly from `LABEL_PALETTE` using any rand RNG
pub struct RngColorSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RngColorSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ColorSource for RngColorSource<R> {
    fn next_color(&mut self) -> &'static str {
        LABEL_PALETTE[self.rng.gen_range(0..LABEL_PALETTE.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn colors_always_come_from_the_palette() {
        let mut source = RngColorSource::new(StdRng::seed_from_u64(42));
        for _ in 0..200 {
            assert!(LABEL_PALETTE.contains(&source.next_color()));
        }
    }

    #[test]
    fn picks_spread_across_the_palette() {
        let mut source = RngColorSource::new(StdRng::seed_from_u64(7));
        let seen: HashSet<&str> = (0..500).map(|_| source.next_color()).collect();
        // 500 uniform draws over 10 colors hit every color with overwhelming probability
        assert_eq!(seen.len(), LABEL_PALETTE.len());
    }
}
