/// The platform pool: a front-evicted, tail-extended queue of platforms.
/// The front holds the largest world y — the platform closest to scrolling
/// out below the view.
///
/// Platforms only ever leave from the front (scrolled out below the view)
/// and only ever appear above the current tail, so the queue stays sorted
/// by descending world y throughout a session. Eviction and regeneration
/// are one operation: a release that drains the pool past its low-water
/// mark tops it back up before returning, so callers can never observe a
/// pool below that mark.
///
/// Generation walks a four-slot horizontal rotation so consecutive
/// platforms alternate across the left and middle of the playfield instead
/// of stacking in one column. The slot counter persists across refills;
/// a refill continues the pattern where the last one stopped.

use std::collections::VecDeque;

use crate::config::{PoolConfig, WorldConfig};
use crate::domain::platform::{Platform, PlatformId};
use crate::domain::rng::LevelRng;

pub struct PlatformPool {
    platforms: VecDeque<Platform>,
    rng: LevelRng,
    target_size: usize,
    low_water: usize,
    gap_min: i32,
    gap_max: i32,
    platform_height: f32,
    world_w: f32,
    /// Rotation slot for the next generated platform, taken mod 4.
    slot: u32,
    next_id: u32,
}

impl PlatformPool {
    /// Build the starting pool: two hand-placed lower platforms (one for
    /// the actor to spawn on, one an easy first jump up) and a generated
    /// tower above them.
    pub fn new(cfg: &PoolConfig, world: &WorldConfig, mut rng: LevelRng) -> Self {
        let w = world.width;
        let h = world.height;

        let mut platforms = VecDeque::with_capacity(cfg.target_size);

        // Spawn platform, near the bottom of the screen.
        let w1 = rng.range(100, (w / 4.0) as i32);
        let x1 = rng.range((w / 4.0) as i32, (w / 2.0) as i32);
        platforms.push_back(Platform::new(
            PlatformId(0),
            x1,
            h - 100.0,
            w1,
            cfg.platform_height,
        ));

        // First hop, at mid-screen.
        let w2 = rng.range(100, (w / 2.0) as i32);
        let x2 = rng.range((w / 4.0) as i32, (w * 0.75) as i32);
        platforms.push_back(Platform::new(
            PlatformId(1),
            x2,
            h / 2.0,
            w2,
            cfg.platform_height,
        ));

        let mut pool = PlatformPool {
            platforms,
            rng,
            target_size: cfg.target_size,
            low_water: cfg.low_water,
            gap_min: cfg.gap_min,
            gap_max: cfg.gap_max,
            platform_height: cfg.platform_height,
            world_w: w,
            slot: 1,
            next_id: 2,
        };
        pool.extend();
        pool
    }

    /// Generate platforms above the tail until the pool is back at target
    /// size. Requires a non-empty pool: extension is relative to the tail.
    fn extend(&mut self) -> usize {
        assert!(!self.platforms.is_empty(), "cannot extend an empty pool");
        let mut added = 0;
        while self.platforms.len() < self.target_size {
            let tail_y = self
                .platforms
                .back()
                .expect("cannot extend an empty pool")
                .top_y();
            let y = tail_y - self.rng.range(self.gap_min, self.gap_max);

            let w = self.world_w;
            let (x, width) = match self.slot % 4 {
                // Bands walk left to right; wide platforms spawn on the
                // left and mid-right slots, narrow on the other two.
                1 => (
                    self.rng.range(0, (w / 4.0) as i32),
                    self.rng.range(100, (w / 2.0) as i32),
                ),
                2 => (
                    self.rng.range((w / 4.0) as i32, (w / 2.0) as i32),
                    self.rng.range(100, (w / 4.0) as i32),
                ),
                3 => (
                    self.rng.range((w / 2.0) as i32, (w * 0.625) as i32),
                    self.rng.range(100, (w / 2.0) as i32),
                ),
                _ => (
                    self.rng.range((w * 0.625) as i32, (w * 0.75) as i32),
                    self.rng.range(100, (w / 4.0) as i32),
                ),
            };

            self.platforms.push_back(Platform::new(
                PlatformId(self.next_id),
                x,
                y,
                width,
                self.platform_height,
            ));
            self.next_id += 1;
            self.slot += 1;
            added += 1;
        }
        added
    }

    /// Evict the front platform (it has scrolled out of view). If the
    /// eviction drains the pool below the low-water mark, new platforms
    /// are generated before returning. Returns the evicted id and how
    /// many platforms were generated (0 if none).
    pub fn release_from_front(&mut self) -> Option<(PlatformId, usize)> {
        let id = self.platforms.pop_front()?.id();
        let added = if self.platforms.len() < self.low_water {
            self.extend()
        } else {
            0
        };
        Some((id, added))
    }

    /// The platform closest to scrolling out (largest world y).
    pub fn front(&self) -> Option<&Platform> {
        self.platforms.front()
    }

    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id() == id)
    }

    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn platforms_mut(&mut self) -> impl Iterator<Item = &mut Platform> {
        self.platforms.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn pool_with_seed(seed: u64) -> PlatformPool {
        let cfg = GameConfig::defaults();
        PlatformPool::new(&cfg.pool, &cfg.world, LevelRng::seeded(seed))
    }

    #[test]
    fn fresh_pool_is_at_target_size() {
        let pool = pool_with_seed(7);
        assert_eq!(pool.len(), 20);
    }

    #[test]
    fn platforms_are_ordered_and_gapped() {
        let pool = pool_with_seed(7);
        let ys: Vec<f32> = pool.platforms().map(|p| p.top_y()).collect();
        for pair in ys.windows(2) {
            let gap = pair[0] - pair[1];
            assert!(gap >= 100.0, "gap below minimum: {gap}");
            assert!(gap <= 300.0, "gap above maximum: {gap}");
        }
    }

    #[test]
    fn platforms_stay_inside_the_playfield() {
        let pool = pool_with_seed(3);
        for p in pool.platforms() {
            let (l, r) = p.x_extent();
            assert!(l >= 0.0);
            // Widest case: mid-right band (up to 0.625w) with width w/2.
            assert!(r <= 800.0 * 1.125, "platform ends at {r}");
        }
    }

    #[test]
    fn generated_platforms_walk_the_x_band_rotation() {
        // Past the two seed platforms, origins cycle through the four
        // horizontal bands starting at slot 1.
        let pool = pool_with_seed(21);
        for (i, p) in pool.platforms().skip(2).enumerate() {
            let slot = (1 + i as u32) % 4;
            let (lo, hi) = match slot {
                1 => (0.0, 200.0),
                2 => (200.0, 400.0),
                3 => (400.0, 500.0),
                _ => (500.0, 600.0),
            };
            let x = p.pos().x;
            assert!(
                (lo..=hi).contains(&x),
                "platform {i} (slot {slot}) at x {x}, band {lo}..{hi}"
            );
        }
    }

    #[test]
    fn ids_are_unique_and_stable() {
        let mut pool = pool_with_seed(11);
        let mut seen: Vec<u32> = pool.platforms().map(|p| p.id().0).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 20);

        // Evict until a refill happens; fresh ids never collide with old.
        for _ in 0..11 {
            pool.release_from_front();
        }
        let mut all: Vec<u32> = pool.platforms().map(|p| p.id().0).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), pool.len());
    }

    #[test]
    fn refill_waits_for_low_water() {
        let mut pool = pool_with_seed(5);

        // Drain down to the threshold: no regeneration yet.
        for _ in 0..10 {
            let (_, added) = pool.release_from_front().expect("pool not empty");
            assert_eq!(added, 0, "refilled above low water");
        }
        assert_eq!(pool.len(), 10);

        // One more eviction dips below the mark: topped up in the same call.
        let (_, added) = pool.release_from_front().expect("pool not empty");
        assert_eq!(added, 11);
        assert_eq!(pool.len(), 20);
    }

    #[test]
    fn pool_never_below_low_water_after_release() {
        // Releasing refills synchronously: no call ever returns with the
        // pool under the low-water mark.
        let mut pool = pool_with_seed(5);
        for _ in 0..100 {
            pool.release_from_front();
            assert!(
                pool.len() >= 10,
                "pool at {} immediately after release",
                pool.len()
            );
        }
    }

    #[test]
    fn refill_continues_above_the_tail() {
        let mut pool = pool_with_seed(13);
        let tail_before = pool.platforms().last().map(|p| p.top_y()).unwrap();
        for _ in 0..11 {
            pool.release_from_front();
        }
        let tail_after = pool.platforms().last().map(|p| p.top_y()).unwrap();
        assert!(tail_after < tail_before, "new platforms must sit higher");
    }

    #[test]
    fn same_seed_same_layout() {
        let a = pool_with_seed(42);
        let b = pool_with_seed(42);
        let pa: Vec<_> = a.platforms().map(|p| (p.pos(), p.width())).collect();
        let pb: Vec<_> = b.platforms().map(|p| (p.pos(), p.width())).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn lookup_by_id() {
        let pool = pool_with_seed(1);
        let front_id = pool.front().map(|p| p.id()).unwrap();
        assert!(pool.get(front_id).is_some());
        assert!(pool.get(PlatformId(9999)).is_none());
    }
}
