//! Pixel-exact collision detection and spawn placement
//!
//! Bitmaps are at most 10x8, so a brute-force mask intersection is cheap
//! enough to run for every relevant pair on every step.

use glam::DVec2;
use rand::Rng;

use super::sprite::Entity;
use crate::consts::{LCD_X, LCD_Y, PLAYFIELD_TOP};

/// True if any set pixel of `a` lands on a set pixel of `b`.
/// Invisible entities never collide.
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    if !a.visible || !b.visible {
        return false;
    }
    let (ax, ay) = a.pixel();
    a.shape
        .set_pixels()
        .any(|(col, row)| b.covers(ax + col, ay + row))
}

/// Inclusive rectangle of top-left positions an entity may spawn at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnArea {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl SpawnArea {
    /// Craft and aliens (5x5)
    pub const SMALL: SpawnArea = SpawnArea {
        min_x: 1,
        max_x: LCD_X - 7,
        min_y: PLAYFIELD_TOP,
        max_y: LCD_Y - 7,
    };

    /// Mothership (10x8)
    pub const MOTHERSHIP: SpawnArea = SpawnArea {
        min_x: 1,
        max_x: LCD_X - 11,
        min_y: PLAYFIELD_TOP,
        max_y: LCD_Y - 9,
    };

    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.min_x as f64, self.min_y as f64)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        DVec2::new(
            rng.random_range(self.min_x..=self.max_x) as f64,
            rng.random_range(self.min_y..=self.max_y) as f64,
        )
    }

    fn positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        (self.min_y..=self.max_y).flat_map(move |y| {
            (self.min_x..=self.max_x).map(move |x| DVec2::new(x as f64, y as f64))
        })
    }
}

/// Where `place` put an entity and how hard it had to try
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: DVec2,
    pub attempts: u32,
    pub fell_back: bool,
}

/// Spawn `entity` at a random position in `area` that does not overlap any
/// of `protected`.
///
/// Random draws are capped at `retry_cap`; after that the area is scanned in
/// row-major order for the first free position, and if the whole area is
/// blocked the entity is left at the area's origin.
pub fn place<R: Rng + ?Sized>(
    entity: &mut Entity,
    area: SpawnArea,
    protected: &[&Entity],
    rng: &mut R,
    retry_cap: u32,
) -> Placement {
    let blocked = |e: &Entity| protected.iter().any(|p| overlaps(e, p));

    for attempt in 1..=retry_cap.max(1) {
        entity.spawn_at(area.sample(rng));
        if !blocked(entity) {
            return Placement {
                pos: entity.pos,
                attempts: attempt,
                fell_back: false,
            };
        }
    }

    log::warn!("spawn retry cap ({}) reached, scanning {:?}", retry_cap, area);
    for pos in area.positions() {
        entity.spawn_at(pos);
        if !blocked(entity) {
            return Placement {
                pos,
                attempts: retry_cap,
                fell_back: true,
            };
        }
    }

    log::warn!("no free spawn position in {:?}, using origin", area);
    entity.spawn_at(area.origin());
    Placement {
        pos: entity.pos,
        attempts: retry_cap,
        fell_back: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::sprite::{ALIEN, Bitmap, CRAFT, MOTHERSHIP};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    static SOLID_5X5: Bitmap = Bitmap {
        width: 5,
        height: 5,
        rows: &[0xF8; 5],
    };

    static HUGE: Bitmap = Bitmap {
        width: 80,
        height: 40,
        rows: &[0xFF; 400],
    };

    /// Blocks column 77 from row 5 down to row 40
    static POST: Bitmap = Bitmap {
        width: 5,
        height: 36,
        rows: &[0xF8; 36],
    };

    fn at(shape: &'static Bitmap, x: f64, y: f64) -> Entity {
        let mut e = Entity::new(shape);
        e.spawn_at(DVec2::new(x, y));
        e
    }

    #[test]
    fn test_solid_masks_overlap_then_separate() {
        let craft = at(&SOLID_5X5, 10.0, 10.0);
        let mut alien = at(&SOLID_5X5, 10.0, 10.0);
        assert!(overlaps(&craft, &alien));

        alien.pos = DVec2::new(20.0, 30.0);
        assert!(!overlaps(&craft, &alien));
    }

    #[test]
    fn test_invisible_never_collides() {
        let craft = at(&CRAFT, 10.0, 10.0);
        let mut alien = at(&ALIEN, 10.0, 10.0);
        alien.hide();
        assert!(!overlaps(&craft, &alien));
        assert!(!overlaps(&alien, &craft));
    }

    #[test]
    fn test_bounding_boxes_touch_but_masks_do_not() {
        // Boxes share only pixel (14, 10): a craft corner and an alien corner
        let craft = at(&CRAFT, 10.0, 10.0);
        let alien = at(&ALIEN, 14.0, 6.0);
        assert!(!craft.covers(14, 10));
        assert!(!alien.covers(14, 10));
        assert!(!overlaps(&craft, &alien));
    }

    #[test]
    fn test_place_avoids_protected() {
        let mut rng = Pcg32::seed_from_u64(1);
        let craft = at(&CRAFT, 30.0, 20.0);
        for _ in 0..50 {
            let mut alien = Entity::new(&ALIEN);
            let placement = place(&mut alien, SpawnArea::SMALL, &[&craft], &mut rng, 64);
            assert!(!placement.fell_back);
            assert!(!overlaps(&alien, &craft));
            let (x, y) = alien.pixel();
            assert!((1..=LCD_X - 7).contains(&x));
            assert!((PLAYFIELD_TOP..=LCD_Y - 7).contains(&y));
        }
    }

    #[test]
    fn test_place_terminates_when_board_is_full() {
        let mut rng = Pcg32::seed_from_u64(2);
        let wall = at(&HUGE, 0.0, 5.0);
        let mut boss = Entity::new(&MOTHERSHIP);
        let placement = place(&mut boss, SpawnArea::MOTHERSHIP, &[&wall], &mut rng, 8);
        assert!(placement.fell_back);
        assert_eq!(placement.pos, SpawnArea::MOTHERSHIP.origin());
        assert!(boss.visible);
    }

    #[test]
    fn test_place_scans_for_the_last_free_spot() {
        let mut rng = Pcg32::seed_from_u64(3);
        // Leaves (77, 41), the bottom-right corner of the area, as the only fit
        let wall = at(&HUGE, -3.0, 5.0);
        let post = at(&POST, 77.0, 5.0);
        let mut e = Entity::new(&SOLID_5X5);
        let placement = place(&mut e, SpawnArea::SMALL, &[&wall, &post], &mut rng, 1);
        assert!(placement.fell_back);
        assert_eq!(placement.pos, DVec2::new(77.0, 41.0));
        assert!(!overlaps(&e, &wall) && !overlaps(&e, &post));
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(ax in 0.0f64..40.0, ay in 0.0f64..40.0, bx in 0.0f64..40.0, by in 0.0f64..40.0) {
            let pairs: [(&'static Bitmap, &'static Bitmap); 3] =
                [(&CRAFT, &ALIEN), (&MOTHERSHIP, &CRAFT), (&ALIEN, &MOTHERSHIP)];
            for (sa, sb) in pairs {
                let a = at(sa, ax, ay);
                let b = at(sb, bx, by);
                prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
            }
        }
    }
}
