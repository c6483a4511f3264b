//! Chunk generation: two braided upward paths plus decoys
//!
//! Each chunk is a vertical slice `[index * chunk_height, (index + 1) * chunk_height)`.
//! Two anchors climb through it independently, each placing platforms a
//! reachable jump above its previous one. Every candidate is checked against
//! what is already placed (including the spill-over of the previous chunk)
//! so no platform gets buried under another without room to stand.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::surface::{Rect, Surface, SurfaceKind};
use crate::tuning::Tuning;

/// Tip of one braided path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Top-center of the last committed platform
    pub tip: Vec2,
    /// Search position; equals `tip` after a commit, creeps up on rejections
    pub cursor: Vec2,
}

impl Anchor {
    fn at(point: Vec2) -> Self {
        Self {
            tip: point,
            cursor: point,
        }
    }
}

/// One committed path platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub anchor: usize,
    pub from: Vec2,
    pub to: Vec2,
}

/// Output of a single chunk generation
#[derive(Debug, Clone, Default)]
pub struct GeneratedChunk {
    pub surfaces: Vec<Surface>,
    pub path: Vec<PathStep>,
}

/// Deterministic generator; chunks must be requested in increasing index order
#[derive(Debug, Clone)]
pub struct ChunkGenerator {
    seed: u64,
    tuning: Tuning,
    anchors: [Anchor; 2],
    /// Already generated surfaces low enough to conflict with future candidates
    carry: Vec<Surface>,
    next_index: i32,
}

impl ChunkGenerator {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let anchors = start_anchors(&tuning);
        Self {
            seed,
            tuning,
            anchors,
            carry: Vec::new(),
            next_index: 0,
        }
    }

    pub fn anchors(&self) -> [Anchor; 2] {
        self.anchors
    }

    /// Lowest non-negative index not generated yet
    pub fn next_index(&self) -> i32 {
        self.next_index
    }

    /// Generate chunk `index`
    ///
    /// Negative indices are below the ground and come back empty without
    /// touching the anchors. Non-negative indices must arrive in order.
    pub fn generate(&mut self, index: i32) -> GeneratedChunk {
        if index < 0 {
            return GeneratedChunk::default();
        }
        debug_assert_eq!(index, self.next_index, "chunks must be generated in order");
        self.next_index = index + 1;

        let t = &self.tuning;
        let start = index as f32 * t.chunk_height;
        let top = start + t.chunk_height;
        let mut rng = chunk_rng(self.seed, index);
        let mut out = GeneratedChunk::default();

        if index == 0 {
            out.surfaces.push(Surface::flat(
                SurfaceKind::Ground,
                Rect::new(0.0, t.ground_y, t.screen_width, t.ground_thickness),
            ));
            self.anchors = start_anchors(t);
        }

        let stretch = (1.0 + index as f32 * t.difficulty_per_chunk).min(t.difficulty_cap);
        let target = top - t.safety_margin;
        let mut rejected = 0u32;

        while self.anchors.iter().any(|a| a.cursor.y < target) {
            for (i, anchor) in self.anchors.iter_mut().enumerate() {
                if anchor.cursor.y >= target {
                    continue;
                }
                match advance_anchor(anchor, t, stretch, &mut rng, &out.surfaces, &self.carry) {
                    Some((step, placed)) => {
                        out.path.push(PathStep { anchor: i, ..step });
                        out.surfaces.extend(placed);
                    }
                    None => rejected += 1,
                }
            }
        }

        let decoys = place_decoys(t, start, top, &mut rng, &mut out.surfaces, &self.carry);

        log::info!(
            "Chunk {}: {} surfaces ({} path steps, {} decoys, {} rejected candidates)",
            index,
            out.surfaces.len(),
            out.path.len(),
            decoys,
            rejected
        );

        // Anything a later candidate could still bump into stays in the carry
        let lowest_tip = self.anchors.iter().map(|a| a.tip.y).fold(f32::INFINITY, f32::min);
        let lowest_reach = (lowest_tip - t.max_rise).min(top - t.decoy_max_rise) - t.platform_thickness;
        let floor = lowest_reach - t.headroom_clearance - 2.0 * t.padding_y;
        self.carry = self
            .carry
            .iter()
            .chain(&out.surfaces)
            .filter(|s| s.bounds().top() >= floor)
            .cloned()
            .collect();

        out
    }
}

fn start_anchors(t: &Tuning) -> [Anchor; 2] {
    let y = t.ground_top();
    [
        Anchor::at(Vec2::new(t.screen_width * t.anchor_start[0], y)),
        Anchor::at(Vec2::new(t.screen_width * t.anchor_start[1], y)),
    ]
}

/// Per-chunk RNG derived from the world seed and chunk index
fn chunk_rng(seed: u64, index: i32) -> Pcg32 {
    let chunk_seed = (index as u64).wrapping_mul(2654435761).wrapping_add(seed);
    Pcg32::seed_from_u64(chunk_seed)
}

/// Try one step along a path; on success returns the step and the new
/// platform (plus an optional wall)
fn advance_anchor(
    anchor: &mut Anchor,
    t: &Tuning,
    stretch: f32,
    rng: &mut Pcg32,
    placed: &[Surface],
    carry: &[Surface],
) -> Option<(PathStep, Vec<Surface>)> {
    let dy = t.max_jump_height * t.jump_height_fraction.sample(rng);
    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let reach = (t.max_jump_width * t.jump_width_fraction.sample(rng) * stretch).min(t.max_jump_width);

    let x = (anchor.cursor.x + sign * reach).clamp(t.margin, t.screen_width - t.margin);
    // Never ask for more than one jump above the last real platform
    let y = (anchor.cursor.y + dy).min(anchor.tip.y + t.max_jump_height);

    let mut width = t.platform_width.sample(rng);
    if (x - anchor.tip.x).abs() > t.max_jump_width * 0.8 {
        width += t.ledge_grace;
    }
    let rise = symmetric(rng, t.max_rise);
    let platform =
        Surface::slanted_from_center(SurfaceKind::Platform, x, y, width, t.platform_thickness, rise);

    if !is_valid_placement(&platform, placed.iter().chain(carry), t) {
        anchor.cursor.y += t.retry_nudge;
        log::debug!(
            "rejected platform at ({:.1}, {:.1}); cursor nudged to {:.1}",
            x,
            y,
            anchor.cursor.y
        );
        return None;
    }

    let from = anchor.tip;
    let to = Vec2::new(x, y);
    *anchor = Anchor::at(to);

    let direction = if to.x != from.x { (to.x - from.x).signum() } else { sign };
    let wall = rng
        .random_bool(t.wall_probability as f64)
        .then(|| leading_wall(&platform, direction, t))
        .filter(|wall| is_valid_placement(wall, placed.iter().chain(carry), t));

    let mut new = vec![platform];
    new.extend(wall);
    Some((PathStep { anchor: 0, from, to }, new))
}

/// Short cover wall standing on the platform edge facing the jump direction
fn leading_wall(platform: &Surface, direction: f32, t: &Tuning) -> Surface {
    let rect = platform.rect;
    let x = if direction > 0.0 {
        rect.right() - t.wall_thickness
    } else {
        rect.left()
    };
    let base = platform
        .surface_y_at(x)
        .min(platform.surface_y_at(x + t.wall_thickness));
    Surface::flat(
        SurfaceKind::Wall,
        Rect::new(x, base, t.wall_thickness, t.wall_height),
    )
}

/// Off-path platforms; returns how many were placed
fn place_decoys(
    t: &Tuning,
    start: f32,
    top: f32,
    rng: &mut Pcg32,
    surfaces: &mut Vec<Surface>,
    carry: &[Surface],
) -> usize {
    let mut placed = 0;
    for _ in 0..t.decoys_per_chunk {
        let width = t.decoy_width.sample(rng);
        let x = rng.random_range(t.margin..=t.screen_width - t.margin);
        let y = rng.random_range(start..top);
        let rise = symmetric(rng, t.decoy_max_rise);
        let mut decoy =
            Surface::slanted_from_center(SurfaceKind::Decoy, x, y, width, t.platform_thickness, rise);

        if rng.random_bool(t.hole_probability as f64) {
            let hole_width = width * t.hole_fraction.sample(rng);
            let lo = width * 0.1;
            let hi = width * 0.9 - hole_width;
            let hole_x = if hi > lo {
                rng.random_range(lo..=hi)
            } else {
                (width - hole_width) / 2.0
            };
            decoy = decoy.with_hole(hole_x, hole_width);
        }

        if is_valid_placement(&decoy, surfaces.iter().chain(carry), t) {
            surfaces.push(decoy);
            placed += 1;
        }
    }
    placed
}

fn symmetric(rng: &mut Pcg32, max: f32) -> f32 {
    if max > 0.0 {
        rng.random_range(-max..=max)
    } else {
        0.0
    }
}

/// Overlap and headroom validation against already placed surfaces
pub fn is_valid_placement<'a>(
    candidate: &Surface,
    existing: impl IntoIterator<Item = &'a Surface>,
    t: &Tuning,
) -> bool {
    let cb = candidate.bounds();
    let padded = cb.expanded(t.padding_x, t.padding_y);

    existing.into_iter().all(|other| {
        let ob = other.bounds();
        if padded.intersects(&ob.expanded(t.padding_x, t.padding_y)) {
            return false;
        }
        if cb.x_overlap(&ob) > 0.0 {
            let gap = (ob.bottom() - cb.top()).max(cb.bottom() - ob.top());
            if gap < t.headroom_clearance {
                return false;
            }
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn generate_run(seed: u64, chunks: i32) -> (ChunkGenerator, Vec<GeneratedChunk>) {
        let mut generator = ChunkGenerator::new(seed, Tuning::default());
        let out = (0..chunks).map(|i| generator.generate(i)).collect();
        (generator, out)
    }

    /// Headroom must hold for every horizontally overlapping pair except a
    /// wall and the platform it stands on (always the surface right before it)
    fn assert_headroom(surfaces: &[&Surface], clearance: f32) {
        for (i, a) in surfaces.iter().enumerate() {
            for (j, b) in surfaces.iter().enumerate().skip(i + 1) {
                if j == i + 1 && b.kind == SurfaceKind::Wall {
                    continue;
                }
                let (ab, bb) = (a.bounds(), b.bounds());
                if ab.x_overlap(&bb) > 0.0 {
                    let gap = (bb.bottom() - ab.top()).max(ab.bottom() - bb.top());
                    assert!(gap >= clearance, "gap {gap} between {a:?} and {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_first_chunk_starts_on_full_ground() {
        let t = Tuning::default();
        let (_, chunks) = generate_run(7, 1);
        let ground = &chunks[0].surfaces[0];
        assert_eq!(ground.kind, SurfaceKind::Ground);
        assert_eq!(ground.rect, Rect::new(0.0, 50.0, 800.0, 50.0));

        let first: Vec<_> = (0..2)
            .filter_map(|a| chunks[0].path.iter().find(|s| s.anchor == a))
            .collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].from, Vec2::new(t.screen_width * t.anchor_start[0], t.ground_top()));
        assert_eq!(first[1].from, Vec2::new(t.screen_width * t.anchor_start[1], t.ground_top()));
    }

    #[test]
    fn test_path_steps_are_reachable_and_continuous() {
        let t = Tuning::default();
        let mut generator = ChunkGenerator::new(42, t.clone());
        let mut tips = generator.anchors().map(|a| a.tip);

        for index in 0..12 {
            let chunk = generator.generate(index);
            for step in &chunk.path {
                // Each step continues exactly where that anchor stopped
                assert_eq!(step.from, tips[step.anchor]);
                let d = step.to - step.from;
                assert!(d.x.abs() <= t.max_jump_width + 1e-3);
                assert!(d.y > 0.0 && d.y <= t.max_jump_height + 1e-3);
                assert!(step.to.x >= t.margin && step.to.x <= t.screen_width - t.margin);
                tips[step.anchor] = step.to;
            }
            assert_eq!(generator.anchors().map(|a| a.tip), tips);
        }
    }

    #[test]
    fn test_cursors_cross_chunk_target() {
        let t = Tuning::default();
        let mut generator = ChunkGenerator::new(3, t.clone());
        for index in 0..5 {
            generator.generate(index);
            let target = (index + 1) as f32 * t.chunk_height - t.safety_margin;
            assert!(generator.anchors().iter().all(|a| a.cursor.y >= target));
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let (_, a) = generate_run(1234, 6);
        let (_, b) = generate_run(1234, 6);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.surfaces, y.surfaces);
        }
        let (_, c) = generate_run(4321, 6);
        assert_ne!(a[1].surfaces, c[1].surfaces);
    }

    #[test]
    fn test_negative_index_is_empty() {
        let mut generator = ChunkGenerator::new(1, Tuning::default());
        let before = generator.anchors();
        assert!(generator.generate(-1).surfaces.is_empty());
        assert_eq!(generator.anchors(), before);
        assert_eq!(generator.next_index(), 0);
    }

    #[test]
    fn test_headroom_check_rejects_low_ceiling() {
        let t = Tuning::default();
        let floor = Surface::flat(SurfaceKind::Platform, Rect::new(100.0, 100.0, 200.0, 18.0));
        let low = Surface::flat(SurfaceKind::Platform, Rect::new(150.0, 118.0 + 60.0, 100.0, 18.0));
        let high = Surface::flat(SurfaceKind::Platform, Rect::new(150.0, 118.0 + 90.0, 100.0, 18.0));
        let beside = Surface::flat(SurfaceKind::Platform, Rect::new(400.0, 140.0, 100.0, 18.0));

        assert!(!is_valid_placement(&low, [&floor], &t));
        assert!(is_valid_placement(&high, [&floor], &t));
        assert!(is_valid_placement(&beside, [&floor], &t));
        // Symmetric: a floor slid under an existing ceiling is just as bad
        assert!(!is_valid_placement(&floor, [&low], &t));
    }

    #[test]
    fn test_overlap_padding_rejects_near_touching() {
        let t = Tuning::default();
        let a = Surface::flat(SurfaceKind::Platform, Rect::new(100.0, 100.0, 100.0, 18.0));
        let b = Surface::flat(SurfaceKind::Platform, Rect::new(215.0, 100.0, 100.0, 18.0));
        assert!(!is_valid_placement(&b, [&a], &t));
    }

    #[test]
    fn test_walls_stand_on_their_platform() {
        let t = Tuning::default();
        let (_, chunks) = generate_run(99, 8);
        let mut walls = 0;
        for chunk in &chunks {
            for (i, s) in chunk.surfaces.iter().enumerate() {
                if s.kind != SurfaceKind::Wall {
                    continue;
                }
                walls += 1;
                let host = &chunk.surfaces[i - 1];
                assert_eq!(host.kind, SurfaceKind::Platform);
                assert!(s.rect.left() >= host.rect.left() && s.rect.right() <= host.rect.right());
                assert_eq!(s.rect.h, t.wall_height);
            }
        }
        assert!(walls > 0);
    }

    #[test]
    fn test_walls_keep_headroom_from_other_surfaces() {
        let t = Tuning::default();
        let (_, chunks) = generate_run(99, 8);
        let all: Vec<_> = chunks.iter().flat_map(|c| &c.surfaces).collect();
        for (i, wall) in all.iter().enumerate() {
            if wall.kind != SurfaceKind::Wall {
                continue;
            }
            let others = all
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i && j + 1 != i)
                .map(|(_, s)| *s);
            assert!(is_valid_placement(wall, others, &t), "wall {wall:?} crowds a neighbor");
        }
    }

    #[test]
    fn test_headroom_holds_across_chunk_boundaries() {
        let t = Tuning::default();
        let (_, chunks) = generate_run(5, 6);
        let all: Vec<_> = chunks.iter().flat_map(|c| &c.surfaces).collect();
        assert_headroom(&all, t.headroom_clearance);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_headroom_invariant(seed in any::<u64>(), chunks in 1i32..5) {
            let t = Tuning::default();
            let (_, out) = generate_run(seed, chunks);
            for chunk in &out {
                let all: Vec<_> = chunk.surfaces.iter().collect();
                assert_headroom(&all, t.headroom_clearance);
            }
        }

        #[test]
        fn prop_holes_fit_inside_decoys(seed in any::<u64>()) {
            let (_, out) = generate_run(seed, 4);
            for s in out.iter().flat_map(|c| &c.surfaces) {
                if let Some(hole) = s.hole {
                    prop_assert_eq!(s.kind, SurfaceKind::Decoy);
                    prop_assert!(hole.x >= 0.0 && hole.x + hole.width <= s.rect.w);
                }
            }
        }
    }
}
