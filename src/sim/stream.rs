//! Chunk streaming: which generated chunks take part in collision and rendering
//!
//! Chunks are generated once and cached forever. Loading and unloading only
//! toggle a flag; surface data is never discarded or regenerated.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

use super::generator::ChunkGenerator;
use super::surface::Surface;

/// Camera/viewport collaborator
pub trait Viewport {
    /// Recenter on a chunk; `center_y` is the chunk's vertical middle
    fn center_on_chunk(&mut self, index: i32, center_y: f32);
}

/// One generated vertical slice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    index: i32,
    surfaces: Vec<Surface>,
    loaded: bool,
}

impl Chunk {
    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Outcome of a per-frame streaming update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamChange {
    pub current: i32,
    pub unloaded: Vec<i32>,
}

fn build_chunk(generator: &mut ChunkGenerator, index: i32) -> Chunk {
    Chunk {
        index,
        surfaces: generator.generate(index).surfaces,
        loaded: false,
    }
}

/// Index -> chunk cache plus the active set
#[derive(Debug, Clone)]
pub struct ChunkStream {
    generator: ChunkGenerator,
    chunk_height: f32,
    /// Ordered so iteration over active surfaces is deterministic
    chunks: BTreeMap<i32, Chunk>,
    current: i32,
    generated: usize,
}

impl ChunkStream {
    pub fn new(generator: ChunkGenerator, chunk_height: f32) -> Self {
        Self {
            generator,
            chunk_height,
            chunks: BTreeMap::new(),
            current: 0,
            generated: 0,
        }
    }

    /// Load the first two chunks and center the viewport on chunk 0
    pub fn prime(&mut self, viewport: &mut impl Viewport) {
        self.current = 0;
        self.ensure(0);
        self.ensure(1);
        viewport.center_on_chunk(0, self.chunk_center(0));
    }

    /// Chunk index containing a world Y
    pub fn chunk_index_at(&self, y: f32) -> i32 {
        (y / self.chunk_height).floor() as i32
    }

    fn chunk_center(&self, index: i32) -> f32 {
        (index as f32 + 0.5) * self.chunk_height
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    /// How many chunks have been generated so far
    pub fn generated_count(&self) -> usize {
        self.generated
    }

    pub fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }

    pub fn get(&self, index: i32) -> Option<&Chunk> {
        self.chunks.get(&index)
    }

    /// Return chunk `index`, generating it on first use, and make sure it is loaded
    ///
    /// Missing lower indices are generated first (left unloaded) so the
    /// braided paths stay continuous whatever order chunks are requested in.
    pub fn ensure(&mut self, index: i32) -> &Chunk {
        while index >= 0 && self.generator.next_index() < index {
            let skipped = self.generator.next_index();
            let chunk = build_chunk(&mut self.generator, skipped);
            self.chunks.insert(skipped, chunk);
            self.generated += 1;
        }

        let chunk = match self.chunks.entry(index) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.generated += 1;
                entry.insert(build_chunk(&mut self.generator, index))
            }
        };
        if !chunk.loaded {
            chunk.loaded = true;
            log::info!("Loaded chunk {}", index);
        }
        chunk
    }

    fn unload(&mut self, index: i32) {
        if let Some(chunk) = self.chunks.get_mut(&index) {
            chunk.loaded = false;
            log::info!("Unloaded chunk {}", index);
        }
    }

    /// Re-evaluate the active set for the body's current height (once per frame)
    pub fn update(&mut self, body_y: f32, viewport: &mut impl Viewport) -> Option<StreamChange> {
        let index = self.chunk_index_at(body_y);
        if index == self.current {
            return None;
        }
        log::info!("Body crossed into chunk {} (from {})", index, self.current);
        self.current = index;

        self.ensure(index);
        self.ensure(index + 1);

        // Collect first, then mutate
        let stale: Vec<i32> = self
            .chunks
            .values()
            .filter(|c| c.loaded && (c.index - index).abs() > 1)
            .map(|c| c.index)
            .collect();
        for &i in &stale {
            self.unload(i);
        }

        viewport.center_on_chunk(index, self.chunk_center(index));
        Some(StreamChange {
            current: index,
            unloaded: stale,
        })
    }

    /// Surfaces of every loaded chunk, in chunk order
    pub fn active_surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.chunks
            .values()
            .filter(|c| c.loaded)
            .flat_map(|c| c.surfaces.iter())
    }

    /// Indices of loaded chunks, ascending
    pub fn loaded_indices(&self) -> Vec<i32> {
        self.chunks
            .values()
            .filter(|c| c.loaded)
            .map(|c| c.index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[derive(Default)]
    struct RecordingViewport {
        centers: Vec<(i32, f32)>,
    }

    impl Viewport for RecordingViewport {
        fn center_on_chunk(&mut self, index: i32, center_y: f32) {
            self.centers.push((index, center_y));
        }
    }

    fn stream() -> ChunkStream {
        let tuning = Tuning::default();
        let height = tuning.chunk_height;
        ChunkStream::new(ChunkGenerator::new(77, tuning), height)
    }

    #[test]
    fn test_ensure_caches_chunk() {
        let mut stream = stream();
        let first = stream.ensure(0).surfaces().as_ptr();
        let again = stream.ensure(0).surfaces().as_ptr();

        assert_eq!(first, again);
        assert_eq!(stream.generated_count(), 1);
    }

    #[test]
    fn test_prime_loads_two_chunks() {
        let mut stream = stream();
        let mut viewport = RecordingViewport::default();
        stream.prime(&mut viewport);

        assert_eq!(stream.loaded_indices(), vec![0, 1]);
        assert_eq!(viewport.centers, vec![(0, 300.0)]);
    }

    #[test]
    fn test_update_streams_forward_and_unloads_far_chunks() {
        let mut stream = stream();
        let mut viewport = RecordingViewport::default();
        stream.prime(&mut viewport);

        assert_eq!(stream.update(550.0, &mut viewport), None);

        let change = stream.update(650.0, &mut viewport).unwrap();
        assert_eq!(change.current, 1);
        assert!(change.unloaded.is_empty());
        assert_eq!(stream.loaded_indices(), vec![0, 1, 2]);

        let change = stream.update(1250.0, &mut viewport).unwrap();
        assert_eq!(change.current, 2);
        assert_eq!(change.unloaded, vec![0]);
        assert_eq!(stream.loaded_indices(), vec![1, 2, 3]);
        assert_eq!(viewport.centers.last(), Some(&(2, 1500.0)));

        // Unloaded data survives
        assert!(!stream.get(0).unwrap().surfaces().is_empty());
        assert_eq!(stream.generated_count(), 4);
    }

    #[test]
    fn test_falling_back_reloads_without_regenerating() {
        let mut stream = stream();
        let mut viewport = RecordingViewport::default();
        stream.prime(&mut viewport);
        stream.update(700.0, &mut viewport);
        stream.update(1300.0, &mut viewport);
        let before = stream.get(0).unwrap().surfaces().to_vec();

        stream.update(100.0, &mut viewport);
        assert!(stream.get(0).unwrap().is_loaded());
        assert_eq!(stream.get(0).unwrap().surfaces(), &before[..]);
        assert_eq!(stream.loaded_indices(), vec![0, 1]);
        assert_eq!(stream.generated_count(), 4);
    }

    #[test]
    fn test_skipping_ahead_generates_in_order() {
        let mut stream = stream();
        stream.ensure(3);
        assert_eq!(stream.generated_count(), 4);
        assert_eq!(stream.loaded_indices(), vec![3]);

        // Same content as a stream that walked there one chunk at a time
        let mut walked = self::stream();
        for i in 0..=3 {
            walked.ensure(i);
        }
        assert_eq!(stream.get(3).unwrap().surfaces(), walked.get(3).unwrap().surfaces());
    }

    #[test]
    fn test_negative_chunk_is_empty() {
        let mut stream = stream();
        assert_eq!(stream.chunk_index_at(-1.0), -1);
        assert!(stream.ensure(-1).surfaces().is_empty());
        assert_eq!(stream.generator().next_index(), 0);
    }
}
