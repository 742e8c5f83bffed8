/// The tile grid of one level.
///
/// Three parallel layers of `width * height` tile ids:
///   - `platforms` : solid ground; any non-blank id blocks
///   - `extras`    : ladders, coins and gems
///   - `background`: decoration only, never queried by physics
///
/// Every lookup is range-checked: cells outside the grid read as `BLANK`.
/// The only runtime mutation is `take_extra()` (item pickup).

use super::physics::Aabb;
use super::tile::{Collectible, TileId};
use crate::error::LevelError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Layer {
    Platforms,
    Extras,
    Background,
    Spawns,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: f32,
    platforms: Vec<TileId>,
    extras: Vec<TileId>,
    background: Vec<TileId>,
}

impl TileGrid {
    pub fn new(
        width: usize,
        height: usize,
        tile_size: f32,
        platforms: Vec<TileId>,
        extras: Vec<TileId>,
        background: Vec<TileId>,
    ) -> Result<Self, LevelError> {
        let expected = width * height;
        for (layer, tiles) in [
            (Layer::Platforms, &platforms),
            (Layer::Extras, &extras),
            (Layer::Background, &background),
        ] {
            if tiles.len() != expected {
                return Err(LevelError::LayerSize { layer, expected, found: tiles.len() });
            }
        }
        Ok(TileGrid { width, height, tile_size, platforms, extras, background })
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn tile_size(&self) -> f32 { self.tile_size }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    /// Raw layer contents, row-major. Spawns are not kept after construction.
    pub fn layer(&self, layer: Layer) -> &[TileId] {
        match layer {
            Layer::Platforms => &self.platforms,
            Layer::Extras => &self.extras,
            Layer::Background => &self.background,
            Layer::Spawns => &[],
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Tile at cell (x, y). Out of range = `BLANK`.
    #[inline]
    pub fn get(&self, layer: Layer, x: usize, y: usize) -> TileId {
        match self.index(x, y) {
            Some(i) => self.layer(layer).get(i).copied().unwrap_or(TileId::BLANK),
            None => TileId::BLANK,
        }
    }

    #[inline]
    pub fn platform_at(&self, x: usize, y: usize) -> TileId {
        self.get(Layer::Platforms, x, y)
    }

    #[inline]
    pub fn extra_at(&self, x: usize, y: usize) -> TileId {
        self.get(Layer::Extras, x, y)
    }

    /// Tile under a pixel position. Points outside `[0, w] x [0, h]` read as `BLANK`.
    pub fn tile_at_point(&self, layer: Layer, px: f32, py: f32) -> TileId {
        if px < 0.0 || py < 0.0 || px > self.pixel_width() || py > self.pixel_height() {
            return TileId::BLANK;
        }
        let x = (px / self.tile_size) as usize;
        let y = (py / self.tile_size) as usize;
        self.get(layer, x, y)
    }

    /// Pixel rectangle of cell (x, y).
    pub fn cell_rect(&self, x: usize, y: usize) -> Aabb {
        Aabb::new(
            x as f32 * self.tile_size,
            y as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Remove an extras tile, returning what was there.
    /// A second call on the same cell returns `BLANK`.
    pub fn take_extra(&mut self, x: usize, y: usize) -> TileId {
        match self.index(x, y) {
            Some(i) => std::mem::replace(&mut self.extras[i], TileId::BLANK),
            None => TileId::BLANK,
        }
    }

    /// Coins still in the extras layer.
    pub fn coins_left(&self) -> usize {
        self.extras.iter().filter(|t| t.collectible() == Some(Collectible::Coin)).count()
    }

    /// Coins and gems still in the extras layer.
    pub fn collectibles_left(&self) -> usize {
        self.extras.iter().filter(|t| t.collectible().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> TileGrid {
        // 3x2: platform row at the bottom, coin + ladder above
        let b = TileId::BLANK;
        TileGrid::new(
            3, 2, 8.0,
            vec![b, b, b, TileId::PLATFORM_LEFT, TileId::PLATFORM_MIDDLE, TileId::PLATFORM_RIGHT],
            vec![TileId::COIN, TileId::LADDER, TileId::GEM, b, TileId::LADDER, b],
            vec![b; 6],
        ).unwrap()
    }

    #[test]
    fn wrong_layer_size_is_rejected() {
        let err = TileGrid::new(2, 2, 8.0, vec![TileId::BLANK; 4], vec![TileId::BLANK; 3], vec![TileId::BLANK; 4]);
        assert_eq!(err, Err(LevelError::LayerSize { layer: Layer::Extras, expected: 4, found: 3 }));
    }

    #[test]
    fn out_of_range_reads_blank() {
        let g = small_grid();
        assert_eq!(g.platform_at(1, 1), TileId::PLATFORM_MIDDLE);
        assert!(g.platform_at(3, 1).is_blank());
        assert!(g.platform_at(0, 2).is_blank());
        assert!(g.extra_at(usize::MAX, 0).is_blank());
    }

    #[test]
    fn point_lookup() {
        let g = small_grid();
        assert_eq!(g.tile_at_point(Layer::Platforms, 12.0, 9.0), TileId::PLATFORM_MIDDLE);
        assert_eq!(g.tile_at_point(Layer::Extras, 9.0, 0.5), TileId::LADDER);
        assert!(g.tile_at_point(Layer::Platforms, -0.1, 9.0).is_blank());
        assert!(g.tile_at_point(Layer::Platforms, 24.5, 9.0).is_blank());
        // exactly on the far edge maps to a row past the grid
        assert!(g.tile_at_point(Layer::Platforms, 4.0, 16.0).is_blank());
    }

    #[test]
    fn take_extra_only_once() {
        let mut g = small_grid();
        assert_eq!(g.coins_left(), 1);
        assert_eq!(g.collectibles_left(), 2);
        assert_eq!(g.take_extra(0, 0), TileId::COIN);
        assert!(g.take_extra(0, 0).is_blank());
        assert_eq!(g.coins_left(), 0);
        assert_eq!(g.collectibles_left(), 1);
    }

    #[test]
    fn cell_rect_is_full_tile() {
        let g = small_grid();
        assert_eq!(g.cell_rect(2, 1), Aabb::new(16.0, 8.0, 8.0, 8.0));
    }
}
