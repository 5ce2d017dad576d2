use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::Canvas;
use crate::err::{ErrorKind, Result};

/// The definition of a sprite.
///
/// A sprite has one or more forms, i.e., textual renderings such as the frames
/// of an animation or the states of a game piece. Each form is written
/// verbatim, so it may include ANSI escape sequences for styling. Adding a
/// sprite to a [`Scene`] copies the forms, so the definition can be reused.
///
/// # Example
///
/// ```
/// # use prettyplay::Sprite;
/// let sheep = Sprite::new(["🐑", "🐏"]);
/// assert_eq!(sheep.forms().len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sprite {
    forms: Vec<String>,
}

impl Sprite {
    /// Create a new sprite with the given forms.
    pub fn new<I, S>(forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            forms: forms.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the forms.
    pub fn forms(&self) -> &[String] {
        &self.forms
    }
}

/// An opaque reference to a sprite placed in a scene.
///
/// Handles identify one particular placement. They stay valid until the
/// sprite is removed or the scene is dropped. A handle never refers to a
/// sprite in any other scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A point in scene space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug)]
struct Placed {
    handle: Handle,
    forms: Box<[String]>,
    form: usize,
    x: i64,
    y: i64,
    z: i64,
}

impl Placed {
    fn key(&self) -> (i64, i64, i64) {
        (self.y, self.x, self.z)
    }
}

/// A sparse, layered space of sprites.
///
/// A scene is unbounded in all three dimensions. Painting renders the part of
/// the scene that fits onto a [`Canvas`], starting at some origin. Where
/// several sprites occupy the same cell, the one with the largest `z` shows.
/// Between sprites with equal `z`, the one added or moved last shows.
///
/// Scenes assume that most cells are empty. They store their sprites in a
/// list ordered by row, column, and layer, which lets painting visit each
/// sprite at most once. Mutations only mark the list as unordered; the next
/// [`Scene::sync`] or [`Scene::paint`] restores the order.
///
/// Each painted sprite's form starts at its cell. Forms are not clipped, so
/// text wider than one column overwrites cells to its right until the
/// painter reaches them.
#[derive(Debug, Default)]
pub struct Scene {
    sprites: Vec<Placed>,
    unsorted: bool,
}

impl Scene {
    /// Create a new, empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of sprites.
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Determine whether the scene has no sprites.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    fn find(&self, handle: Handle) -> Result<usize> {
        self.sprites
            .iter()
            .position(|sprite| sprite.handle == handle)
            .ok_or_else(|| ErrorKind::NotFound.into())
    }

    fn get_mut(&mut self, handle: Handle) -> Result<&mut Placed> {
        let index = self.find(handle)?;
        Ok(&mut self.sprites[index])
    }

    /// Add a copy of the sprite at the given coordinates, displaying its first
    /// form.
    ///
    /// This method fails with [`ErrorKind::InvalidArgument`] if the sprite has
    /// no forms and with [`ErrorKind::OutOfMemory`] if memory runs out.
    pub fn add(&mut self, x: i64, y: i64, z: i64, sprite: &Sprite) -> Result<Handle> {
        if sprite.forms.is_empty() {
            return Err(ErrorKind::InvalidArgument.into());
        }

        self.sprites.try_reserve(1)?;
        let mut forms = Vec::new();
        forms.try_reserve_exact(sprite.forms.len())?;
        forms.extend(sprite.forms.iter().cloned());

        let handle = Handle::next();
        self.sprites.push(Placed {
            handle,
            forms: forms.into_boxed_slice(),
            form: 0,
            x,
            y,
            z,
        });
        self.unsorted = true;
        Ok(handle)
    }

    /// Move the sprite to the given coordinates.
    pub fn move_to(&mut self, handle: Handle, x: i64, y: i64, z: i64) -> Result<()> {
        let sprite = self.get_mut(handle)?;
        sprite.x = x;
        sprite.y = y;
        sprite.z = z;

        // Move the sprite to the end so that it wins ties after resorting.
        let index = self.find(handle)?;
        let sprite = self.sprites.remove(index);
        self.sprites.push(sprite);
        self.unsorted = true;
        Ok(())
    }

    /// Switch the sprite to the form with the given index.
    ///
    /// This method fails with [`ErrorKind::OutOfRange`] if the sprite has no
    /// such form.
    pub fn morph(&mut self, handle: Handle, form: usize) -> Result<()> {
        let sprite = self.get_mut(handle)?;
        if sprite.forms.len() <= form {
            return Err(ErrorKind::OutOfRange.into());
        }
        sprite.form = form;
        Ok(())
    }

    /// Remove the sprite.
    ///
    /// This method fails with [`ErrorKind::NotFound`] if the handle does not
    /// refer to a sprite in this scene, including a sprite already removed.
    pub fn remove(&mut self, handle: Handle) -> Result<()> {
        let index = self.find(handle)?;
        self.sprites.remove(index);
        Ok(())
    }

    /// Get the sprite's coordinates `(x, y, z)`.
    pub fn position(&self, handle: Handle) -> Result<(i64, i64, i64)> {
        let sprite = &self.sprites[self.find(handle)?];
        Ok((sprite.x, sprite.y, sprite.z))
    }

    /// Get the index of the sprite's current form.
    pub fn form(&self, handle: Handle) -> Result<usize> {
        Ok(self.sprites[self.find(handle)?].form)
    }

    /// Restore the order of sprites by row, column, and layer.
    pub fn sync(&mut self) {
        if self.unsorted {
            self.sprites.sort_by_key(Placed::key);
            self.unsorted = false;
            tracing::trace!(sprites = self.sprites.len(), "scene sorted");
        }
    }

    /// Paint the scene onto the canvas.
    ///
    /// This method paints every cell of the canvas, row by row. The canvas's
    /// top-left cell shows the scene at `origin`. Cells without a sprite are
    /// painted with a single space. If writing a cell fails, this method stops
    /// right away and returns the error, leaving the canvas partially painted.
    pub fn paint<C: Canvas + ?Sized>(&mut self, canvas: &mut C, origin: Point) -> Result<()> {
        self.sync();

        let sprites = &self.sprites;
        let count = sprites.len();
        let mut cursor = 0;

        for row in 0..canvas.rows() {
            // Cells beyond the edge of scene space hold no sprites.
            let y = i64::try_from(row).ok().and_then(|row| origin.y.checked_add(row));

            for column in 0..canvas.columns() {
                let x = i64::try_from(column).ok().and_then(|column| origin.x.checked_add(column));
                let (Some(x), Some(y)) = (x, y) else {
                    canvas.puts(column + 1, row + 1, " ")?;
                    continue;
                };

                while cursor < count && sprites[cursor].y < y {
                    cursor += 1;
                }
                while cursor < count && sprites[cursor].y == y && sprites[cursor].x < x {
                    cursor += 1;
                }
                while cursor + 1 < count && sprites[cursor + 1].y == y && sprites[cursor + 1].x == x {
                    cursor += 1;
                }

                let text = match sprites.get(cursor) {
                    Some(sprite) if sprite.y == y && sprite.x == x => &sprite.forms[sprite.form],
                    _ => " ",
                };
                canvas.puts(column + 1, row + 1, text)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::Recorder;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_topmost_sprite_shows() -> Result<()> {
        let mut scene = Scene::new();
        let a = scene.add(0, 0, 0, &Sprite::new(["a", "b"]))?;
        let c = scene.add(0, 0, 1, &Sprite::new(["c"]))?;

        let mut canvas = Recorder::new(1, 1);
        scene.paint(&mut canvas, Point::new(0, 0))?;
        assert_eq!(canvas.lines(), ["c"]);

        scene.remove(c)?;
        scene.paint(&mut canvas, Point::new(0, 0))?;
        assert_eq!(canvas.lines(), ["a"]);

        scene.morph(a, 1)?;
        scene.paint(&mut canvas, Point::new(0, 0))?;
        assert_eq!(canvas.lines(), ["b"]);
        Ok(())
    }

    #[test]
    fn test_layers_ignore_insertion_order() -> Result<()> {
        let mut scene = Scene::new();
        scene.add(1, 0, 5, &Sprite::new(["X"]))?;
        scene.add(1, 0, 2, &Sprite::new(["y"]))?;
        scene.add(0, 0, -1, &Sprite::new(["z"]))?;

        let mut canvas = Recorder::new(3, 1);
        scene.paint(&mut canvas, Point::default())?;
        assert_eq!(canvas.lines(), ["zX "]);
        Ok(())
    }

    #[test]
    fn test_move_to() -> Result<()> {
        let mut scene = Scene::new();
        let player = scene.add(0, 0, 0, &Sprite::new(["@"]))?;
        let wall = scene.add(2, 1, 0, &Sprite::new(["#"]))?;

        scene.move_to(player, 2, 1, 0)?;
        assert_eq!(scene.position(player)?, (2, 1, 0));

        let mut canvas = Recorder::new(3, 2);
        scene.paint(&mut canvas, Point::default())?;
        assert_eq!(canvas.lines(), ["   ", "  @"], "moved sprite wins the tie");

        scene.move_to(wall, 2, 1, 0)?;
        scene.paint(&mut canvas, Point::default())?;
        assert_eq!(canvas.lines(), ["   ", "  #"]);
        Ok(())
    }

    #[test]
    fn test_blanks() -> Result<()> {
        let mut scene = Scene::new();
        scene.add(100, 100, 0, &Sprite::new(["far"]))?;

        let mut canvas = Recorder::new(4, 3);
        scene.paint(&mut canvas, Point::new(-2, -1))?;
        assert_eq!(canvas.lines(), ["    ", "    ", "    "]);
        assert_eq!(canvas.puts(), 12, "one write per cell");
        Ok(())
    }

    #[test]
    fn test_edge_of_scene_space() -> Result<()> {
        let mut scene = Scene::new();
        scene.add(i64::MAX, i64::MAX, 0, &Sprite::new(["e"]))?;
        scene.add(i64::MAX, 0, 0, &Sprite::new(["x"]))?;

        let mut canvas = Recorder::new(2, 1);
        scene.paint(&mut canvas, Point::new(i64::MAX, 0))?;
        assert_eq!(canvas.lines(), ["x "]);

        let mut canvas = Recorder::new(2, 2);
        scene.paint(&mut canvas, Point::new(i64::MAX - 1, i64::MAX))?;
        assert_eq!(canvas.lines(), [" e", "  "]);
        assert_eq!(canvas.puts(), 4, "every cell is painted");
        Ok(())
    }

    #[test]
    fn test_errors() -> Result<()> {
        let mut scene = Scene::new();
        let error = scene.add(0, 0, 0, &Sprite::default()).expect_err("sprite without forms");
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);

        let sprite = scene.add(0, 0, 0, &Sprite::new(["a"]))?;
        let error = scene.morph(sprite, 1).expect_err("only one form");
        assert_eq!(error.kind(), ErrorKind::OutOfRange);
        assert_eq!(scene.form(sprite)?, 0);

        scene.remove(sprite)?;
        let error = scene.remove(sprite).expect_err("sprite is gone");
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert!(scene.is_empty());

        // Handles don't cross scenes.
        let mut other = Scene::new();
        let sprite = other.add(0, 0, 0, &Sprite::new(["a"]))?;
        scene.add(0, 0, 0, &Sprite::new(["a"]))?;
        let error = scene.remove(sprite).expect_err("sprite belongs to other scene");
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(scene.len(), 1);
        Ok(())
    }

    #[test]
    fn test_failing_canvas_aborts() -> Result<()> {
        let mut scene = Scene::new();
        scene.add(0, 0, 0, &Sprite::new(["a"]))?;

        let mut canvas = Recorder::new(3, 3).failing_after(4);
        let error = scene.paint(&mut canvas, Point::default()).expect_err("canvas fails");
        assert_eq!(error.kind(), ErrorKind::Io);
        assert_eq!(canvas.puts(), 4);
        Ok(())
    }

    #[test]
    fn test_translation_invariance() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let glyphs = ["a", "b", "c", "d", "e"];

        for _ in 0..20 {
            let (dx, dy) = (rng.random_range(-50..50), rng.random_range(-50..50));
            let mut scene = Scene::new();
            let mut shifted = Scene::new();

            for _ in 0..30 {
                let (x, y, z) = (
                    rng.random_range(0..8),
                    rng.random_range(0..5),
                    rng.random_range(-2..3),
                );
                let sprite = Sprite::new([glyphs[rng.random_range(0..glyphs.len())]]);
                scene.add(x, y, z, &sprite)?;
                shifted.add(x + dx, y + dy, z, &sprite)?;
            }

            let mut expected = Recorder::new(8, 5);
            scene.paint(&mut expected, Point::new(0, 0))?;
            let mut actual = Recorder::new(8, 5);
            shifted.paint(&mut actual, Point::new(dx, dy))?;
            assert_eq!(expected.lines(), actual.lines());
        }
        Ok(())
    }
}
