/// # meadow: A Sheep on the Run
///
/// This example scrolls through an endless meadow. The arrow keys move the
/// sheep left and right, the up arrow makes it jump. Landing on a plant ends
/// the game, as does pressing `q` or control-d.
use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;

use prettyplay::err::{report, Result};
use prettyplay::opt::Options;
use prettyplay::{Event, Handle, Io, Key, Point, Scene, Sprite};

const PLANTS: [&str; 8] = ["♣", "♠", "¥", "†", "‡", "*", "%", "¶"];
const TICK: i32 = 150;
const MARGIN: i64 = 4;

struct Meadow {
    scene: Scene,
    sheep: Handle,
    planted: i64,
    plants: HashSet<i64>,
}

impl Meadow {
    fn new() -> Result<Self> {
        let mut scene = Scene::new();
        let sheep = scene.add(0, 0, 1, &Sprite::new(["@", "&"]))?;
        Ok(Self {
            scene,
            sheep,
            planted: MARGIN,
            plants: HashSet::new(),
        })
    }

    /// Plant the ground up to the given column.
    fn plant_until<R: Rng>(&mut self, column: i64, rng: &mut R) -> Result<()> {
        let ground = Sprite::new(["═"]);
        while self.planted < column {
            self.planted += 1;
            self.scene.add(self.planted, 1, 0, &ground)?;
            if rng.random_ratio(1, 12) {
                let plant = PLANTS[rng.random_range(0..PLANTS.len())];
                self.scene.add(self.planted, 0, 0, &Sprite::new([plant]))?;
                self.plants.insert(self.planted);
            }
        }
        Ok(())
    }
}

fn run() -> Result<()> {
    let mut rng = rand::rng();
    let mut io = Io::with_options(std::io::stdin(), std::io::stdout(), &Options::with_tick(TICK))?;
    let mut meadow = Meadow::new()?;

    for column in -MARGIN..=MARGIN {
        meadow.scene.add(column, 1, 0, &Sprite::new(["═"]))?;
    }

    let (mut x, mut height, mut velocity) = (0_i64, 0_i64, 0_i64);

    loop {
        let columns = io.columns() as i64;
        let rows = io.rows() as i64;
        meadow.plant_until(x + columns, &mut rng)?;

        let origin = Point::new(x - columns / 3, 1 - rows * 2 / 3);
        meadow.scene.paint(&mut io, origin)?;
        io.sync()?;

        match io.read() {
            Event::Key(Key::CTRL_D) => break,
            Event::Key(key) if key == b'q' => break,
            Event::Key(Key::LEFT) if height > 0 || !meadow.plants.contains(&(x - 1)) => x -= 1,
            Event::Key(Key::RIGHT) if height > 0 || !meadow.plants.contains(&(x + 1)) => x += 1,
            Event::Key(Key::UP) if height == 0 => velocity = 3,
            Event::Tick if height > 0 || velocity > 0 => {
                height = (height + velocity).max(0);
                velocity -= 1;
                if height == 0 {
                    velocity = 0;
                    if meadow.plants.contains(&x) {
                        meadow.scene.morph(meadow.sheep, 1)?;
                        meadow.scene.move_to(meadow.sheep, x, 0, 1)?;
                        meadow.scene.paint(&mut io, origin)?;
                        io.sync()?;
                        std::thread::sleep(Duration::from_secs(1));
                        break;
                    }
                }
            }
            Event::Error(code) => return Err(std::io::Error::from_raw_os_error(code).into()),
            _ => {}
        }

        meadow.scene.move_to(meadow.sheep, x, -height, 1)?;
    }

    io.free();
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        report(&error);
    }
}
