//! Shared fixtures: two fictional titles, mock processes and on-disk images

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::Once;

use igt_autosplitter::engine::{shared_settings, RunSettings, SharedSettings};
use igt_autosplitter::games::hash_executable;
use igt_autosplitter::memory::{MockMemoryReader, MockProcessFinder, ProcessRef};
use igt_autosplitter::{Autosplitter, GameCatalog};

pub const BASE: usize = 0x400000;

/// Classic title layout
pub mod crypt {
    pub const LEVEL: usize = 0x100;
    pub const LEVEL_TIME: usize = 0x104;
    pub const COMPLETE: usize = 0x108;
    pub const MENU: usize = 0x10C;
    pub const HEALTH: usize = 0x110;
    pub const SECRETS: usize = 0x114;
    pub const SAVED: usize = 0x200;
}

/// Later title layout
pub mod harbor {
    pub const TIMER: usize = 0x100;
    pub const LEVEL: usize = 0x104;
    pub const NEXT: usize = 0x108;
    pub const LOADING: usize = 0x10C;
    pub const HEALTH: usize = 0x110;
    pub const SECRETS: usize = 0x114;
    pub const VARIANT: usize = 0x118;
}

static LOGGER: Once = Once::new();

pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn image(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

fn catalog_toml(crypt_hash: &str, harbor_hash: &str) -> String {
    format!(
        r#"
        [[title]]
        id = "crypt"
        name = "Crypt of Ages"
        family = "classic"
        process_names = ["crypt.exe"]

        [title.classic]
        new_game_choice = 0
        exit_choice = 2

        [[title.variants]]
        id = "crypt"
        first_segment = 1
        final_segment = 3
        home_segment = 9

        [[title.versions]]
        id = "1.0"
        hash = "{crypt_hash}"

        [title.versions.fields.level]
        type = "u8"
        address = [0x100]

        [title.versions.fields.level_time]
        type = "u32"
        address = [0x104]

        [title.versions.fields.level_complete]
        type = "bool"
        address = [0x108]

        [title.versions.fields.menu_choice]
        type = "u8"
        address = [0x10C]

        [title.versions.fields.health]
        type = "i16"
        address = [0x110]

        [title.versions.fields.secrets]
        type = "u8"
        address = [0x114]

        [title.versions.fields.saved_times]
        type = "u32"
        address = [0x200]
        count = 4
        stride = 4

        [[title]]
        id = "harbor"
        name = "Harbor Run"
        family = "later"
        process_names = ["harbor.exe"]

        [title.later]
        cutscene_segments = [9]

        [[title.variants]]
        id = "harbor"
        first_segment = 1
        final_segment = 3
        selector = 0

        [[title.variants]]
        id = "harbor-plus"
        first_segment = 20
        final_segment = 22
        selector = 1

        [[title.versions]]
        id = "2.0"
        hash = "{harbor_hash}"

        [title.versions.fields.timer]
        type = "u32"
        address = [0x100]

        [title.versions.fields.level]
        type = "u8"
        address = [0x104]

        [title.versions.fields.next_level]
        type = "u8"
        address = [0x108]

        [title.versions.fields.loading]
        type = "bool"
        address = [0x10C]

        [title.versions.fields.health]
        type = "f32"
        address = [0x110]

        [title.versions.fields.secrets]
        type = "u8"
        address = [0x114]

        [title.versions.fields.variant]
        type = "u8"
        address = [0x118]
        "#
    )
}

/// A launched mock game
pub struct Game {
    pub mem: MockMemoryReader,
    pub pid: u32,
}

impl Game {
    pub fn u8(&self, offset: usize, value: u8) -> &Self {
        self.mem.write_u8(BASE + offset, value);
        self
    }

    pub fn i16(&self, offset: usize, value: i16) -> &Self {
        self.mem.write_i16(BASE + offset, value);
        self
    }

    pub fn u32(&self, offset: usize, value: u32) -> &Self {
        self.mem.write_u32(BASE + offset, value);
        self
    }

    pub fn f32(&self, offset: usize, value: f32) -> &Self {
        self.mem.write_bytes(BASE + offset, &value.to_le_bytes());
        self
    }
}

/// Autosplitter wired to mock processes and a two-title catalog
pub struct Rig {
    pub splitter: Autosplitter,
    pub finder: MockProcessFinder,
    pub settings: SharedSettings,
    crypt_image: tempfile::NamedTempFile,
    harbor_image: tempfile::NamedTempFile,
    next_pid: u32,
}

impl Rig {
    pub fn new() -> Self {
        init_logging();
        let crypt_image = image(b"crypt of ages 1.0");
        let harbor_image = image(b"harbor run 2.0");
        let catalog = GameCatalog::from_toml_str(&catalog_toml(
            &hash_executable(crypt_image.path()).unwrap(),
            &hash_executable(harbor_image.path()).unwrap(),
        ))
        .unwrap();

        let finder = MockProcessFinder::new();
        let settings = shared_settings(RunSettings::default());
        let splitter = Autosplitter::new(catalog, Box::new(finder.clone()), settings.clone());

        Self {
            splitter,
            finder,
            settings,
            crypt_image,
            harbor_image,
            next_pid: 100,
        }
    }

    fn launch(&mut self, name: &str, executable: PathBuf) -> Game {
        self.next_pid += 1;
        let mem = MockMemoryReader::new();
        let process = ProcessRef {
            pid: self.next_pid,
            name: name.to_string(),
            executable,
            base_address: BASE,
            module_size: 0x10000,
            is_64_bit: false,
        };
        self.finder.add_process(process, mem.clone());
        Game {
            mem,
            pid: self.next_pid,
        }
    }

    /// Start the Classic title at its title screen with "New Game" highlighted
    pub fn launch_crypt(&mut self) -> Game {
        let path = self.crypt_image.path().to_path_buf();
        let game = self.launch("crypt.exe", path);
        game.u8(crypt::LEVEL, 1)
            .u32(crypt::LEVEL_TIME, 0)
            .u8(crypt::COMPLETE, 0)
            .u8(crypt::MENU, 0)
            .i16(crypt::HEALTH, 100)
            .u8(crypt::SECRETS, 0);
        for i in 0..4 {
            game.u32(crypt::SAVED + i * 4, 0);
        }
        game
    }

    /// Start the Later title in its main menu
    pub fn launch_harbor(&mut self) -> Game {
        let path = self.harbor_image.path().to_path_buf();
        let game = self.launch("harbor.exe", path);
        game.u32(harbor::TIMER, 0)
            .u8(harbor::LEVEL, 0)
            .u8(harbor::NEXT, 0)
            .u8(harbor::LOADING, 0)
            .f32(harbor::HEALTH, 100.0)
            .u8(harbor::SECRETS, 0)
            .u8(harbor::VARIANT, 0);
        game
    }

    /// Launch a process whose executable is not in the catalog
    pub fn launch_unknown(&mut self, image_contents: &[u8]) -> (Game, tempfile::NamedTempFile) {
        let file = image(image_contents);
        let game = self.launch("crypt.exe", file.path().to_path_buf());
        (game, file)
    }

    pub fn exit(&self, game: &Game) {
        self.finder.remove_process(game.pid);
    }

    pub fn tick(&mut self) -> bool {
        self.splitter.refresh()
    }
}
