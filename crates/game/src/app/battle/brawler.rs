use std::path::Path;

use engine::{
    load_scaled_image, Containable, Fighter, FighterIntent, LayerLoadError, Rect, RectPx, Surface,
    Vec2,
};
use image::imageops;
use image::RgbaImage;
use tracing::{info, warn};

use crate::app::roster::{FighterStats, RosterEntry};

/// Pixels per frame squared.
pub(crate) const GRAVITY: f32 = 0.8;
const HIT_FLASH_FRAMES: u32 = 6;
const SPRITE_FILE: &str = "idle.png";
const ATTACK_COLOR: [u8; 4] = [255, 236, 140, 200];
const HIT_FLASH_COLOR: [u8; 4] = [255, 255, 255, 150];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Left,
    Right,
}

struct Sprite {
    right: RgbaImage,
    left: RgbaImage,
}

/// Rectangle-bodied fighter with a timed melee swing in front of its facing side.
pub(crate) struct Brawler {
    name: String,
    stats: FighterStats,
    color: [u8; 4],
    sprite: Option<Sprite>,
    position: Vec2,
    velocity_y: f32,
    on_ground: bool,
    facing: Facing,
    intent: FighterIntent,
    health: u32,
    attack_frames_left: u32,
    attack_cooldown: u32,
    hit_flash: u32,
    floor_y: f32,
}

impl Brawler {
    pub(crate) fn new(
        entry: &RosterEntry,
        position: Vec2,
        facing: Facing,
        screen_height: u32,
    ) -> Self {
        let [r, g, b] = entry.color;
        Self {
            name: entry.name.clone(),
            stats: entry.stats,
            color: [r, g, b, 255],
            sprite: None,
            position,
            velocity_y: 0.0,
            on_ground: false,
            facing,
            intent: FighterIntent::default(),
            health: entry.stats.max_health,
            attack_frames_left: 0,
            attack_cooldown: 0,
            hit_flash: 0,
            floor_y: (screen_height as f32 - entry.stats.height).max(0.0),
        }
    }

    /// Same as `new`, plus the optional idle sprite from the character's folder.
    pub(crate) fn spawn(
        entry: &RosterEntry,
        base_folder: &Path,
        position: Vec2,
        facing: Facing,
        screen_height: u32,
    ) -> Self {
        let mut brawler = Self::new(entry, position, facing, screen_height);
        brawler.sprite = load_sprite(&entry.name, base_folder, &entry.stats);
        brawler
    }

    fn is_attacking(&self) -> bool {
        self.attack_frames_left > 0
    }

    fn start_attack_if_ready(&mut self) {
        if self.attack_frames_left > 0 || self.attack_cooldown > 0 {
            return;
        }
        self.attack_frames_left = self.stats.attack_frames;
        self.attack_cooldown = self.stats.attack_frames + self.stats.attack_cooldown_frames;
    }

    fn body_px(&self) -> RectPx {
        RectPx::new(
            self.position.x.round() as i32,
            self.position.y.round() as i32,
            self.stats.width.round() as i32,
            self.stats.height.round() as i32,
        )
    }
}

fn load_sprite(name: &str, base_folder: &Path, stats: &FighterStats) -> Option<Sprite> {
    let path = base_folder.join(SPRITE_FILE);
    let width = stats.width.round().max(1.0) as u32;
    let height = stats.height.round().max(1.0) as u32;
    match load_scaled_image(&path, width, height) {
        Ok(right) => {
            let left = imageops::flip_horizontal(&right);
            Some(Sprite { right, left })
        }
        Err(LayerLoadError::Open { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            warn!(
                character = name,
                path = %path.display(),
                "character_sprite_missing_using_fill"
            );
            None
        }
        Err(error) => {
            warn!(character = name, error = %error, "character_sprite_unreadable_using_fill");
            None
        }
    }
}

impl Containable for Brawler {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn extent(&self) -> Vec2 {
        Vec2::new(self.stats.width, self.stats.height)
    }
}

impl Fighter for Brawler {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_intent(&mut self, intent: FighterIntent) {
        self.intent = if self.is_defeated() {
            FighterIntent::default()
        } else {
            intent
        };
    }

    fn apply_gravity(&mut self) {
        if !self.on_ground {
            self.velocity_y += GRAVITY;
        }
    }

    fn update(&mut self) {
        self.attack_frames_left = self.attack_frames_left.saturating_sub(1);
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.hit_flash = self.hit_flash.saturating_sub(1);

        let intent = self.intent;
        let horizontal = intent.horizontal.clamp(-1.0, 1.0);
        self.position.x += horizontal * self.stats.move_speed;
        if horizontal < 0.0 {
            self.facing = Facing::Left;
        } else if horizontal > 0.0 {
            self.facing = Facing::Right;
        }

        if intent.jump && self.on_ground {
            self.velocity_y = -self.stats.jump_velocity;
            self.on_ground = false;
        }
        if intent.attack {
            self.start_attack_if_ready();
        }

        self.position.y += self.velocity_y;
        if self.position.y >= self.floor_y {
            self.position.y = self.floor_y;
            self.velocity_y = 0.0;
            self.on_ground = true;
        } else if self.velocity_y == 0.0 && self.on_ground {
            // Lifted off the floor without a jump.
            self.on_ground = false;
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let body = self.body_px();
        match &self.sprite {
            Some(sprite) => {
                let image = match self.facing {
                    Facing::Right => &sprite.right,
                    Facing::Left => &sprite.left,
                };
                surface.blit(image, body.x, body.y);
            }
            None => surface.fill_rect(body, self.color),
        }
        if self.hit_flash > 0 {
            surface.fill_rect(body, HIT_FLASH_COLOR);
        }
        if let Some(hit) = self.attack_box() {
            surface.fill_rect(
                RectPx::new(
                    hit.position.x.round() as i32,
                    hit.position.y.round() as i32,
                    hit.size.x.round() as i32,
                    hit.size.y.round() as i32,
                ),
                ATTACK_COLOR,
            );
        }
    }

    fn take_damage(&mut self, amount: u32) {
        if self.health == 0 {
            return;
        }
        self.health = self.health.saturating_sub(amount);
        self.hit_flash = HIT_FLASH_FRAMES;
        if self.health == 0 {
            self.attack_frames_left = 0;
            self.intent = FighterIntent::default();
            info!(character = %self.name, "fighter_defeated");
        }
    }

    fn health(&self) -> u32 {
        self.health
    }

    fn max_health(&self) -> u32 {
        self.stats.max_health
    }

    fn attack_box(&self) -> Option<Rect> {
        if !self.is_attacking() || self.is_defeated() {
            return None;
        }
        let reach = self.stats.attack_reach;
        let x = match self.facing {
            Facing::Right => self.position.x + self.stats.width,
            Facing::Left => self.position.x - reach,
        };
        Some(Rect::new(
            x,
            self.position.y + self.stats.height * 0.25,
            reach,
            self.stats.height * 0.3,
        ))
    }
}
