use std::str::FromStr;

pub const DEFAULT_CHUNK_CELLS: usize = 15;
pub const DEFAULT_CELL_SIZE: f32 = 10.0;
pub const DEFAULT_LOAD_RADIUS: i32 = 1;
pub const DEFAULT_STREAM_EVERY: u32 = 3;
pub const WALL_HEIGHT: f32 = 4.0;
pub const WALL_THICKNESS: f32 = 0.2;
pub const DOOR_CHANCE: f32 = 0.3;
pub const SAVE_POINT_CHANCE: f32 = 0.05;
pub const SAVE_POINT_REACH: f32 = 3.0;
pub const EYE_HEIGHT: f32 = 2.0;
pub const OBSERVER_RADIUS: f32 = 0.5;
pub const MOVE_SPEED: f32 = 0.15;
pub const MOVE_SMOOTHING: f32 = 0.1;
pub const LOOK_SENSITIVITY: f32 = 0.002;

/// Knobs shared by the streamer, builder and session.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub chunk_cells: usize,
    pub cell_size: f32,
    pub load_radius: i32,
    pub stream_every: u32,
    pub seed: Option<u64>,
    pub wall_height: f32,
    pub wall_thickness: f32,
    pub door_chance: f32,
    pub save_point_chance: f32,
    pub save_point_reach: f32,
    pub border_passages: bool,
    pub eye_height: f32,
    pub observer_radius: f32,
    pub move_speed: f32,
    pub move_smoothing: f32,
    pub look_sensitivity: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_cells: DEFAULT_CHUNK_CELLS,
            cell_size: DEFAULT_CELL_SIZE,
            load_radius: DEFAULT_LOAD_RADIUS,
            stream_every: DEFAULT_STREAM_EVERY,
            seed: None,
            wall_height: WALL_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            door_chance: DOOR_CHANCE,
            save_point_chance: SAVE_POINT_CHANCE,
            save_point_reach: SAVE_POINT_REACH,
            border_passages: false,
            eye_height: EYE_HEIGHT,
            observer_radius: OBSERVER_RADIUS,
            move_speed: MOVE_SPEED,
            move_smoothing: MOVE_SMOOTHING,
            look_sensitivity: LOOK_SENSITIVITY,
        }
    }
}

impl WorldConfig {
    /// Defaults with `MAZE_*` environment overrides applied. Unparseable or
    /// out-of-range values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(radius) = env_parse::<i32>("MAZE_LOAD_RADIUS").filter(|v| *v >= 0) {
            config.load_radius = radius;
        }
        if let Some(every) = env_parse::<u32>("MAZE_STREAM_EVERY").filter(|v| *v > 0) {
            config.stream_every = every;
        }
        if let Some(seed) = env_parse::<u64>("MAZE_SEED") {
            config.seed = Some(seed);
        }
        let border = std::env::var("MAZE_BORDER_PASSAGES").ok();
        if let Some(flag) = border.and_then(|v| parse_flag(&v)) {
            config.border_passages = flag;
        }
        config
    }

    pub fn chunk_world_size(&self) -> f32 {
        self.chunk_cells as f32 * self.cell_size
    }
}

pub fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chunk_is_150_units() {
        assert_eq!(WorldConfig::default().chunk_world_size(), 150.0);
    }

    #[test]
    fn flags() {
        assert_eq!(parse_flag(" On "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
