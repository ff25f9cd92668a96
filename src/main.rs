use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use glam::Vec3;
use maze_stalker::config::env_parse;
use maze_stalker::{
    Aabb, Chunk, DifficultyLevel, Feature, Intent, SaveStore, Session, SessionState, TickReport,
    WorldConfig,
};
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const VIEW_W: usize = 41;
const VIEW_H: usize = 21;
const CELL_W: usize = 2;
const GLYPH_WORLD: f32 = 2.5;
const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_RENDER_FPS: u64 = 60;
const INPUT_HOLD_MS: u64 = 160;
const LOOK_STEP: f32 = 40.0;
const SAVE_SLOT: u8 = 1;
const DEFAULT_SAVE_DIR: &str = "saves";

#[derive(Clone, Copy)]
enum Key {
    Forward,
    Back,
    Left,
    Right,
    TurnLeft,
    TurnRight,
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Observer(usize),
    Agent,
    Wall,
    Door,
    SavePoint,
    Empty,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const EMPTY: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

struct Renderer {
    last: Vec<Cell>,
    frame: Vec<Cell>,
    last_hud: String,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new() -> Self {
        Self {
            last: vec![EMPTY; VIEW_W * VIEW_H],
            frame: vec![EMPTY; VIEW_W * VIEW_H],
            last_hud: String::new(),
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

#[derive(Default)]
struct HeldKeys {
    last_seen: [Option<Instant>; 6],
}

impl HeldKeys {
    fn press(&mut self, key: Key) {
        self.last_seen[idx_for_key(key)] = Some(Instant::now());
    }

    fn held(&self, key: Key, now: Instant) -> bool {
        self.last_seen[idx_for_key(key)]
            .map(|t| now.duration_since(t) <= Duration::from_millis(INPUT_HOLD_MS))
            .unwrap_or(false)
    }

    fn intent(&self) -> Intent {
        let now = Instant::now();
        let mut look_delta = 0.0;
        if self.held(Key::TurnRight, now) {
            look_delta += LOOK_STEP;
        }
        if self.held(Key::TurnLeft, now) {
            look_delta -= LOOK_STEP;
        }
        Intent {
            forward: self.held(Key::Forward, now),
            back: self.held(Key::Back, now),
            left: self.held(Key::Left, now),
            right: self.held(Key::Right, now),
            look_delta,
        }
    }
}

fn main() -> io::Result<()> {
    env_logger::init();
    log::info!("stalker starting up");

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout) -> io::Result<()> {
    let (tick_ms, render_fps) = read_speed_settings();
    let frame_time = Duration::from_micros(1_000_000 / render_fps.max(1));
    let store = SaveStore::new(read_save_dir());
    log::info!("save slots in {}", store.dir().display());
    let mut session = Session::new(WorldConfig::from_env());
    let mut keys = HeldKeys::default();
    let mut renderer = Renderer::new();
    let mut report: Option<TickReport> = None;
    let mut status = difficulty_prompt();
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('w') | KeyCode::Up => keys.press(Key::Forward),
                    KeyCode::Char('s') | KeyCode::Down => keys.press(Key::Back),
                    KeyCode::Char('a') => keys.press(Key::Left),
                    KeyCode::Char('d') => keys.press(Key::Right),
                    KeyCode::Char('h') | KeyCode::Left => keys.press(Key::TurnLeft),
                    KeyCode::Char('l') | KeyCode::Right => keys.press(Key::TurnRight),
                    KeyCode::Char(c @ '1'..='5') => {
                        let level = DifficultyLevel::ALL[c as usize - '1' as usize];
                        status = start_session(&mut session, level);
                        report = None;
                        renderer.needs_full = true;
                    }
                    KeyCode::Char('p') => {
                        let result = match session.state() {
                            SessionState::Paused => session.resume(),
                            _ => session.pause(),
                        };
                        status = match result {
                            Ok(()) => format!("{}", session.state()),
                            Err(e) => e.to_string(),
                        };
                    }
                    KeyCode::Char('e') => status = save_game(&session, &store),
                    KeyCode::Char('r') => status = load_game(&mut session, &store),
                    KeyCode::Char('n') => {
                        if session.reset().is_ok() {
                            status = difficulty_prompt();
                            report = None;
                            renderer.needs_full = true;
                        }
                    }
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= Duration::from_millis(tick_ms) {
            last_tick = Instant::now();
            if let Some(next) = session.tick(&keys.intent()) {
                if next.captured {
                    status = "It caught you. n for a new game, q to quit".to_string();
                }
                report = Some(next);
                compose(&session, &mut renderer);
            }
        }

        render(stdout, &session, report.as_ref(), &status, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn read_speed_settings() -> (u64, u64) {
    let tick_ms = env_parse::<u64>("MAZE_TICK_MS")
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TICK_MS);
    let render_fps = env_parse::<u64>("MAZE_FPS")
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS);
    (tick_ms, render_fps)
}

fn read_save_dir() -> PathBuf {
    std::env::var("MAZE_SAVE_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_DIR))
}

fn difficulty_prompt() -> String {
    "Choose: 1 very easy  2 easy  3 normal  4 hard  5 nightmare  (q to quit)".to_string()
}

fn start_session(session: &mut Session, level: DifficultyLevel) -> String {
    if let Err(e) = session.select_difficulty(level) {
        return e.to_string();
    }
    match session.finish_loading() {
        Ok(delta) => format!("{} - {} chunks generated", level, delta.added.len()),
        Err(e) => e.to_string(),
    }
}

fn save_game(session: &Session, store: &SaveStore) -> String {
    if session.state() != SessionState::Active {
        return "Nothing to save".to_string();
    }
    if !session.near_save_point() {
        return "Find a save point to save".to_string();
    }
    match store.save(SAVE_SLOT, &session.save_record()) {
        Ok(()) => format!("Saved to slot {SAVE_SLOT}"),
        Err(e) => {
            log::warn!("save failed: {e}");
            format!("Save failed: {e}")
        }
    }
}

fn load_game(session: &mut Session, store: &SaveStore) -> String {
    match store.load(SAVE_SLOT) {
        Ok(Some(record)) => match session.restore(&record) {
            Ok(()) => format!("Loaded slot {SAVE_SLOT}"),
            Err(e) => e.to_string(),
        },
        Ok(None) => format!("Slot {SAVE_SLOT} is empty"),
        Err(e) => {
            log::warn!("load failed: {e}");
            format!("Load failed: {e}")
        }
    }
}

fn view_origin(center: Vec3) -> (f32, f32) {
    (
        center.x - (VIEW_W / 2) as f32 * GLYPH_WORLD,
        center.z - (VIEW_H / 2) as f32 * GLYPH_WORLD,
    )
}

fn glyph_at(center: Vec3, pos: Vec3) -> Option<usize> {
    let (x0, z0) = view_origin(center);
    let gx = ((pos.x - x0) / GLYPH_WORLD).round();
    let gy = ((pos.z - z0) / GLYPH_WORLD).round();
    if gx < 0.0 || gy < 0.0 || gx >= VIEW_W as f32 || gy >= VIEW_H as f32 {
        return None;
    }
    Some(gy as usize * VIEW_W + gx as usize)
}

// Rebuilds the top-down frame from the loaded chunks' walls and features.
fn compose(session: &Session, renderer: &mut Renderer) {
    let center = session.observer().position();
    let (x0, z0) = view_origin(center);
    let view = Aabb {
        min: Vec3::new(x0 - GLYPH_WORLD, f32::MIN, z0 - GLYPH_WORLD),
        max: Vec3::new(
            x0 + VIEW_W as f32 * GLYPH_WORLD,
            f32::MAX,
            z0 + VIEW_H as f32 * GLYPH_WORLD,
        ),
    };

    let size = session.streamer().chunk_world_size();
    let visible: Vec<&Chunk> = session
        .streamer()
        .chunks()
        .filter(|chunk| {
            let origin = chunk.origin();
            let footprint = Aabb {
                min: Vec3::new(origin.x, f32::MIN, origin.z),
                max: Vec3::new(origin.x + size, f32::MAX, origin.z + size),
            };
            footprint.intersects(&view)
        })
        .collect();

    let walls: Vec<Aabb> = visible
        .iter()
        .flat_map(|chunk| chunk.segments())
        .map(|seg| seg.aabb())
        .filter(|aabb| aabb.intersects(&view))
        .collect();

    let half = Vec3::new(GLYPH_WORLD * 0.5, f32::MAX, GLYPH_WORLD * 0.5);
    for gy in 0..VIEW_H {
        for gx in 0..VIEW_W {
            let point = Vec3::new(x0 + gx as f32 * GLYPH_WORLD, 0.0, z0 + gy as f32 * GLYPH_WORLD);
            let probe = Aabb {
                min: point - half,
                max: point + half,
            };
            renderer.frame[gy * VIEW_W + gx] = if walls.iter().any(|w| w.intersects(&probe)) {
                Cell {
                    glyph: Glyph::Wall,
                    color: Color::DarkYellow,
                }
            } else {
                EMPTY
            };
        }
    }

    for chunk in &visible {
        for feature in chunk.features() {
            let cell = match feature {
                Feature::Door { .. } => Cell {
                    glyph: Glyph::Door,
                    color: Color::DarkRed,
                },
                Feature::SavePoint { .. } => Cell {
                    glyph: Glyph::SavePoint,
                    color: Color::Cyan,
                },
                Feature::Ceiling { .. } => continue,
            };
            if let Some(idx) = glyph_at(center, feature.position()) {
                renderer.frame[idx] = cell;
            }
        }
    }

    if let Some(idx) = glyph_at(center, session.agent().position()) {
        renderer.frame[idx] = Cell {
            glyph: Glyph::Agent,
            color: Color::Red,
        };
    }

    let heading = (session.observer().yaw() / std::f32::consts::FRAC_PI_2).round() as usize % 4;
    renderer.frame[(VIEW_H / 2) * VIEW_W + VIEW_W / 2] = Cell {
        glyph: Glyph::Observer(heading),
        color: Color::Yellow,
    };
}

fn render(
    stdout: &mut Stdout,
    session: &Session,
    report: Option<&TickReport>,
    status: &str,
    renderer: &mut Renderer,
) -> io::Result<()> {
    let needed_h = (VIEW_H + 3) as u16;
    let needed_w = (VIEW_W * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
    }

    let hud = match report {
        Some(r) => format!(
            "Eeriness {:>3.0}  Fear {:>3.0}  Dist {:>6.1}  Chunks {:>2} @ {}  {}  [{}]",
            r.tension.eeriness,
            r.tension.fear,
            r.distance,
            session.streamer().len(),
            session.streamer().center().map(|c| c.to_string()).unwrap_or_default(),
            session.difficulty(),
            session.state()
        ),
        None => format!("[{}]", session.state()),
    };
    if renderer.needs_full || hud != renderer.last_hud {
        draw_line(stdout, renderer.origin_x, renderer.origin_y - 1, &hud, Color::White)?;
        renderer.last_hud = hud;
    }

    let show_map = !matches!(session.state(), SessionState::Idle | SessionState::Loading);
    for idx in 0..VIEW_W * VIEW_H {
        let cell = if show_map { renderer.frame[idx] } else { EMPTY };
        if renderer.needs_full || cell != renderer.last[idx] {
            renderer.last[idx] = cell;
            draw_cell(stdout, renderer, idx % VIEW_W, idx / VIEW_W, cell)?;
        }
    }

    let near = report.map(|r| r.near_save_point).unwrap_or(false);
    let status_line = if near && session.state() == SessionState::Active {
        format!("{status}  (save point: e to save)")
    } else {
        status.to_string()
    };
    if renderer.needs_full || status_line != renderer.last_status {
        let y = renderer.origin_y + VIEW_H as u16;
        draw_line(stdout, renderer.origin_x, y, &status_line, Color::Grey)?;
        renderer.last_status = status_line;
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn draw_line(stdout: &mut Stdout, x: u16, y: u16, text: &str, color: Color) -> io::Result<()> {
    stdout.queue(MoveTo(x, y))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Clear(ClearType::CurrentLine))?;
    stdout.queue(Print(text))?;
    stdout.queue(ResetColor)?;
    Ok(())
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    cell: Cell,
) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Observer(0) => "▲",
        Glyph::Observer(1) => "▶",
        Glyph::Observer(2) => "▼",
        Glyph::Observer(_) => "◀",
        Glyph::Agent => "👹",
        Glyph::Wall => "██",
        Glyph::Door => "▒▒",
        Glyph::SavePoint => "💾",
        Glyph::Empty => "  ",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn idx_for_key(key: Key) -> usize {
    match key {
        Key::Forward => 0,
        Key::Back => 1,
        Key::Left => 2,
        Key::Right => 3,
        Key::TurnLeft => 4,
        Key::TurnRight => 5,
    }
}
