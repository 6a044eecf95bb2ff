// terminal front end: raw stdin for the arrow keys, a coloured grid on stdout
// the play area is drawn with one cell per stride, so with the default
// 500x300 area and a stride of 10 the board is 51x31 cells
use std::fmt::Write as _;
use std::io::{self, Read, Write as _};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use circular_buffer::CircularBuffer;
use colored::Colorize;
use termios::{tcsetattr, Termios, ECHO, ICANON, TCSANOW};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::events::{ChannelObserver, EventChannel, Notification};
use crate::game::GameState;
use crate::geometry::{self, BoundingBox, Direction, Position};
use crate::simulation::{SharedGame, SimulationLoop};

const STDIN_FD: i32 = 0;

type InputBuffer = CircularBuffer<1024, u8>; // 1024 bytes in input buffer

fn clear_screen() {
    print!("{}[2J", 27 as char);
    print!("{}[1;1H", 27 as char);
}

/// Turns raw stdin bytes into directions. Arrow keys arrive as three bytes,
/// `ESC [` followed by `A`, `B`, `C` or `D`.
pub struct KeyDecoder {
    buffer: InputBuffer,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self {
            buffer: InputBuffer::new(),
        }
    }

    pub fn push(&mut self, key: u8) {
        match key {
            27 | 91 | 65 | 66 | 67 | 68 => {
                // if the buffer is full, ignore the input
                if self.buffer.is_full() {
                    return;
                }
                self.buffer.push_back(key);
            }
            _ => {
                // not part of an arrow key
            }
        }
    }

    pub fn next_direction(&mut self) -> Option<Direction> {
        while self.buffer.len() >= 3 {
            if self.buffer.nth_front(0) == Some(&27) && self.buffer.nth_front(1) == Some(&91) {
                let direction = match self.buffer.nth_front(2) {
                    Some(65) => Some(Direction::Up),
                    Some(66) => Some(Direction::Down),
                    Some(67) => Some(Direction::Right),
                    Some(68) => Some(Direction::Left),
                    _ => None,
                };
                if let Some(direction) = direction {
                    for _ in 0..3 {
                        self.buffer.pop_front();
                    }
                    return Some(direction);
                }
            }
            self.buffer.pop_front();
        }
        None
    }
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Body,
    Head,
    Prey,
}

/// Render surface fed by notifications only, it never touches the game state.
#[derive(Debug, Clone)]
pub struct TerminalView {
    width: i32,
    height: i32,
    stride: i32,
    body: Vec<Position>,
    prey: Option<BoundingBox>,
    score: u32,
    over: bool,
}

impl TerminalView {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            stride: config.stride,
            body: config.initial_body.clone(),
            prey: None,
            score: 0,
            over: false,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn apply(&mut self, notification: &Notification) {
        match notification {
            Notification::Moved { body } => self.body.clone_from(body),
            Notification::ScoreChanged { score } => self.score = *score,
            Notification::PreyCreated { bounds } => self.prey = Some(*bounds),
            Notification::GameOver => self.over = true,
        }
    }

    fn columns(&self) -> usize {
        (self.width / self.stride + 1) as usize
    }

    fn rows(&self) -> usize {
        (self.height / self.stride + 1) as usize
    }

    // positions past the walls (the fatal head) have no cell
    fn cell_of(&self, position: Position) -> Option<(usize, usize)> {
        if !geometry::is_within_bounds(position, self.width, self.height) {
            return None;
        }
        Some((
            (position.x / self.stride) as usize,
            (position.y / self.stride) as usize,
        ))
    }

    fn board(&self) -> Vec<Vec<Cell>> {
        let mut board = vec![vec![Cell::Empty; self.columns()]; self.rows()];
        if let Some((x, y)) = self.prey.and_then(|bounds| self.cell_of(bounds.center())) {
            board[y][x] = Cell::Prey;
        }
        let head = self.body.len().saturating_sub(1);
        for (index, segment) in self.body.iter().enumerate() {
            if let Some((x, y)) = self.cell_of(*segment) {
                board[y][x] = if index == head { Cell::Head } else { Cell::Body };
            }
        }
        board
    }

    pub fn render(&self) -> String {
        let mut frame = String::new();
        let columns = self.columns();
        //border up
        let _ = writeln!(frame, "▗{}▖", "▄▄".repeat(columns));
        for row in self.board() {
            frame.push('▐');
            for cell in row {
                let _ = match cell {
                    Cell::Empty => write!(frame, "  "),
                    Cell::Body => write!(frame, "{}", "⏺ ".green()),
                    Cell::Head => write!(frame, "{}", "Ӫ ".yellow()),
                    Cell::Prey => write!(frame, "{}", "♦ ".red()),
                };
            }
            frame.push_str("▌\n");
        }
        //border down
        let _ = writeln!(frame, "▝{}▘", "▀▀".repeat(columns));
        let _ = writeln!(frame, "Your Score: {}", self.score);
        if self.over {
            let _ = writeln!(frame, "{}", "Game Over!".red().bold());
            let _ = writeln!(frame, "Press any key to close");
        }
        frame
    }
}

/// Raw-mode switch for stdin, restored on drop.
struct TerminalStreams {
    old_termios: Termios,
    new_termios: Termios,
    active: bool,
}

impl TerminalStreams {
    fn new() -> io::Result<Self> {
        let termios = Termios::from_fd(STDIN_FD)?;
        let mut new_termios = termios;
        new_termios.c_lflag &= !(ICANON | ECHO); // no echo and canonical mode for stdin
        Ok(Self {
            old_termios: termios,
            new_termios,
            active: false,
        })
    }

    fn setup(&mut self) -> io::Result<()> {
        // stdin no longer waits for enter and no longer echoes
        tcsetattr(STDIN_FD, TCSANOW, &self.new_termios)?;
        self.active = true;
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        if self.active {
            tcsetattr(STDIN_FD, TCSANOW, &self.old_termios)?;
            self.active = false;
        }
        Ok(())
    }
}

impl Drop for TerminalStreams {
    fn drop(&mut self) {
        let _ = self.reset();
    }
}

fn spawn_stdin_channel() -> io::Result<Receiver<u8>> {
    let (tx, rx) = mpsc::channel::<u8>();
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            let mut reader = io::stdin();
            let mut buffer = [0u8; 1];
            loop {
                if let Err(err) = reader.read_exact(&mut buffer) {
                    debug!(%err, "stdin closed");
                    break;
                }
                if tx.send(buffer[0]).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

fn display_final_screen(score: u32) {
    println!("Game Over!");
    println!("Final Score: {}", score);
}

/// Plays one session in the current terminal and returns the final score.
pub fn play(config: GameConfig) -> Result<u32> {
    let (tx, notifications) = mpsc::channel();
    let mut events = EventChannel::new(config.dispatch_mode);
    events.register(ChannelObserver::new(tx));
    let mut state = GameState::new(&config, events).context("invalid game configuration")?;
    // deferred mode holds the first prey until drained
    state.events_mut().drain();
    let game = SharedGame::new(state);
    let mut view = TerminalView::new(&config);

    let mut streams = TerminalStreams::new().context("failed to read terminal settings")?;
    streams
        .setup()
        .context("failed to switch stdin to raw mode")?;
    let stdin_channel = spawn_stdin_channel().context("failed to spawn stdin reader")?;
    let simulation = SimulationLoop::new(game.clone(), config.tick_period)
        .spawn()
        .context("failed to spawn simulation thread")?;
    info!(width = config.width, height = config.height, "game started");

    let mut decoder = KeyDecoder::new();
    let mut dirty = true;
    loop {
        loop {
            match stdin_channel.try_recv() {
                Ok(key) => decoder.push(key),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => bail!("stdin reader stopped"),
            }
        }
        while let Some(direction) = decoder.next_direction() {
            // no directional input once the game is over
            if !view.is_over() {
                game.set_direction(direction)?;
            }
        }
        while let Ok(notification) = notifications.try_recv() {
            view.apply(&notification);
            dirty = true;
        }
        if dirty {
            clear_screen();
            print!("{}", view.render());
            io::stdout().flush().context("failed to draw frame")?;
            dirty = false;
        }
        if view.is_over() {
            break;
        }
        thread::sleep(Duration::from_millis(3));
    }

    let ticks = simulation.join()?;
    info!(ticks, score = view.score(), "game finished");

    // any key dismisses the game over screen, earlier presses do not count
    while stdin_channel.try_recv().is_ok() {}
    let _ = stdin_channel.recv();

    streams.reset().context("failed to restore terminal")?;
    display_final_screen(view.score());
    Ok(view.score())
}
