mod board;
mod solver;

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{self, Stylize},
    terminal::{self, ClearType},
};
use rand::{thread_rng, Rng};

use board::{Board, Tile, CELLS, SIDE};
use solver::SolveTask;

// fraction of shuffles deliberately dealt unsolvable
const UNSOLVABLE_CHANCE: f64 = 0.1;

struct Game {
    board: Board,
    solvable: bool,
    plan: Vec<Tile>,
    step: usize,
    pending: Option<SolveTask>,
    hint_wanted: bool,
    moves_made: usize,
    status: String,
}

impl Game {
    fn new() -> Self {
        let mut game = Game {
            board: Board::solved(),
            solvable: true,
            plan: Vec::new(),
            step: 0,
            pending: None,
            hint_wanted: false,
            moves_made: 0,
            status: String::new(),
        };
        game.reshuffle();
        game
    }

    fn reshuffle(&mut self) {
        let force_unsolvable = thread_rng().gen_bool(UNSOLVABLE_CHANCE);
        self.board = Board::shuffled(force_unsolvable);
        self.solvable = self.board.is_solvable();
        self.plan.clear();
        self.step = 0;
        self.moves_made = 0;
        self.hint_wanted = false;
        // a fresh shuffle supersedes any search still in flight
        self.pending = None;
        if self.solvable {
            self.pending = Some(SolveTask::spawn(self.board));
            self.status = String::from("shuffled");
        } else {
            self.status = String::from("unsolvable configuration! press s to reshuffle");
        }
    }

    /// Arrow keys slide the tile on the opposite side of the blank, so the
    /// tiles appear to move in the pressed direction.
    fn handle_arrow(&mut self, code: KeyCode) {
        let blank = self.board.blank_index();
        let source = match code {
            KeyCode::Left if blank % SIDE < SIDE - 1 => Some(blank + 1),
            KeyCode::Right if blank % SIDE > 0 => Some(blank - 1),
            KeyCode::Up if blank + SIDE < CELLS => Some(blank + SIDE),
            KeyCode::Down if blank >= SIDE => Some(blank - SIDE),
            _ => None,
        };
        if let Some(index) = source {
            if self.board.slide(index) {
                self.moves_made += 1;
                // a manual move invalidates the computed plan
                self.plan.clear();
                self.step = 0;
                self.pending = None;
                self.hint_wanted = false;
                self.status.clear();
            }
        }
    }

    fn request_hint(&mut self) {
        if !self.solvable {
            self.status = String::from("no hints for an unsolvable board");
            return;
        }
        if self.board.is_solved() {
            self.status = String::from("already solved");
            return;
        }
        if self.step < self.plan.len() {
            self.apply_next_hint();
        } else {
            if self.pending.is_none() {
                self.pending = Some(SolveTask::spawn(self.board));
            }
            self.hint_wanted = true;
            self.status = String::from("solving…");
        }
    }

    fn apply_next_hint(&mut self) {
        let step = self.plan[self.step];
        self.step += 1;
        if self.board.slide(self.board.index_of(step.value)) {
            self.moves_made += 1;
            self.status = format!("hint: slide {}", step.value);
        }
    }

    /// Drains a finished background search; called every pass of the event
    /// loop so results never block input handling.
    fn poll_solver(&mut self) {
        let plan = match self.pending.as_mut().and_then(SolveTask::try_take) {
            Some(plan) => plan,
            None => return,
        };
        self.plan = plan;
        self.step = 0;
        self.pending = None;
        if self.hint_wanted {
            self.hint_wanted = false;
            if self.step < self.plan.len() {
                self.apply_next_hint();
            }
        }
    }
}

fn draw(game: &Game, out: &mut impl Write) -> io::Result<()> {
    queue!(out, terminal::Clear(ClearType::All))?;
    let mut row = 0;
    queue!(out, cursor::MoveTo(0, row), style::Print("fifteen".bold()))?;
    row += 2;
    for line in game.board.to_string().lines() {
        queue!(out, cursor::MoveTo(2, row), style::Print(line))?;
        row += 1;
    }
    row += 1;
    let summary = if game.board.is_solved() {
        format!("solved in {} moves!", game.moves_made)
    } else {
        format!("moves: {}", game.moves_made)
    };
    queue!(out, cursor::MoveTo(0, row), style::Print(summary))?;
    row += 1;
    if !game.status.is_empty() {
        queue!(
            out,
            cursor::MoveTo(0, row),
            style::Print(game.status.as_str().dim())
        )?;
    }
    row += 2;
    queue!(
        out,
        cursor::MoveTo(0, row),
        style::Print("arrows slide · s shuffle · h hint · q quit".dim())
    )?;
    out.flush()
}

fn run(out: &mut impl Write) -> io::Result<()> {
    let mut game = Game::new();
    loop {
        game.poll_solver();
        draw(&game, out)?;
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('s') => game.reshuffle(),
                KeyCode::Char('h') => game.request_hint(),
                KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                    game.handle_arrow(code)
                }
                _ => {}
            }
        }
    }
}

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = run(&mut stdout);

    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}
