use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::board::{Board, Tile, BLANK, CELLS, SIDE};

fn manhattan(board: &Board) -> usize {
    let mut distance = 0;
    for (i, &value) in board.cells().iter().enumerate() {
        if value != BLANK {
            let goal = value as usize - 1;
            distance += (i / SIDE).abs_diff(goal / SIDE);
            distance += (i % SIDE).abs_diff(goal % SIDE);
        }
    }
    distance
}

/// Running-max scan per row and column: among tiles already in their goal
/// line, every tile that is not a new maximum is blocked by an earlier one
/// and adds 2. Cheaper than the pairwise count and close enough on 4x4
/// boards, though not strictly admissible, so solutions may be slightly
/// longer than optimal.
fn linear_conflict(board: &Board) -> usize {
    let cells = board.cells();
    let mut conflicts = 0;
    for line in 0..SIDE {
        let mut max_in_row = 0;
        let mut max_in_col = 0;
        for offset in 0..SIDE {
            let row_value = cells[line * SIDE + offset];
            if row_value != BLANK && (row_value as usize - 1) / SIDE == line {
                if row_value > max_in_row {
                    max_in_row = row_value;
                } else {
                    conflicts += 2;
                }
            }
            let col_value = cells[offset * SIDE + line];
            if col_value != BLANK && (col_value as usize - 1) % SIDE == line {
                if col_value > max_in_col {
                    max_in_col = col_value;
                } else {
                    conflicts += 2;
                }
            }
        }
    }
    conflicts
}

fn heuristic(board: &Board) -> usize {
    manhattan(board) + linear_conflict(board)
}

/// Frontier entry. Nodes are never mutated once pushed; successors are
/// freshly allocated with their own move history.
struct Node {
    board: Board,
    moves: Vec<Tile>,
    cost: usize,
    priority: usize,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed so the BinaryHeap pops the lowest priority first
        other.priority.cmp(&self.priority)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Slots the blank may swap with: left/right only within the same row,
/// up/down within the grid.
fn neighbours(blank: usize) -> Vec<usize> {
    let mut slots = Vec::with_capacity(4);
    if blank % SIDE > 0 {
        slots.push(blank - 1);
    }
    if blank % SIDE < SIDE - 1 {
        slots.push(blank + 1);
    }
    if blank >= SIDE {
        slots.push(blank - SIDE);
    }
    if blank + SIDE < CELLS {
        slots.push(blank + SIDE);
    }
    slots
}

/// A* search over board snapshots, keyed by cost-so-far plus heuristic.
///
/// Each move records the tile that just arrived in the blank's old slot, so
/// the result replays by looking the tile up by value in the live board and
/// sliding it into the blank.
///
/// The input must be solvable; callers check with `Board::is_solvable`
/// before handing a board over. An exhausted frontier returns an empty
/// sequence rather than an error.
pub fn solve(initial: &Board) -> Vec<Tile> {
    let mut frontier = BinaryHeap::new();
    let mut visited: HashSet<Board> = HashSet::new();
    visited.insert(*initial);
    frontier.push(Node {
        board: *initial,
        moves: Vec::new(),
        cost: 0,
        priority: heuristic(initial),
    });

    while let Some(node) = frontier.pop() {
        if heuristic(&node.board) == 0 {
            return node.moves;
        }

        let blank = node.board.blank_index();
        for slot in neighbours(blank) {
            let next = node.board.swapped(blank, slot);
            // mark at enqueue time so a state is never scheduled twice
            if visited.insert(next) {
                let mut moves = node.moves.clone();
                moves.push(Tile {
                    value: next.value_at(blank),
                    index: blank,
                });
                frontier.push(Node {
                    board: next,
                    moves,
                    cost: node.cost + 1,
                    priority: node.cost + 1 + heuristic(&next),
                });
            }
        }
    }

    Vec::new()
}

/// One search running off the caller's thread. The result is delivered
/// exactly once; dropping the task discards it when it eventually arrives,
/// which is how a reshuffle supersedes a search still in flight.
pub struct SolveTask {
    result: Receiver<Vec<Tile>>,
}

impl SolveTask {
    pub fn spawn(board: Board) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // send fails only when the task was dropped; nothing to do then
            let _ = tx.send(solve(&board));
        });
        Self { result: rx }
    }

    /// Non-blocking poll, meant to be called from a UI loop.
    pub fn try_take(&mut self) -> Option<Vec<Tile>> {
        self.result.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use std::time::{Duration, Instant};

    fn scramble(steps: usize) -> Board {
        let mut rng = thread_rng();
        let mut board = Board::solved();
        let mut walked = 0;
        while walked < steps {
            if board.slide(rng.gen_range(0..CELLS)) {
                walked += 1;
            }
        }
        board
    }

    /// Applies each move the way the UI does: find the tile by value, slide
    /// it into the blank, and check it landed in the recorded slot.
    fn replay(mut board: Board, moves: &[Tile]) -> Board {
        for step in moves {
            let from = board.index_of(step.value);
            assert!(board.slide(from), "every move must be a legal slide");
            assert_eq!(
                board.value_at(step.index),
                step.value,
                "tile must land in the recorded slot"
            );
        }
        board
    }

    #[test]
    fn solved_board_needs_no_moves() {
        assert!(solve(&Board::solved()).is_empty());
    }

    #[test]
    fn one_slide_from_solved_records_one_move() {
        let board =
            Board::from_cells([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 16, 15]);
        assert!(board.is_solvable());
        let moves = solve(&board);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0], Tile { value: 15, index: 14 });
        assert!(replay(board, &moves).is_solved());
    }

    #[test]
    fn rotated_tail_solves_in_two_moves() {
        let board =
            Board::from_cells([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 16, 14, 15]);
        assert!(board.is_solvable());
        let moves = solve(&board);
        assert_eq!(moves.len(), 2);
        assert!(replay(board, &moves).is_solved());
    }

    #[test]
    fn scrambles_replay_to_solved() {
        for _ in 0..8 {
            let board = scramble(28);
            assert!(board.is_solvable());
            let moves = solve(&board);
            assert!(replay(board, &moves).is_solved());
        }
    }

    #[test]
    fn heuristic_is_zero_only_when_solved() {
        assert_eq!(heuristic(&Board::solved()), 0);
        let board = scramble(20);
        if !board.is_solved() {
            assert!(heuristic(&board) > 0);
        }
    }

    #[test]
    fn blocked_pair_adds_conflict_penalty() {
        // 1 and 2 sit in their goal row but in the wrong relative order:
        // manhattan 2 plus one conflict worth 2
        let board =
            Board::from_cells([2, 1, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]);
        assert_eq!(manhattan(&board), 2);
        assert_eq!(linear_conflict(&board), 2);
        assert_eq!(heuristic(&board), 4);
    }

    #[test]
    fn background_task_delivers_exactly_one_result() {
        let board = scramble(24);
        let mut task = SolveTask::spawn(board);
        let deadline = Instant::now() + Duration::from_secs(60);
        let moves = loop {
            if let Some(moves) = task.try_take() {
                break moves;
            }
            assert!(Instant::now() < deadline, "short scrambles should solve quickly");
            thread::sleep(Duration::from_millis(5));
        };
        assert!(replay(board, &moves).is_solved());
        assert!(task.try_take().is_none());
    }
}
