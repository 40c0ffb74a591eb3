use blockfall_engine::{
    ActionError, Block, Board, GameCommand, GameSession, MoveOutcome, PieceKind, Position,
    Randomizer, SessionConfig, SessionState,
};

fn sequence(kinds: &[PieceKind]) -> SessionConfig {
    SessionConfig {
        seed: Some(0),
        randomizer: Randomizer::Sequence(kinds.to_vec()),
        show_ghost: true,
    }
}

fn board(text: &str) -> Board {
    text.parse().unwrap()
}

/// Rotates the vertical I into the rightmost column.
fn vertical_i_to_right_wall(session: &mut GameSession) {
    session.try_rotate().unwrap();
    for _ in 0..6 {
        session.move_right().unwrap();
    }
    assert_eq!(session.active_piece().unwrap().position(), Position::new(9, 0));
}

#[test]
fn i_piece_falls_nineteen_rows_then_locks() {
    let mut session = GameSession::with_config(sequence(&[PieceKind::I, PieceKind::T]));
    for y in 1..=19 {
        assert_eq!(session.move_down(), Ok(MoveOutcome::Moved));
        assert_eq!(session.active_piece().unwrap().position(), Position::new(3, y));
        assert!(session.board().is_empty());
    }

    let Ok(MoveOutcome::Locked(report)) = session.move_down() else {
        panic!("20th move down should lock");
    };
    assert_eq!(report.kind, PieceKind::I);
    assert_eq!(report.cleared_lines, 0);
    for x in 0..10 {
        let expected = if (3..=6).contains(&x) {
            Block::Piece(PieceKind::I)
        } else {
            Block::Empty
        };
        assert_eq!(session.board().cell(x, 19), Some(expected));
    }
    assert_eq!(session.board().occupied_count(), 4);
    assert_eq!(session.lines(), 0);
    assert_eq!(session.score(), 0);
    assert_eq!(session.active_piece().unwrap().kind(), PieceKind::T);
}

#[test]
fn hard_drop_completing_a_row_scores_single() {
    let mut session = GameSession::with_board(
        sequence(&[PieceKind::I]),
        board("IIIIIIIII."),
    );
    vertical_i_to_right_wall(&mut session);
    assert_eq!(session.ghost_piece().unwrap().position(), Position::new(9, 16));

    let report = session.hard_drop().unwrap();
    assert_eq!(report.cleared_lines, 1);
    assert_eq!(report.score_gained, 100);
    assert_eq!(session.lines(), 1);
    assert_eq!(session.score(), 100);
    assert_eq!(session.level(), 1);
    // The three remaining I cells sank by one row.
    assert_eq!(session.board().occupied_count(), 3);
    for y in 17..20 {
        assert_eq!(session.board().cell(9, y), Some(Block::Piece(PieceKind::I)));
    }
}

#[test]
fn five_o_pieces_clear_two_lines() {
    let mut session = GameSession::with_config(sequence(&[PieceKind::O]));
    for dx in [-4_i32, -2, 0, 2, 4] {
        let step = if dx < 0 {
            GameCommand::MoveLeft
        } else {
            GameCommand::MoveRight
        };
        for _ in 0..dx.abs() {
            session.apply(step).unwrap();
        }
        let report = session.apply(GameCommand::HardDrop).unwrap().unwrap();
        assert!(!report.game_over);
    }
    assert_eq!(session.lines(), 2);
    assert_eq!(session.score(), 300);
    assert!(session.board().is_empty());
    assert_eq!(session.stats().line_cleared_counter(), &[4, 0, 1, 0, 0]);
}

#[test]
fn points_use_level_before_the_lock() {
    let mut session = GameSession::with_board(
        sequence(&[PieceKind::I]),
        board(
            "
            IIIIIIIII.
            I.........
            IIIIIIIII.
            IIIIIIIII.
            IIIIIIIII.
            ",
        ),
    );

    vertical_i_to_right_wall(&mut session);
    let report = session.hard_drop().unwrap();
    assert_eq!(report.cleared_lines, 3);
    assert_eq!(report.score_gained, 500);
    assert_eq!(session.level(), 2);

    vertical_i_to_right_wall(&mut session);
    let report = session.hard_drop().unwrap();
    assert_eq!(report.cleared_lines, 1);
    assert_eq!(report.score_gained, 200);
    assert_eq!(session.score(), 700);
    assert_eq!(session.lines(), 4);
    assert_eq!(session.level(), 2);
    assert_eq!(session.board().occupied_count(), 5);
}

#[test]
fn blocked_spawn_is_game_over_until_restart() {
    let mut session = GameSession::with_board(
        sequence(&[PieceKind::T]),
        board(&format!("...TTTT...\n...TTTT...\n{}", "..........\n".repeat(18))),
    );
    assert!(session.is_game_over());
    assert_eq!(session.session_state(), SessionState::GameOver);
    assert!(session.active_piece().is_none());
    assert!(session.ghost_piece().is_none());

    let before = session.snapshot();
    assert_eq!(session.move_left(), Err(ActionError::GameOver));
    assert_eq!(session.move_down(), Err(ActionError::GameOver));
    assert_eq!(session.try_rotate(), Err(ActionError::GameOver));
    assert_eq!(session.hard_drop(), Err(ActionError::GameOver));
    assert_eq!(session.snapshot(), before);

    // Pausing a finished game changes nothing visible.
    session.toggle_pause();
    assert_eq!(session.session_state(), SessionState::GameOver);
    assert_eq!(session.move_left(), Err(ActionError::GameOver));

    session.restart();
    assert!(!session.is_game_over());
    assert!(!session.is_paused());
    assert!(session.board().is_empty());
    assert_eq!(session.session_state(), SessionState::Playing);
    assert_eq!(session.move_left(), Ok(MoveOutcome::Moved));
}

#[test]
fn stacking_at_spawn_ends_the_game() {
    let mut session = GameSession::with_config(sequence(&[PieceKind::O]));
    for _ in 0..9 {
        let report = session.hard_drop().unwrap();
        assert!(!report.game_over);
    }
    let report = session.hard_drop().unwrap();
    assert!(report.game_over);
    assert!(session.is_game_over());
    // The final piece stays on the board.
    assert_eq!(session.board().occupied_count(), 40);
    assert_eq!(session.stats().completed_pieces(), 10);
    assert_eq!(session.hard_drop(), Err(ActionError::GameOver));
}

#[test]
fn same_seed_replays_identically() {
    let commands = [
        GameCommand::MoveLeft,
        GameCommand::Rotate,
        GameCommand::HardDrop,
        GameCommand::MoveRight,
        GameCommand::MoveRight,
        GameCommand::HardDrop,
        GameCommand::Rotate,
        GameCommand::Rotate,
        GameCommand::MoveDown,
        GameCommand::HardDrop,
    ];
    let play = |seed| {
        let mut session = GameSession::with_seed(seed);
        for command in commands {
            session.apply(command).ok();
        }
        session.snapshot()
    };
    assert_eq!(play(77), play(77));
}

#[test]
fn display_board_shows_ghost_only_below_piece() {
    let mut session = GameSession::with_config(sequence(&[PieceKind::O]));
    session.hard_drop().unwrap();
    for _ in 0..16 {
        session.move_down().unwrap();
    }
    // The new O rests directly on the first one: no separate ghost.
    assert_eq!(session.ghost_piece().unwrap().position().y, 16);
    let display = session.display_board();
    assert!(display.values().iter().flatten().all(|&v| v >= 0));
    assert_eq!(
        display.to_string().lines().skip(16).collect::<Vec<_>>(),
        ["....OO....", "....OO....", "....OO....", "....OO...."]
    );
}
