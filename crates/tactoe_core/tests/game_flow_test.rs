//! End-to-end games driven through the controller.

use tactoe_core::{
    ControllerConfig, GameController, GameState, GridSize, HistoryStore, InMemoryStore, MoveError,
    Outcome, Replay, Symbol, TaskKind, TaskOutcome,
};

fn new_game(config: ControllerConfig) -> GameController<InMemoryStore> {
    GameController::new(config, HistoryStore::new(InMemoryStore::new()))
}

#[test]
fn test_top_row_win_ends_game() {
    let mut game = new_game(ControllerConfig::default());
    for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        let report = game.apply_move(row, col).unwrap();
        assert_eq!(report.outcome, Outcome::InProgress);
    }

    let report = game.apply_move(0, 2).unwrap();
    assert_eq!(report.outcome, Outcome::Win(Symbol::First));
    assert_eq!(game.state(), GameState::Terminal(Outcome::Win(Symbol::First)));
    assert_eq!(game.current_turn(), None);

    let reset = report.follow_up.expect("auto reset scheduled");
    assert_eq!(reset.kind, TaskKind::Reset);

    assert_eq!(game.apply_move(2, 2), Err(MoveError::GameAlreadyTerminal));
    assert_eq!(game.moves().len(), 5);
}

#[test]
fn test_top_row_win_against_center_opening() {
    let mut game = new_game(ControllerConfig::default());
    let moves = [(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)];
    let mut outcomes = Vec::new();
    for (row, col) in moves {
        outcomes.push(game.apply_move(row, col).unwrap().outcome);
    }
    assert_eq!(outcomes[..4], [Outcome::InProgress; 4]);
    assert_eq!(outcomes[4], Outcome::Win(Symbol::First));

    let symbols: Vec<Symbol> = game.moves().iter().map(|m| m.symbol).collect();
    assert_eq!(
        symbols,
        [Symbol::First, Symbol::Second, Symbol::First, Symbol::Second, Symbol::First]
    );

    let board = game.board().clone();
    assert_eq!(game.apply_move(1, 0), Err(MoveError::GameAlreadyTerminal));
    assert_eq!(game.board(), &board);
    assert_eq!(game.moves().len(), 5);
    assert_eq!(game.last_record().unwrap().result_text(), "X wins!");
}

#[test]
fn test_full_board_without_line_is_draw() {
    let mut game = new_game(ControllerConfig::default());
    // X O X / X O O / O X X
    let order = [
        (0, 0),
        (0, 1),
        (0, 2),
        (1, 1),
        (1, 0),
        (1, 2),
        (2, 1),
        (2, 0),
        (2, 2),
    ];
    let mut last = None;
    for (row, col) in order {
        last = Some(game.apply_move(row, col).unwrap());
    }
    assert_eq!(last.unwrap().outcome, Outcome::Draw);

    let record = game.last_record().expect("record finalized");
    assert_eq!(record.result_text(), "It's a Draw!");
    assert_eq!(record.moves().len(), 9);
}

#[test]
fn test_finished_games_reach_history() {
    let mut game = new_game(ControllerConfig::default());
    for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
        game.apply_move(row, col).unwrap();
    }
    game.reset();
    for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 1)] {
        game.apply_move(row, col).unwrap();
    }

    let summary = game.history().summary();
    assert_eq!(*summary.total(), 2);
    assert_eq!(summary.wins(Symbol::First), 1);
    assert_eq!(summary.wins(Symbol::Second), 1);
}

#[test]
fn test_auto_reset_task_starts_new_game() {
    let mut game = new_game(ControllerConfig::default());
    let mut follow_up = None;
    for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
        follow_up = game.apply_move(row, col).unwrap().follow_up;
    }
    let epoch = game.epoch();

    let outcome = game.apply_deferred(follow_up.unwrap());
    assert_eq!(outcome, TaskOutcome::Reset { follow_up: None });
    assert_eq!(game.epoch(), epoch + 1);
    assert!(game.moves().is_empty());
    assert_eq!(game.current_turn(), Some(Symbol::First));
}

#[test]
fn test_manual_reset_cancels_pending_auto_reset() {
    let mut game = new_game(ControllerConfig::default());
    let mut follow_up = None;
    for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
        follow_up = game.apply_move(row, col).unwrap().follow_up;
    }
    game.reset();
    game.apply_move(1, 1).unwrap();

    assert_eq!(game.apply_deferred(follow_up.unwrap()), TaskOutcome::Stale);
    assert_eq!(game.moves().len(), 1);
}

#[test]
fn test_human_moving_for_computer_skips_its_task() {
    let mut game = new_game(ControllerConfig::default().with_assist(true));
    let task = game.apply_move(0, 0).unwrap().follow_up.unwrap();
    // Hot-seat: the human places O before the computer gets to run.
    game.apply_move(2, 2).unwrap();
    assert_eq!(game.apply_deferred(task), TaskOutcome::Skipped);
    assert_eq!(game.moves().len(), 2);
}

#[test]
fn test_enabling_assist_on_computer_turn_schedules_move() {
    let mut game = new_game(ControllerConfig::default());
    game.apply_move(1, 1).unwrap();
    let task = game.set_assist_mode(true).expect("computer to move");
    assert!(matches!(game.apply_deferred(task), TaskOutcome::Moved(_)));

    assert_eq!(game.set_assist_mode(true), None);
}

#[test]
fn test_computer_vs_computer_terminates_on_every_size() {
    for size in GridSize::all() {
        let mut game = new_game(ControllerConfig::new(size).with_depth_limit(2));
        while game.current_turn().is_some() {
            game.play_computer_move().unwrap();
        }
        assert!(game.outcome().is_terminal());

        let record = game.last_record().unwrap().clone();
        let mut replay = Replay::new(record);
        replay.run_to_end().unwrap();
        assert_eq!(replay.board(), game.board());
        assert_eq!(replay.outcome(), game.outcome());
    }
}

#[test]
fn test_computer_blocks_immediate_threat() {
    let mut game = new_game(ControllerConfig::default().with_assist(true));
    game.apply_move(0, 0).unwrap();
    game.apply_move(2, 2).unwrap();
    let task = game.apply_move(0, 1).unwrap().follow_up;
    // X threatens the top row.
    assert!(task.is_some());
    let TaskOutcome::Moved(report) = game.apply_deferred(task.unwrap()) else {
        panic!("computer should move");
    };
    assert_eq!((report.mv.row, report.mv.col), (0, 2));
}
