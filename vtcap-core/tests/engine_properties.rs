//! Property tests for the emulation engine
//!
//! Arbitrary input must never break the grid invariants the snapshot encoder
//! relies on.

use proptest::prelude::*;
use vtcap_core::{Terminal, UnhandledPolicy};

fn terminal() -> Terminal<()> {
    let mut term = Terminal::new(24, 80, (), UnhandledPolicy::default());
    term.enable_alt_screen(true);
    term.reset();
    term
}

/// Every width-2 cell is followed by a continuation slot and every
/// continuation slot follows a width-2 cell.
fn assert_wide_pairs(term: &Terminal<()>) -> Result<(), TestCaseError> {
    let (rows, cols) = term.size();
    for row in 0..rows {
        for col in 0..cols {
            let cell = term.cell(row, col).expect("cell in bounds");
            match cell.width {
                2 => {
                    let next = term.cell(row, col + 1);
                    prop_assert!(
                        next.is_some_and(|n| n.is_continuation()),
                        "wide cell at {},{} without continuation",
                        col,
                        row
                    );
                }
                0 => {
                    prop_assert!(col > 0, "continuation at column 0, row {}", row);
                    let prev = term.cell(row, col - 1).expect("cell in bounds");
                    prop_assert_eq!(prev.width, 2);
                }
                1 => {}
                other => prop_assert!(false, "unexpected width {}", other),
            }
        }
    }
    Ok(())
}

fn text_fragment() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(|s| s.into_bytes()),
        "[あいう中文]{1,10}".prop_map(|s| s.into_bytes()),
        Just("e\u{301}".as_bytes().to_vec()),
        (1u8..30, 1u8..90).prop_map(|(r, c)| format!("\x1b[{};{}H", r, c).into_bytes()),
        (0u8..3).prop_map(|m| format!("\x1b[{}K", m).into_bytes()),
        (0u8..3).prop_map(|m| format!("\x1b[{}J", m).into_bytes()),
        (1u8..5).prop_map(|n| format!("\x1b[{}@", n).into_bytes()),
        (1u8..5).prop_map(|n| format!("\x1b[{}P", n).into_bytes()),
        (1u8..5).prop_map(|n| format!("\x1b[{}X", n).into_bytes()),
        (1u8..5).prop_map(|n| format!("\x1b[{}L", n).into_bytes()),
        Just(b"\r\n".to_vec()),
        Just(b"\x1b[4h".to_vec()),
        Just(b"\x1b[4l".to_vec()),
        Just(b"\x1b[?1049h".to_vec()),
        Just(b"\x1b[?1049l".to_vec()),
    ]
}

proptest! {
    #[test]
    fn arbitrary_bytes_keep_cursor_in_bounds(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut term = terminal();
        term.input_write(&bytes);
        let (row, col) = term.cursor_position();
        prop_assert!(row < 24);
        prop_assert!(col < 80);
        assert_wide_pairs(&term)?;
    }

    #[test]
    fn editing_sequences_keep_wide_pairs(fragments in proptest::collection::vec(text_fragment(), 1..40)) {
        let mut term = terminal();
        for fragment in &fragments {
            term.input_write(fragment);
        }
        assert_wide_pairs(&term)?;
    }

    #[test]
    fn cells_hold_at_most_six_code_points(marks in 0usize..20) {
        let mut term = terminal();
        let mut input = String::from("a");
        input.extend(std::iter::repeat('\u{301}').take(marks));
        term.input_write(input.as_bytes());
        let cell = term.cell(0, 0).expect("cell in bounds");
        prop_assert_eq!(cell.chars.len(), (marks + 1).min(vtcap_core::MAX_CHARS_PER_CELL));
        prop_assert_eq!(term.cursor_position(), (0, 1));
    }

    #[test]
    fn soft_wrap_marks_only_following_rows(len in 1usize..400) {
        let mut term = terminal();
        term.input_write(&vec![b'x'; len]);
        let wrapped_rows = (len - 1) / 80;
        prop_assert!(!term.line_continuation(0));
        for row in 1..24 {
            prop_assert_eq!(term.line_continuation(row), row <= wrapped_rows);
        }
    }
}
