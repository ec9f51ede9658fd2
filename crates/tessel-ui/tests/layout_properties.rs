// SPDX-License-Identifier: MIT
//
// Layout and edit-state properties.

use proptest::prelude::*;
use tessel_ui::layout::{Dim, Rect, resolve};
use tessel_ui::{EDIT_CAPACITY, EditState};

fn dim() -> impl Strategy<Value = Dim> {
    prop_oneof![
        (0u16..200).prop_map(Dim::Near),
        (0u16..200).prop_map(Dim::Far),
        Just(Dim::Auto),
    ]
}

fn parent() -> impl Strategy<Value = Rect> {
    (0u16..300, 0u16..300, 0u16..300, 0u16..300).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

/// Short strings mixing ASCII and multibyte codepoints.
fn snippet() -> impl Strategy<Value = String> {
    "[a-zé日🔥]{0,6}"
}

proptest! {
    #[test]
    fn resolved_rect_lies_within_parent(p in parent(), x in dim(), y in dim(), w in dim(), h in dim()) {
        let r = resolve(p, x, y, w, h);
        prop_assert!(p.encloses(r), "{r:?} escapes {p:?}");
    }

    #[test]
    fn resolution_is_deterministic(p in parent(), x in dim(), y in dim(), w in dim(), h in dim()) {
        prop_assert_eq!(resolve(p, x, y, w, h), resolve(p, x, y, w, h));
    }

    #[test]
    fn fitting_near_rect_is_exact(p in parent(), x in 0u16..50, y in 0u16..50, w in 0u16..50, h in 0u16..50) {
        prop_assume!(x + w <= p.w && y + h <= p.h);
        let r = resolve(p, Dim::Near(x), Dim::Near(y), Dim::Near(w), Dim::Near(h));
        prop_assert_eq!(r, Rect::new(p.x + x, p.y + y, w, h));
    }

    #[test]
    fn insert_then_backspace_restores(initial in snippet(), cursor in 0usize..8, typed in "[a-zé日🔥]") {
        let mut state = EditState::new(&initial);
        for _ in cursor..state.len() {
            state.move_left();
        }
        let before = state.clone();

        prop_assert!(state.insert(&typed));
        prop_assert_eq!(state.cursor(), before.cursor() + 1);
        state.backspace();
        prop_assert_eq!(state, before);
    }

    #[test]
    fn insert_then_delete_restores(initial in snippet(), typed in "[a-zé日🔥]") {
        let mut state = EditState::new(&initial);
        state.move_home();
        let before = state.clone();

        prop_assert!(state.insert(&typed));
        state.move_left();
        state.delete();
        prop_assert_eq!(state, before);
    }

    #[test]
    fn edit_text_never_exceeds_capacity(chunks in proptest::collection::vec(snippet(), 0..120)) {
        let mut state = EditState::new("");
        for chunk in &chunks {
            state.insert(chunk);
            prop_assert!(state.text().len() < EDIT_CAPACITY);
            prop_assert_eq!(state.len(), state.text().chars().count());
            prop_assert!(state.cursor() <= state.len());
        }
    }
}
