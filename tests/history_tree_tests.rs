//! 履歴ツリーの分岐・移動テスト
//!
//! undo 後の編集による分岐、redo の子選択、ルートへの復帰、
//! 線形モードでの履歴破棄を検証

use edittree::history::{HistoryError, HistoryMode, HistoryStatus, HistoryTree, NodeId};
use edittree::{Position, TextBuffer};
use proptest::prelude::*;

fn snapshot(text: &str) -> TextBuffer {
    TextBuffer::from_text(text)
}

fn moved_text(status: HistoryStatus) -> String {
    match status {
        HistoryStatus::Moved(checkpoint) => checkpoint.snapshot.content(),
        other => panic!("expected a move, got {:?}", other),
    }
}

#[test]
fn test_undo_then_push_creates_sibling_branch() {
    let mut tree = HistoryTree::new(snapshot(""));
    let a = tree.push("A", snapshot("a"), None, None);
    let b = tree.push("B", snapshot("ab"), None, None);
    tree.undo().unwrap();
    let c = tree.push("C", snapshot("ac"), None, None);

    assert_eq!(tree.node(c).unwrap().parent(), Some(a));
    assert_eq!(tree.get_branches(a).unwrap(), &[b, c]);
    assert_eq!(tree.node(b).unwrap().snapshot().content(), "ab");
}

#[test]
fn test_redo_lands_on_oldest_child_until_explicit_goto() {
    let mut tree = HistoryTree::new(snapshot(""));
    let a = tree.push("A", snapshot("a"), None, None);
    let b = tree.push("B", snapshot("ab"), None, None);
    tree.undo().unwrap();
    let c = tree.push("C", snapshot("ac"), None, None);

    for _ in 0..3 {
        tree.goto_node(a).unwrap();
        assert_eq!(moved_text(tree.redo().unwrap()), "ab");
        assert_eq!(tree.current_id(), Some(b));
    }

    let checkpoint = tree.goto_node(c).unwrap();
    assert_eq!(checkpoint.snapshot.content(), "ac");
    assert_eq!(tree.current_id(), Some(c));
}

#[test]
fn test_repeated_undo_reaches_initial_snapshot() {
    let mut tree = HistoryTree::new(snapshot("initial"));
    for i in 0..5 {
        tree.push(format!("edit {}", i), snapshot(&format!("initial{}", i)), None, None);
    }

    let mut last = None;
    while tree.current_id().is_some() {
        last = Some(tree.undo().unwrap());
    }
    assert_eq!(moved_text(last.unwrap()), "initial");

    for _ in 0..3 {
        let status = tree.undo().unwrap();
        assert_eq!(status, HistoryStatus::AtOldest);
        assert_eq!(status.message(), Some("Already at oldest change"));
    }
}

#[test]
fn test_redo_at_leaf_reports_boundary() {
    let mut tree = HistoryTree::new(snapshot(""));
    tree.push("A", snapshot("a"), None, None);
    let status = tree.redo().unwrap();
    assert_eq!(status, HistoryStatus::AtNewest);
    assert_eq!(
        status.status_message().unwrap().message,
        "Already at newest change"
    );
}

#[test]
fn test_undo_redo_restore_cursor() {
    let mut tree = HistoryTree::new(snapshot(""));
    tree.push("type", snapshot("abc"), Some(0), Some(3));
    tree.push("newline", snapshot("abc\n"), Some(1), Some(0));

    match tree.undo().unwrap() {
        HistoryStatus::Moved(checkpoint) => {
            assert_eq!(checkpoint.cursor(), Some(Position::new(0, 3)));
        }
        other => panic!("unexpected {:?}", other),
    }
    match tree.redo().unwrap() {
        HistoryStatus::Moved(checkpoint) => {
            assert_eq!(checkpoint.cursor(), Some(Position::new(1, 0)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_missing_node_errors() {
    let mut tree = HistoryTree::new(snapshot(""));
    assert_eq!(tree.goto_node(0), Err(HistoryError::NodeNotFound { id: 0 }));
    assert_eq!(tree.get_branches(3), Err(HistoryError::NodeNotFound { id: 3 }));
}

#[test]
fn test_tree_structure_marks_single_current() {
    let mut tree = HistoryTree::new(snapshot(""));
    let a = tree.push("A", snapshot("a"), None, None);
    tree.push("B", snapshot("ab"), None, None);
    tree.goto_node(a).unwrap();
    tree.push("C", snapshot("ac"), None, None);

    let structure = tree.tree_structure();
    assert_eq!(structure.iter().filter(|n| n.is_current).count(), 1);
    let root_level: Vec<_> = structure.iter().filter(|n| n.parent_id.is_none()).collect();
    assert_eq!(root_level.len(), 1);
    assert_eq!(root_level[0].child_ids.len(), 2);
}

#[test]
fn test_switching_to_linear_mode_applies_on_next_push() {
    let mut tree = HistoryTree::new(snapshot(""));
    let a = tree.push("A", snapshot("a"), None, None);
    let b = tree.push("B", snapshot("ab"), None, None);
    tree.undo().unwrap();
    let c = tree.push("C", snapshot("ac"), None, None);
    assert_eq!(tree.get_branches(a).unwrap(), &[b, c]);

    tree.set_mode(HistoryMode::Linear);
    tree.undo().unwrap();
    let d = tree.push("D", snapshot("ad"), None, None);
    assert_eq!(tree.get_branches(a).unwrap(), &[d]);
    assert!(tree.node(b).is_none());
    assert!(tree.node(c).is_none());
}

#[derive(Debug, Clone)]
enum Step {
    Push,
    Undo,
    Redo,
    Goto(usize),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Push),
        2 => Just(Step::Undo),
        1 => Just(Step::Redo),
        1 => any::<usize>().prop_map(Step::Goto),
    ]
}

fn run_steps(tree: &mut HistoryTree, steps: &[Step]) -> Vec<NodeId> {
    let mut pushed = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        match step {
            Step::Push => pushed.push(tree.push(format!("{}", i), snapshot(&i.to_string()), None, None)),
            Step::Undo => {
                tree.undo().unwrap();
            }
            Step::Redo => {
                tree.redo().unwrap();
            }
            Step::Goto(seed) => {
                let live: Vec<_> = tree.tree_structure().iter().map(|n| n.id).collect();
                if !live.is_empty() {
                    tree.goto_node(live[seed % live.len()]).unwrap();
                }
            }
        }
    }
    pushed
}

proptest! {
    #[test]
    fn prop_parent_child_links_are_consistent(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let mut tree = HistoryTree::new(snapshot(""));
        let pushed = run_steps(&mut tree, &steps);

        // Branching mode never drops a node.
        prop_assert_eq!(tree.len(), pushed.len());

        for summary in tree.tree_structure() {
            let siblings = match summary.parent_id {
                Some(parent) => tree.get_branches(parent).unwrap().to_vec(),
                None => tree.root_branches().to_vec(),
            };
            prop_assert_eq!(siblings.iter().filter(|&&id| id == summary.id).count(), 1);
            for child in &summary.child_ids {
                prop_assert_eq!(tree.node(*child).unwrap().parent(), Some(summary.id));
            }
        }

        if let Some(current) = tree.current_id() {
            prop_assert!(tree.node(current).is_some());
        }
    }

    #[test]
    fn prop_linear_mode_keeps_single_children(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let mut tree = HistoryTree::with_mode(snapshot(""), HistoryMode::Linear);
        run_steps(&mut tree, &steps);

        prop_assert!(tree.root_branches().len() <= 1);
        for summary in tree.tree_structure() {
            prop_assert!(summary.child_ids.len() <= 1);
        }
    }

    #[test]
    fn prop_undo_to_root_always_yields_initial(steps in prop::collection::vec(step_strategy(), 0..30)) {
        let mut tree = HistoryTree::new(snapshot("seed"));
        run_steps(&mut tree, &steps);

        while tree.current_id().is_some() {
            tree.undo().unwrap();
        }
        prop_assert_eq!(tree.current_snapshot().unwrap().content(), "seed");
        prop_assert_eq!(tree.undo().unwrap(), HistoryStatus::AtOldest);
    }
}
