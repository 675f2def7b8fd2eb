use brief_core::Message;
use brief_graph::{merge_messages, trim_history};
use proptest::prelude::*;

fn arb_message() -> impl Strategy<Value = Message> {
    (0u64..40, "[a-z ]{0,12}", 0u8..3).prop_map(|(seq, content, role)| match role {
        0 => Message::Human { seq, content },
        1 => Message::Ai { seq, content, tool_calls: Vec::new() },
        _ => Message::Tool { seq, content, tool_name: "sum_tool".into(), tool_call_id: "c".into() },
    })
}

fn arb_log() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(arb_message(), 0..20)
}

proptest! {
    #[test]
    fn merge_is_idempotent(a in arb_log(), b in arb_log()) {
        let once = merge_messages(&a, &b);
        let twice = merge_messages(&once, &b);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_is_sorted_and_unique(a in arb_log(), b in arb_log()) {
        let merged = merge_messages(&a, &b);
        for pair in merged.windows(2) {
            prop_assert!(pair[0].seq() < pair[1].seq());
        }
    }

    #[test]
    fn merge_keeps_existing_copies(a in arb_log(), b in arb_log()) {
        let merged = merge_messages(&a, &b);
        for message in &a {
            let kept = merged.iter().find(|m| m.seq() == message.seq()).unwrap();
            let first = a.iter().find(|m| m.seq() == message.seq()).unwrap();
            prop_assert_eq!(kept, first);
        }
    }

    #[test]
    fn trim_never_exceeds_window(log in arb_log(), window in 0usize..25) {
        let trimmed = trim_history(&log, window);
        prop_assert!(trimmed.len() <= window);
        if let Some(first) = trimmed.first() {
            let first_is_tool = matches!(first, Message::Tool { .. });
            prop_assert!(!first_is_tool);
        }
    }
}
